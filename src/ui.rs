// UI layer: coloured status lines plus the flows that drive a session.
// Output goes through `Printer` so the flows can be checked against an
// in-memory buffer instead of the terminal.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::style::Stylize;
use dialoguer::{Input, Password};
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::{HhUpdater, ResumeSession};
use crate::error::Result;

/// Login/password pair for one HH.ru account.
#[derive(Clone)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"***")
            .finish()
    }
}

impl Credentials {
    /// Use whatever was given on the command line and prompt for the rest.
    /// The password prompt hides its input.
    pub fn resolve(login: Option<String>, password: Option<String>) -> Result<Self> {
        let login = match login {
            Some(l) => l,
            None => Input::new().with_prompt("Login").interact_text()?,
        };
        let password = match password {
            Some(p) => p,
            None => Password::new().with_prompt("Password").interact()?,
        };
        Ok(Credentials { login, password })
    }
}

/// Writes `✓`/`✗`/`ℹ` status lines. `detail` lines only show up in verbose
/// mode; everything else is always printed.
pub struct Printer<W: Write> {
    out: W,
    verbose: bool,
}

impl Printer<io::Stdout> {
    pub fn stdout(verbose: bool) -> Self {
        Printer::new(io::stdout(), verbose)
    }
}

impl<W: Write> Printer<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Printer { out, verbose }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn success(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{}", format!("✓ {message}").green())
    }

    pub fn error(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{}", format!("✗ {message}").red())
    }

    pub fn info(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{}", format!("ℹ {message}").blue())
    }

    /// Info line for verbose runs only.
    pub fn detail(&mut self, message: &str) -> io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        self.info(message)
    }

    pub fn plain(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{message}")
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Result of the single-resume flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchOutcome {
    Updated,
    UpdateFailed,
    AuthFailed,
}

/// Log in and touch one resume, reporting each step on `out`. The update
/// is never attempted when the login is rejected.
pub fn touch_resume<S: ResumeSession, W: Write>(
    session: &mut S,
    credentials: &Credentials,
    cv_id: &str,
    out: &mut W,
) -> Result<TouchOutcome> {
    if !session.auth(&credentials.login, &credentials.password)? {
        writeln!(out, "Ошибка авторизации")?;
        return Ok(TouchOutcome::AuthFailed);
    }
    writeln!(out, "Авторизация успешна!")?;

    if session.update_cv(cv_id)? {
        writeln!(out, "Резюме успешно обновлено!")?;
        Ok(TouchOutcome::Updated)
    } else {
        writeln!(out, "Ошибка при обновлении резюме")?;
        Ok(TouchOutcome::UpdateFailed)
    }
}

/// What the `update` command asks for.
#[derive(Debug)]
pub struct UpdateRequest<'a> {
    pub base_url: &'a str,
    pub credentials: &'a Credentials,
    pub cv_ids: &'a [String],
}

/// Summary of a multi-resume run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub authenticated: bool,
    pub updated: usize,
    pub total: usize,
    pub elapsed: Duration,
}

impl UpdateReport {
    /// True when the login went through and every resume was touched.
    pub fn is_complete(&self) -> bool {
        self.authenticated && self.updated == self.total
    }
}

/// Log in once and touch every resume in order. Individual refusals are
/// reported and counted; transport errors abort the run.
pub fn update_resumes<S: ResumeSession, W: Write>(
    session: &mut S,
    request: &UpdateRequest<'_>,
    printer: &mut Printer<W>,
) -> Result<UpdateReport> {
    let total = request.cv_ids.len();
    printer.detail(&format!("Начинаем процесс обновления {total} резюме"))?;
    printer.detail(&format!("Используем базовый URL: {}", request.base_url))?;
    printer.detail(&format!("Резюме для обновления: {}", request.cv_ids.join(", ")))?;

    let start = Instant::now();

    printer.detail("Получаем XSRF токен...")?;
    printer.detail("Выполняем авторизацию...")?;
    let spinner = auth_spinner(printer.is_verbose());
    let creds = request.credentials;
    let authenticated = session.auth(&creds.login, &creds.password);
    spinner.finish_and_clear();

    if !authenticated? {
        printer.error("Ошибка авторизации. Проверьте логин и пароль.")?;
        return Ok(UpdateReport {
            authenticated: false,
            updated: 0,
            total,
            elapsed: start.elapsed(),
        });
    }
    printer.success("Авторизация прошла успешно!")?;

    let mut updated = 0;
    for cv_id in request.cv_ids {
        printer.detail(&format!("Обновляем резюме {cv_id}..."))?;
        if session.update_cv(cv_id)? {
            printer.success(&format!("Резюме {cv_id} успешно обновлено!"))?;
            updated += 1;
        } else {
            printer.error(&format!("Не удалось обновить резюме {cv_id}"))?;
        }
    }

    let elapsed = start.elapsed();
    printer.success(&format!(
        "Обновлено {updated} из {total} резюме за {:.2} секунд",
        elapsed.as_secs_f64()
    ))?;

    Ok(UpdateReport {
        authenticated: true,
        updated,
        total,
        elapsed,
    })
}

/// Probe the site by fetching an XSRF token. Returns whether one came back.
pub fn check_availability<W: Write>(
    updater: &mut HhUpdater,
    printer: &mut Printer<W>,
) -> Result<bool> {
    match updater.get_xsrf()? {
        Some(token) => {
            let prefix: String = token.chars().take(10).collect();
            printer.success(&format!("HH.ru доступен! XSRF токен получен: {prefix}..."))?;
            Ok(true)
        }
        None => {
            printer.error("Не удалось получить XSRF токен")?;
            Ok(false)
        }
    }
}

/// Spinner shown while the login form is submitted. Verbose runs already
/// print a line per step, so they get a hidden bar.
fn auth_spinner(verbose: bool) -> ProgressBar {
    if verbose {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("Авторизация...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
