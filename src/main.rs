// Entrypoint for the CLI application.
// - Parses arguments, sets up logging, then runs one command.
// - Every failure ends with a red status line and exit code 1.

mod cli;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use hh_updater::api::HhUpdater;
use hh_updater::ui::{check_availability, update_resumes, Credentials, Printer, UpdateRequest};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut printer = Printer::stdout(cli.verbose > 0);
    let outcome = match &cli.command {
        Commands::Update { cv_ids } => run_update(&cli, cv_ids, &mut printer)
            .map_err(|e| ("Произошла непредвиденная ошибка", e)),
        Commands::Check => {
            run_check(&cli, &mut printer).map_err(|e| ("Ошибка при проверке доступности", e))
        }
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err((prefix, err)) => {
            tracing::debug!(error = ?err, "command failed");
            let _ = printer.error(&format!("{prefix}: {err:#}"));
            if printer.is_verbose() {
                let _ = printer.plain(&format!("{err:?}"));
            }
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr so the status lines on stdout stay clean. `RUST_LOG`
/// wins over the `-v` flags when set.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info,hh_updater=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_update(cli: &Cli, cv_ids: &[String], printer: &mut Printer<std::io::Stdout>) -> Result<bool> {
    let credentials = Credentials::resolve(cli.login.clone(), cli.password.clone())
        .context("failed to read credentials")?;

    let mut updater = HhUpdater::with_timeout(&cli.base_url, cli.timeout())
        .context("failed to open HH.ru session")?;
    let base_url = updater.base_url().to_string();

    let request = UpdateRequest {
        base_url: &base_url,
        credentials: &credentials,
        cv_ids,
    };
    let report = update_resumes(&mut updater, &request, printer)?;
    tracing::info!(
        updated = report.updated,
        total = report.total,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "update run finished"
    );
    Ok(report.is_complete())
}

fn run_check(cli: &Cli, printer: &mut Printer<std::io::Stdout>) -> Result<bool> {
    printer.info(&format!("Проверяем доступность {}...", cli.base_url))?;

    let mut updater = HhUpdater::with_timeout(&cli.base_url, cli.timeout())
        .context("failed to open HH.ru session")?;
    Ok(check_availability(&mut updater, printer)?)
}
