// API client module: a small blocking HTTP session against HH.ru. It
// keeps one reqwest client and one cookie jar per session so the XSRF
// cookie and the login cookies travel with every following request.

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, REFERER, USER_AGENT,
};
use reqwest::redirect::Policy;
use reqwest::{StatusCode, Url};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Result, UpdaterError};

/// Production endpoint used when no base URL is given.
pub const DEFAULT_BASE_URL: &str = "https://hh.ru";

/// Request timeout used by [`HhUpdater::new`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const LOGIN_PATH: &str = "/account/login?backurl=%2F";
const TOUCH_PATH: &str = "/applicant/resumes/touch";
const XSRF_COOKIE: &str = "_xsrf";
const MAX_REDIRECTS: usize = 10;

/// Operations the UI flows need from a session. `HhUpdater` is the real
/// implementation; tests drive the flows with in-memory fakes.
pub trait ResumeSession {
    /// Log in with the given credentials. `Ok(false)` means the site
    /// rejected them.
    fn auth(&mut self, login: &str, password: &str) -> Result<bool>;

    /// Touch a resume so it moves up in search results.
    fn update_cv(&mut self, cv_id: &str) -> Result<bool>;
}

/// Login form as the HH.ru page submits it.
#[derive(Serialize, Debug)]
struct LoginForm<'a> {
    username: &'a str,
    password: &'a str,
    #[serde(rename = "backUrl")]
    back_url: String,
    #[serde(rename = "_xsrf")]
    xsrf: &'a str,
    action: &'a str,
}

/// Body of the resume touch request.
#[derive(Serialize, Debug)]
struct TouchForm<'a> {
    resume: &'a str,
    undirectable: &'a str,
}

/// Session against one HH.ru instance. Dropping it closes the session;
/// keep it in a block (or pass it by value) to scope its lifetime.
pub struct HhUpdater {
    client: Client,
    jar: Arc<Jar>,
    base_url: String,
    login_url: Url,
    xsrf: Option<String>,
}

impl HhUpdater {
    /// Open a session against `base_url` with the default timeout.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Open a session against [`DEFAULT_BASE_URL`], ignoring the environment.
    pub fn default_url() -> Result<Self> {
        Self::new(DEFAULT_BASE_URL)
    }

    /// Open a session configured from `HH_BASE_URL` when it is set, falling
    /// back to [`DEFAULT_BASE_URL`].
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("HH_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        Self::new(&base_url)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let login_url = parse_url(&base_url, &format!("{base_url}{LOGIN_PATH}"))?;

        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .default_headers(browser_headers())
            .cookie_provider(Arc::clone(&jar))
            .redirect(Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .build()?;

        debug!(%base_url, ?timeout, "opened HH.ru session");
        Ok(HhUpdater {
            client,
            jar,
            base_url,
            login_url,
            xsrf: None,
        })
    }

    /// Base URL without the trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// XSRF token fetched so far, if any.
    pub fn xsrf(&self) -> Option<&str> {
        self.xsrf.as_deref()
    }

    /// Load the login page and pick the `_xsrf` cookie out of the jar.
    /// The token is cached on the session for later requests; an empty
    /// cookie counts as no token.
    pub fn get_xsrf(&mut self) -> Result<Option<String>> {
        let res = self.client.get(self.login_url.clone()).send()?;
        debug!(status = %res.status(), url = %res.url(), "fetched login page");

        self.xsrf = self.cookie(XSRF_COOKIE).filter(|t| !t.is_empty());
        if self.xsrf.is_none() {
            warn!(base_url = %self.base_url, "login page did not set an XSRF cookie");
        }
        Ok(self.xsrf.clone())
    }

    fn cookie(&self, name: &str) -> Option<String> {
        let header = self.jar.cookies(&self.login_url)?;
        let raw = header.to_str().ok()?;
        find_cookie(raw, name).map(str::to_string)
    }
}

impl ResumeSession for HhUpdater {
    fn auth(&mut self, login: &str, password: &str) -> Result<bool> {
        if self.xsrf.is_none() {
            self.get_xsrf()?;
        }

        let form = LoginForm {
            username: login,
            password,
            back_url: format!("{}/", self.base_url),
            xsrf: self.xsrf.as_deref().unwrap_or(""),
            action: "Войти",
        };
        let res = self.client.post(self.login_url.clone()).form(&form).send()?;
        let status = res.status();
        debug!(%status, url = %res.url(), "submitted login form");

        let ok = status == StatusCode::OK;
        info!(%login, ok, "authentication finished");
        Ok(ok)
    }

    fn update_cv(&mut self, cv_id: &str) -> Result<bool> {
        let Some(xsrf) = self.xsrf.as_deref() else {
            warn!(%cv_id, "no XSRF token, skipping resume update");
            return Ok(false);
        };

        let url = format!("{}{TOUCH_PATH}", self.base_url);
        let referer = format!("{}/applicant/resumes/{cv_id}", self.base_url);
        let form = TouchForm {
            resume: cv_id,
            undirectable: "true",
        };
        let res = self
            .client
            .post(&url)
            .header("X-Xsrftoken", xsrf)
            .header("X-Requested-With", "XMLHttpRequest")
            .header(REFERER, referer)
            .form(&form)
            .send()?;
        let status = res.status();
        debug!(%status, %cv_id, "touched resume");

        let ok = status == StatusCode::OK;
        info!(%cv_id, ok, "resume update finished");
        Ok(ok)
    }
}

impl Drop for HhUpdater {
    fn drop(&mut self) {
        debug!(base_url = %self.base_url, "closing HH.ru session");
    }
}

/// Headers that make the requests look like a desktop browser.
/// `Accept-Encoding: gzip, br, deflate` is added by reqwest, which also
/// decodes the bodies.
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static("Mozilla/5.0 (Windows NT 6.1; Win64; x64) AppleWebKit/537.36"),
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7"),
    );
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(HeaderName::from_static("dnt"), HeaderValue::from_static("1"));
    headers
}

/// Strip trailing slashes and make sure the result is an absolute
/// http(s) URL.
fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = parse_url(raw, trimmed)?;
    match url.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(UpdaterError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

fn parse_url(original: &str, candidate: &str) -> Result<Url> {
    Url::parse(candidate).map_err(|e| UpdaterError::InvalidBaseUrl {
        url: original.to_string(),
        reason: e.to_string(),
    })
}

/// Find `name` in a `Cookie` header value such as `a=1; _xsrf=abc`.
fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}
