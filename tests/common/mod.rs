// Fake HH.ru used by the integration tests.
// A small axum app on a background thread with its own tokio runtime.
// It mimics the three exchanges the client makes and records what it
// received, so tests can assert on both the client's answer and the
// requests it sent.

#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use axum::extract::{Form, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

pub const LOGIN: &str = "applicant@example.com";
pub const PASSWORD: &str = "correct horse";
pub const XSRF: &str = "0123456789abcdef";
pub const KNOWN_RESUMES: [&str; 2] = ["cv123", "cv456"];

const SESSION_COOKIE: &str = "hhtoken=session-1";

#[derive(Debug, Clone, Deserialize)]
pub struct LoginAttempt {
    pub username: String,
    pub password: String,
    #[serde(rename = "backUrl")]
    pub back_url: String,
    #[serde(rename = "_xsrf")]
    pub xsrf: String,
    pub action: String,
}

#[derive(Debug, Clone, Deserialize)]
struct TouchBody {
    resume: String,
    undirectable: String,
}

#[derive(Debug, Clone)]
pub struct TouchAttempt {
    pub resume: String,
    pub undirectable: String,
    pub xsrf_header: Option<String>,
    pub requested_with: Option<String>,
    pub referer: Option<String>,
    pub cookie: String,
}

#[derive(Debug, Default)]
pub struct Recorded {
    pub logins: Vec<LoginAttempt>,
    pub touches: Vec<TouchAttempt>,
    pub user_agent: Option<String>,
    pub accept_encoding: Option<String>,
}

/// What the login page does with the `_xsrf` cookie.
#[derive(Clone, Copy)]
enum XsrfCookie {
    Set,
    Empty,
    Missing,
}

#[derive(Clone)]
struct AppState {
    recorded: Arc<Mutex<Recorded>>,
    xsrf: XsrfCookie,
}

pub struct FakeHh {
    pub base_url: String,
    recorded: Arc<Mutex<Recorded>>,
}

impl FakeHh {
    /// Site that behaves: sets the XSRF cookie and accepts [`LOGIN`] /
    /// [`PASSWORD`].
    pub fn start() -> Self {
        Self::spawn(XsrfCookie::Set)
    }

    /// Site whose login page never sets the XSRF cookie.
    pub fn without_xsrf() -> Self {
        Self::spawn(XsrfCookie::Missing)
    }

    /// Site whose login page sets `_xsrf=` with no value.
    pub fn with_empty_xsrf() -> Self {
        Self::spawn(XsrfCookie::Empty)
    }

    pub fn recorded(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().expect("recorded state poisoned")
    }

    fn spawn(xsrf: XsrfCookie) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake server");
        listener.set_nonblocking(true).expect("nonblocking listener");
        let addr = listener.local_addr().expect("local addr");

        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let state = AppState {
            recorded: Arc::clone(&recorded),
            xsrf,
        };
        let app = Router::new()
            .route("/", get(home))
            .route("/account/login", get(login_page).post(login_submit))
            .route("/applicant/resumes/touch", post(touch))
            .with_state(state);

        thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("tokio runtime");
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).expect("tokio listener");
                axum::serve(listener, app).await.expect("fake server");
            });
        });

        FakeHh {
            base_url: format!("http://{addr}"),
            recorded,
        }
    }
}

/// Address nothing listens on.
pub fn dead_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn home() -> Html<&'static str> {
    Html("<html><body>home</body></html>")
}

async fn login_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    {
        let mut recorded = state.recorded.lock().unwrap();
        recorded.user_agent = header_str(&headers, "user-agent");
        recorded.accept_encoding = header_str(&headers, "accept-encoding");
    }

    let page = Html("<html><form method=\"post\"></form></html>");
    let cookie = match state.xsrf {
        XsrfCookie::Set => format!("_xsrf={XSRF}; Path=/"),
        XsrfCookie::Empty => "_xsrf=; Path=/".to_string(),
        XsrfCookie::Missing => return page.into_response(),
    };
    ([(header::SET_COOKIE, cookie)], page).into_response()
}

async fn login_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginAttempt>,
) -> Response {
    let cookie = header_str(&headers, "cookie").unwrap_or_default();
    let ok = form.username == LOGIN
        && form.password == PASSWORD
        && form.xsrf == XSRF
        && cookie.contains(&format!("_xsrf={XSRF}"));
    state.recorded.lock().unwrap().logins.push(form);

    if ok {
        let session = format!("{SESSION_COOKIE}; Path=/");
        ([(header::SET_COOKIE, session)], Redirect::to("/")).into_response()
    } else {
        (StatusCode::FORBIDDEN, "bad credentials").into_response()
    }
}

async fn touch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(body): Form<TouchBody>,
) -> Response {
    let attempt = TouchAttempt {
        resume: body.resume.clone(),
        undirectable: body.undirectable.clone(),
        xsrf_header: header_str(&headers, "x-xsrftoken"),
        requested_with: header_str(&headers, "x-requested-with"),
        referer: header_str(&headers, "referer"),
        cookie: header_str(&headers, "cookie").unwrap_or_default(),
    };
    let authorized =
        attempt.xsrf_header.as_deref() == Some(XSRF) && attempt.cookie.contains(SESSION_COOKIE);
    state.recorded.lock().unwrap().touches.push(attempt);

    if !authorized {
        return StatusCode::FORBIDDEN.into_response();
    }
    if KNOWN_RESUMES.iter().any(|id| *id == body.resume) {
        StatusCode::OK.into_response()
    } else {
        StatusCode::CONFLICT.into_response()
    }
}
