// Library root
// -----------
// The `hh-updater` binary is a thin shell over these modules.
//
// Module responsibilities:
// - `api`: the HH.ru session (XSRF token, login form, resume touch) and
//   the `ResumeSession` trait the flows are written against.
// - `ui`: status output and the login/update flows.
// - `error`: the library error type.
pub mod api;
pub mod error;
pub mod ui;

pub use api::{HhUpdater, ResumeSession, DEFAULT_BASE_URL};
pub use error::{Result, UpdaterError};
pub use ui::{Credentials, Printer, TouchOutcome, UpdateReport};
