// Minimal library usage: log in and touch one resume, twice.
// The first session uses the default endpoint, the second one the base
// URL from `HH_BASE_URL` (or the default when it is unset). Each session
// is closed when its block ends.
//
//   HH_LOGIN=me@example.com HH_PASSWORD=... HH_RESUME_ID=abc123 \
//       cargo run --example basic

use std::io;

use anyhow::{Context, Result};
use hh_updater::ui::touch_resume;
use hh_updater::{Credentials, HhUpdater};

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let credentials = Credentials {
        login: std::env::var("HH_LOGIN").context("HH_LOGIN is not set")?,
        password: std::env::var("HH_PASSWORD").context("HH_PASSWORD is not set")?,
    };
    let cv_id = std::env::var("HH_RESUME_ID").context("HH_RESUME_ID is not set")?;

    {
        let mut updater = HhUpdater::default_url()?;
        touch_resume(&mut updater, &credentials, &cv_id, &mut io::stdout())?;
    }

    {
        let mut updater = HhUpdater::from_env()?;
        touch_resume(&mut updater, &credentials, &cv_id, &mut io::stdout())?;
    }

    Ok(())
}
