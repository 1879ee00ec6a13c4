//! Headless shell for the curator client: wires the pure core to the IO
//! engine, restores config and session, and pumps the loop. A UI embeds
//! [`session::Session`]; run standalone this performs a startup bring-up
//! and reports the resulting state.

mod effects;
mod logging;
mod persistence;
mod session;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use curator_logging::{curator_error, curator_info};

fn main() {
    logging::initialize(logging::LogDestination::Both);

    let config_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut session = match session::Session::new(config_dir) {
        Ok(session) => session,
        Err(err) => {
            curator_error!("engine startup failed: {err}");
            return;
        }
    };

    // Give startup work (restored session, user list) a moment to settle.
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if session.pump() {
            let view = session.view();
            curator_info!(
                "state: logged_in={} users_known={} requests_page={}",
                view.logged_in,
                session.users().len(),
                view.requests.page
            );
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    let view = session.view();
    curator_info!(
        "curator ready: backend_configured={} logged_in={}",
        session.config().backend_configured(),
        view.logged_in
    );
}
