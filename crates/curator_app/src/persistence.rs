//! RON persistence for the app config and the logged-in session.
//!
//! Loaded once at startup, saved on explicit user action only (config save,
//! login); the session file is removed on logout. A corrupt file falls back
//! to defaults with a warning rather than failing startup.

use std::fs;
use std::path::Path;

use curator_engine::AtomicFileWriter;
use curator_logging::{curator_error, curator_info, curator_warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILENAME: &str = "curator_config.ron";
const SESSION_FILENAME: &str = "curator_session.ron";

/// Backend endpoints. Empty strings mean not configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub api_url: String,
    pub parser_url: String,
}

impl AppConfig {
    pub fn backend_configured(&self) -> bool {
        !self.api_url.trim().is_empty()
    }
}

/// The logged-in user, kept across restarts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub user_id: String,
    pub user_name: String,
}

fn load_ron<T: for<'de> Deserialize<'de>>(path: &Path, what: &str) -> Option<T> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
        Err(err) => {
            curator_warn!("Failed to read {what} from {path:?}: {err}");
            return None;
        }
    };
    match ron::from_str(&content) {
        Ok(value) => {
            curator_info!("Loaded {what} from {path:?}");
            Some(value)
        }
        Err(err) => {
            curator_warn!("Failed to parse {what} from {path:?}: {err}");
            None
        }
    }
}

fn save_ron<T: Serialize>(dir: &Path, filename: &str, value: &T, what: &str) {
    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(value, pretty) {
        Ok(text) => text,
        Err(err) => {
            curator_error!("Failed to serialize {what}: {err}");
            return;
        }
    };
    let writer = AtomicFileWriter::new(dir.to_path_buf());
    if let Err(err) = writer.write(filename, content.as_bytes()) {
        curator_error!("Failed to write {what} to {dir:?}: {err}");
    }
}

pub(crate) fn load_config(dir: &Path) -> AppConfig {
    load_ron(&dir.join(CONFIG_FILENAME), "config").unwrap_or_default()
}

pub(crate) fn save_config(dir: &Path, config: &AppConfig) {
    save_ron(dir, CONFIG_FILENAME, config, "config");
}

pub(crate) fn load_session(dir: &Path) -> Option<UserSession> {
    load_ron(&dir.join(SESSION_FILENAME), "session")
}

pub(crate) fn save_session(dir: &Path, session: &UserSession) {
    save_ron(dir, SESSION_FILENAME, session, "session");
}

pub(crate) fn remove_session(dir: &Path) {
    let path = dir.join(SESSION_FILENAME);
    match fs::remove_file(&path) {
        Ok(()) => curator_info!("Removed session file {path:?}"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => curator_warn!("Failed to remove session file {path:?}: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Once;

    fn init_logging() {
        static INIT: Once = Once::new();
        INIT.call_once(curator_logging::initialize_for_tests);
    }

    #[test]
    fn config_round_trips() {
        init_logging();
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            api_url: "https://api.example.com".to_string(),
            parser_url: "https://parse.example.com".to_string(),
        };
        save_config(dir.path(), &config);
        assert_eq!(load_config(dir.path()), config);
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        init_logging();
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path());
        assert_eq!(config, AppConfig::default());
        assert!(!config.backend_configured());
    }

    #[test]
    fn corrupt_config_falls_back_to_defaults() {
        init_logging();
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "(this is { not ron").unwrap();
        assert_eq!(load_config(dir.path()), AppConfig::default());
    }

    #[test]
    fn session_round_trips_and_is_removed_on_logout() {
        init_logging();
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_session(dir.path()), None);

        let session = UserSession {
            user_id: "u1".to_string(),
            user_name: "alex".to_string(),
        };
        save_session(dir.path(), &session);
        assert_eq!(load_session(dir.path()), Some(session));

        remove_session(dir.path());
        assert_eq!(load_session(dir.path()), None);
        // Removing again is harmless.
        remove_session(dir.path());
    }
}
