//! The shell driver: owns the core state, the effect runner and the
//! persisted config/session, and pumps the msg/effect/event loop.

use std::collections::VecDeque;
use std::path::PathBuf;

use curator_core::{update, AppState, AppViewModel, Msg};
use curator_engine::ApiError;
use curator_logging::{curator_info, curator_warn, Sensitive};

use crate::effects::{EffectRunner, ShellEvent};
use crate::persistence::{self, AppConfig, UserSession};

pub struct Session {
    state: AppState,
    runner: EffectRunner,
    config: AppConfig,
    config_dir: PathBuf,
    user: Option<UserSession>,
    /// Known user names for a login chooser.
    users: Vec<String>,
    /// Name of the login attempt in flight, if any.
    pending_login: Option<String>,
    login_error: Option<String>,
    pending: VecDeque<Msg>,
}

impl Session {
    /// Loads config and any persisted session from `config_dir` and wires
    /// the core to a fresh engine.
    pub fn new(config_dir: PathBuf) -> Result<Self, ApiError> {
        let config = persistence::load_config(&config_dir);
        let user = persistence::load_session(&config_dir);
        let runner = EffectRunner::new(&config)?;

        let mut session = Self {
            state: AppState::new(),
            runner,
            config,
            config_dir,
            user,
            users: Vec::new(),
            pending_login: None,
            login_error: None,
            pending: VecDeque::new(),
        };
        session.dispatch(Msg::BackendConfigured(
            session.config.backend_configured(),
        ));
        if let Some(user) = session.user.clone() {
            curator_info!("restored session for {}", user.user_name);
            session.dispatch(Msg::SessionStarted {
                user_id: user.user_id,
            });
        }
        if session.config.backend_configured() {
            session.runner.submit_fetch_users();
        }
        Ok(session)
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn user(&self) -> Option<&UserSession> {
        self.user.as_ref()
    }

    pub fn users(&self) -> &[String] {
        &self.users
    }

    pub fn login_error(&self) -> Option<&str> {
        self.login_error.as_deref()
    }

    pub fn dispatch(&mut self, msg: Msg) {
        self.pending.push_back(msg);
    }

    /// Applies queued msgs and pumps engine completions; returns whether
    /// anything observable changed.
    pub fn pump(&mut self) -> bool {
        while let Some(msg) = self.pending.pop_front() {
            self.apply(msg);
        }
        for event in self.runner.poll() {
            match event {
                ShellEvent::Core(msg) => self.apply(msg),
                ShellEvent::LoginFinished { result } => self.finish_login(result),
                ShellEvent::UsersFetched { result } => match result {
                    Ok(users) => self.users = users,
                    Err(message) => curator_warn!("user list fetch failed: {message}"),
                },
            }
        }
        self.state.consume_dirty()
    }

    fn apply(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.run(effects);
    }

    /// Saves the new config and rebuilds the engine against it.
    pub fn save_config(&mut self, config: AppConfig) -> Result<(), ApiError> {
        persistence::save_config(&self.config_dir, &config);
        self.runner = EffectRunner::new(&config)?;
        self.config = config;
        self.dispatch(Msg::BackendConfigured(
            self.config.backend_configured(),
        ));
        if self.config.backend_configured() {
            self.runner.submit_fetch_users();
        }
        Ok(())
    }

    /// Auth stays at the shell boundary; the core only learns the user id.
    pub fn login(&mut self, name: String, pin: String) {
        curator_info!("login submitted for {name} (pin {})", Sensitive(&pin));
        self.login_error = None;
        self.pending_login = Some(name.clone());
        self.runner.submit_login(name, pin);
    }

    fn finish_login(&mut self, result: Result<Option<String>, String>) {
        let Some(name) = self.pending_login.take() else {
            return;
        };
        match result {
            Ok(Some(user_id)) => {
                let session = UserSession {
                    user_id: user_id.clone(),
                    user_name: name,
                };
                persistence::save_session(&self.config_dir, &session);
                self.user = Some(session);
                self.dispatch(Msg::SessionStarted { user_id });
            }
            Ok(None) => {
                self.login_error = Some("Invalid name or PIN.".to_string());
            }
            Err(message) => {
                self.login_error = Some(message);
            }
        }
    }

    pub fn logout(&mut self) {
        persistence::remove_session(&self.config_dir);
        self.user = None;
        self.dispatch(Msg::SessionEnded);
    }
}
