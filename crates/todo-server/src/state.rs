use crate::config::ServerConfig;
use crate::session::{SessionCookie, SessionStore};

/// Shared across workers. Sessions are the only mutable state.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub session_cookie: SessionCookie,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        log::info!(
            "Session store ready (cookie: {}, ttl: {}s)",
            config.cookie_name,
            config.session_ttl.as_secs()
        );

        Self {
            sessions: SessionStore::new(config.session_ttl),
            session_cookie: SessionCookie::new(config.cookie_name.clone(), &config.session_secret),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&ServerConfig::default())
    }
}
