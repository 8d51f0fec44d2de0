//! Server configuration
//!
//! Values come from the command line or environment (see `main.rs`);
//! `Default` mirrors the CLI defaults so tests and embedders can start from it.

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 4567;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_SESSION_SECRET: &str = "secret";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;
pub const SESSION_COOKIE_NAME: &str = "todo.session";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub session_secret: String,
    pub session_ttl: Duration,
    pub cookie_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            session_secret: DEFAULT_SESSION_SECRET.to_string(),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            cookie_name: SESSION_COOKIE_NAME.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_session_secret(mut self, secret: impl Into<String>) -> Self {
        self.session_secret = secret.into();
        self
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }
}
