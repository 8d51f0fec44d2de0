pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod server;
pub mod session;
pub mod state;
pub mod views;

pub use config::ServerConfig;
pub use server::{app_config, run_server};
pub use session::{SessionData, SessionHandle, SessionStore};
pub use state::AppState;
