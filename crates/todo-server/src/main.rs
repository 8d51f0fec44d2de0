use clap::Parser;
use std::io;
use std::time::Duration;

use todo_server::config::{
    ServerConfig, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SESSION_SECRET, DEFAULT_SESSION_TTL_SECS,
};
use todo_server::logging::init_logging;
use todo_server::run_server;

#[derive(Parser, Debug, Clone)]
#[command(name = "todo-server")]
#[command(about = "Session-backed todo lists over HTTP")]
#[command(version)]
struct Cli {
    /// Enable debug mode
    #[arg(long, env = "DEBUG", default_value = "false")]
    debug: bool,

    /// Server port
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Interface to bind
    #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Secret used to sign session cookies
    #[arg(long, env = "SESSION_SECRET", default_value = DEFAULT_SESSION_SECRET)]
    session_secret: String,

    /// Seconds a session may stay idle before it is dropped
    #[arg(long, env = "SESSION_TTL_SECS", default_value_t = DEFAULT_SESSION_TTL_SECS)]
    session_ttl_secs: u64,

    /// Log level (overrides debug flag)
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let cli = Cli::parse();

    if cli.log_level.is_some() {
        env_logger::init();
    } else {
        init_logging(cli.debug);
    }

    if cli.session_secret == DEFAULT_SESSION_SECRET {
        log::warn!("Using the default session secret; set SESSION_SECRET in production");
    }

    if cli.debug {
        log::debug!("Debug mode enabled");
        log::debug!("  Host: {}", cli.host);
        log::debug!("  Port: {}", cli.port);
        log::debug!("  Session TTL: {}s", cli.session_ttl_secs);
    }

    let config = ServerConfig::default()
        .with_host(cli.host)
        .with_port(cli.port)
        .with_session_secret(cli.session_secret)
        .with_session_ttl(Duration::from_secs(cli.session_ttl_secs));

    run_server(config).await
}
