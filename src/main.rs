use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::env;
use std::time::Duration;

use gold_grid_bot::config::Config;
use gold_grid_bot::debug_logger::DebugLogger;
use gold_grid_bot::session::{Session, SessionError};
use gold_grid_bot::ws_transport::WsTransport;

#[tokio::main]
async fn main() {
    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    info!("Starting gold grid bot...");

    // Load configuration once at startup
    let config = Config::load_or_default();
    if config.identity.token.is_empty() {
        warn!("No token configured; set BOT_TOKEN or identity.token in Bot.toml");
    }

    let debug_logger = DebugLogger::new(config.debug.enabled, &config.debug.log_file_path).await;
    let mut session = Session::new(config.clone(), StdRng::from_os_rng(), debug_logger);
    let reconnect_delay = Duration::from_millis(config.server.reconnect_delay_ms);

    loop {
        match WsTransport::connect(&config.server.uri).await {
            Ok(mut transport) => match session.run(&mut transport).await {
                Err(SessionError::LoginRejected) => {
                    tokio::time::sleep(Duration::from_millis(
                        config.server.login_rejected_delay_ms,
                    ))
                    .await;
                }
                Err(e) => warn!("Session ended: {}", e),
                Ok(()) => {}
            },
            Err(e) => error!("Failed to connect to {}: {}", config.server.uri, e),
        }

        tokio::time::sleep(reconnect_delay).await;
        info!("Reconnecting to {}", config.server.uri);
    }
}
