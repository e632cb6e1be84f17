// Library exports for the gold grid bot
// This allows the replay and ledger tools to use the core decision logic

pub mod config;
pub mod debug_logger;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod opponents;
pub mod reach;
pub mod replay;
pub mod scoring;
pub mod selector;
pub mod session;
pub mod snapshot;
pub mod types;
pub mod ws_transport;
