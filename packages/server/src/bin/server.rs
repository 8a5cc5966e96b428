//! Realtime chat relay server for tip rooms.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tipchat-server -- --port 8080
//! ```

use clap::Parser;
use tipchat_server::Cli;
use tipchat_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &cli.log_level);

    // Run the server
    if let Err(e) = tipchat_server::run_server(cli).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
