//! Command-line and environment configuration.

use std::{
    num::{NonZeroU64, NonZeroUsize},
    time::Duration,
};

use clap::Parser;

use crate::ui::realtime::RealtimeConfig;

/// Realtime chat relay for tip rooms
#[derive(Parser, Clone, Debug)]
#[command(name = "tipchat-server", version, about = "Realtime chat relay for tip rooms")]
pub struct Cli {
    /// Bind address
    #[arg(long, env = "TIPCHAT_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "TIPCHAT_PORT", default_value = "8080")]
    pub port: u16,

    /// Outbound queue size per connection; frames beyond it are dropped
    #[arg(long, env = "TIPCHAT_OUTBOUND_CAPACITY", default_value = "256")]
    pub outbound_capacity: NonZeroUsize,

    /// Seconds without room activity before its members are evicted
    #[arg(long, env = "TIPCHAT_ROOM_IDLE_SECS", default_value = "300")]
    pub room_idle_secs: NonZeroU64,

    /// Seconds between idle-room sweeps
    #[arg(long, env = "TIPCHAT_SWEEP_INTERVAL_SECS", default_value = "300")]
    pub sweep_interval_secs: NonZeroU64,

    /// Default log level, overridden by RUST_LOG
    #[arg(long, env = "TIPCHAT_LOG_LEVEL", default_value = "debug")]
    pub log_level: String,
}

impl Cli {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn realtime_config(&self) -> RealtimeConfig {
        RealtimeConfig {
            outbound_capacity: self.outbound_capacity.get(),
            room_idle_threshold: Duration::from_secs(self.room_idle_secs.get()),
            sweep_interval: Duration::from_secs(self.sweep_interval_secs.get()),
        }
    }
}
