//! Realtime chat relay for tip rooms.
//!
//! Clients open one WebSocket per tip, send/edit/delete messages, and every
//! accepted change is fanned out to the room. History is served over HTTP.

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use cli::Cli;
pub use ui::run as run_server;
