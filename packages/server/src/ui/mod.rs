//! WebSocket chat relay server implementation.

mod handler;
pub mod realtime;
mod router;
mod runner;
mod signal;
pub mod state;

pub use router::create_router;
pub use runner::{ServerError, run, serve};
