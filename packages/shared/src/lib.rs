//! Shared utilities for tipchat binaries and tests.

pub mod logger;
pub mod time;
