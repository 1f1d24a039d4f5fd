//! Logging setup for taskflow binaries.
mod logger;
pub use logger::*;
