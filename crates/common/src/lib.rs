//! Chatreel Common Utilities
//!
//! Shared infrastructure for all chatreel crates:
//! - Error types and result aliases
//! - Clock utilities for frame timestamping
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
