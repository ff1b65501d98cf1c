//! CLI subcommand implementations.

pub mod check;
pub mod export;
pub mod formats;
pub mod init;
pub mod templates;
