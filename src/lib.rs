//! pacbackup keeps the list of explicitly installed pacman packages, grouped
//! by repository, under git so the package set can be audited and restored.

pub mod backup;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod pacman;
pub mod platform;
pub mod repo;
pub mod snapshot;

pub use error::{Error, Result};

/// Name written into snapshot headers and commit identities.
pub const TOOL_NAME: &str = "PacBackup";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
