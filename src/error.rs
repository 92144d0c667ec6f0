//! Error types shared by every stage of a backup run.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// pacman configuration or database could not be read
    #[error("configuration error: {0}")]
    Config(String),

    /// first-time setup of the backup folder failed and was rolled back
    #[error("setup error: {0}")]
    Setup(String),

    #[error("{}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error("invalid settings file {}: {source}", path.display())]
    Settings {
        path: PathBuf,
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
