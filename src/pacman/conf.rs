//! Minimal pacman.conf reader.
//!
//! Only the settings that locate the databases are read:
//! - `[options]` `DBPath` and `RootDir`
//! - every other section header, in file order, as a sync repository

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

pub const DEFAULT_CONF: &str = "/etc/pacman.conf";
pub const DEFAULT_DBPATH: &str = "/var/lib/pacman/";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PacmanConf {
    pub db_path: Option<PathBuf>,
    pub root_dir: Option<PathBuf>,
    pub repos: Vec<String>,
}

impl PacmanConf {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let conf = Self::parse(&content)?;
        debug!(
            "{}: {} sync repositories configured",
            path.display(),
            conf.repos.len()
        );
        Ok(conf)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut conf = PacmanConf::default();
        let mut section: Option<String> = None;

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let name = rest.strip_suffix(']').map(str::trim).filter(|n| !n.is_empty());
                let Some(name) = name else {
                    return Err(Error::Config(format!(
                        "pacman.conf line {}: malformed section header '{line}'",
                        idx + 1
                    )));
                };
                if name != "options" && !conf.repos.iter().any(|r| r == name) {
                    conf.repos.push(name.to_string());
                }
                section = Some(name.to_string());
                continue;
            }

            if section.as_deref() != Some("options") {
                // Server, Include, SigLevel and friends don't affect the index
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let value = value.trim();
                match key.trim() {
                    "DBPath" => conf.db_path = Some(PathBuf::from(value)),
                    "RootDir" => conf.root_dir = Some(PathBuf::from(value)),
                    _ => {}
                }
            }
        }

        Ok(conf)
    }
}
