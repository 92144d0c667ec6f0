use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::pacman::conf::DEFAULT_CONF;
use crate::platform;

pub const DEFAULT_BACKUP_FILE: &str = "~/.pacbackup/pkglist";

/// Optional settings file, `~/.config/pacbackup/config.toml` on Linux.
///
/// ```toml
/// backup_config = "~/backups/pkglist"
/// pacman_config = "/etc/pacman.conf"
/// restore_script = "/opt/pacbackup/pacrestore.sh"
/// ```
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub backup_config: Option<PathBuf>,
    pub pacman_config: Option<PathBuf>,
    pub restore_script: Option<PathBuf>,
}

impl Settings {
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "pacbackup")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load settings; a missing file means defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no settings file at {}", path.display());
                return Ok(Settings::default());
            }
            Err(e) => return Err(Error::io(path, e)),
        };

        toml::from_str(&content).map_err(|source| Error::Settings {
            path: path.to_path_buf(),
            source,
        })
    }
}

pub struct Config {
    pub pacman_conf: PathBuf,
    pub db_path: Option<PathBuf>,
    pub root: Option<PathBuf>,
    /// snapshot file, absolute
    pub backup_file: PathBuf,
    /// parent of `backup_file`, the git working directory
    pub container: PathBuf,
    pub script_candidates: Vec<PathBuf>,
    pub verbose: bool,
}

impl Config {
    /// Command line first, then the settings file, then built-in defaults.
    pub fn from_cli(cli: &Cli, settings: &Settings) -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| Error::io(".", e))?;
        let home = platform::home_dir();

        let raw_backup = cli
            .backup_config
            .clone()
            .or_else(|| settings.backup_config.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BACKUP_FILE));
        let backup_file = platform::sanitize_path(&raw_backup, home.as_deref(), &cwd);

        let container = backup_file
            .parent()
            .filter(|_| backup_file.file_name().is_some())
            .map(Path::to_path_buf)
            .ok_or_else(|| {
                Error::Config(format!(
                    "backup file {} has no parent directory",
                    backup_file.display()
                ))
            })?;

        let pacman_conf = cli
            .config
            .clone()
            .or_else(|| settings.pacman_config.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONF));

        let restore_script = cli
            .restore_script
            .as_deref()
            .or(settings.restore_script.as_deref())
            .map(|p| platform::sanitize_path(p, home.as_deref(), &cwd));

        Ok(Config {
            pacman_conf,
            db_path: cli.dbpath.clone(),
            root: cli.root.clone(),
            backup_file,
            container,
            script_candidates: platform::restore_script_candidates(restore_script.as_deref()),
            verbose: cli.verbose,
        })
    }
}
