use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pacbackup")]
#[command(about = "Backs-up the list of pacman-installed packages on the system")]
#[command(version)]
pub struct Cli {
    /// pacman configuration file (defaults to /etc/pacman.conf)
    #[arg(long, short = 'c', value_name = "path")]
    pub config: Option<PathBuf>,

    /// Alternate database location
    #[arg(long, short = 'b', value_name = "path")]
    pub dbpath: Option<PathBuf>,

    /// Alternate installation root
    #[arg(long, short = 'r', value_name = "path")]
    pub root: Option<PathBuf>,

    /// Backup file location (defaults to ~/.pacbackup/pkglist)
    #[arg(long, value_name = "path")]
    pub backup_config: Option<PathBuf>,

    /// Restore script to copy into a new backup folder
    #[arg(long, value_name = "path")]
    pub restore_script: Option<PathBuf>,

    /// Print the package grouping and every change since the last backup
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,

    /// Show debug log output
    #[arg(long, default_value_t = false)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_pacman_and_backup_options() {
        let cli = Cli::parse_from([
            "pacbackup",
            "--config",
            "/tmp/pacman.conf",
            "-b",
            "/tmp/db",
            "--backup-config",
            "~/backups/pkglist",
            "-v",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/pacman.conf")));
        assert_eq!(cli.dbpath, Some(PathBuf::from("/tmp/db")));
        assert_eq!(cli.backup_config, Some(PathBuf::from("~/backups/pkglist")));
        assert!(cli.verbose);
        assert!(!cli.debug);
        assert_eq!(cli.root, None);
    }
}
