//! Reads the local (installed) package database.
//!
//! Layout: `<dbpath>/local/<name>-<version>/desc`, plus an `ALPM_DB_VERSION`
//! marker file that is skipped.

use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::{desc, LocalPackage};
use crate::error::{Error, Result};

pub fn read_local_db(db_path: &Path) -> Result<Vec<LocalPackage>> {
    let local_dir = db_path.join("local");
    if !local_dir.is_dir() {
        return Err(Error::Config(format!(
            "local database not found at {}",
            local_dir.display()
        )));
    }

    let mut packages = Vec::new();

    for entry in WalkDir::new(&local_dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            Error::Config(format!("cannot read {}: {e}", local_dir.display()))
        })?;

        if !entry.file_type().is_dir() {
            continue;
        }

        let desc_path = entry.path().join("desc");
        let content = std::fs::read_to_string(&desc_path).map_err(|e| {
            Error::Config(format!("cannot read {}: {e}", desc_path.display()))
        })?;

        match desc::parse(&content) {
            Some(d) => packages.push(LocalPackage {
                name: d.name,
                reason: d.reason,
            }),
            None => warn!("{}: no %NAME% entry, skipped", desc_path.display()),
        }
    }

    // libalpm keeps its package cache sorted by name
    packages.sort_by(|a, b| a.name.cmp(&b.name));

    debug!("local database: {} packages", packages.len());
    Ok(packages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacman::InstallReason;
    use std::fs;

    fn add_pkg(db: &Path, dir: &str, desc: &str) {
        let pkg_dir = db.join("local").join(dir);
        fs::create_dir_all(&pkg_dir).unwrap();
        fs::write(pkg_dir.join("desc"), desc).unwrap();
    }

    #[test]
    fn reads_packages_sorted_by_name() {
        let tmp = tempfile::tempdir().unwrap();
        add_pkg(tmp.path(), "zsh-5.9-5", "%NAME%\nzsh\n\n");
        add_pkg(tmp.path(), "bash-5.2-1", "%NAME%\nbash\n\n%REASON%\n1\n\n");
        add_pkg(tmp.path(), "git-2.45-1", "%NAME%\ngit\n\n");
        fs::write(tmp.path().join("local/ALPM_DB_VERSION"), "9\n").unwrap();

        let packages = read_local_db(tmp.path()).unwrap();
        let names: Vec<_> = packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["bash", "git", "zsh"]);
        assert_eq!(packages[0].reason, InstallReason::Dependency);
        assert_eq!(packages[1].reason, InstallReason::Explicit);
    }

    #[test]
    fn missing_local_dir_is_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = read_local_db(tmp.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn package_dir_without_desc_is_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("local/broken-1.0-1")).unwrap();
        let err = read_local_db(tmp.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
