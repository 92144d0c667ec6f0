//! Read-only access to the pacman databases.
//!
//! The backup only needs two facts from pacman:
//! - which sync repository carries each package name
//! - which installed packages were explicitly requested
//!
//! `PackageDatabase` is the seam between the backup workflow and the system.
//! `PacmanDb` reads the real on-disk databases; tests substitute their own.

pub mod conf;
pub mod desc;
pub mod local;
pub mod sync;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use conf::PacmanConf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallReason {
    Explicit,
    Dependency,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalPackage {
    pub name: String,
    pub reason: InstallReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRepo {
    pub name: String,
    pub packages: Vec<String>,
}

pub trait PackageDatabase {
    /// Sync repositories in configured order.
    fn sync_repos(&self) -> Result<Vec<SyncRepo>>;
    /// Installed packages in database enumeration order.
    fn local_packages(&self) -> Result<Vec<LocalPackage>>;
}

/// Databases of a pacman installation, located through pacman.conf.
pub struct PacmanDb {
    db_path: PathBuf,
    repos: Vec<String>,
}

impl PacmanDb {
    /// Locate the databases. Explicit `dbpath`/`root` overrides win over the
    /// values from the configuration file.
    pub fn open(conf_path: &Path, db_path: Option<&Path>, root: Option<&Path>) -> Result<Self> {
        let conf = PacmanConf::load(conf_path)?;

        let under_root = |root: &Path| root.join(conf::DEFAULT_DBPATH.trim_start_matches('/'));

        let db_path = match (db_path, root) {
            (Some(db), _) => db.to_path_buf(),
            (None, Some(root)) => under_root(root),
            (None, None) => match (&conf.db_path, &conf.root_dir) {
                (Some(db), _) => db.clone(),
                (None, Some(root)) => under_root(root),
                (None, None) => PathBuf::from(conf::DEFAULT_DBPATH),
            },
        };

        debug!("pacman database path: {}", db_path.display());
        Ok(PacmanDb {
            db_path,
            repos: conf.repos,
        })
    }

    #[cfg(test)]
    fn db_path(&self) -> &Path {
        &self.db_path
    }
}

impl PackageDatabase for PacmanDb {
    fn sync_repos(&self) -> Result<Vec<SyncRepo>> {
        self.repos
            .iter()
            .map(|repo| sync::read_sync_db(&self.db_path, repo))
            .collect()
    }

    fn local_packages(&self) -> Result<Vec<LocalPackage>> {
        local::read_local_db(&self.db_path)
    }
}

/// Everything the classifier needs, gathered in one read of the databases.
#[derive(Debug, Clone, Default)]
pub struct PackageIndex {
    /// sync repository names in configured order
    pub repos: Vec<String>,
    /// package name -> owning sync repository
    pub membership: HashMap<String, String>,
    /// explicitly installed package names in local database order
    pub explicit: Vec<String>,
}

pub fn read_index(db: &dyn PackageDatabase) -> Result<PackageIndex> {
    let mut index = PackageIndex::default();

    for repo in db.sync_repos()? {
        // later repositories overwrite earlier ones for duplicated names
        for pkg in repo.packages {
            index.membership.insert(pkg, repo.name.clone());
        }
        index.repos.push(repo.name);
    }

    index.explicit = db
        .local_packages()?
        .into_iter()
        .filter(|p| p.reason == InstallReason::Explicit)
        .map(|p| p.name)
        .collect();

    debug!(
        "{} sync packages indexed, {} explicit packages installed",
        index.membership.len(),
        index.explicit.len()
    );
    Ok(index)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// In-memory database for unit tests.
    #[derive(Default)]
    pub struct FakeDb {
        pub repos: Vec<SyncRepo>,
        pub local: Vec<LocalPackage>,
    }

    impl FakeDb {
        pub fn repo(mut self, name: &str, packages: &[&str]) -> Self {
            self.repos.push(SyncRepo {
                name: name.to_string(),
                packages: packages.iter().map(|p| p.to_string()).collect(),
            });
            self
        }

        pub fn installed(mut self, name: &str, reason: InstallReason) -> Self {
            self.local.push(LocalPackage {
                name: name.to_string(),
                reason,
            });
            self
        }
    }

    impl PackageDatabase for FakeDb {
        fn sync_repos(&self) -> Result<Vec<SyncRepo>> {
            Ok(self.repos.clone())
        }

        fn local_packages(&self) -> Result<Vec<LocalPackage>> {
            Ok(self.local.clone())
        }
    }
}
