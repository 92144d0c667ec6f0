//! Git history of the backup folder.
//!
//! Lifecycle of a backup folder:
//! - absent: `ensure_initialized` creates it, copies the restore script in,
//!   lets the caller seed it (the first snapshot) and makes the root commit
//! - initialized: every run calls `commit_if_changed`, which commits the
//!   snapshot only when it differs from `HEAD`
//!
//! There is no path back to absent once the root commit exists.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use git2::{ErrorCode, IndexAddOption, Oid, Repository, Signature, Status};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

pub const RESTORE_SCRIPT: &str = "pacrestore.sh";

const INITIAL_MESSAGE: &str = "Initial Commit - Automated Package List Backup";
const BACKUP_SUFFIX: &str = " - Automated Package List Backup";

/// Author/committer of every automated commit, plus the message templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Identity {
            name: name.into(),
            email: email.into(),
        }
    }

    /// `PacBackup <version>`, tagging history with the version that wrote it.
    pub fn for_version(version: &str) -> Self {
        Identity::new(format!("{} {version}", crate::TOOL_NAME), "pacbackup@dummy.org")
    }

    pub fn signature(&self) -> Result<Signature<'static>> {
        Ok(Signature::now(&self.name, &self.email)?)
    }

    pub fn initial_message(&self) -> String {
        INITIAL_MESSAGE.to_string()
    }

    /// e.g. `March 04, 2025 - Automated Package List Backup`
    pub fn backup_message(&self, date: NaiveDate) -> String {
        format!("{}{BACKUP_SUFFIX}", date.format("%B %d, %Y"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Created,
    AlreadyPresent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed(Oid),
    NoChanges,
}

pub struct BackupRepo {
    container: PathBuf,
    identity: Identity,
    script_candidates: Vec<PathBuf>,
}

impl BackupRepo {
    pub fn new(container: impl Into<PathBuf>, identity: Identity, script_candidates: Vec<PathBuf>) -> Self {
        BackupRepo {
            container: container.into(),
            identity,
            script_candidates,
        }
    }

    pub fn container(&self) -> &Path {
        &self.container
    }

    pub fn exists(&self) -> bool {
        self.container.exists()
    }

    /// Create the folder and its root commit if the folder does not exist.
    ///
    /// `seed` runs after the restore script is in place and before the root
    /// commit, so whatever it writes is part of that commit. On any failure
    /// the folder is removed again. The parent directory must already exist.
    pub fn ensure_initialized<F>(&self, seed: F) -> Result<InitOutcome>
    where
        F: FnOnce(&Path) -> Result<()>,
    {
        if self.exists() {
            debug!("backup folder {} already present", self.container.display());
            return Ok(InitOutcome::AlreadyPresent);
        }

        fs::create_dir(&self.container).map_err(|e| Error::io(&self.container, e))?;

        match self.initialize(seed) {
            Ok(oid) => {
                info!("initialized {} at {oid}", self.container.display());
                Ok(InitOutcome::Created)
            }
            Err(e) => {
                if let Err(cleanup) = fs::remove_dir_all(&self.container) {
                    warn!("failed to remove {}: {cleanup}", self.container.display());
                }
                Err(e)
            }
        }
    }

    fn initialize<F>(&self, seed: F) -> Result<Oid>
    where
        F: FnOnce(&Path) -> Result<()>,
    {
        let repo = Repository::init(&self.container)?;
        self.install_restore_script()?;
        seed(&self.container)?;

        let mut index = repo.index()?;
        index.add_all(["*"], IndexAddOption::DEFAULT, None)?;
        index.write()?;
        let tree = repo.find_tree(index.write_tree()?)?;

        let signature = self.identity.signature()?;
        let oid = repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            &self.identity.initial_message(),
            &tree,
            &[],
        )?;
        Ok(oid)
    }

    fn install_restore_script(&self) -> Result<()> {
        let target = self.container.join(RESTORE_SCRIPT);

        for candidate in &self.script_candidates {
            if !candidate.is_file() {
                debug!("no restore script at {}", candidate.display());
                continue;
            }
            fs::copy(candidate, &target).map_err(|e| Error::io(candidate, e))?;
            debug!("copied restore script from {}", candidate.display());
            return Ok(());
        }

        let tried = self
            .script_candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Err(Error::Setup(format!(
            "couldn't find the restore script anywhere (tried: {tried}), try reinstalling"
        )))
    }

    /// Commit `snapshot` on the current branch if it differs from `HEAD`.
    pub fn commit_if_changed(&self, snapshot: &Path) -> Result<CommitOutcome> {
        self.commit_if_changed_on(snapshot, chrono::Local::now().date_naive())
    }

    pub fn commit_if_changed_on(&self, snapshot: &Path, date: NaiveDate) -> Result<CommitOutcome> {
        let repo = Repository::open(&self.container)?;
        let relative = snapshot.strip_prefix(&self.container).map_err(|_| {
            Error::Config(format!(
                "{} is not inside the backup folder {}",
                snapshot.display(),
                self.container.display()
            ))
        })?;

        let status = repo.status_file(relative)?;
        if status == Status::CURRENT {
            debug!("{} unchanged since HEAD", relative.display());
            return Ok(CommitOutcome::NoChanges);
        }

        let mut index = repo.index()?;
        index.read(false)?;
        index.add_path(relative)?;
        index.write()?;
        let tree = repo.find_tree(index.write_tree()?)?;

        let parent = match repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => None,
            Err(e) => return Err(e.into()),
        };
        let parents: Vec<_> = parent.iter().collect();

        let signature = self.identity.signature()?;
        let oid = repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            &self.identity.backup_message(date),
            &tree,
            &parents,
        )?;

        info!("committed {} as {oid}", relative.display());
        Ok(CommitOutcome::Committed(oid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CommitInfo {
        id: Oid,
        parents: Vec<Oid>,
        message: String,
        author: String,
        email: String,
        files: Vec<String>,
    }

    /// Commits reachable from HEAD, newest first.
    fn history(path: &Path) -> Vec<CommitInfo> {
        let repo = Repository::open(path).unwrap();
        let mut walk = repo.revwalk().unwrap();
        walk.push_head().unwrap();
        walk.map(|oid| {
            let commit = repo.find_commit(oid.unwrap()).unwrap();
            let files = commit
                .tree()
                .unwrap()
                .iter()
                .filter_map(|entry| entry.name().map(str::to_string))
                .collect();
            let author = commit.author().name().unwrap_or_default().to_string();
            let email = commit.committer().email().unwrap_or_default().to_string();
            let info = CommitInfo {
                id: commit.id(),
                parents: commit.parent_ids().collect(),
                message: commit.message().unwrap_or_default().to_string(),
                author,
                email,
                files,
            };
            info
        })
        .collect()
    }

    fn setup() -> (tempfile::TempDir, BackupRepo) {
        let tmp = tempfile::tempdir().unwrap();
        let script = tmp.path().join("pacrestore.sh");
        fs::write(&script, "#!/bin/sh\n").unwrap();
        let repo = BackupRepo::new(
            tmp.path().join("backup"),
            Identity::for_version("9.9.9"),
            vec![tmp.path().join("missing.sh"), script],
        );
        (tmp, repo)
    }

    #[test]
    fn backup_message_uses_long_date() {
        let identity = Identity::for_version("1.0.0");
        let date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        assert_eq!(
            identity.backup_message(date),
            "March 04, 2025 - Automated Package List Backup"
        );
        assert_eq!(identity.name, "PacBackup 1.0.0");
    }

    #[test]
    fn initial_commit_contains_script_and_seed() {
        let (_tmp, repo) = setup();

        let outcome = repo
            .ensure_initialized(|dir| {
                fs::write(dir.join("pkglist"), "[core]\nlinux\n\n").map_err(|e| Error::io(dir, e))
            })
            .unwrap();
        assert_eq!(outcome, InitOutcome::Created);

        let commits = history(repo.container());
        assert_eq!(commits.len(), 1);
        let root = &commits[0];
        assert!(root.parents.is_empty());
        assert_eq!(root.message, INITIAL_MESSAGE);
        assert_eq!(root.author, "PacBackup 9.9.9");
        assert_eq!(root.files, vec![RESTORE_SCRIPT.to_string(), "pkglist".to_string()]);
    }

    #[test]
    fn second_initialization_is_noop() {
        let (_tmp, repo) = setup();
        repo.ensure_initialized(|_| Ok(())).unwrap();

        let outcome = repo
            .ensure_initialized(|_| panic!("seed must not run for an existing folder"))
            .unwrap();
        assert_eq!(outcome, InitOutcome::AlreadyPresent);
        assert_eq!(history(repo.container()).len(), 1);
    }

    #[test]
    fn missing_script_rolls_back() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = BackupRepo::new(
            tmp.path().join("backup"),
            Identity::for_version("9.9.9"),
            vec![tmp.path().join("nope.sh")],
        );

        let err = repo.ensure_initialized(|_| Ok(())).unwrap_err();
        assert!(matches!(err, Error::Setup(_)));
        assert!(!repo.exists());
    }

    #[test]
    fn missing_parent_directory_is_not_created() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = BackupRepo::new(
            tmp.path().join("a/b/backup"),
            Identity::for_version("9.9.9"),
            vec![tmp.path().join("nope.sh")],
        );

        let err = repo.ensure_initialized(|_| Ok(())).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(!tmp.path().join("a").exists());
    }

    #[test]
    fn failing_seed_rolls_back() {
        let (_tmp, repo) = setup();
        let err = repo
            .ensure_initialized(|_| Err(Error::Config("boom".into())))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(!repo.exists());
    }

    #[test]
    fn commit_only_when_snapshot_changes() {
        let (_tmp, repo) = setup();
        let snapshot = repo.container().join("pkglist");
        repo.ensure_initialized(|_| {
            fs::write(&snapshot, "[core]\nlinux\n\n").map_err(|e| Error::io(&snapshot, e))
        })
        .unwrap();

        assert_eq!(repo.commit_if_changed(&snapshot).unwrap(), CommitOutcome::NoChanges);

        fs::write(&snapshot, "[core]\nlinux\nvim\n\n").unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        let CommitOutcome::Committed(oid) = repo.commit_if_changed_on(&snapshot, date).unwrap() else {
            panic!("expected a commit");
        };

        let commits = history(repo.container());
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].id, oid);
        assert_eq!(commits[0].parents, vec![commits[1].id]);
        assert_eq!(commits[0].message, "December 25, 2024 - Automated Package List Backup");
        assert_eq!(commits[0].email, "pacbackup@dummy.org");

        assert_eq!(repo.commit_if_changed(&snapshot).unwrap(), CommitOutcome::NoChanges);
    }

    #[test]
    fn snapshot_outside_container_is_rejected() {
        let (tmp, repo) = setup();
        repo.ensure_initialized(|_| Ok(())).unwrap();

        let err = repo.commit_if_changed(&tmp.path().join("elsewhere")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
