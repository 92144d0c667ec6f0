//! One backup run: read the databases, classify, write the snapshot, commit.

use crate::classify::{classify, Grouping};
use crate::config::Config;
use crate::error::Result;
use crate::pacman::{self, PackageDatabase};
use crate::repo::{BackupRepo, CommitOutcome, Identity, InitOutcome};
use crate::snapshot::diff::{self, DiffResult};
use crate::snapshot::Snapshot;
use crate::VERSION;

pub struct BackupReport {
    pub grouping: Grouping,
    pub init: InitOutcome,
    pub commit: CommitOutcome,
    /// changes against the snapshot found on disk, if there was one
    pub diff: Option<DiffResult>,
}

pub fn run(config: &Config, db: &dyn PackageDatabase) -> Result<BackupReport> {
    println!("Retrieving current package list");
    let index = pacman::read_index(db)?;
    let grouping = classify(&index.explicit, &index.membership);

    if config.verbose {
        print!("{}", grouping.render_tree());
    }

    println!("Backing package list up");
    let snapshot = Snapshot::new(grouping.clone(), &index.repos);
    let repo = BackupRepo::new(
        &config.container,
        Identity::for_version(VERSION),
        config.script_candidates.clone(),
    );

    let previous = Snapshot::read_existing(&config.backup_file);

    let init = repo.ensure_initialized(|_| snapshot.write(&config.backup_file, VERSION))?;
    if init == InitOutcome::AlreadyPresent {
        snapshot.write(&config.backup_file, VERSION)?;
    }

    let diff = previous.map(|prev| diff::compare(&prev, &snapshot));

    println!("Committing the backup to the local git tree");
    let commit = repo.commit_if_changed(&config.backup_file)?;
    if commit == CommitOutcome::NoChanges {
        println!("No local changes to commit");
    }

    Ok(BackupReport {
        grouping,
        init,
        commit,
        diff,
    })
}
