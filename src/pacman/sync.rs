//! Reads sync databases (`<dbpath>/sync/<repo>.db`).
//!
//! A sync database is a tar archive with one `<name>-<version>/desc` entry per
//! package. repo-add compresses it with gzip by default; xz, zstd and plain tar
//! are accepted as well, so the format is detected from the magic bytes.

use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use tar::Archive;
use tracing::{debug, warn};
use xz2::read::XzDecoder;

use super::{desc, SyncRepo};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Compression {
    None,
    Gzip,
    Xz,
    Zstd,
}

impl Compression {
    fn from_magic_bytes(data: &[u8]) -> Self {
        if data.starts_with(&[0x1f, 0x8b]) {
            Compression::Gzip
        } else if data.starts_with(&[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00]) {
            Compression::Xz
        } else if data.starts_with(&[0x28, 0xb5, 0x2f, 0xfd]) {
            Compression::Zstd
        } else {
            Compression::None
        }
    }
}

/// Read one configured repository. A missing database file yields an empty
/// repository, same as pacman before the first `-Sy`.
pub fn read_sync_db(db_path: &Path, repo: &str) -> Result<SyncRepo> {
    let file = db_path.join("sync").join(format!("{repo}.db"));

    let data = match std::fs::read(&file) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("database file for '{repo}' does not exist ({})", file.display());
            return Ok(SyncRepo {
                name: repo.to_string(),
                packages: Vec::new(),
            });
        }
        Err(e) => {
            return Err(Error::Config(format!("cannot read {}: {e}", file.display())));
        }
    };

    let packages = parse_archive(&data).map_err(|e| {
        Error::Config(format!("corrupt sync database {}: {e}", file.display()))
    })?;

    debug!("sync database '{repo}': {} packages", packages.len());
    Ok(SyncRepo {
        name: repo.to_string(),
        packages,
    })
}

fn parse_archive(data: &[u8]) -> std::io::Result<Vec<String>> {
    let reader: Box<dyn Read + '_> = match Compression::from_magic_bytes(data) {
        Compression::Gzip => Box::new(GzDecoder::new(data)),
        Compression::Xz => Box::new(XzDecoder::new(data)),
        Compression::Zstd => Box::new(zstd::Decoder::new(data)?),
        Compression::None => Box::new(data),
    };

    let mut archive = Archive::new(reader);
    let mut names = Vec::new();

    for entry in archive.entries()? {
        let mut entry = entry?;

        if !entry.header().entry_type().is_file() {
            continue;
        }

        let is_desc = entry
            .path()?
            .file_name()
            .is_some_and(|name| name == "desc");
        if !is_desc {
            continue;
        }

        let mut content = String::new();
        entry.read_to_string(&mut content)?;

        if let Some(d) = desc::parse(&content) {
            names.push(d.name);
        }
    }

    Ok(names)
}
