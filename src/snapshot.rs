//! Package list snapshot file.
//!
//! Format:
//! ```text
//! # Generated by PacBackup 1.1.0
//! [core]
//! linux
//! pacman
//!
//! [AUR]
//! yay
//!
//! ```
//!
//! Sync repositories come first in configured order and are written even when
//! no explicit package belongs to them, then any leftover group such as `AUR`.
//! The file is rewritten from scratch on every run.

pub mod diff;

use std::fmt::Write as _;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use crate::classify::Grouping;
use crate::error::{Error, Result};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: package '{name}' appears before any [section] header")]
    PackageOutsideSection { line: usize, name: String },

    #[error("line {line}: malformed section header '{text}'")]
    MalformedHeader { line: usize, text: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    sections: Grouping,
}

impl Snapshot {
    /// Order the classification result for writing.
    pub fn new(mut grouping: Grouping, repos: &[String]) -> Self {
        let mut sections = Grouping::new();

        for repo in repos {
            sections.ensure_group(repo);
            for pkg in grouping.take(repo).unwrap_or_default() {
                sections.push(repo, pkg);
            }
        }

        for (group, packages) in grouping.iter() {
            sections.ensure_group(group);
            for pkg in packages {
                sections.push(group, pkg.as_str());
            }
        }

        Snapshot { sections }
    }

    pub fn sections(&self) -> &Grouping {
        &self.sections
    }

    pub fn render(&self, tool_version: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Generated by {} {tool_version}", crate::TOOL_NAME);

        for (group, packages) in self.sections.iter() {
            let _ = writeln!(out, "[{group}]");
            for pkg in packages {
                let _ = writeln!(out, "{pkg}");
            }
            out.push('\n');
        }

        out
    }

    /// Truncate and rewrite `path` with the rendered snapshot.
    pub fn write(&self, path: &Path, tool_version: &str) -> Result<()> {
        std::fs::write(path, self.render(tool_version)).map_err(|e| Error::io(path, e))?;
        debug!(
            "wrote {} packages in {} sections to {}",
            self.sections.package_count(),
            self.sections.iter().count(),
            path.display()
        );
        Ok(())
    }

    pub fn parse(content: &str) -> std::result::Result<Self, ParseError> {
        let mut sections = Grouping::new();
        let mut current: Option<String> = None;

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let name = rest
                    .strip_suffix(']')
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| ParseError::MalformedHeader {
                        line: idx + 1,
                        text: line.to_string(),
                    })?;
                sections.ensure_group(name);
                current = Some(name.to_string());
                continue;
            }

            match &current {
                Some(group) => sections.push(group, line),
                None => {
                    return Err(ParseError::PackageOutsideSection {
                        line: idx + 1,
                        name: line.to_string(),
                    })
                }
            }
        }

        Ok(Snapshot { sections })
    }

    /// Load the snapshot currently on disk, if there is a readable one.
    pub fn read_existing(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match Self::parse(&content) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("ignoring previous snapshot {}: {e}", path.display());
                None
            }
        }
    }
}
