//! Snapshot comparison.
//!
//! Compares the previous package list with the new one and reports:
//! - packages that appeared (added)
//! - packages that disappeared (removed)
//! - packages whose group changed, e.g. an AUR package adopted into extra

use std::collections::HashMap;

use super::Snapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffType {
    Added,
    Removed,
    Moved { from: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    pub name: String,
    /// group in the new snapshot, or the old one for removals
    pub group: String,
    pub diff_type: DiffType,
}

#[derive(Debug, Default)]
pub struct DiffResult {
    pub entries: Vec<DiffEntry>,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, kind: fn(&DiffType) -> bool) -> usize {
        self.entries.iter().filter(|e| kind(&e.diff_type)).count()
    }

    pub fn added(&self) -> usize {
        self.count(|t| matches!(t, DiffType::Added))
    }

    pub fn removed(&self) -> usize {
        self.count(|t| matches!(t, DiffType::Removed))
    }

    pub fn moved(&self) -> usize {
        self.count(|t| matches!(t, DiffType::Moved { .. }))
    }

    /// One line per change, `+`/`-`/`~` prefixed.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let line = match &entry.diff_type {
                DiffType::Added => format!("  [+] {} ({})\n", entry.name, entry.group),
                DiffType::Removed => format!("  [-] {} ({})\n", entry.name, entry.group),
                DiffType::Moved { from } => {
                    format!("  [~] {} {} -> {}\n", entry.name, from, entry.group)
                }
            };
            out.push_str(&line);
        }
        out
    }
}

fn index(snapshot: &Snapshot) -> HashMap<&str, &str> {
    snapshot
        .sections()
        .iter()
        .flat_map(|(group, pkgs)| pkgs.iter().map(move |p| (p.as_str(), group)))
        .collect()
}

/// Compare two snapshots. Added and moved entries follow the new snapshot's
/// order, removed entries follow the old one's and come last.
pub fn compare(from: &Snapshot, to: &Snapshot) -> DiffResult {
    let from_map = index(from);
    let to_map = index(to);
    let mut entries = Vec::new();

    for (group, pkgs) in to.sections().iter() {
        for pkg in pkgs {
            let diff_type = match from_map.get(pkg.as_str()) {
                None => DiffType::Added,
                Some(old) if *old != group => DiffType::Moved {
                    from: old.to_string(),
                },
                Some(_) => continue,
            };
            entries.push(DiffEntry {
                name: pkg.clone(),
                group: group.to_string(),
                diff_type,
            });
        }
    }

    for (group, pkgs) in from.sections().iter() {
        for pkg in pkgs {
            if !to_map.contains_key(pkg.as_str()) {
                entries.push(DiffEntry {
                    name: pkg.clone(),
                    group: group.to_string(),
                    diff_type: DiffType::Removed,
                });
            }
        }
    }

    DiffResult { entries }
}
