//! Groups explicitly installed packages by the sync repository providing them.
//!
//! Packages no sync repository knows about land in the `AUR` group.

use std::collections::HashMap;
use std::fmt::Write;

use indexmap::IndexMap;

pub const AUR_GROUP: &str = "AUR";

/// Ordered mapping from group name to package names.
///
/// Group order is first-seen order; package order within a group is the order
/// packages were pushed.
#[derive(Debug, Clone, Default)]
pub struct Grouping {
    groups: IndexMap<String, Vec<String>>,
}

// IndexMap equality ignores order, but group order is part of the result
impl PartialEq for Grouping {
    fn eq(&self, other: &Self) -> bool {
        self.groups.iter().eq(other.groups.iter())
    }
}

impl Eq for Grouping {}

impl Grouping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, group: &str, package: impl Into<String>) {
        self.groups
            .entry(group.to_string())
            .or_default()
            .push(package.into());
    }

    /// Make sure `group` exists, even without packages.
    pub fn ensure_group(&mut self, group: &str) {
        self.groups.entry(group.to_string()).or_default();
    }

    pub fn get(&self, group: &str) -> Option<&[String]> {
        self.groups.get(group).map(Vec::as_slice)
    }

    /// Remove a group while keeping the order of the others.
    pub fn take(&mut self, group: &str) -> Option<Vec<String>> {
        self.groups.shift_remove(group)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn package_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Human-readable dump used by verbose mode.
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        for (group, packages) in &self.groups {
            let _ = writeln!(out, "{group}");
            for pkg in packages {
                let _ = writeln!(out, "\t{pkg}");
            }
        }
        out
    }
}

/// Assign every explicit package to the repository that provides it.
pub fn classify(explicit: &[String], membership: &HashMap<String, String>) -> Grouping {
    explicit.iter().fold(Grouping::new(), |mut grouping, pkg| {
        let group = membership
            .get(pkg)
            .map(String::as_str)
            .unwrap_or(AUR_GROUP);
        grouping.push(group, pkg.as_str());
        grouping
    })
}
