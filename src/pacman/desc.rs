//! Parser for pacman `desc` records.
//!
//! Both the local database and the sync databases describe a package as a
//! sequence of blocks:
//!
//! ```text
//! %NAME%
//! linux
//!
//! %REASON%
//! 1
//! ```
//!
//! Only the fields this tool consumes are kept.

use super::InstallReason;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Desc {
    pub name: String,
    pub reason: InstallReason,
}

/// Parse a desc record. Returns `None` when `%NAME%` is missing or empty.
pub fn parse(content: &str) -> Option<Desc> {
    let mut name = None;
    let mut reason = InstallReason::Explicit;
    let mut key: Option<&str> = None;

    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() {
            key = None;
            continue;
        }

        if line.len() > 2 && line.starts_with('%') && line.ends_with('%') {
            key = Some(&line[1..line.len() - 1]);
            continue;
        }

        // only the first value line of a block matters for these keys
        match key.take() {
            Some("NAME") => name = Some(line.to_string()),
            Some("REASON") => {
                if line == "1" {
                    reason = InstallReason::Dependency;
                }
            }
            _ => {}
        }
    }

    name.filter(|n| !n.is_empty()).map(|name| Desc { name, reason })
}
