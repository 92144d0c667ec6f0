use std::path::{Component, Path, PathBuf};

use crate::repo::RESTORE_SCRIPT;

/// System-wide install location of the restore script.
pub const SYSTEM_SCRIPT_PATH: &str = "/usr/share/pacbackup/pacrestore.sh";

pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Directory holding the running executable, symlinks resolved.
pub fn exe_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let exe = exe.canonicalize().unwrap_or(exe);
    exe.parent().map(Path::to_path_buf)
}

/// Where to look for the restore script, most specific first:
/// an explicitly configured path, the system package location, then the
/// `share/` tree and the directory next to the executable (prefix installs
/// and development checkouts).
pub fn restore_script_candidates(configured: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    candidates.extend(configured.map(Path::to_path_buf));
    candidates.push(PathBuf::from(SYSTEM_SCRIPT_PATH));

    if let Some(dir) = exe_dir() {
        candidates.push(dir.join("../share/pacbackup").join(RESTORE_SCRIPT));
        candidates.push(dir.join(RESTORE_SCRIPT));
    }

    candidates
}

/// Expand a leading `~`, anchor relative paths at `cwd`, and drop `.`/`..`
/// components lexically.
pub fn sanitize_path(path: &Path, home: Option<&Path>, cwd: &Path) -> PathBuf {
    let expanded = match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    };

    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
