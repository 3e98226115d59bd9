//! Pattern matching of user input against live sandboxes.

use std::path::{Path, PathBuf};

use crate::git::Vcs;

use super::inventory::Inventory;

/// Finds the sandbox a pattern refers to.
///
/// Directory matches (on the basename or the full path) always win over
/// branch matches. Within a pass the first sandbox in git's listing order
/// wins; that order is git's, not ours. Branch names are read from each
/// worktree only when no directory matched. Matching is case-sensitive
/// substring containment.
pub fn resolve<V: Vcs>(vcs: &V, inventory: &Inventory, pattern: &str) -> Option<PathBuf> {
    if let Some(sandbox) = inventory
        .sandboxes()
        .iter()
        .find(|s| directory_matches(&s.path, pattern))
    {
        tracing::debug!(pattern = %pattern, path = ?sandbox.path, "matched sandbox directory");
        return Some(sandbox.path.clone());
    }

    for sandbox in inventory.sandboxes() {
        let Some(branch) = vcs.current_branch(&sandbox.path) else {
            continue;
        };
        if branch.contains(pattern) {
            tracing::debug!(pattern = %pattern, branch = %branch, "matched sandbox branch");
            return Some(sandbox.path.clone());
        }
    }

    None
}

fn directory_matches(path: &Path, pattern: &str) -> bool {
    let basename_match = path
        .file_name()
        .map(|name| name.to_string_lossy().contains(pattern))
        .unwrap_or(false);
    basename_match || path.to_string_lossy().contains(pattern)
}
