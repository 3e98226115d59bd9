//! Create, clean up, and list sandboxes.

use std::path::PathBuf;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::git::Vcs;
use crate::sandbox::{resolve, Inventory, SandboxName};

/// A freshly created sandbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedSandbox {
    pub path: PathBuf,
    pub branch: String,
}

/// What `cleanup` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// No pattern was given and there are no sandboxes.
    NothingToClean,
    /// The worktree was removed.
    Removed {
        path: PathBuf,
        branch: Option<String>,
        /// False when branch deletion failed and the branch was left behind.
        branch_deleted: bool,
    },
}

/// Creates a sandbox on a new branch forked from the freshly fetched main branch.
pub fn create<V: Vcs>(config: &Config, vcs: &V) -> Result<CreatedSandbox> {
    vcs.fetch(&config.remote, &config.main_branch)?;

    let SandboxName { branch, path } = SandboxName::generate(config);

    // Left in place if `worktree add` fails; it is reused next time.
    std::fs::create_dir_all(&config.base_dir)?;

    vcs.add_worktree(&path, &branch, &config.upstream_ref())?;

    tracing::info!(path = ?path, branch = %branch, "created sandbox worktree");

    Ok(CreatedSandbox { path, branch })
}

/// Removes the sandbox matching `pattern`, or the latest one when `pattern` is `None`.
pub fn cleanup<V: Vcs>(config: &Config, vcs: &V, pattern: Option<&str>) -> Result<CleanupOutcome> {
    let inventory = Inventory::load(vcs, &config.marker)?;

    let path = match pattern {
        Some(pattern) => {
            resolve(vcs, &inventory, pattern).ok_or_else(|| Error::NotFound(pattern.to_string()))?
        }
        None => match inventory.latest() {
            Some(sandbox) => sandbox.path.clone(),
            None => return Ok(CleanupOutcome::NothingToClean),
        },
    };

    let branch = vcs.current_branch(&path);

    vcs.remove_worktree(&path, true)?;
    tracing::info!(path = ?path, "removed sandbox worktree");

    let branch_deleted = match &branch {
        Some(branch) => match vcs.delete_branch(branch, true) {
            Ok(()) => true,
            Err(e) => {
                // Worktree is already gone
                tracing::warn!(
                    branch = %branch,
                    error = %e,
                    "failed to delete sandbox branch, may need manual cleanup"
                );
                false
            }
        },
        None => false,
    };

    Ok(CleanupOutcome::Removed {
        path,
        branch,
        branch_deleted,
    })
}

/// Returns every sandbox in git's listing order.
pub fn list<V: Vcs>(config: &Config, vcs: &V) -> Result<Inventory> {
    Inventory::load(vcs, &config.marker)
}
