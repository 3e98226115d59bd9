//! Typed client for the external git tool.
//!
//! Everything that shells out to git goes through the [`Vcs`] trait so the
//! sandbox logic works on structured [`Worktree`] records and never parses
//! command output itself. [`GitCli`] is the process-backed implementation.

mod cli;
mod porcelain;

#[cfg(test)]
pub(crate) mod fake;

use std::path::{Path, PathBuf};

use crate::error::Result;

pub use cli::GitCli;
pub use porcelain::parse_worktree_list;

/// One entry of `git worktree list --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worktree {
    /// Absolute path of the worktree directory.
    pub path: PathBuf,
    /// Commit checked out at HEAD, if reported.
    pub head: Option<String>,
    /// Short branch name, or `None` when HEAD is detached (or the entry is bare).
    pub branch: Option<String>,
}

impl Worktree {
    /// Returns true if the worktree's path contains `marker`.
    pub fn path_contains(&self, marker: &str) -> bool {
        self.path.to_string_lossy().contains(marker)
    }
}

/// Result of merging a ref into a worktree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The merge created new commits (or fast-forwarded).
    Merged,
    /// Nothing to merge.
    UpToDate,
    /// The merge stopped, leaving the worktree in git's conflicted state.
    Conflict(String),
}

/// Operations the sandbox tool needs from version control.
///
/// Calls are synchronous and run one at a time.
pub trait Vcs {
    /// Lists all worktrees in the order git reports them.
    fn list_worktrees(&self) -> Result<Vec<Worktree>>;

    /// Returns the branch checked out at `dir`, or `None` if HEAD is detached
    /// or the lookup fails.
    fn current_branch(&self, dir: &Path) -> Option<String>;

    /// Returns the top-level directory of the checkout containing `dir`, or
    /// `None` when `dir` is not inside a checkout.
    fn toplevel(&self, dir: &Path) -> Option<PathBuf>;

    /// Fetches `branch` from `remote`.
    fn fetch(&self, remote: &str, branch: &str) -> Result<()>;

    /// Registers a new worktree at `path` on a new branch forked from `base`.
    fn add_worktree(&self, path: &Path, new_branch: &str, base: &str) -> Result<()>;

    /// Removes the worktree at `path`.
    fn remove_worktree(&self, path: &Path, force: bool) -> Result<()>;

    /// Deletes a local branch.
    fn delete_branch(&self, branch: &str, force: bool) -> Result<()>;

    /// Merges `source_ref` into whatever is checked out at `dir` without
    /// opening an editor.
    fn merge(&self, dir: &Path, source_ref: &str) -> Result<MergeOutcome>;
}
