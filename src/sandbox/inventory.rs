//! Live view of the sandboxes git currently knows about.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::Result;
use crate::git::{Vcs, Worktree};

/// A worktree that belongs to the sandbox namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sandbox {
    /// Worktree directory.
    pub path: PathBuf,
    /// Checked-out branch; `None` when detached.
    pub branch: Option<String>,
}

impl From<Worktree> for Sandbox {
    fn from(worktree: Worktree) -> Self {
        Self {
            path: worktree.path,
            branch: worktree.branch,
        }
    }
}

/// Sandboxes in git's listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    sandboxes: Vec<Sandbox>,
}

impl Inventory {
    /// Lists worktrees and keeps those whose path contains `marker`.
    pub fn load<V: Vcs>(vcs: &V, marker: &str) -> Result<Self> {
        let inventory = Self::from_worktrees(vcs.list_worktrees()?, marker);
        tracing::debug!(count = inventory.len(), marker = %marker, "loaded sandbox inventory");
        Ok(inventory)
    }

    /// Filters an already-parsed listing. Order is preserved.
    pub fn from_worktrees(worktrees: Vec<Worktree>, marker: &str) -> Self {
        let sandboxes = worktrees
            .into_iter()
            .filter(|w| w.path_contains(marker))
            .map(Sandbox::from)
            .collect();
        Self { sandboxes }
    }

    pub fn sandboxes(&self) -> &[Sandbox] {
        &self.sandboxes
    }

    pub fn len(&self) -> usize {
        self.sandboxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sandboxes.is_empty()
    }

    /// Most recently created sandbox that has a branch checked out.
    ///
    /// Directory names embed a sortable timestamp, so the greatest path is
    /// the newest. Paths compare as raw strings, not component-wise, so
    /// `/x/boxes/..` sorts after `/x/boxes-old/..`.
    pub fn latest(&self) -> Option<&Sandbox> {
        self.sandboxes
            .iter()
            .filter(|s| s.branch.is_some())
            .max_by(|a, b| a.path.as_os_str().cmp(b.path.as_os_str()))
    }
}
