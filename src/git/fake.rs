//! In-memory [`Vcs`] used by unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

use super::{MergeOutcome, Vcs, Worktree};

/// Records every mutating call and answers queries from canned state.
#[derive(Default)]
pub(crate) struct FakeVcs {
    pub worktrees: Vec<Worktree>,
    /// Branch reported by `current_branch`, keyed by directory.
    pub branches: HashMap<PathBuf, String>,
    /// Top-level reported by `toplevel`, keyed by directory.
    pub toplevels: HashMap<PathBuf, PathBuf>,
    /// Merge results keyed by directory; missing entries merge cleanly.
    pub merges: HashMap<PathBuf, MergeOutcome>,
    pub fail_fetch: bool,
    pub fail_add: bool,
    pub fail_remove: bool,
    pub fail_delete_branch: bool,
    pub calls: RefCell<Vec<String>>,
    pub branch_lookups: Cell<usize>,
}

impl FakeVcs {
    /// Adds a worktree on `branch` (or detached when `None`).
    pub fn with_worktree(mut self, path: &str, branch: Option<&str>) -> Self {
        if let Some(branch) = branch {
            self.branches.insert(PathBuf::from(path), branch.to_string());
        }
        self.worktrees.push(Worktree {
            path: PathBuf::from(path),
            head: Some("0000000".to_string()),
            branch: branch.map(str::to_string),
        });
        self
    }

    pub fn with_merge(mut self, path: &str, outcome: MergeOutcome) -> Self {
        self.merges.insert(PathBuf::from(path), outcome);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl Vcs for FakeVcs {
    fn list_worktrees(&self) -> Result<Vec<Worktree>> {
        Ok(self.worktrees.clone())
    }

    fn current_branch(&self, dir: &Path) -> Option<String> {
        self.branch_lookups.set(self.branch_lookups.get() + 1);
        self.branches.get(dir).cloned()
    }

    fn toplevel(&self, dir: &Path) -> Option<PathBuf> {
        self.toplevels.get(dir).cloned()
    }

    fn fetch(&self, remote: &str, branch: &str) -> Result<()> {
        self.record(format!("fetch {} {}", remote, branch));
        if self.fail_fetch {
            return Err(Error::Git("fetch refused".to_string()));
        }
        Ok(())
    }

    fn add_worktree(&self, path: &Path, new_branch: &str, base: &str) -> Result<()> {
        self.record(format!("add {} {} {}", path.display(), new_branch, base));
        if self.fail_add {
            return Err(Error::SandboxCreation("already exists".to_string()));
        }
        Ok(())
    }

    fn remove_worktree(&self, path: &Path, force: bool) -> Result<()> {
        self.record(format!("remove {} force={}", path.display(), force));
        if self.fail_remove {
            return Err(Error::SandboxCleanup {
                path: path.to_path_buf(),
                reason: "locked".to_string(),
            });
        }
        Ok(())
    }

    fn delete_branch(&self, branch: &str, force: bool) -> Result<()> {
        self.record(format!("delete-branch {} force={}", branch, force));
        if self.fail_delete_branch {
            return Err(Error::Git("branch not found".to_string()));
        }
        Ok(())
    }

    fn merge(&self, dir: &Path, source_ref: &str) -> Result<MergeOutcome> {
        self.record(format!("merge {} {}", dir.display(), source_ref));
        Ok(self
            .merges
            .get(dir)
            .cloned()
            .unwrap_or(MergeOutcome::Merged))
    }
}
