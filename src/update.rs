//! Merging the main branch into sandboxes.
//!
//! Targets are resolved first, the main branch is fetched once, and then
//! each target is merged in turn. A conflicted merge is left in place for
//! the user to resolve and does not stop the remaining targets.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::git::{MergeOutcome, Vcs};
use crate::sandbox::{resolve, Inventory};

/// Which sandboxes an update applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateTarget {
    /// Every sandbox.
    All,
    /// The sandbox matching a pattern.
    Pattern(String),
    /// The sandbox containing the working directory, else the latest one.
    Auto,
}

/// Outcome of updating one sandbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    Updated,
    UpToDate,
    /// Merge stopped; the worktree is left conflicted.
    Conflict(String),
}

impl UpdateStatus {
    pub fn is_success(&self) -> bool {
        !matches!(self, UpdateStatus::Conflict(_))
    }
}

/// Per-sandbox update result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetResult {
    pub path: PathBuf,
    pub branch: Option<String>,
    pub status: UpdateStatus,
}

/// Results of one update invocation, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub results: Vec<TargetResult>,
}

impl UpdateReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    /// More than one target was processed.
    pub fn is_batch(&self) -> bool {
        self.results.len() > 1
    }

    /// Process exit code for this report.
    ///
    /// Batches fail when any target failed. A single conflicted target only
    /// fails when `fail_on_conflict` is set.
    pub fn exit_code(&self, fail_on_conflict: bool) -> i32 {
        let failing = if self.is_batch() {
            self.failed() > 0
        } else {
            fail_on_conflict && self.failed() > 0
        };
        i32::from(failing)
    }
}

/// Picks the sandboxes an update applies to. Does not fetch.
pub fn select_targets<V: Vcs>(
    config: &Config,
    vcs: &V,
    target: &UpdateTarget,
    cwd: &Path,
) -> Result<Vec<PathBuf>> {
    let inventory = Inventory::load(vcs, &config.marker)?;

    match target {
        UpdateTarget::All => {
            if inventory.is_empty() {
                return Err(Error::NoSandboxes);
            }
            Ok(inventory.sandboxes().iter().map(|s| s.path.clone()).collect())
        }
        UpdateTarget::Pattern(pattern) => resolve(vcs, &inventory, pattern)
            .map(|path| vec![path])
            .ok_or_else(|| Error::NotFound(pattern.clone())),
        UpdateTarget::Auto => {
            if let Some(current) = current_sandbox(config, vcs, cwd) {
                tracing::debug!(path = ?current, "updating sandbox containing working directory");
                return Ok(vec![current]);
            }
            inventory
                .latest()
                .map(|s| vec![s.path.clone()])
                .ok_or(Error::NoSandboxes)
        }
    }
}

/// The sandbox checkout containing `cwd`, if any.
fn current_sandbox<V: Vcs>(config: &Config, vcs: &V, cwd: &Path) -> Option<PathBuf> {
    if !cwd.to_string_lossy().contains(&config.marker) {
        return None;
    }
    vcs.toplevel(cwd)
        .filter(|top| top.to_string_lossy().contains(&config.marker))
}

/// Merges the main branch into one sandbox.
pub fn update_one<V: Vcs>(config: &Config, vcs: &V, path: &Path) -> TargetResult {
    let branch = vcs.current_branch(path);
    let upstream = config.upstream_ref();

    let status = match vcs.merge(path, &upstream) {
        Ok(MergeOutcome::Merged) => UpdateStatus::Updated,
        Ok(MergeOutcome::UpToDate) => UpdateStatus::UpToDate,
        Ok(MergeOutcome::Conflict(detail)) => UpdateStatus::Conflict(detail),
        Err(e) => UpdateStatus::Conflict(e.to_string()),
    };

    if status.is_success() {
        tracing::info!(path = ?path, branch = ?branch, upstream = %upstream, "updated sandbox");
    } else {
        tracing::warn!(path = ?path, branch = ?branch, upstream = %upstream, "merge conflict");
    }

    TargetResult {
        path: path.to_path_buf(),
        branch,
        status,
    }
}

/// Resolves targets, fetches once, and merges into each target in order.
pub fn update<V: Vcs>(
    config: &Config,
    vcs: &V,
    target: &UpdateTarget,
    cwd: &Path,
) -> Result<UpdateReport> {
    let targets = select_targets(config, vcs, target, cwd)?;

    vcs.fetch(&config.remote, &config.main_branch)?;

    let results = targets
        .iter()
        .map(|path| update_one(config, vcs, path))
        .collect();

    Ok(UpdateReport { results })
}
