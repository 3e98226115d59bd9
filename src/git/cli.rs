//! Process-backed [`Vcs`] implementation that runs the `git` binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::error::{Error, Result};

use super::porcelain::parse_worktree_list;
use super::{MergeOutcome, Vcs, Worktree};

/// Runs git commands against one repository.
#[derive(Debug, Clone)]
pub struct GitCli {
    /// Root of the main (non-linked) checkout.
    repo_path: PathBuf,
}

impl GitCli {
    /// Creates a client for the repository rooted at `repo_path`.
    pub fn new(repo_path: PathBuf) -> Self {
        Self { repo_path }
    }

    /// Finds the main repository root for `dir`.
    ///
    /// Works from the main checkout and from any linked worktree: the common
    /// git directory is shared by all of them, and its parent is the main
    /// checkout.
    pub fn discover(dir: &Path) -> Result<Self> {
        let output = git_output(dir, &["rev-parse", "--git-common-dir"])?;
        if !output.status.success() {
            return Err(Error::Git(format!(
                "not inside a git repository: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let common_dir = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
        let common_dir = if common_dir.is_absolute() {
            common_dir
        } else {
            dir.join(common_dir)
        };
        let common_dir = common_dir.canonicalize()?;

        let repo_path = common_dir
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::Git(format!("unexpected git dir {}", common_dir.display())))?;

        tracing::debug!(repo = ?repo_path, "discovered repository");
        Ok(Self::new(repo_path))
    }

    /// Returns the main repository root.
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    fn run(&self, dir: &Path, args: &[&str]) -> Result<Output> {
        tracing::debug!(dir = ?dir, args = ?args, "running git");
        git_output(dir, args)
    }
}

fn git_output(dir: &Path, args: &[&str]) -> Result<Output> {
    Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .map_err(|e| Error::Git(format!("failed to run git: {}", e)))
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

impl Vcs for GitCli {
    fn list_worktrees(&self) -> Result<Vec<Worktree>> {
        let output = self.run(&self.repo_path, &["worktree", "list", "--porcelain"])?;

        if !output.status.success() {
            return Err(Error::Git(format!(
                "failed to list worktrees: {}",
                stderr_of(&output)
            )));
        }

        Ok(parse_worktree_list(&String::from_utf8_lossy(&output.stdout)))
    }

    fn current_branch(&self, dir: &Path) -> Option<String> {
        let output = self
            .run(dir, &["symbolic-ref", "--quiet", "--short", "HEAD"])
            .ok()?;

        if !output.status.success() {
            return None;
        }

        let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!branch.is_empty()).then_some(branch)
    }

    fn toplevel(&self, dir: &Path) -> Option<PathBuf> {
        let output = self.run(dir, &["rev-parse", "--show-toplevel"]).ok()?;

        if !output.status.success() {
            return None;
        }

        let top = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!top.is_empty()).then(|| PathBuf::from(top))
    }

    fn fetch(&self, remote: &str, branch: &str) -> Result<()> {
        let output = self.run(&self.repo_path, &["fetch", remote, branch])?;

        if !output.status.success() {
            return Err(Error::Git(format!(
                "failed to fetch {}/{}: {}",
                remote,
                branch,
                stderr_of(&output)
            )));
        }

        Ok(())
    }

    fn add_worktree(&self, path: &Path, new_branch: &str, base: &str) -> Result<()> {
        let path_arg = path.to_string_lossy();
        let output = self.run(
            &self.repo_path,
            &["worktree", "add", "-b", new_branch, &path_arg, base],
        )?;

        if !output.status.success() {
            return Err(Error::SandboxCreation(format!(
                "git worktree add failed: {}",
                stderr_of(&output)
            )));
        }

        Ok(())
    }

    fn remove_worktree(&self, path: &Path, force: bool) -> Result<()> {
        let path_arg = path.to_string_lossy();
        let mut args = vec!["worktree", "remove"];
        if force {
            args.push("--force");
        }
        args.push(&path_arg);

        let output = self.run(&self.repo_path, &args)?;

        if !output.status.success() {
            return Err(Error::SandboxCleanup {
                path: path.to_path_buf(),
                reason: stderr_of(&output),
            });
        }

        Ok(())
    }

    fn delete_branch(&self, branch: &str, force: bool) -> Result<()> {
        let flag = if force { "-D" } else { "-d" };
        let output = self.run(&self.repo_path, &["branch", flag, branch])?;

        if !output.status.success() {
            return Err(Error::Git(format!(
                "failed to delete branch {}: {}",
                branch,
                stderr_of(&output)
            )));
        }

        Ok(())
    }

    fn merge(&self, dir: &Path, source_ref: &str) -> Result<MergeOutcome> {
        tracing::debug!(dir = ?dir, source = %source_ref, "running git merge");

        // LC_ALL keeps the "Already up to date" message parseable.
        let output = Command::new("git")
            .current_dir(dir)
            .env("GIT_MERGE_AUTOEDIT", "no")
            .env("LC_ALL", "C")
            .args(["merge", "--no-edit", source_ref])
            .output()
            .map_err(|e| Error::Git(format!("failed to run git: {}", e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            let stderr = stderr_of(&output);
            let detail = [stdout.trim(), stderr.as_str()]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            return Ok(MergeOutcome::Conflict(detail));
        }

        if stdout.contains("Already up to date") || stdout.contains("Already up-to-date") {
            return Ok(MergeOutcome::UpToDate);
        }

        Ok(MergeOutcome::Merged)
    }
}
