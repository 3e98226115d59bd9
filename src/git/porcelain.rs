//! Parser for `git worktree list --porcelain`.
//!
//! The format is one attribute per line, records separated by blank lines:
//!
//! ```text
//! worktree /repo
//! HEAD 3f1c...
//! branch refs/heads/main
//!
//! worktree /sandboxes/alice-sandbox-20240101-100000
//! HEAD 9ab2...
//! detached
//! ```

use std::path::PathBuf;

use super::Worktree;

const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// Parses porcelain output into worktree records, preserving git's order.
///
/// Attribute lines that appear before any `worktree` line are ignored, as
/// are attributes this tool does not use (`bare`, `locked`, `prunable`).
pub fn parse_worktree_list(output: &str) -> Vec<Worktree> {
    let mut worktrees: Vec<Worktree> = Vec::new();

    for line in output.lines() {
        let (key, value) = match line.split_once(' ') {
            Some((key, value)) => (key, value),
            None => (line, ""),
        };

        match key {
            "worktree" => worktrees.push(Worktree {
                path: PathBuf::from(value),
                head: None,
                branch: None,
            }),
            "HEAD" => {
                if let Some(current) = worktrees.last_mut() {
                    current.head = Some(value.to_string());
                }
            }
            "branch" => {
                if let Some(current) = worktrees.last_mut() {
                    let name = value.strip_prefix(BRANCH_REF_PREFIX).unwrap_or(value);
                    current.branch = Some(name.to_string());
                }
            }
            "detached" => {
                if let Some(current) = worktrees.last_mut() {
                    current.branch = None;
                }
            }
            _ => {}
        }
    }

    worktrees
}
