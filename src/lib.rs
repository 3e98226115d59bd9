//! Worktree Sandbox - disposable git worktrees forked from the main branch.
//!
//! This library creates, lists, updates, and removes sandbox worktrees. All
//! durable state lives in git; every command re-reads the worktree list and
//! works out what to do from there.

pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod lifecycle;
pub mod sandbox;
pub mod update;

pub use cli::{execute, Command, USAGE};
pub use config::{Config, ConfigFile, ValidationResult};
pub use error::{Error, Result};
pub use git::{GitCli, MergeOutcome, Vcs, Worktree};
pub use lifecycle::{CleanupOutcome, CreatedSandbox};
pub use sandbox::{Inventory, Sandbox, SandboxName};
pub use update::{TargetResult, UpdateReport, UpdateStatus, UpdateTarget};
