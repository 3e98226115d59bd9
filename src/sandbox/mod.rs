//! Sandbox naming, discovery, and pattern resolution.
//!
//! A sandbox is a worktree + branch pair created under the configured
//! namespace. Nothing is stored: every command rebuilds the [`Inventory`]
//! from `git worktree list`.

pub mod inventory;
pub mod naming;
pub mod resolve;

pub use inventory::{Inventory, Sandbox};
pub use naming::SandboxName;
pub use resolve::resolve;
