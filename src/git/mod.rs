//! Read-only git access using git2-rs
//!
//! - `manager` - GitManager struct and repository discovery
//! - `commits` - HEAD lookup, changed files and per-file patches
//! - `types` - Shared data structures

mod commits;
mod manager;
mod types;

pub use manager::GitManager;
pub use types::{ChangedFile, CommitInfo};

pub use git2::Error as GitError;
