//! Core GitManager implementation

use git2::{Error as GitError, Repository};
use std::path::{Path, PathBuf};

/// Git manager for the checked-out repository an agent runs in
pub struct GitManager {
    pub(crate) repo: Repository,
}

impl GitManager {
    /// Open the repository at exactly this path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, GitError> {
        let repo = Repository::open(path)?;
        Ok(Self { repo })
    }

    /// Open the repository containing `path`, searching parent directories
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self, GitError> {
        let repo = Repository::discover(path)?;
        Ok(Self { repo })
    }

    /// Get the repository path
    pub fn repo_path(&self) -> PathBuf {
        self.repo.path().to_path_buf()
    }
}
