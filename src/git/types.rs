//! Git data types shared by the agents

use serde::{Deserialize, Serialize};

/// Represents a git commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    pub id: String,
    pub short_id: String,
    pub message: String,
    pub author: String,
    pub email: String,
    pub timestamp: i64,
    pub parent_ids: Vec<String>,
}

/// A path touched between two revisions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    pub path: String,
    pub status: String,
}

impl ChangedFile {
    pub fn is_deleted(&self) -> bool {
        self.status == "deleted"
    }

    pub fn has_extension(&self, extension: &str) -> bool {
        std::path::Path::new(&self.path)
            .extension()
            .map(|ext| ext == extension)
            .unwrap_or(false)
    }
}
