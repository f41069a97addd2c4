// sprint_planning.json: written by the requirements agent, read by the standup

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const SPRINT_PLAN_FILE: &str = "sprint_planning.json";

/// Where the current sprint plan lives in the wiki
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintPlanRecord {
    pub page_id: Option<String>,
    #[serde(default)]
    pub page_url: Option<String>,
    #[serde(default)]
    pub feature_key: Option<String>,
    #[serde(default)]
    pub issue_number: Option<u32>,
    #[serde(default)]
    pub stories: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Read the record; missing or unreadable files yield `None`
pub fn read_record(dir: &Path) -> Option<SprintPlanRecord> {
    let path = dir.join(SPRINT_PLAN_FILE);
    if !path.exists() {
        return None;
    }
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            log::warn!("Could not read {}: {}", path.display(), e);
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(record) => Some(record),
        Err(e) => {
            log::warn!("Ignoring malformed {}: {}", path.display(), e);
            None
        }
    }
}

pub fn write_record(dir: &Path, record: &SprintPlanRecord) -> Result<()> {
    let path = dir.join(SPRINT_PLAN_FILE);
    let json = serde_json::to_string_pretty(record)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Page id to append standups to, if one was recorded
pub fn recorded_page_id(dir: &Path) -> Option<String> {
    read_record(dir).and_then(|r| r.page_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let record = SprintPlanRecord {
            page_id: Some("4242".to_string()),
            page_url: Some("https://wiki/pages/viewpage.action?pageId=4242".to_string()),
            feature_key: Some("SHOP-1".to_string()),
            issue_number: Some(7),
            stories: vec!["SHOP-2".to_string()],
            created_at: Some("2024-05-01T10:00:00Z".to_string()),
        };
        write_record(dir.path(), &record).unwrap();
        assert_eq!(read_record(dir.path()), Some(record));
        assert_eq!(recorded_page_id(dir.path()).as_deref(), Some("4242"));
    }

    #[test]
    fn test_minimal_file_only_needs_page_id() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SPRINT_PLAN_FILE), r#"{"page_id": "99"}"#).unwrap();
        assert_eq!(recorded_page_id(dir.path()).as_deref(), Some("99"));
    }

    #[test]
    fn test_missing_or_malformed_file() {
        let dir = TempDir::new().unwrap();
        assert!(read_record(dir.path()).is_none());

        fs::write(dir.path().join(SPRINT_PLAN_FILE), "not json").unwrap();
        assert!(recorded_page_id(dir.path()).is_none());
    }

    #[test]
    fn test_null_page_id() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SPRINT_PLAN_FILE), r#"{"page_id": null}"#).unwrap();
        assert!(read_record(dir.path()).is_some());
        assert!(recorded_page_id(dir.path()).is_none());
    }
}
