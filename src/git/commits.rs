//! Commit and diff queries for GitManager

use git2::{Commit, Delta, Diff, DiffFormat, DiffOptions, Error as GitError};

use crate::git::types::{ChangedFile, CommitInfo};
use crate::git::GitManager;

impl GitManager {
    /// Full SHA of HEAD
    pub fn head_sha(&self) -> Result<String, GitError> {
        let head = self.repo.head()?.peel_to_commit()?;
        Ok(head.id().to_string())
    }

    /// The commit HEAD points at
    pub fn head_commit(&self) -> Result<CommitInfo, GitError> {
        let head = self.repo.head()?.peel_to_commit()?;
        self.commit_to_info(&head)
    }

    /// Files changed between two revisions (e.g. `HEAD~1`, `HEAD`)
    ///
    /// An unresolvable `from` revision, such as the parent of a root commit,
    /// yields an empty list.
    pub fn changed_files(&self, from: &str, to: &str) -> Result<Vec<ChangedFile>, GitError> {
        let Some(diff) = self.diff_between(from, to, None)? else {
            return Ok(Vec::new());
        };

        let mut files = Vec::new();
        for delta in diff.deltas() {
            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(|p| p.to_string_lossy().to_string());

            if let Some(path) = path {
                files.push(ChangedFile {
                    path,
                    status: delta_to_string(delta.status()),
                });
            }
        }

        Ok(files)
    }

    /// Unified diff text of one path between two revisions
    ///
    /// Empty when the path did not change or `from` cannot be resolved.
    pub fn file_patch(&self, from: &str, to: &str, path: &str) -> Result<String, GitError> {
        let Some(diff) = self.diff_between(from, to, Some(path))? else {
            return Ok(String::new());
        };

        let mut patch = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            let origin = line.origin();
            if matches!(origin, '+' | '-' | ' ') {
                patch.push(origin);
            }
            patch.push_str(&String::from_utf8_lossy(line.content()));
            true
        })?;

        Ok(patch)
    }

    fn diff_between(
        &self,
        from: &str,
        to: &str,
        pathspec: Option<&str>,
    ) -> Result<Option<Diff<'_>>, GitError> {
        let from_commit = match self.resolve_commit(from) {
            Ok(commit) => commit,
            Err(e) => {
                log::debug!("Cannot resolve '{}': {}", from, e.message());
                return Ok(None);
            }
        };
        let to_commit = self.resolve_commit(to)?;

        let mut options = DiffOptions::new();
        if let Some(pathspec) = pathspec {
            options.pathspec(pathspec).disable_pathspec_match(true);
        }

        let diff = self.repo.diff_tree_to_tree(
            Some(&from_commit.tree()?),
            Some(&to_commit.tree()?),
            Some(&mut options),
        )?;
        Ok(Some(diff))
    }

    fn resolve_commit(&self, spec: &str) -> Result<Commit<'_>, GitError> {
        self.repo.revparse_single(spec)?.peel_to_commit()
    }

    pub(crate) fn commit_to_info(&self, commit: &Commit) -> Result<CommitInfo, GitError> {
        let author = commit.author();
        let id = commit.id().to_string();

        Ok(CommitInfo {
            short_id: id.chars().take(7).collect(),
            id,
            message: commit.message().unwrap_or("").to_string(),
            author: author.name().unwrap_or("").to_string(),
            email: author.email().unwrap_or("").to_string(),
            timestamp: commit.time().seconds(),
            parent_ids: commit.parent_ids().map(|id| id.to_string()).collect(),
        })
    }
}

fn delta_to_string(delta: Delta) -> String {
    match delta {
        Delta::Added => "added",
        Delta::Deleted => "deleted",
        Delta::Modified => "modified",
        Delta::Renamed => "renamed",
        Delta::Copied => "copied",
        Delta::Ignored => "ignored",
        Delta::Untracked => "untracked",
        Delta::Typechange => "typechange",
        Delta::Unmodified => "unmodified",
        Delta::Unreadable => "unreadable",
        Delta::Conflicted => "conflicted",
    }
    .to_string()
}
