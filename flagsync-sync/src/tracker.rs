//! Issue tracker and git collaborator.
//!
//! Wraps the `gh` and `git` CLIs instead of the REST APIs to avoid token
//! management; the [`Tracker`] trait is the seam the pipeline depends on so
//! tests can record calls instead of shelling out.

use std::path::PathBuf;
use std::process::Command;

use serde::Deserialize;
use thiserror::Error;

/// All errors that can arise from tracker/git operations.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("command '{command}' failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("not authenticated with the tracker; run 'gh auth login' first")]
    NotAuthenticated,

    #[error("issue #{number} not found")]
    IssueNotFound { number: u64 },

    #[error("git operation failed: {reason}")]
    Git { reason: String },

    #[error("failed to parse tracker response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Narrow tracker capability consumed by the pipeline.
pub trait Tracker {
    /// Exact-title issue lookup. `None` when no open issue matches.
    fn find_issue_by_title(&self, title: &str) -> Result<Option<u64>, TrackerError>;

    fn close_issue(&self, number: u64) -> Result<(), TrackerError>;

    /// Stage `paths` into one commit on a fresh branch, push it, and open a
    /// pull request for review.
    fn create_and_push_branch(
        &self,
        name: &str,
        commit_message: &str,
        paths: &[PathBuf],
    ) -> Result<(), TrackerError>;
}

// ---------------------------------------------------------------------------
// gh / git implementation
// ---------------------------------------------------------------------------

/// Production tracker shelling out to `gh` and `git`.
pub struct GhTracker {
    /// `owner/repo`; `None` lets `gh` infer from the git remote.
    repo: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IssueListEntry {
    number: u64,
    title: String,
}

impl GhTracker {
    pub fn new(repo: Option<String>) -> Self {
        Self { repo }
    }

    fn gh(&self, args: &[&str]) -> Result<String, TrackerError> {
        let mut cmd = Command::new("gh");
        cmd.args(args);
        if let Some(repo) = &self.repo {
            cmd.args(["-R", repo]);
        }
        let output = cmd.output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            if stderr.contains("not logged") || stderr.contains("auth") {
                return Err(TrackerError::NotAuthenticated);
            }
            return Err(TrackerError::CommandFailed {
                command: format!("gh {}", args.join(" ")),
                stderr,
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn git(&self, args: &[&str]) -> Result<(), TrackerError> {
        let output = Command::new("git").args(args).output()?;
        if !output.status.success() {
            return Err(TrackerError::Git {
                reason: format!(
                    "git {}: {}",
                    args.join(" "),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(())
    }
}

impl Tracker for GhTracker {
    fn find_issue_by_title(&self, title: &str) -> Result<Option<u64>, TrackerError> {
        let search = format!("in:title {title}");
        let stdout = self.gh(&[
            "issue",
            "list",
            "--state",
            "open",
            "--search",
            &search,
            "--json",
            "number,title",
        ])?;
        let entries: Vec<IssueListEntry> = serde_json::from_str(&stdout)?;
        Ok(entries
            .into_iter()
            .find(|entry| entry.title == title)
            .map(|entry| entry.number))
    }

    fn close_issue(&self, number: u64) -> Result<(), TrackerError> {
        let id = number.to_string();
        match self.gh(&["issue", "close", &id]) {
            Ok(_) => Ok(()),
            Err(TrackerError::CommandFailed { stderr, .. })
                if stderr.contains("Could not resolve") || stderr.contains("not found") =>
            {
                Err(TrackerError::IssueNotFound { number })
            }
            Err(other) => Err(other),
        }
    }

    fn create_and_push_branch(
        &self,
        name: &str,
        commit_message: &str,
        paths: &[PathBuf],
    ) -> Result<(), TrackerError> {
        self.git(&["checkout", "-b", name])?;
        let mut add_args = vec!["add".to_owned()];
        add_args.extend(paths.iter().map(|p| p.display().to_string()));
        let add_refs: Vec<&str> = add_args.iter().map(String::as_str).collect();
        self.git(&add_refs)?;
        self.git(&["commit", "-m", commit_message])?;
        self.git(&["push", "-u", "origin", name])?;
        self.gh(&["pr", "create", "--fill"])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_list_payload_parses() {
        let payload = r#"[{"number": 41, "title": "[flag] feature_fe_1_fl_1_x_enabled"}]"#;
        let entries: Vec<IssueListEntry> = serde_json::from_str(payload).expect("parse");
        assert_eq!(entries[0].number, 41);
        assert_eq!(entries[0].title, "[flag] feature_fe_1_fl_1_x_enabled");
    }
}
