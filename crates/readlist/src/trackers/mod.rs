//! Issue trackers that saved links are filed into
//!
//! Design: the pipeline only knows the [`IssueTracker`] trait. The GitHub
//! REST implementation is [`GitHubTracker`]; tests substitute their own.

mod github;

pub use github::{Credentials, GitHubTracker, DEFAULT_API_BASE};

use crate::error::IssueError;
use crate::types::{NewIssue, RepoRef};
use async_trait::async_trait;

/// Capability to create an issue in a repository
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Identifier for logging
    fn name(&self) -> &'static str;

    /// Create the issue and return its web URL
    async fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> Result<String, IssueError>;
}
