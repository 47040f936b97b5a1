//! The extract-and-file pipeline

use crate::error::Error;
use crate::extract::{extract_with_options, ExtractOptions};
use crate::issue::{create_issue, IssueOptions, DEFAULT_MAX_OUTLINE_CHARS};
use crate::trackers::IssueTracker;
use crate::types::{RepoRef, SavedLink};
use std::sync::Arc;
use tracing::{info, warn};

/// Builder for configuring a [`LinkSaver`]
#[derive(Debug, Clone)]
pub struct LinkSaverBuilder {
    user_agent: Option<String>,
    max_outline_chars: usize,
}

impl Default for LinkSaverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkSaverBuilder {
    /// Create a builder with default options
    pub fn new() -> Self {
        Self {
            user_agent: None,
            max_outline_chars: DEFAULT_MAX_OUTLINE_CHARS,
        }
    }

    /// Set custom User-Agent for page fetches
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set the outline length cap, in code points
    pub fn max_outline_chars(mut self, max: usize) -> Self {
        self.max_outline_chars = max;
        self
    }

    /// Build the saver for a tracker and target repository
    pub fn build(self, tracker: Arc<dyn IssueTracker>, repo: RepoRef) -> LinkSaver {
        LinkSaver {
            tracker,
            repo,
            extract_options: ExtractOptions {
                user_agent: self.user_agent,
            },
            issue_options: IssueOptions {
                max_outline_chars: self.max_outline_chars,
            },
        }
    }
}

/// Fetches a page, extracts its metadata and files it as an issue
///
/// Holds no per-request state, so one saver can be shared between
/// concurrent callers.
#[derive(Clone)]
pub struct LinkSaver {
    tracker: Arc<dyn IssueTracker>,
    repo: RepoRef,
    extract_options: ExtractOptions,
    issue_options: IssueOptions,
}

impl LinkSaver {
    /// Create a new saver builder
    pub fn builder() -> LinkSaverBuilder {
        LinkSaverBuilder::new()
    }

    /// Target repository
    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    /// Save one link; the first failure aborts the run
    pub async fn save(&self, url: &str) -> Result<SavedLink, Error> {
        let metadata = extract_with_options(url, &self.extract_options)
            .await
            .inspect_err(|e| warn!(url, error = %e, "Failed to fetch page"))?;

        let issue_url = create_issue(
            self.tracker.as_ref(),
            &self.repo,
            &metadata,
            &self.issue_options,
        )
        .await
        .inspect_err(|e| warn!(url, error = %e, "Failed to create issue"))?;

        info!(url, issue = %issue_url, "Saved link");

        Ok(SavedLink {
            metadata,
            issue_url,
        })
    }
}

impl std::fmt::Debug for LinkSaver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkSaver")
            .field("tracker", &self.tracker.name())
            .field("repo", &self.repo)
            .field("extract_options", &self.extract_options)
            .field("issue_options", &self.issue_options)
            .finish()
    }
}
