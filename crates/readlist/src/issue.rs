//! Issue formatting
//!
//! Renders [`LinkMetadata`] into the Markdown body and label set of a
//! tracking issue, then hands it to an [`IssueTracker`].

use crate::error::IssueError;
use crate::trackers::IssueTracker;
use crate::types::{LinkMetadata, NewIssue, RepoRef};
use tracing::debug;

/// Default cap on outline length, in Unicode code points
///
/// Keeps the rendered body under GitHub's issue body size limit.
pub const DEFAULT_MAX_OUTLINE_CHARS: usize = 60_000;

const CODE_FENCE: &str = "```";

/// Options for rendering issues
#[derive(Debug, Clone)]
pub struct IssueOptions {
    /// Maximum outline length in code points
    pub max_outline_chars: usize,
}

impl Default for IssueOptions {
    fn default() -> Self {
        Self {
            max_outline_chars: DEFAULT_MAX_OUTLINE_CHARS,
        }
    }
}

/// Strip code fences from the outline and cut it to `max_chars` code points
pub fn prepare_outline(outline: &str, max_chars: usize) -> String {
    outline
        .replace(CODE_FENCE, "")
        .chars()
        .take(max_chars)
        .collect()
}

/// Render the Markdown issue body
pub fn render_body(meta: &LinkMetadata, options: &IssueOptions) -> String {
    let outline = prepare_outline(&meta.outline, options.max_outline_chars);

    format!(
        "Title: {title}\n\
         URL: {url}\n\
         \n\
         ![OG Image]({image})\n\
         \n\
         <details>\n\
         \n\
         {fence}\n\
         {outline}\n\
         {fence}\n\
         \n\
         </details>\n",
        title = meta.title,
        url = meta.url,
        image = meta.image,
        fence = CODE_FENCE,
        outline = outline,
    )
}

/// Labels for the issue: `type:` before `site:`, empty fields skipped
pub fn labels(meta: &LinkMetadata) -> Vec<String> {
    let mut labels = Vec::new();
    if !meta.kind.is_empty() {
        labels.push(format!("type:{}", meta.kind));
    }
    if !meta.site_name.is_empty() {
        labels.push(format!("site:{}", meta.site_name));
    }
    labels
}

/// Build the full issue request for a page
pub fn build_issue(meta: &LinkMetadata, options: &IssueOptions) -> NewIssue {
    NewIssue {
        title: meta.title.clone(),
        body: render_body(meta, options),
        labels: labels(meta),
    }
}

/// File an issue for the page and return its web URL
///
/// Tracker errors are returned unchanged.
pub async fn create_issue(
    tracker: &dyn IssueTracker,
    repo: &RepoRef,
    meta: &LinkMetadata,
    options: &IssueOptions,
) -> Result<String, IssueError> {
    let issue = build_issue(meta, options);
    debug!(
        tracker = tracker.name(),
        repo = %repo,
        labels = ?issue.labels,
        body_len = issue.body.len(),
        "Creating issue"
    );
    tracker.create_issue(repo, &issue).await
}
