//! readlist - save links for later reading as GitHub issues
//!
//! This crate fetches a web page, extracts lightweight metadata (title,
//! Open Graph type, preview image, site name and a plain-text outline) and
//! files it as an issue in a GitHub repository.
//!
//! ## Pipeline
//!
//! [`LinkSaver::save`] runs the two stages in order:
//! - [`extract`] - fetch the page and build a [`LinkMetadata`] record
//! - [`issue`] - render the issue body and labels, then hand them to an
//!   [`IssueTracker`]
//!
//! The GitHub implementation of [`IssueTracker`] is [`GitHubTracker`],
//! which authenticates with a static token or as a GitHub App installation.

pub mod error;
pub mod extract;
pub mod issue;
mod saver;
pub mod trackers;
mod types;

pub use error::{Error, FetchError, IssueError};
pub use extract::{extract, extract_with_options, parse_metadata, ExtractOptions};
pub use issue::{build_issue, create_issue, render_body, IssueOptions, DEFAULT_MAX_OUTLINE_CHARS};
pub use saver::{LinkSaver, LinkSaverBuilder};
pub use trackers::{Credentials, GitHubTracker, IssueTracker, DEFAULT_API_BASE};
pub use types::{LinkMetadata, NewIssue, RepoRef, SavedLink};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = concat!("readlist/", env!("CARGO_PKG_VERSION"));
