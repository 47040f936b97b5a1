//! Core types for readlist

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Metadata extracted from a saved page
///
/// Built once per extraction and never modified afterwards. Fields that
/// the page does not provide are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMetadata {
    /// The URL that was fetched
    pub url: String,

    /// Page title (`og:title`, falling back to `<title>`)
    pub title: String,

    /// Open Graph type, e.g. "article"
    #[serde(rename = "type")]
    pub kind: String,

    /// Preview image URL (`og:image`)
    pub image: String,

    /// Site name (`og:site_name`)
    pub site_name: String,

    /// Plain-text outline of the page body
    pub outline: String,
}

/// An issue ready to be filed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

/// Target repository for new issues
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// Create a repository reference from owner and name
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Build a reference from an owner and an "owner/repo" full name
    ///
    /// The `owner/` prefix is stripped from `full_name` when present, so a
    /// bare repository name is accepted too.
    pub fn from_env_pair(owner: &str, full_name: &str) -> Self {
        let prefix = format!("{}/", owner);
        let name = full_name.strip_prefix(&prefix).unwrap_or(full_name);
        Self::new(owner, name)
    }
}

impl FromStr for RepoRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self::new(owner, name))
            }
            _ => Err(format!("Invalid repository: expected owner/repo, got {:?}", s)),
        }
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Result of saving a link: the extracted metadata and the filed issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedLink {
    pub metadata: LinkMetadata,
    pub issue_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_ref_from_str() {
        let repo: RepoRef = "octo/reading".parse().unwrap();
        assert_eq!(repo, RepoRef::new("octo", "reading"));
        assert_eq!(repo.to_string(), "octo/reading");

        assert!("octo".parse::<RepoRef>().is_err());
        assert!("/reading".parse::<RepoRef>().is_err());
        assert!("octo/".parse::<RepoRef>().is_err());
        assert!("a/b/c".parse::<RepoRef>().is_err());
    }

    #[test]
    fn test_repo_ref_from_env_pair() {
        assert_eq!(
            RepoRef::from_env_pair("octo", "octo/reading"),
            RepoRef::new("octo", "reading")
        );
        assert_eq!(
            RepoRef::from_env_pair("octo", "reading"),
            RepoRef::new("octo", "reading")
        );
    }

    #[test]
    fn test_metadata_serializes_type_field() {
        let meta = LinkMetadata {
            url: "https://example.com".to_string(),
            kind: "article".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains("\"type\":\"article\""));
        assert!(!json.contains("kind"));
    }
}
