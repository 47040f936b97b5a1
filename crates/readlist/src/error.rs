//! Error types for readlist

use thiserror::Error;

/// Errors that can occur while fetching the page to be saved
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL is missing
    #[error("Missing required parameter: url")]
    MissingUrl,

    /// URL has invalid scheme
    #[error("Invalid URL: must start with http:// or https://")]
    InvalidUrlScheme,

    /// URL has an http(s) scheme but does not parse
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[source] url::ParseError),

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Failed to connect to server
    #[error("Failed to connect to server: {0}")]
    ConnectError(#[source] reqwest::Error),

    /// Other request error
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Response body could not be read as a document
    #[error("Failed to read response body: {0}")]
    BodyError(#[source] reqwest::Error),
}

impl FetchError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_connect() {
            FetchError::ConnectError(err)
        } else {
            FetchError::RequestError(err.to_string())
        }
    }
}

/// Errors raised by an issue tracker while filing an issue
#[derive(Debug, Error)]
pub enum IssueError {
    /// Failed to build HTTP client
    #[error("Failed to create GitHub API client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Credentials could not be turned into a request header
    #[error("Invalid GitHub credentials: {0}")]
    InvalidCredentials(String),

    /// The GitHub App private key is not a valid RSA PEM key
    #[error("Invalid GitHub App private key: {0}")]
    InvalidPrivateKey(#[source] jsonwebtoken::errors::Error),

    /// Signing the GitHub App JWT failed
    #[error("Failed to sign GitHub App token: {0}")]
    TokenSigning(#[source] jsonwebtoken::errors::Error),

    /// Transport-level failure talking to the API
    #[error("GitHub API request failed: {0}")]
    RequestError(#[source] reqwest::Error),

    /// The API answered with a non-success status
    #[error("GitHub API error: HTTP {status}: {message}")]
    ApiError { status: u16, message: String },

    /// The API answered with a body we could not understand
    #[error("Unexpected GitHub API response: {0}")]
    InvalidResponse(String),
}

/// Error returned by the extract-and-file pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// The page could not be fetched
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The issue could not be created
    #[error(transparent)]
    Issue(#[from] IssueError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            FetchError::MissingUrl.to_string(),
            "Missing required parameter: url"
        );
        assert_eq!(
            FetchError::InvalidUrlScheme.to_string(),
            "Invalid URL: must start with http:// or https://"
        );
        assert_eq!(
            FetchError::InvalidUrl(url::ParseError::EmptyHost).to_string(),
            "Invalid URL: empty host"
        );
        assert_eq!(
            IssueError::ApiError {
                status: 422,
                message: "Validation Failed".to_string()
            }
            .to_string(),
            "GitHub API error: HTTP 422: Validation Failed"
        );
    }

    #[test]
    fn test_pipeline_error_is_transparent() {
        let err: Error = FetchError::MissingUrl.into();
        assert_eq!(err.to_string(), "Missing required parameter: url");

        let err: Error = IssueError::InvalidResponse("missing html_url".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Unexpected GitHub API response: missing html_url"
        );
    }
}
