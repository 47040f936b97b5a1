//! GitHub issue tracker
//!
//! Files issues through the GitHub REST API, authenticating either with a
//! static token or as a GitHub App installation.

use crate::error::IssueError;
use crate::trackers::IssueTracker;
use crate::types::{NewIssue, RepoRef};
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Public GitHub API endpoint
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";

/// App JWTs are backdated to tolerate clock drift
const JWT_BACKDATE_SECS: i64 = 60;

/// GitHub rejects app JWTs that live longer than ten minutes
const JWT_LIFETIME_SECS: i64 = 9 * 60;

/// How the tracker authenticates to GitHub
#[derive(Clone)]
pub enum Credentials {
    /// Personal access token or workflow token
    Token(String),
    /// GitHub App installation; exchanged for an installation token per call
    App {
        app_id: u64,
        installation_id: u64,
        key: EncodingKey,
    },
}

impl Credentials {
    /// Static token credentials
    pub fn token(token: impl Into<String>) -> Self {
        Credentials::Token(token.into())
    }

    /// GitHub App credentials from an RSA private key in PEM format
    pub fn app(
        app_id: u64,
        installation_id: u64,
        private_key_pem: &[u8],
    ) -> Result<Self, IssueError> {
        let key =
            EncodingKey::from_rsa_pem(private_key_pem).map_err(IssueError::InvalidPrivateKey)?;
        Ok(Credentials::App {
            app_id,
            installation_id,
            key,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Token(_) => f.debug_tuple("Token").field(&"<redacted>").finish(),
            Credentials::App {
                app_id,
                installation_id,
                ..
            } => f
                .debug_struct("App")
                .field("app_id", app_id)
                .field("installation_id", installation_id)
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Debug, Serialize)]
struct AppClaims {
    iat: i64,
    exp: i64,
    iss: String,
}

#[derive(Debug, Serialize)]
struct CreateIssueRequest<'a> {
    title: &'a str,
    body: &'a str,
    labels: &'a [String],
}

#[derive(Debug, Deserialize)]
struct CreatedIssue {
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct InstallationToken {
    token: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Issue tracker backed by the GitHub REST API
#[derive(Debug, Clone)]
pub struct GitHubTracker {
    http: reqwest::Client,
    api_base: String,
    credentials: Credentials,
}

impl GitHubTracker {
    /// Create a tracker against the public GitHub API
    pub fn new(credentials: Credentials) -> Result<Self, IssueError> {
        Self::with_api_base(credentials, DEFAULT_API_BASE)
    }

    /// Create a tracker against a custom API base (GitHub Enterprise, tests)
    pub fn with_api_base(
        credentials: Credentials,
        api_base: impl Into<String>,
    ) -> Result<Self, IssueError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(IssueError::ClientBuildError)?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// API base URL without trailing slash
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Resolve the bearer token for one API call
    async fn access_token(&self) -> Result<String, IssueError> {
        match &self.credentials {
            Credentials::Token(token) => {
                let token = token.trim();
                if token.is_empty() {
                    return Err(IssueError::InvalidCredentials(
                        "GitHub token is empty".to_string(),
                    ));
                }
                Ok(token.to_string())
            }
            Credentials::App {
                app_id,
                installation_id,
                key,
            } => {
                let jwt = app_jwt(*app_id, key)?;
                let url = format!(
                    "{}/app/installations/{}/access_tokens",
                    self.api_base, installation_id
                );
                debug!(app_id, installation_id, "Requesting installation token");
                let response = self
                    .http
                    .post(&url)
                    .bearer_auth(jwt)
                    .send()
                    .await
                    .map_err(IssueError::RequestError)?;
                let token: InstallationToken = read_json(response).await?;
                Ok(token.token)
            }
        }
    }
}

#[async_trait]
impl IssueTracker for GitHubTracker {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> Result<String, IssueError> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/repos/{}/{}/issues",
            self.api_base, repo.owner, repo.name
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&CreateIssueRequest {
                title: &issue.title,
                body: &issue.body,
                labels: &issue.labels,
            })
            .send()
            .await
            .map_err(IssueError::RequestError)?;

        let created: CreatedIssue = read_json(response).await?;
        debug!(repo = %repo, url = %created.html_url, "Created issue");
        Ok(created.html_url)
    }
}

/// Sign the short-lived JWT a GitHub App uses to request installation tokens
fn app_jwt(app_id: u64, key: &EncodingKey) -> Result<String, IssueError> {
    let now = Utc::now().timestamp();
    let claims = AppClaims {
        iat: now - JWT_BACKDATE_SECS,
        exp: now + JWT_LIFETIME_SECS,
        iss: app_id.to_string(),
    };
    encode(&Header::new(Algorithm::RS256), &claims, key).map_err(IssueError::TokenSigning)
}

/// Decode a success body, or turn an error status into [`IssueError::ApiError`]
async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, IssueError> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let message = api_error_message(&text);
        warn!(status = status.as_u16(), %message, "GitHub API request rejected");
        return Err(IssueError::ApiError {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|e| IssueError::InvalidResponse(e.to_string()))
}

/// Prefer the `message` field of a GitHub error body, else the raw text
fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
