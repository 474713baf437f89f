//! Configuration management for the event links Lambda.

use std::env;
use std::time::Duration;

use crate::{Error, Result};

const DEFAULT_REPOSITORY: &str = "meganus2000/event-links";
const DEFAULT_FILE_PATH: &str = "liens.json";
const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_COMMIT_MESSAGE: &str = "🔄 Update from SMHS admin panel";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where the GitHub credential comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// Token supplied directly in the environment
    Env(String),
    /// ARN of a Secrets Manager secret holding the token
    SecretArn(String),
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenSource::Env(_) => f.write_str("Env(<redacted>)"),
            TokenSource::SecretArn(arn) => f.debug_tuple("SecretArn").field(arn).finish(),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// GitHub credential source
    pub token_source: TokenSource,
    /// Repository as `owner/name`
    pub repository: String,
    /// Path of the JSON document inside the repository
    pub file_path: String,
    /// Branch to read and commit to (repository default when unset)
    pub branch: Option<String>,
    /// GitHub API base URL
    pub api_url: String,
    /// Commit message used for every update
    pub commit_message: String,
    /// Per-request timeout against the GitHub API
    pub timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let token_source = match (non_empty("GITHUB_TOKEN"), non_empty("GITHUB_TOKEN_SECRET_ARN")) {
            (Some(token), _) => TokenSource::Env(token),
            (None, Some(arn)) => TokenSource::SecretArn(arn),
            (None, None) => {
                return Err(Error::Config(
                    "GITHUB_TOKEN or GITHUB_TOKEN_SECRET_ARN must be set".to_string(),
                ))
            }
        };

        let repository =
            non_empty("EVENT_LINKS_REPO").unwrap_or_else(|| DEFAULT_REPOSITORY.to_string());
        if repository.split('/').filter(|part| !part.is_empty()).count() != 2 {
            return Err(Error::Config(format!(
                "EVENT_LINKS_REPO must look like owner/name, got {repository}"
            )));
        }

        let timeout_secs = match non_empty("GITHUB_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                Error::Config(format!("GITHUB_TIMEOUT_SECS is not a number: {}", e))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            token_source,
            repository,
            file_path: non_empty("EVENT_LINKS_PATH")
                .map(|path| path.trim_start_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_FILE_PATH.to_string()),
            branch: non_empty("EVENT_LINKS_BRANCH"),
            api_url: non_empty("GITHUB_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            commit_message: non_empty("EVENT_LINKS_COMMIT_MESSAGE")
                .unwrap_or_else(|| DEFAULT_COMMIT_MESSAGE.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
