//! Remote storage for the event links document.
//!
//! The document lives in a GitHub repository and is read and written through the
//! contents API. Writes carry the blob sha from the preceding read, so GitHub
//! rejects them if anyone else committed in between.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::{EventDocument, RevisionToken};
use crate::{Config, Error, Result};

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const CLIENT_USER_AGENT: &str = concat!("event-links/", env!("CARGO_PKG_VERSION"));

/// Read-modify-write access to a single JSON document.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the document together with its current revision.
    async fn read(&self) -> Result<(EventDocument, RevisionToken)>;

    /// Replace the document, provided it is still at `revision`.
    async fn write(&self, doc: &EventDocument, revision: &RevisionToken) -> Result<()>;
}

/// Contents API response for a single file.
#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: String,
    sha: String,
}

/// Contents API update request.
#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    message: &'a str,
    content: String,
    sha: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

/// [`DocumentStore`] backed by a file in a GitHub repository.
pub struct GitHubContentStore {
    http_client: reqwest::Client,
    token: String,
    url: String,
    branch: Option<String>,
    commit_message: String,
}

impl GitHubContentStore {
    /// Create a store for the file named in `config`, authenticating with `token`.
    pub fn new(config: &Config, token: String) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            token,
            url: format!(
                "{}/repos/{}/contents/{}",
                config.api_url, config.repository, config.file_path
            ),
            branch: config.branch.clone(),
            commit_message: config.commit_message.clone(),
        })
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.http_client
            .request(method, &self.url)
            .header(AUTHORIZATION, format!("token {}", self.token))
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(USER_AGENT, CLIENT_USER_AGENT)
    }
}

#[async_trait]
impl DocumentStore for GitHubContentStore {
    async fn read(&self) -> Result<(EventDocument, RevisionToken)> {
        let mut request = self.request(reqwest::Method::GET);
        if let Some(branch) = &self.branch {
            request = request.query(&[("ref", branch)]);
        }

        let response = request.send().await.map_err(|e| Error::RemoteRead {
            status: None,
            detail: e.to_string(),
        })?;

        if !response.status().is_success() {
            warn!("GitHub GET returned {}", response.status());
            return Err(Error::read_status(response.status().as_u16()));
        }

        let file: ContentsResponse = response.json().await.map_err(|e| Error::RemoteRead {
            status: None,
            detail: format!("Failed to parse contents response: {}", e),
        })?;

        let doc = decode_document(&file.content)?;
        info!(sha = %file.sha, "Fetched event document");

        Ok((doc, RevisionToken(file.sha)))
    }

    async fn write(&self, doc: &EventDocument, revision: &RevisionToken) -> Result<()> {
        let body = UpdateRequest {
            message: &self.commit_message,
            content: encode_document(doc)?,
            sha: revision.as_str(),
            branch: self.branch.as_deref(),
        };

        let response = self
            .request(reqwest::Method::PUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::RemoteWrite {
                status: None,
                body: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("GitHub PUT returned {}", status);
            return Err(Error::RemoteWrite {
                status: Some(status.as_u16()),
                body: error_text,
            });
        }

        info!(previous_sha = %revision, "Committed event document");
        Ok(())
    }
}

/// Decode the base64 file content GitHub returns, which may contain line breaks.
pub fn decode_document(content: &str) -> Result<EventDocument> {
    let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(compact).map_err(|e| Error::RemoteRead {
        status: None,
        detail: format!("Stored content is not valid base64: {}", e),
    })?;

    serde_json::from_slice(&bytes).map_err(|e| Error::RemoteRead {
        status: None,
        detail: format!("Stored content is not a valid event document: {}", e),
    })
}

/// Encode a document as pretty-printed JSON in base64.
pub fn encode_document(doc: &EventDocument) -> Result<String> {
    let json = serde_json::to_string_pretty(doc)?;
    Ok(STANDARD.encode(json))
}

/// In-memory [`DocumentStore`] with the same revision check as GitHub.
///
/// The document is held in its encoded form, so every read decodes what the
/// previous write produced. A write holding an older revision is rejected with
/// a 409 and leaves the document untouched.
#[cfg(test)]
pub(crate) struct MemoryStore {
    state: tokio::sync::Mutex<(String, u64)>,
}

#[cfg(test)]
impl MemoryStore {
    pub(crate) fn new(doc: EventDocument) -> Self {
        let content = encode_document(&doc).expect("encodable document");
        Self {
            state: tokio::sync::Mutex::new((content, 1)),
        }
    }

    /// Current document contents.
    pub(crate) async fn snapshot(&self) -> EventDocument {
        decode_document(&self.state.lock().await.0).expect("stored document decodes")
    }

    /// Current revision token.
    pub(crate) async fn revision(&self) -> RevisionToken {
        Self::token(self.state.lock().await.1)
    }

    fn token(revision: u64) -> RevisionToken {
        RevisionToken(format!("rev-{}", revision))
    }
}

#[cfg(test)]
#[async_trait]
impl DocumentStore for MemoryStore {
    async fn read(&self) -> Result<(EventDocument, RevisionToken)> {
        let state = self.state.lock().await;
        Ok((decode_document(&state.0)?, Self::token(state.1)))
    }

    async fn write(&self, doc: &EventDocument, revision: &RevisionToken) -> Result<()> {
        let mut state = self.state.lock().await;
        if Self::token(state.1) != *revision {
            return Err(Error::RemoteWrite {
                status: Some(409),
                body: format!("{} does not match {}", revision, Self::token(state.1)),
            });
        }
        state.0 = encode_document(doc)?;
        state.1 += 1;
        Ok(())
    }
}
