//! AWS Secrets Manager integration.

use aws_sdk_secretsmanager::Client as SecretsClient;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use tokio::sync::RwLock;

use crate::{Error, Result};

/// Cached secrets, kept for the lifetime of a warm Lambda container.
static SECRETS_CACHE: OnceLock<RwLock<HashMap<String, String>>> = OnceLock::new();

fn get_cache() -> &'static RwLock<HashMap<String, String>> {
    SECRETS_CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// JSON shape accepted for a token secret, besides a bare string.
#[derive(Debug, Deserialize)]
struct TokenSecret {
    #[serde(alias = "GITHUB_TOKEN")]
    token: String,
}

/// Get a secret value from Secrets Manager with caching.
pub async fn get_secret(client: &SecretsClient, secret_arn: &str) -> Result<String> {
    {
        let cache = get_cache().read().await;
        if let Some(value) = cache.get(secret_arn) {
            return Ok(value.clone());
        }
    }

    let response = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Secrets(format!("Failed to get secret: {}", e)))?;

    let secret_string = response
        .secret_string()
        .ok_or_else(|| Error::Secrets("Secret has no string value".to_string()))?
        .to_string();

    {
        let mut cache = get_cache().write().await;
        cache.insert(secret_arn.to_string(), secret_string.clone());
    }

    Ok(secret_string)
}

/// Get the GitHub token stored under `secret_arn`.
pub async fn get_github_token(client: &SecretsClient, secret_arn: &str) -> Result<String> {
    let secret_string = get_secret(client, secret_arn).await?;
    parse_token_secret(&secret_string)
}

/// Accept either the raw token or `{"token": "..."}`.
fn parse_token_secret(secret_string: &str) -> Result<String> {
    let trimmed = secret_string.trim();
    let token = if trimmed.starts_with('{') {
        serde_json::from_str::<TokenSecret>(trimmed)
            .map_err(|e| Error::Secrets(format!("Failed to parse token secret: {}", e)))?
            .token
    } else {
        trimmed.to_string()
    };

    if token.is_empty() {
        return Err(Error::Secrets("Token secret is empty".to_string()));
    }
    Ok(token)
}

/// Clear the secrets cache (useful for testing or credential rotation).
pub async fn clear_cache() {
    let mut cache = get_cache().write().await;
    cache.clear();
}
