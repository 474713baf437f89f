//! Update Links Lambda - Handles event submissions from the admin panel.
//!
//! Each request carries a new event. The Lambda archives the event currently
//! stored in the GitHub-hosted links document, labels the new event's days, and
//! commits the result back guarded by the sha it read.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::http::{failure_response, success_response};
use shared::{get_github_token, submit_event, Config, GitHubContentStore, TokenSource};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Application state shared across requests.
struct AppState {
    store: GitHubContentStore,
    file_path: String,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = Config::from_env()?;

        let token = match &config.token_source {
            TokenSource::Env(token) => token.clone(),
            TokenSource::SecretArn(arn) => {
                let aws_config =
                    aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
                let secrets_client = aws_sdk_secretsmanager::Client::new(&aws_config);
                get_github_token(&secrets_client, arn).await?
            }
        };

        info!(
            repository = %config.repository,
            file_path = %config.file_path,
            "Configured event links store"
        );

        Ok(Self {
            store: GitHubContentStore::new(&config, token)?,
            file_path: config.file_path,
        })
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    match submit_event(&state.store, event.body().as_ref()).await {
        Ok(_) => {
            info!("Updated {}", state.file_path);
            success_response(&state.file_path)
        }
        Err(e) => {
            error!("Failed to update {}: {}", state.file_path, e);
            failure_response(e)
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
