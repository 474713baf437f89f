//! Shared library for the event links Lambda.
//!
//! Holds the event document model, date labeling, the archive/merge transition,
//! and the GitHub-backed document store used by the `update_links` handler.

pub mod config;
pub mod date_label;
pub mod error;
pub mod events;
pub mod http;
pub mod models;
pub mod secrets;
pub mod service;
pub mod store;

pub use config::{Config, TokenSource};
pub use date_label::{format_date_label, ordinal_suffix, INVALID_DATE};
pub use error::{Error, Result};
pub use events::{archive_and_merge, archive_and_merge_at, label_days};
pub use models::{ArchivedEvent, Day, Event, EventDocument, RevisionToken};
pub use secrets::{clear_cache, get_github_token, get_secret};
pub use service::{parse_submission, submit_event};
pub use store::{DocumentStore, GitHubContentStore};
