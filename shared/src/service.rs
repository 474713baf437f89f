//! One read-merge-write cycle per inbound submission.

use serde_json::Value;
use tracing::info;

use crate::events::archive_and_merge;
use crate::models::{Event, EventDocument};
use crate::store::DocumentStore;
use crate::{Error, Result};

/// Parse an inbound submission into an [`Event`].
///
/// The body must be a JSON object with a `days` array.
pub fn parse_submission(body: &[u8]) -> Result<Event> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| Error::MalformedRequest(e.to_string()))?;

    if !value.get("days").is_some_and(Value::is_array) {
        return Err(Error::MalformedRequest(
            "submission must contain a days array".to_string(),
        ));
    }

    serde_json::from_value(value).map_err(|e| Error::MalformedRequest(e.to_string()))
}

/// Archive the stored current event and store the submitted one in its place.
///
/// Nothing is written unless every earlier step succeeded, and the write is
/// attempted once against the revision that was read.
pub async fn submit_event(store: &dyn DocumentStore, body: &[u8]) -> Result<EventDocument> {
    let new_event = parse_submission(body)?;
    info!(days = new_event.days.len(), "Parsed event submission");

    let (doc, revision) = store.read().await?;
    info!(
        %revision,
        has_current = doc.current_event.is_some(),
        past_events = doc.past_events.len(),
        "Read event document"
    );

    let updated = archive_and_merge(doc, new_event);

    store.write(&updated, &revision).await?;
    info!(past_events = updated.past_events.len(), "Event document updated");

    Ok(updated)
}
