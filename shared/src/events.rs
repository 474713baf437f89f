//! Archive and merge transition for the event links document.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::date_label::{format_date_label, INVALID_DATE};
use crate::models::{ArchivedEvent, Event, EventDocument};

/// Key added to every archived event.
const ARCHIVED_AT: &str = "archived_at";

/// Archive the current event and install `new_event` as current, stamped now.
pub fn archive_and_merge(doc: EventDocument, new_event: Event) -> EventDocument {
    archive_and_merge_at(doc, new_event, Utc::now())
}

/// Same as [`archive_and_merge`] with an explicit archival time.
pub fn archive_and_merge_at(
    mut doc: EventDocument,
    mut new_event: Event,
    archived_at: DateTime<Utc>,
) -> EventDocument {
    if let Some(mut previous) = doc.current_event.take() {
        // The archive stamp is the only archived_at the entry may carry.
        previous.extra.remove(ARCHIVED_AT);
        doc.past_events.insert(
            0,
            ArchivedEvent {
                event: previous,
                archived_at: archived_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            },
        );
    }

    label_days(&mut new_event);
    doc.current_event = Some(new_event);
    doc
}

/// Fill in a computed label for every dated day that has none.
pub fn label_days(event: &mut Event) {
    for day in event.days.iter_mut().filter(|day| !day.has_label()) {
        let label = match day.date() {
            Some(Value::String(date)) => format_date_label(date),
            Some(_) => INVALID_DATE.to_string(),
            None => continue,
        };
        day.set_label(label);
    }
}
