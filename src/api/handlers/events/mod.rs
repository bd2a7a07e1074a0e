//! Event catalog: the organizer wizard, public browsing and admin listings.

pub(crate) mod admin;
pub(crate) mod browse;
mod storage;
mod types;
pub(crate) mod wizard;

use types::{EventPayload, EventRecord};

fn payloads(events: Vec<EventRecord>) -> Vec<EventPayload> {
    events.into_iter().map(EventPayload::from).collect()
}
