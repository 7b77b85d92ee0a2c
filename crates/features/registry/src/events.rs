//! Delivery of registry events: the in-memory audit journal and the event bus.

use rlist_domain::{RegistryEvent, RegistryVersion};
use rlist_event_bus::EventBus;
use serde::Serialize;
use std::sync::Arc;
use tracing::{trace, warn};

/// One entry of the audit journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalRecord {
    /// Position in the journal, starting at 1 and strictly increasing.
    pub sequence: u64,
    #[serde(flatten)]
    pub event: RegistryEvent,
}

/// Append-only log of every event emitted since the registry was constructed.
///
/// The journal is unbounded. Long-lived holders call [`EventJournal::drain`] to hand the
/// records off; sequence numbers keep increasing across drains.
#[derive(Debug, Clone, Default)]
pub struct EventJournal {
    records: Vec<JournalRecord>,
    appended: u64,
}

impl EventJournal {
    fn append(&mut self, event: RegistryEvent) -> u64 {
        self.appended = self.appended.saturating_add(1);
        let sequence = self.appended;
        self.records.push(JournalRecord { sequence, event });
        sequence
    }

    /// Removes and returns every retained record.
    pub fn drain(&mut self) -> Vec<JournalRecord> {
        std::mem::take(&mut self.records)
    }

    #[must_use]
    pub fn records(&self) -> &[JournalRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Commits events after a successful state change.
///
/// Journal appends cannot fail. Bus problems are logged and never reach the caller:
/// the state change they describe has already happened.
pub(crate) fn emit(
    journal: &mut EventJournal,
    bus: &EventBus,
    events: impl IntoIterator<Item = RegistryEvent>,
) {
    for event in events {
        let name = event.name();
        let version = match &event {
            RegistryEvent::RegistryUpdated { version } => Some(*version),
            _ => None,
        };

        let event = Arc::new(event);
        let sequence = journal.append(RegistryEvent::clone(&event));

        match bus.publish_arc(event) {
            Ok(delivered) => trace!(event = name, sequence, delivered, "Registry event published"),
            Err(err) => warn!(
                event = name,
                sequence,
                error = %err,
                kind = err.variant(),
                "Registry event not published"
            ),
        }

        if let Some(version) = version
            && let Err(err) = bus.publish_latest(RegistryVersion(version))
        {
            warn!(version, error = %err, "Registry version not published");
        }
    }
}
