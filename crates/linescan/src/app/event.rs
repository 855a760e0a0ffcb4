//! Oracle responses routed back to the owning browser.
//!
//! Producers (spawned request tasks) only emit events; every state mutation
//! happens in [`crate::app::Browser`] when the event is applied. Each event
//! carries the key it was issued under so the browser can tell a current
//! response from a superseded one.

use crate::domain::entity::{EntityKind, ListingEntry};
use crate::infra::oracle::OracleError;

#[derive(Debug)]
pub(crate) enum BrowserEvent {
    /// The start hint or working-directory fallback produced a directory.
    StartLocationResolved { result: Result<String, OracleError> },
    /// A child listing issued for `directory` finished.
    ListingLoaded {
        directory: String,
        generation: u64,
        result: Result<Vec<ListingEntry>, OracleError>,
    },
    /// The kind of a typed or adopted `text` was determined.
    SelectionValidated {
        generation: u64,
        kind: EntityKind,
        text: String,
    },
    /// A clicked entry was resolved against `from_directory` and its path
    /// classified again.
    EntryResolved {
        from_directory: String,
        generation: u64,
        result: Result<(String, EntityKind), OracleError>,
    },
    /// A committed `text` was canonicalized.
    SelectionCommitted {
        generation: u64,
        result: Result<String, OracleError>,
        text: String,
    },
}

/// Monotonic request counters, one per independently superseded concern.
///
/// A response is current only when its generation equals the live counter.
#[derive(Debug, Default)]
pub(crate) struct RequestGenerations {
    pub(crate) commit: u64,
    pub(crate) listing: u64,
    pub(crate) navigation: u64,
    pub(crate) validation: u64,
}

impl RequestGenerations {
    /// Advances `counter` and returns the new generation.
    pub(crate) fn advance(counter: &mut u64) -> u64 {
        *counter += 1;

        *counter
    }
}
