use serde::Serialize;

use crate::domain::entity::ListingEntry;
use crate::infra::oracle::OracleError;

/// Lifecycle phase of one browser session.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowserPhase {
    /// The start location is being resolved.
    Initializing,
    /// A current directory is established and intents are accepted.
    Ready,
    /// Neither the start hint nor the working directory could be resolved.
    /// Terminal: no further oracle calls are made.
    Unavailable,
    /// The session was confirmed or cancelled. Terminal.
    Closed,
}

impl BrowserPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, BrowserPhase::Unavailable | BrowserPhase::Closed)
    }
}

/// Observable browser state published to subscribers after every mutation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BrowserState {
    /// A listing request for `current_directory` has not landed yet.
    pub awaiting_listing: bool,
    /// A verdict for `selected_path` has not landed yet.
    pub awaiting_validation: bool,
    pub current_directory: String,
    pub include_files: bool,
    /// Validator verdict for `selected_path`. `false` while awaiting one.
    pub is_selection_valid: bool,
    /// Most recent listing, navigation, commit, or start-up failure.
    pub last_failure: Option<OracleError>,
    /// Children of `current_directory` from the latest applied listing.
    pub listing: Vec<ListingEntry>,
    pub phase: BrowserPhase,
    /// Free-text candidate path; may hold partial or invalid input.
    pub selected_path: String,
}

impl BrowserState {
    pub(crate) fn initializing(include_files: bool) -> Self {
        Self {
            awaiting_listing: false,
            awaiting_validation: false,
            current_directory: String::new(),
            include_files,
            is_selection_valid: false,
            last_failure: None,
            listing: Vec::new(),
            phase: BrowserPhase::Initializing,
            selected_path: String::new(),
        }
    }

    /// Returns whether `confirm` would currently succeed.
    pub fn can_confirm(&self) -> bool {
        self.phase == BrowserPhase::Ready && self.is_selection_valid
    }

    /// Looks up a listing entry by name.
    pub fn entry(&self, name: &str) -> Option<&ListingEntry> {
        self.listing.iter().find(|entry| entry.name == name)
    }
}
