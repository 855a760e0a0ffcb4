//! Navigation state machine for the interactive directory browser.
//!
//! [`Browser`] exclusively owns one session's [`BrowserState`]. User intents
//! mutate it synchronously and issue oracle requests as spawned tasks; the
//! responses come back as [`BrowserEvent`]s that are applied one at a time
//! by the owner. Each request is tagged with a generation counter and the
//! directory or text it targeted, and a response is applied only while both
//! still match the live state.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::app::config::BrowserConfig;
use crate::app::event::{BrowserEvent, RequestGenerations};
use crate::app::state::{BrowserPhase, BrowserState};
use crate::domain::entity::{EntityKind, ListingEntry};
use crate::domain::selection::validate;
use crate::infra::oracle::{FilesystemOracle, OracleError, OracleOperation};

/// Reasons an intent was rejected without changing state.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum BrowserError {
    #[error("the browser session is closed")]
    Closed,
    #[error("the current selection cannot be confirmed")]
    NotConfirmable,
    #[error("no start directory could be established")]
    Unavailable,
}

/// One open browser session.
///
/// Must be created inside a tokio runtime because oracle requests are
/// spawned as tasks.
pub struct Browser {
    cancel: CancellationToken,
    event_rx: mpsc::UnboundedReceiver<BrowserEvent>,
    event_tx: mpsc::UnboundedSender<BrowserEvent>,
    generations: RequestGenerations,
    in_flight: usize,
    oracle: Arc<dyn FilesystemOracle>,
    state: BrowserState,
    state_tx: watch::Sender<BrowserState>,
}

impl Browser {
    /// Opens a session and starts resolving its start location.
    ///
    /// A start hint that is a directory is adopted as-is. Any other hint, or
    /// no hint, falls back to the oracle's working directory; if that fails
    /// too the session becomes [`BrowserPhase::Unavailable`].
    pub fn open(oracle: Arc<dyn FilesystemOracle>, config: BrowserConfig) -> Self {
        let state = BrowserState::initializing(config.include_files);
        let (state_tx, _) = watch::channel(state.clone());
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let mut browser = Self {
            cancel: CancellationToken::new(),
            event_rx,
            event_tx,
            generations: RequestGenerations::default(),
            in_flight: 0,
            oracle,
            state,
            state_tx,
        };

        let start_hint = config.effective_start_hint().map(ToString::to_string);
        info!(
            start_hint = start_hint.as_deref().unwrap_or_default(),
            include_files = config.include_files,
            "opening browser"
        );

        let request = resolve_start_location(Arc::clone(&browser.oracle), start_hint);
        browser.spawn_request(request, |outcome| BrowserEvent::StartLocationResolved {
            result: flatten(OracleOperation::CurrentWorkingDirectory, outcome),
        });

        browser
    }

    pub fn state(&self) -> &BrowserState {
        &self.state
    }

    /// Returns a receiver that observes every published state change.
    pub fn subscribe(&self) -> watch::Receiver<BrowserState> {
        self.state_tx.subscribe()
    }

    /// Returns whether any oracle response is still expected.
    pub fn has_pending_requests(&self) -> bool {
        !self.state.phase.is_terminal() && self.in_flight > 0
    }

    /// Waits for the next oracle response and applies it.
    ///
    /// Returns `false` immediately when nothing is in flight.
    pub async fn next_event(&mut self) -> bool {
        if !self.has_pending_requests() {
            return false;
        }

        let Some(event) = self.event_rx.recv().await else {
            return false;
        };
        self.apply_event(event);

        true
    }

    /// Applies already-arrived responses without waiting and returns how
    /// many were processed.
    #[cfg(test)]
    pub(crate) fn apply_pending_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.event_rx.try_recv() {
            self.apply_event(event);
            applied += 1;
        }

        applied
    }

    /// Applies responses until no request remains in flight.
    ///
    /// Never returns while an oracle call hangs; callers that need a bound
    /// wrap this in a timeout.
    pub async fn settle(&mut self) {
        while self.next_event().await {}
    }

    /// Re-requests the children of the current directory.
    pub fn refresh_listing(&mut self) {
        if self.state.phase != BrowserPhase::Ready {
            return;
        }

        self.request_listing();
        self.publish();
    }

    /// Navigates into a directory entry, or selects a file entry when files
    /// are selectable. Other entries are ignored.
    ///
    /// The listing kind only gates the click; the resolved path is
    /// classified again before the current directory changes.
    pub fn select_entry(&mut self, entry: &ListingEntry) {
        if self.state.phase != BrowserPhase::Ready {
            return;
        }

        let selectable = entry.kind.is_directory()
            || (entry.kind == EntityKind::File && self.state.include_files);
        if !selectable {
            debug!(name = %entry.name, kind = %entry.kind, "ignoring unselectable entry");

            return;
        }

        let generation = RequestGenerations::advance(&mut self.generations.navigation);
        let from_directory = self.state.current_directory.clone();
        debug!(%from_directory, name = %entry.name, generation, "resolving selected entry");

        let request = resolve_entry(
            Arc::clone(&self.oracle),
            from_directory.clone(),
            entry.name.clone(),
        );
        self.spawn_request(request, move |outcome| BrowserEvent::EntryResolved {
            from_directory,
            generation,
            result: flatten(OracleOperation::Normalize, outcome),
        });
    }

    /// Replaces the selected path with `text` and revalidates it.
    ///
    /// The text is updated immediately; the verdict follows once the oracle
    /// has classified exactly this text.
    pub fn edit_selection(&mut self, text: impl Into<String>) {
        if self.state.phase.is_terminal() {
            return;
        }

        self.replace_selection(text.into());
        self.publish();
    }

    /// Canonicalizes a valid selected path in place. Invalid input is left
    /// untouched.
    pub fn commit_selection(&mut self) {
        if !self.state.can_confirm() {
            return;
        }

        let generation = RequestGenerations::advance(&mut self.generations.commit);
        let text = self.state.selected_path.clone();
        debug!(%text, generation, "committing selection");

        let request = self.oracle.normalize(text.clone(), String::new());
        self.spawn_request(request, move |outcome| BrowserEvent::SelectionCommitted {
            generation,
            result: flatten(OracleOperation::Normalize, outcome),
            text,
        });
    }

    /// Ends the session with the selected path.
    ///
    /// # Errors
    /// Returns an error when the session is not ready or the selection is
    /// not valid; state is left unchanged in that case.
    pub fn confirm(&mut self) -> Result<String, BrowserError> {
        match self.state.phase {
            BrowserPhase::Closed => return Err(BrowserError::Closed),
            BrowserPhase::Unavailable => return Err(BrowserError::Unavailable),
            BrowserPhase::Initializing | BrowserPhase::Ready => {}
        }
        if !self.state.can_confirm() {
            return Err(BrowserError::NotConfirmable);
        }

        let selected_path = self.state.selected_path.clone();
        info!(%selected_path, "selection confirmed");
        self.finish(BrowserPhase::Closed);

        Ok(selected_path)
    }

    /// Ends the session without a result.
    pub fn cancel(&mut self) {
        if self.state.phase == BrowserPhase::Closed {
            return;
        }

        info!("browser cancelled");
        self.finish(BrowserPhase::Closed);
    }

    fn apply_event(&mut self, event: BrowserEvent) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.state.phase.is_terminal() {
            debug!("dropping response for a finished session");

            return;
        }

        match event {
            BrowserEvent::StartLocationResolved { result } => {
                self.apply_start_location(result);
            }
            BrowserEvent::ListingLoaded {
                directory,
                generation,
                result,
            } => self.apply_listing(&directory, generation, result),
            BrowserEvent::SelectionValidated {
                generation,
                kind,
                text,
            } => self.apply_verdict(generation, kind, &text),
            BrowserEvent::EntryResolved {
                from_directory,
                generation,
                result,
            } => self.apply_navigation(&from_directory, generation, result),
            BrowserEvent::SelectionCommitted {
                generation,
                result,
                text,
            } => self.apply_commit(generation, result, &text),
        }

        self.publish();
    }

    fn apply_start_location(&mut self, result: Result<String, OracleError>) {
        if self.state.phase != BrowserPhase::Initializing {
            return;
        }

        match result {
            Ok(directory) => {
                info!(%directory, "browser ready");
                self.state.phase = BrowserPhase::Ready;
                self.adopt_selection(directory.clone(), EntityKind::Directory);
                self.change_directory(directory);
            }
            Err(error) => {
                warn!(%error, "browser unavailable");
                self.state.last_failure = Some(error);
                self.finish(BrowserPhase::Unavailable);
            }
        }
    }

    fn apply_listing(
        &mut self,
        directory: &str,
        generation: u64,
        result: Result<Vec<ListingEntry>, OracleError>,
    ) {
        if generation != self.generations.listing || directory != self.state.current_directory {
            debug!(directory, generation, "discarding superseded listing");

            return;
        }

        self.state.awaiting_listing = false;
        match result {
            Ok(listing) => {
                debug!(directory, entries = listing.len(), "listing applied");
                self.state.listing = listing;
                self.state.last_failure = None;
            }
            Err(error) => {
                warn!(directory, %error, "listing failed, keeping previous entries");
                self.state.last_failure = Some(error);
            }
        }
    }

    fn apply_verdict(&mut self, generation: u64, kind: EntityKind, text: &str) {
        if generation != self.generations.validation || text != self.state.selected_path {
            debug!(text, generation, "discarding superseded verdict");

            return;
        }

        self.state.is_selection_valid = validate(kind, self.state.include_files);
        self.state.awaiting_validation = false;
    }

    fn apply_navigation(
        &mut self,
        from_directory: &str,
        generation: u64,
        result: Result<(String, EntityKind), OracleError>,
    ) {
        if generation != self.generations.navigation
            || from_directory != self.state.current_directory
        {
            debug!(from_directory, generation, "discarding superseded navigation");

            return;
        }

        match result {
            Ok((path, kind)) if kind.is_directory() => {
                self.adopt_selection(path.clone(), kind);
                self.change_directory(path);
            }
            Ok((path, kind)) => {
                debug!(%path, %kind, "selected entry is not a directory, staying put");
                self.adopt_selection(path, kind);
            }
            Err(error) => {
                warn!(from_directory, %error, "navigation failed");
                self.state.last_failure = Some(error);
            }
        }
    }

    fn apply_commit(&mut self, generation: u64, result: Result<String, OracleError>, text: &str) {
        if generation != self.generations.commit || text != self.state.selected_path {
            debug!(text, generation, "discarding superseded commit");

            return;
        }

        match result {
            Ok(normal_path) if normal_path == text => {}
            Ok(normal_path) => self.replace_selection(normal_path),
            Err(error) => {
                warn!(text, %error, "commit failed, keeping typed path");
                self.state.last_failure = Some(error);
            }
        }
    }

    /// Moves to a directory whose kind is already confirmed and reloads its
    /// children.
    fn change_directory(&mut self, directory: String) {
        self.state.current_directory = directory;
        self.request_listing();
    }

    fn request_listing(&mut self) {
        let generation = RequestGenerations::advance(&mut self.generations.listing);
        let directory = self.state.current_directory.clone();
        self.state.awaiting_listing = true;
        debug!(%directory, generation, "requesting listing");

        let request = self
            .oracle
            .list_children(directory.clone(), self.state.include_files);
        self.spawn_request(request, move |outcome| BrowserEvent::ListingLoaded {
            directory,
            generation,
            result: flatten(OracleOperation::ListChildren, outcome),
        });
    }

    /// Sets a selection whose kind is already known, dropping any pending
    /// verdict or commit for earlier text.
    fn adopt_selection(&mut self, path: String, kind: EntityKind) {
        self.supersede_selection_requests();
        self.state.selected_path = path;
        self.state.is_selection_valid = validate(kind, self.state.include_files);
        self.state.awaiting_validation = false;
    }

    /// Sets a selection of unknown kind and asks the oracle to classify it.
    fn replace_selection(&mut self, text: String) {
        let generation = self.supersede_selection_requests();
        self.state.selected_path.clone_from(&text);
        self.state.is_selection_valid = false;
        self.state.awaiting_validation = true;
        debug!(%text, generation, "validating selection");

        let request = self.oracle.kind_of(text.clone());
        self.spawn_request(request, move |outcome| BrowserEvent::SelectionValidated {
            generation,
            kind: outcome.unwrap_or(EntityKind::Unknown),
            text,
        });
    }

    /// Invalidates in-flight verdicts and commits; returns the new
    /// validation generation.
    fn supersede_selection_requests(&mut self) -> u64 {
        RequestGenerations::advance(&mut self.generations.commit);

        RequestGenerations::advance(&mut self.generations.validation)
    }

    fn finish(&mut self, phase: BrowserPhase) {
        self.state.phase = phase;
        self.state.awaiting_listing = false;
        self.state.awaiting_validation = false;
        self.in_flight = 0;
        self.cancel.cancel();
        self.publish();
    }

    /// Runs `request` on its own task and reports its outcome as an event.
    ///
    /// A panicking request surfaces as `Err` with the join error text.
    /// Cancellation of the session drops the outcome silently.
    fn spawn_request<T, F, E>(&mut self, request: F, into_event: E)
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
        E: FnOnce(Result<T, String>) -> BrowserEvent + Send + 'static,
    {
        self.in_flight += 1;
        let cancel = self.cancel.clone();
        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            let mut request = tokio::spawn(request);
            let outcome = tokio::select! {
                () = cancel.cancelled() => {
                    request.abort();

                    return;
                }
                joined = &mut request => joined.map_err(|error| error.to_string()),
            };

            let _ = event_tx.send(into_event(outcome));
        });
    }

    fn publish(&self) {
        self.state_tx.send_if_modified(|published| {
            if *published == self.state {
                return false;
            }
            published.clone_from(&self.state);

            true
        });
    }
}

impl Drop for Browser {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Resolves the directory a session starts in.
async fn resolve_start_location(
    oracle: Arc<dyn FilesystemOracle>,
    start_hint: Option<String>,
) -> Result<String, OracleError> {
    if let Some(start_hint) = start_hint {
        let kind = oracle.kind_of(start_hint.clone()).await;
        if kind.is_directory() {
            return Ok(start_hint);
        }

        debug!(%start_hint, %kind, "start hint is not a directory, using working directory");
    }

    oracle.current_working_directory().await
}

/// Resolves a clicked entry to its normalized path and current kind.
async fn resolve_entry(
    oracle: Arc<dyn FilesystemOracle>,
    directory: String,
    name: String,
) -> Result<(String, EntityKind), OracleError> {
    let path = oracle.normalize(directory, name).await?;
    let kind = oracle.kind_of(path.clone()).await;

    Ok((path, kind))
}

/// Folds a task join failure into the oracle error channel.
fn flatten<T>(
    operation: OracleOperation,
    outcome: Result<Result<T, OracleError>, String>,
) -> Result<T, OracleError> {
    outcome.unwrap_or_else(|message| Err(OracleError::new(operation, message)))
}
