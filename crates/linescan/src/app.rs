//! Browser session composition: configuration, observable state, and the
//! navigation state machine that sequences oracle round trips.

pub mod browser;
pub mod config;
mod event;
pub mod state;

pub use browser::{Browser, BrowserError};
pub use config::BrowserConfig;
pub use state::{BrowserPhase, BrowserState};
