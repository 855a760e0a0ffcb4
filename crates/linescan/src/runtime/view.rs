//! Plain-text and JSON rendering of browser state for the line front end.

use std::io::{self, Write};

use clap::ValueEnum;

use crate::app::{BrowserPhase, BrowserState};

/// How state updates are written.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// One human-readable status line per change.
    #[default]
    Text,
    /// One JSON object per change.
    Json,
}

const HELP_TEXT: &str = "\
commands:
  ls              list entries of the current directory
  cd <name>       open a listed directory (or pick a listed file)
  edit <text>     type a path into the selection field
  blur            canonicalize the typed path if it is valid
  refresh         reload the current directory
  status          show the current state
  ok              confirm the selection
  cancel | q      close without a selection";

pub(crate) fn write_help<W: Write>(output: &mut W) -> io::Result<()> {
    writeln!(output, "{HELP_TEXT}")
}

/// Writes one status update for `state`.
pub(crate) fn write_state<W: Write>(
    output: &mut W,
    state: &BrowserState,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => writeln!(output, "{}", status_line(state)),
        OutputFormat::Json => {
            serde_json::to_writer(&mut *output, state).map_err(io::Error::other)?;

            writeln!(output)
        }
    }
}

/// Writes the current listing, one entry per line.
pub(crate) fn write_listing<W: Write>(output: &mut W, state: &BrowserState) -> io::Result<()> {
    if state.listing.is_empty() {
        return writeln!(output, "(empty)");
    }

    for entry in &state.listing {
        writeln!(output, "{:<8}{}", entry.kind.label(), entry.name)?;
    }

    Ok(())
}

fn status_line(state: &BrowserState) -> String {
    match state.phase {
        BrowserPhase::Initializing => "resolving start directory...".to_string(),
        BrowserPhase::Unavailable => {
            let reason = state
                .last_failure
                .as_ref()
                .map_or_else(|| "unknown error".to_string(), ToString::to_string);

            format!("browser unavailable: {reason}")
        }
        BrowserPhase::Closed => "closed".to_string(),
        BrowserPhase::Ready => {
            let verdict = if state.awaiting_validation {
                "checking"
            } else if state.is_selection_valid {
                "valid"
            } else {
                "invalid"
            };
            let mut line = format!(
                "dir: {}  selected: {} [{verdict}]  entries: {}",
                state.current_directory,
                state.selected_path,
                state.listing.len()
            );
            if state.awaiting_listing {
                line.push_str(" (loading)");
            }
            if let Some(failure) = &state.last_failure {
                line.push_str(&format!("  error: {failure}"));
            }

            line
        }
    }
}
