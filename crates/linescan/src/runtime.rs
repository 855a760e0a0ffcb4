//! Line-oriented front end that drives one browser session.
//!
//! Commands are read from an async line source while oracle responses keep
//! being applied in between, so a slow listing never blocks typing.

use std::io::{self, Write};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;

use crate::app::{Browser, BrowserPhase, BrowserState};

mod command;
pub mod view;

use command::{Command, parse_command};
pub use view::OutputFormat;

/// How a front-end session ended.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SessionOutcome {
    Confirmed(String),
    Cancelled,
    /// No start directory could be established.
    Unavailable,
}

enum Flow {
    Continue,
    Done(SessionOutcome),
}

/// Runs `browser` against commands read from `input`, writing status
/// updates to `output` until the session is confirmed or cancelled.
///
/// Each command is handled once previously issued requests have landed, so
/// scripted input sees the effect of the command before it.
///
/// # Errors
/// Returns an error if reading input or writing output fails.
pub async fn run<R, W>(
    browser: &mut Browser,
    input: R,
    output: &mut W,
    format: OutputFormat,
) -> io::Result<SessionOutcome>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut state_rx = browser.subscribe();

    browser.settle().await;
    view::write_state(output, browser.state(), format)?;
    state_rx.mark_unchanged();

    loop {
        if browser.state().phase == BrowserPhase::Unavailable {
            return Ok(SessionOutcome::Unavailable);
        }

        tokio::select! {
            biased;
            applied = browser.next_event(), if browser.has_pending_requests() => {
                if applied {
                    write_if_changed(&mut state_rx, output, format)?;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    browser.cancel();

                    return Ok(SessionOutcome::Cancelled);
                };

                browser.settle().await;
                write_if_changed(&mut state_rx, output, format)?;
                if let Flow::Done(outcome) = handle_line(browser, &line, output)? {
                    return Ok(outcome);
                }
                write_if_changed(&mut state_rx, output, format)?;
            }
        }
    }
}

fn handle_line<W: Write>(browser: &mut Browser, line: &str, output: &mut W) -> io::Result<Flow> {
    let command = match parse_command(line) {
        Ok(command) => command,
        Err(message) => {
            writeln!(output, "{message}")?;

            return Ok(Flow::Continue);
        }
    };

    match command {
        Command::Cancel => {
            browser.cancel();

            return Ok(Flow::Done(SessionOutcome::Cancelled));
        }
        Command::Confirm => match browser.confirm() {
            Ok(selected_path) => return Ok(Flow::Done(SessionOutcome::Confirmed(selected_path))),
            Err(error) => writeln!(output, "{error}")?,
        },
        Command::Commit => browser.commit_selection(),
        Command::Edit(text) => browser.edit_selection(text),
        Command::Enter(name) => {
            let Some(entry) = browser.state().entry(&name).cloned() else {
                writeln!(output, "No entry named `{name}`")?;

                return Ok(Flow::Continue);
            };
            browser.select_entry(&entry);
        }
        Command::Help => view::write_help(output)?,
        Command::List => view::write_listing(output, browser.state())?,
        Command::Refresh => browser.refresh_listing(),
        Command::Status => view::write_state(output, browser.state(), OutputFormat::Text)?,
    }

    Ok(Flow::Continue)
}

fn write_if_changed<W: Write>(
    state_rx: &mut watch::Receiver<BrowserState>,
    output: &mut W,
    format: OutputFormat,
) -> io::Result<()> {
    if !state_rx.has_changed().unwrap_or(false) {
        return Ok(());
    }

    let state = state_rx.borrow_and_update().clone();

    view::write_state(output, &state, format)
}
