use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use linescan::runtime::{self, OutputFormat, SessionOutcome};
use linescan::{Browser, BrowserConfig, LocalFilesystemOracle};
use tokio::io::BufReader;
use tracing::Level;

/// Pick a directory (or file) to scan by browsing the filesystem.
#[derive(Debug, Parser)]
#[command(name = "linescan", version, about)]
struct Cli {
    /// Directory to start browsing from; falls back to the working directory.
    #[arg(long)]
    start: Option<String>,
    /// Allow files, not only directories, to be selected.
    #[arg(long)]
    include_files: bool,
    /// Format of the status updates written to stderr.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Maximum log level written to stderr.
    #[arg(long, default_value_t = Level::WARN)]
    log_level: Level,
}

#[tokio::main]
async fn main() -> io::Result<ExitCode> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(io::stderr)
        .init();

    let mut config = BrowserConfig::new().include_files(cli.include_files);
    if let Some(start) = cli.start {
        config = config.start_hint(start);
    }

    let mut browser = Browser::open(Arc::new(LocalFilesystemOracle), config);
    let input = BufReader::new(tokio::io::stdin());
    let outcome = runtime::run(&mut browser, input, &mut io::stderr(), cli.format).await?;

    Ok(match outcome {
        SessionOutcome::Confirmed(selected_path) => {
            writeln!(io::stdout(), "{selected_path}")?;

            ExitCode::SUCCESS
        }
        SessionOutcome::Cancelled => ExitCode::from(1),
        SessionOutcome::Unavailable => ExitCode::from(2),
    })
}
