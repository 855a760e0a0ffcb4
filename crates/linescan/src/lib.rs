pub mod app;
pub mod domain;
pub mod infra;
pub mod runtime;

// Re-exports for convenience
pub use app::{Browser, BrowserConfig, BrowserError, BrowserPhase, BrowserState};
pub use domain::entity::{EntityKind, ListingEntry};
pub use domain::selection::validate;
pub use infra::local_oracle::LocalFilesystemOracle;
pub use infra::oracle::{FilesystemOracle, OracleError, OracleFuture, OracleOperation};
