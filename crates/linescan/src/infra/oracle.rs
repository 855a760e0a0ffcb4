//! Async boundary to the filesystem oracle consulted by the browser.
//!
//! The browser never touches the filesystem itself. Every question about a
//! path (what it is, what it contains, what its canonical form is) goes
//! through [`FilesystemOracle`], which may be slow, may fail, and gives no
//! ordering guarantee across distinct calls.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::Serialize;
use thiserror::Error;

use crate::domain::entity::{EntityKind, ListingEntry};

/// Boxed async result used by [`FilesystemOracle`] trait methods.
pub type OracleFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Identifies which oracle operation produced a response or failure.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleOperation {
    KindOf,
    ListChildren,
    Normalize,
    CurrentWorkingDirectory,
}

impl OracleOperation {
    /// Returns the operation name used in logs and failure messages.
    pub fn name(self) -> &'static str {
        match self {
            OracleOperation::KindOf => "kind_of",
            OracleOperation::ListChildren => "list_children",
            OracleOperation::Normalize => "normalize",
            OracleOperation::CurrentWorkingDirectory => "current_working_directory",
        }
    }
}

impl fmt::Display for OracleOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failure reported by one oracle round trip.
#[derive(Clone, Debug, Eq, Error, PartialEq, Serialize)]
#[error("{operation} failed: {message}")]
pub struct OracleError {
    pub message: String,
    pub operation: OracleOperation,
}

impl OracleError {
    pub fn new(operation: OracleOperation, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            operation,
        }
    }
}

/// Filesystem questions the browser needs answered.
///
/// Production uses [`crate::infra::local_oracle::LocalFilesystemOracle`],
/// while tests inject `MockFilesystemOracle` to script slow, failing, or
/// out-of-order responses.
#[cfg_attr(test, mockall::automock)]
pub trait FilesystemOracle: Send + Sync {
    /// Classifies `path`.
    ///
    /// Never fails: anything that cannot be resolved is reported as
    /// [`EntityKind::Unknown`] and absent paths as [`EntityKind::Missing`].
    fn kind_of(&self, path: String) -> OracleFuture<EntityKind>;

    /// Lists the children of `dir`.
    ///
    /// When `include_files` is `false` the result contains directories only.
    /// Entry order is implementation-defined and may differ between calls.
    ///
    /// # Errors
    /// Returns an error when `dir` is not a readable directory.
    fn list_children(
        &self,
        dir: String,
        include_files: bool,
    ) -> OracleFuture<Result<Vec<ListingEntry>, OracleError>>;

    /// Resolves `child` against `parent` into one canonical path.
    ///
    /// An empty `child` canonicalizes `parent` itself.
    ///
    /// # Errors
    /// Returns an error when the combination does not denote a valid
    /// location.
    fn normalize(&self, parent: String, child: String) -> OracleFuture<Result<String, OracleError>>;

    /// Returns the working directory used as the default start location.
    ///
    /// # Errors
    /// Returns an error when the working directory cannot be determined.
    fn current_working_directory(&self) -> OracleFuture<Result<String, OracleError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oracle_error_display_names_operation() {
        // Arrange
        let error = OracleError::new(OracleOperation::ListChildren, "permission denied");

        // Act
        let message = error.to_string();

        // Assert
        assert_eq!(message, "list_children failed: permission denied");
    }
}
