//! Infrastructure adapters behind the filesystem oracle boundary.

/// Local-disk implementation of the filesystem oracle.
pub mod local_oracle;
pub mod oracle;
