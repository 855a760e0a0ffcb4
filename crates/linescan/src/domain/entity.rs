use std::fmt;

use serde::Serialize;

/// Classification of one filesystem path as reported by the oracle.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum EntityKind {
    Directory,
    File,
    /// The path does not exist.
    Missing,
    /// Existence or type could not be determined.
    Unknown,
}

impl EntityKind {
    /// Returns the short label used in listings and logs.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Directory => "dir",
            EntityKind::File => "file",
            EntityKind::Missing => "missing",
            EntityKind::Unknown => "unknown",
        }
    }

    pub fn is_directory(self) -> bool {
        self == EntityKind::Directory
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One child of the current directory.
///
/// Entries never carry a full path. The full path is obtained by asking the
/// oracle to normalize `(current_directory, name)`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ListingEntry {
    pub kind: EntityKind,
    pub name: String,
}

impl ListingEntry {
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    /// Returns the synthetic parent-directory entry.
    pub fn parent() -> Self {
        Self::new(PARENT_ENTRY_NAME, EntityKind::Directory)
    }
}

/// Name used for the synthetic entry that navigates to the parent directory.
pub const PARENT_ENTRY_NAME: &str = "..";
