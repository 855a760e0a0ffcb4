//! Selection validity rules.

use crate::domain::entity::EntityKind;

/// Returns whether a path of `kind` is a confirmable selection.
///
/// Directories are always selectable, files only when `include_files` is
/// set, and missing or undeterminable paths never are.
pub fn validate(kind: EntityKind, include_files: bool) -> bool {
    match kind {
        EntityKind::Directory => true,
        EntityKind::File => include_files,
        EntityKind::Missing | EntityKind::Unknown => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_covers_every_kind_and_flag() {
        // Arrange
        let expectations = [
            (EntityKind::Directory, false, true),
            (EntityKind::Directory, true, true),
            (EntityKind::File, false, false),
            (EntityKind::File, true, true),
            (EntityKind::Missing, false, false),
            (EntityKind::Missing, true, false),
            (EntityKind::Unknown, false, false),
            (EntityKind::Unknown, true, false),
        ];

        for (kind, include_files, expected) in expectations {
            // Act
            let verdict = validate(kind, include_files);

            // Assert
            assert_eq!(
                verdict, expected,
                "validate({kind}, include_files={include_files})"
            );
        }
    }
}
