use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, warn};

use crate::domain::entity::{EntityKind, ListingEntry};
use crate::infra::oracle::{FilesystemOracle, OracleError, OracleFuture, OracleOperation};

/// Answers oracle questions from the local disk.
///
/// All filesystem work runs on the blocking thread pool so a slow mount never
/// stalls the event loop that applies browser responses.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalFilesystemOracle;

impl FilesystemOracle for LocalFilesystemOracle {
    fn kind_of(&self, path: String) -> OracleFuture<EntityKind> {
        Box::pin(async move {
            let summary = format!("path: {path}");

            run_blocking(OracleOperation::KindOf, summary, move || {
                Ok(probe_kind(Path::new(&path)))
            })
            .await
            .unwrap_or(EntityKind::Unknown)
        })
    }

    fn list_children(
        &self,
        dir: String,
        include_files: bool,
    ) -> OracleFuture<Result<Vec<ListingEntry>, OracleError>> {
        Box::pin(async move {
            let summary = format!("dir: {dir}, include_files: {include_files}");

            run_blocking(OracleOperation::ListChildren, summary, move || {
                list_directory(Path::new(&dir), include_files)
            })
            .await
        })
    }

    fn normalize(&self, parent: String, child: String) -> OracleFuture<Result<String, OracleError>> {
        Box::pin(async move {
            let summary = format!("parent: {parent}, child: {child}");

            run_blocking(OracleOperation::Normalize, summary, move || {
                normalize_path(&parent, &child)
            })
            .await
        })
    }

    fn current_working_directory(&self) -> OracleFuture<Result<String, OracleError>> {
        Box::pin(async move {
            run_blocking(
                OracleOperation::CurrentWorkingDirectory,
                String::new(),
                || {
                    let path = std::env::current_dir().map_err(|error| error.to_string())?;

                    path_to_string(path)
                },
            )
            .await
        })
    }
}

/// Runs `job` on the blocking pool, timing it and mapping failures into
/// [`OracleError`].
async fn run_blocking<T, F>(
    operation: OracleOperation,
    summary: String,
    job: F,
) -> Result<T, OracleError>
where
    F: FnOnce() -> Result<T, String> + Send + 'static,
    T: Send + 'static,
{
    let started_at = Instant::now();
    let result = match tokio::task::spawn_blocking(job).await {
        Ok(result) => result.map_err(|message| OracleError::new(operation, message)),
        Err(error) => Err(OracleError::new(
            operation,
            format!("Blocking task did not complete: {error}"),
        )),
    };
    let elapsed_ms = u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX);

    match &result {
        Ok(_) => debug!(%operation, %summary, elapsed_ms, "oracle call completed"),
        Err(error) => warn!(%operation, %summary, elapsed_ms, %error, "oracle call failed"),
    }

    result
}

/// Classifies `path`, following symlinks.
fn probe_kind(path: &Path) -> EntityKind {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => EntityKind::Directory,
        Ok(metadata) if metadata.is_file() => EntityKind::File,
        Ok(_) => EntityKind::Unknown,
        Err(error) if error.kind() == io::ErrorKind::NotFound => EntityKind::Missing,
        Err(_) => EntityKind::Unknown,
    }
}

/// Lists `dir` with a leading `..` entry when it has a parent.
///
/// Directories sort before other entries; within each group entries sort by
/// name. Children whose names are not valid UTF-8 are skipped because they
/// could not be passed back to [`normalize_path`].
fn list_directory(dir: &Path, include_files: bool) -> Result<Vec<ListingEntry>, String> {
    if !dir.is_dir() {
        return Err(format!("'{}' is not a directory", dir.display()));
    }

    let dir = dir.canonicalize().map_err(|error| error.to_string())?;
    let reader = fs::read_dir(&dir).map_err(|error| error.to_string())?;

    let mut children: Vec<ListingEntry> = reader
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            let kind = probe_kind(&entry.path());

            (kind.is_directory() || include_files).then(|| ListingEntry::new(name, kind))
        })
        .collect();

    children.sort_by(|first, second| {
        second
            .kind
            .is_directory()
            .cmp(&first.kind.is_directory())
            .then(first.name.cmp(&second.name))
    });

    let mut entries = Vec::with_capacity(children.len() + 1);
    if dir.parent().is_some() {
        entries.push(ListingEntry::parent());
    }
    entries.extend(children);

    Ok(entries)
}

fn normalize_path(parent: &str, child: &str) -> Result<String, String> {
    let joined = if child.is_empty() {
        PathBuf::from(parent)
    } else {
        Path::new(parent).join(child)
    };
    let normal_path = joined
        .canonicalize()
        .map_err(|error| format!("Failed to canonicalize path: {error}"))?;

    path_to_string(normal_path)
}

fn path_to_string(path: PathBuf) -> Result<String, String> {
    path.into_os_string()
        .into_string()
        .map_err(|path| format!("Path is not valid UTF-8: {}", path.to_string_lossy()))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn canonical(path: &Path) -> String {
        path.canonicalize()
            .expect("test expectation should hold")
            .to_string_lossy()
            .to_string()
    }

    fn new_tree() -> TempDir {
        let temp_dir = TempDir::new().expect("test expectation should hold");
        fs::create_dir_all(temp_dir.path().join("src/nested"))
            .expect("test expectation should hold");
        fs::create_dir_all(temp_dir.path().join("docs")).expect("test expectation should hold");
        fs::write(temp_dir.path().join("README.md"), "# readme\n")
            .expect("test expectation should hold");
        fs::write(temp_dir.path().join("src/lib.rs"), "").expect("test expectation should hold");

        temp_dir
    }

    #[tokio::test]
    async fn test_kind_of_classifies_directory_file_and_missing() {
        // Arrange
        let temp_dir = new_tree();
        let oracle = LocalFilesystemOracle;
        let root = temp_dir.path();

        // Act
        let directory = oracle.kind_of(root.join("src").display().to_string()).await;
        let file = oracle
            .kind_of(root.join("README.md").display().to_string())
            .await;
        let missing = oracle.kind_of(root.join("absent").display().to_string()).await;

        // Assert
        assert_eq!(directory, EntityKind::Directory);
        assert_eq!(file, EntityKind::File);
        assert_eq!(missing, EntityKind::Missing);
    }

    #[tokio::test]
    async fn test_kind_of_empty_path_is_missing() {
        // Arrange
        let oracle = LocalFilesystemOracle;

        // Act
        let kind = oracle.kind_of(String::new()).await;

        // Assert
        assert_eq!(kind, EntityKind::Missing);
    }

    #[tokio::test]
    async fn test_list_children_omits_files_when_not_requested() {
        // Arrange
        let temp_dir = new_tree();
        let oracle = LocalFilesystemOracle;

        // Act
        let entries = oracle
            .list_children(temp_dir.path().display().to_string(), false)
            .await
            .expect("test expectation should hold");

        // Assert
        assert_eq!(
            entries,
            vec![
                ListingEntry::parent(),
                ListingEntry::new("docs", EntityKind::Directory),
                ListingEntry::new("src", EntityKind::Directory),
            ]
        );
    }

    #[tokio::test]
    async fn test_list_children_includes_files_after_directories() {
        // Arrange
        let temp_dir = new_tree();
        let oracle = LocalFilesystemOracle;

        // Act
        let entries = oracle
            .list_children(temp_dir.path().join("src").display().to_string(), true)
            .await
            .expect("test expectation should hold");

        // Assert
        assert_eq!(
            entries,
            vec![
                ListingEntry::parent(),
                ListingEntry::new("nested", EntityKind::Directory),
                ListingEntry::new("lib.rs", EntityKind::File),
            ]
        );
    }

    #[tokio::test]
    async fn test_list_children_fails_for_file_path() {
        // Arrange
        let temp_dir = new_tree();
        let oracle = LocalFilesystemOracle;
        let file_path = temp_dir.path().join("README.md").display().to_string();

        // Act
        let result = oracle.list_children(file_path.clone(), true).await;

        // Assert
        let error = result.expect_err("listing a file should fail");
        assert_eq!(error.operation, OracleOperation::ListChildren);
        assert_eq!(error.message, format!("'{file_path}' is not a directory"));
    }

    #[tokio::test]
    async fn test_list_children_root_has_no_parent_entry() {
        // Arrange
        let oracle = LocalFilesystemOracle;
        let root = if cfg!(windows) { "C:\\" } else { "/" };

        // Act
        let entries = oracle
            .list_children(root.to_string(), false)
            .await
            .expect("test expectation should hold");

        // Assert
        assert!(!entries.contains(&ListingEntry::parent()));
    }

    #[tokio::test]
    async fn test_normalize_resolves_child_and_parent_segments() {
        // Arrange
        let temp_dir = new_tree();
        let oracle = LocalFilesystemOracle;
        let src = temp_dir.path().join("src").display().to_string();

        // Act
        let nested = oracle
            .normalize(src.clone(), "nested".to_string())
            .await
            .expect("test expectation should hold");
        let parent = oracle
            .normalize(src, "..".to_string())
            .await
            .expect("test expectation should hold");

        // Assert
        assert_eq!(nested, canonical(&temp_dir.path().join("src/nested")));
        assert_eq!(parent, canonical(temp_dir.path()));
    }

    #[tokio::test]
    async fn test_normalize_empty_child_canonicalizes_parent() {
        // Arrange
        let temp_dir = new_tree();
        let oracle = LocalFilesystemOracle;
        let typed = format!("{}/src/nested/../", temp_dir.path().display());

        // Act
        let normal_path = oracle
            .normalize(typed, String::new())
            .await
            .expect("test expectation should hold");

        // Assert
        assert_eq!(normal_path, canonical(&temp_dir.path().join("src")));
    }

    #[tokio::test]
    async fn test_normalize_missing_child_fails() {
        // Arrange
        let temp_dir = new_tree();
        let oracle = LocalFilesystemOracle;

        // Act
        let result = oracle
            .normalize(temp_dir.path().display().to_string(), "absent".to_string())
            .await;

        // Assert
        let error = result.expect_err("normalizing a missing child should fail");
        assert_eq!(error.operation, OracleOperation::Normalize);
        assert!(error.message.starts_with("Failed to canonicalize path:"));
    }

    #[tokio::test]
    async fn test_current_working_directory_is_a_directory() {
        // Arrange
        let oracle = LocalFilesystemOracle;

        // Act
        let working_dir = oracle
            .current_working_directory()
            .await
            .expect("test expectation should hold");

        // Assert
        assert_eq!(oracle.kind_of(working_dir).await, EntityKind::Directory);
    }
}
