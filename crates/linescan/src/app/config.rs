/// Options fixed when a browser session is opened.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BrowserConfig {
    /// Whether files, not only directories, are eligible selections.
    pub include_files: bool,
    /// Preferred start location. Falls back to the working directory when
    /// absent or not a directory.
    pub start_hint: Option<String>,
}

impl BrowserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn include_files(mut self, include_files: bool) -> Self {
        self.include_files = include_files;

        self
    }

    #[must_use]
    pub fn start_hint(mut self, start_hint: impl Into<String>) -> Self {
        self.start_hint = Some(start_hint.into());

        self
    }

    /// Returns the start hint, treating blank text as no hint.
    pub(crate) fn effective_start_hint(&self) -> Option<&str> {
        self.start_hint
            .as_deref()
            .filter(|start_hint| !start_hint.trim().is_empty())
    }
}
