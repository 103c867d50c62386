use std::path::PathBuf;

/// Title of the open panel
pub const OPEN_TITLE: &str = "Open File Location";

/// Title of the save panel
pub const SAVE_TITLE: &str = "Save File Location";

/// How the user left a dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogOutcome {
    Confirmed,
    Cancelled,
}

impl DialogOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

/// Paths reported by a file panel, in the order the backend reported them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub outcome: DialogOutcome,
    pub paths: Vec<PathBuf>,
}

impl Selection {
    pub fn confirmed(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            outcome: DialogOutcome::Confirmed,
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn cancelled() -> Self {
        Self {
            outcome: DialogOutcome::Cancelled,
            paths: Vec::new(),
        }
    }
}

/// Informational alert with an OK button and an optional Cancel button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertRequest {
    pub message: String,
    pub informative: String,
    pub show_cancel: bool,
}

/// Open panel, optionally allowing several items to be chosen.
///
/// Both supported backends offer either files or directories in one panel,
/// never both, so the panel is shown in file mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRequest {
    pub title: String,
    pub allow_multiple: bool,
}

impl OpenRequest {
    pub fn new(allow_multiple: bool) -> Self {
        Self {
            title: OPEN_TITLE.to_string(),
            allow_multiple,
        }
    }
}

/// Save panel, optionally preferring one extension
///
/// The extension is a preference, not a constraint: other types stay
/// selectable and the chosen path is never re-checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub title: String,
    pub extension: Option<String>,
}

impl SaveRequest {
    pub fn new(extension: Option<String>) -> Self {
        Self {
            title: SAVE_TITLE.to_string(),
            extension,
        }
    }

    /// Glob matching the preferred extension, e.g. `*.png`
    pub fn extension_glob(&self) -> Option<String> {
        self.extension
            .as_deref()
            .map(|ext| format!("*.{}", ext.trim_start_matches('.')))
    }
}

/// Errors from a dialog backend
#[derive(Debug, thiserror::Error)]
pub enum DialogError {
    /// The backend could not be reached at all
    #[error("dialog backend unavailable: {0}")]
    Unavailable(String),
    /// The backend was reached but the interaction broke down
    #[error("dialog failed: {0}")]
    Failed(String),
}

/// A source of modal dialogs.
///
/// Every call blocks until the user has dismissed the dialog. There is no
/// timeout and no way to cancel from the caller's side.
pub trait DialogBackend {
    /// Show an alert and report which button was used
    fn alert(&self, request: &AlertRequest) -> Result<DialogOutcome, DialogError>;

    /// Show an open panel
    fn open(&self, request: &OpenRequest) -> Result<Selection, DialogError>;

    /// Show a save panel
    fn save(&self, request: &SaveRequest) -> Result<Selection, DialogError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_glob_strips_leading_dot() {
        assert_eq!(
            SaveRequest::new(Some("png".into())).extension_glob().as_deref(),
            Some("*.png")
        );
        assert_eq!(
            SaveRequest::new(Some(".tar.gz".into())).extension_glob().as_deref(),
            Some("*.tar.gz")
        );
        assert_eq!(SaveRequest::new(None).extension_glob(), None);
    }

    #[test]
    fn panel_titles() {
        assert_eq!(OpenRequest::new(false).title, "Open File Location");
        assert_eq!(SaveRequest::new(None).title, "Save File Location");
    }
}
