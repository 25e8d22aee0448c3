use chrono::{DateTime, Local};
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};

/// Snapshot of one filesystem entry, taken when it was enumerated.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub name: String,
    pub full_path: PathBuf,
    pub is_directory: bool,
    pub size: Option<u64>,
    pub modified_at: Option<DateTime<Local>>,
}

impl FileEntry {
    pub fn from_metadata(path: &Path, metadata: &Metadata) -> Self {
        let is_directory = metadata.is_dir();
        Self {
            name: display_name(path),
            full_path: path.to_path_buf(),
            is_directory,
            size: if is_directory { None } else { Some(metadata.len()) },
            modified_at: metadata.modified().ok().map(DateTime::<Local>::from),
        }
    }

    /// Stats `path`. When that fails the entry carries the name alone.
    pub fn from_path(path: &Path) -> Self {
        match fs::metadata(path) {
            Ok(metadata) => Self::from_metadata(path, &metadata),
            Err(_) => Self::name_only(path),
        }
    }

    /// An entry with no metadata, for paths that live on another machine.
    pub fn name_only(path: &Path) -> Self {
        Self {
            name: display_name(path),
            full_path: path.to_path_buf(),
            is_directory: false,
            size: None,
            modified_at: None,
        }
    }
}

// Roots have no file name; show the whole path instead.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Outcome of one command. Only constructible through [`CommandResult::success`]
/// and [`CommandResult::failure`], so a failure never carries items.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult {
    success: bool,
    message: String,
    items: Option<Vec<FileEntry>>,
}

impl CommandResult {
    /// `items = None` means the command produced no listing at all, which is
    /// not the same as a listing with zero entries.
    pub fn success(message: impl Into<String>, items: Option<Vec<FileEntry>>) -> Self {
        Self {
            success: true,
            message: message.into(),
            items,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            items: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn items(&self) -> &[FileEntry] {
        self.items.as_deref().unwrap_or(&[])
    }

    pub fn has_listing(&self) -> bool {
        self.items.is_some()
    }
}
