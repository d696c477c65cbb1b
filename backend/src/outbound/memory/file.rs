//! JSON snapshot persistence for [`BagDocument`].
//!
//! Writes go to a staging file beside the target and are renamed into
//! place, so a crash never leaves a half-written snapshot behind.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use super::document::BagDocument;

/// Errors raised while reading or writing a snapshot file.
#[derive(Debug, Error)]
pub enum DocumentFileError {
    /// Path has no file name component.
    #[error("snapshot path {path} must name a file")]
    InvalidPath {
        /// Offending path.
        path: PathBuf,
    },
    /// Filesystem access failed.
    #[error("failed to access snapshot at {path}: {source}")]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Snapshot content is not a valid document.
    #[error("snapshot at {path} is malformed: {source}")]
    Malformed {
        /// Path being parsed.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl DocumentFileError {
    pub(super) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub(super) fn split(path: &Path) -> Result<(&Path, OsString), DocumentFileError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| DocumentFileError::InvalidPath {
            path: path.to_path_buf(),
        })?;
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok((parent, file_name.to_os_string()))
}

/// Load a document from `path`. A missing file yields an empty document.
///
/// # Examples
///
/// ```rust
/// use fitting_backend::outbound::memory::load_document;
///
/// let path = std::env::temp_dir().join("fitting-missing-snapshot.json");
/// let document = load_document(&path)?;
/// assert!(document.owners.is_empty());
/// # Ok::<(), fitting_backend::outbound::memory::DocumentFileError>(())
/// ```
pub fn load_document(path: &Path) -> Result<BagDocument, DocumentFileError> {
    let (parent, file_name) = split(path)?;
    let directory = match Dir::open_ambient_dir(parent, ambient_authority()) {
        Ok(directory) => directory,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(BagDocument::default()),
        Err(error) => return Err(DocumentFileError::io(path, error)),
    };
    let raw = match directory.read_to_string(Path::new(&file_name)) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(BagDocument::default()),
        Err(error) => return Err(DocumentFileError::io(path, error)),
    };
    serde_json::from_str(&raw).map_err(|source| DocumentFileError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Persist `document` to `path`, creating parent directories as needed.
pub fn save_document(path: &Path, document: &BagDocument) -> Result<(), DocumentFileError> {
    let (parent, file_name) = split(path)?;
    Dir::create_ambient_dir_all(parent, ambient_authority())
        .map_err(|error| DocumentFileError::io(parent, error))?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority())
        .map_err(|error| DocumentFileError::io(parent, error))?;

    let body = serde_json::to_vec_pretty(document).map_err(|source| {
        DocumentFileError::Malformed {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let staging = PathBuf::from(format!(".tmp-bag-{}.json", Uuid::new_v4().simple()));
    directory
        .write(&staging, &body)
        .map_err(|error| DocumentFileError::io(&parent.join(&staging), error))?;
    if let Err(error) = directory.rename(&staging, &directory, Path::new(&file_name)) {
        if let Err(cleanup) = directory.remove_file(&staging) {
            warn!(path = %path.display(), error = %cleanup, "failed to remove staging snapshot");
        }
        return Err(DocumentFileError::io(path, error));
    }
    Ok(())
}
