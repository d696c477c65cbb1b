//! Cross-process exclusion for snapshot files.
//!
//! [`OwnerLocks`](crate::domain::OwnerLocks) and the conditional ledger write
//! only serialise work inside one process. Every process that loads a
//! snapshot, mutates it and saves it back must hold a [`SnapshotLock`] for
//! the whole cycle, otherwise two processes can both consume the same change.

use std::fs::File;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir, fs::OpenOptions};
use fs4::fs_std::FileExt;
use tracing::{debug, warn};

use super::file::{DocumentFileError, split};

/// Exclusive advisory lock on the `<snapshot>.lock` file beside a snapshot.
///
/// The lock is released when the value is dropped.
#[derive(Debug)]
pub struct SnapshotLock {
    file: File,
    path: PathBuf,
}

impl SnapshotLock {
    /// Block until the lock for `snapshot` is held by this process.
    ///
    /// Parent directories are created so the first run can lock before any
    /// snapshot exists.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentFileError`] when the lock file cannot be opened or
    /// locked.
    pub fn acquire(snapshot: &Path) -> Result<Self, DocumentFileError> {
        let (parent, file_name) = split(snapshot)?;
        let mut lock_name = file_name;
        lock_name.push(".lock");
        let path = parent.join(&lock_name);

        Dir::create_ambient_dir_all(parent, ambient_authority())
            .map_err(|error| DocumentFileError::io(parent, error))?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())
            .map_err(|error| DocumentFileError::io(parent, error))?;
        let mut options = OpenOptions::new();
        options.create(true).write(true);
        let file = directory
            .open_with(Path::new(&lock_name), &options)
            .map_err(|error| DocumentFileError::io(&path, error))?
            .into_std();

        debug!(path = %path.display(), "waiting for snapshot lock");
        FileExt::lock_exclusive(&file).map_err(|error| DocumentFileError::io(&path, error))?;
        debug!(path = %path.display(), "snapshot lock held");
        Ok(Self { file, path })
    }

    /// Lock file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SnapshotLock {
    fn drop(&mut self) {
        if let Err(error) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), %error, "failed to release snapshot lock");
        }
    }
}
