use crate::config::LOCK_FILE;
use dashmap::DashSet;
use fs2::FileExt;
use once_cell::sync::Lazy;
use potash::errors::{ErrorKind, PotashError, PotashResult};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// Canonical paths of the directories opened by this process.
static OPEN_DIRECTORIES: Lazy<DashSet<PathBuf>> = Lazy::new(DashSet::new);

pub(crate) fn io_error(message: &str, err: std::io::Error) -> PotashError {
    log::error!("{}: {}", message, err);
    PotashError::new(&format!("{}: {}", message, err), ErrorKind::IOError)
}

fn already_open(path: &Path) -> PotashError {
    log::error!("Database directory {} is already open", path.display());
    PotashError::new(
        &format!("Database directory {} is already open", path.display()),
        ErrorKind::AlreadyOpen,
    )
}

/// Exclusive ownership of a database directory.
///
/// Held through an advisory lock on `potash.lock`, which keeps other
/// processes out, and an entry in a process-wide registry, since advisory
/// locks do not reliably conflict within one process. Both are released on
/// drop.
#[derive(Debug)]
pub(crate) struct DirectoryLock {
    path: PathBuf,
    lock_file: File,
}

impl DirectoryLock {
    /// Creates `path` if needed and takes ownership of it.
    ///
    /// # Errors
    /// `AlreadyOpen` when this or another process already holds the
    /// directory, `IOError` when it cannot be created.
    pub(crate) fn acquire(path: &Path) -> PotashResult<DirectoryLock> {
        fs::create_dir_all(path).map_err(|e| io_error("Failed to create database directory", e))?;
        let path = path
            .canonicalize()
            .map_err(|e| io_error("Failed to resolve database directory", e))?;

        if !OPEN_DIRECTORIES.insert(path.clone()) {
            return Err(already_open(&path));
        }

        match Self::lock_file(&path) {
            Ok(lock_file) => {
                log::debug!("Locked database directory {}", path.display());
                Ok(DirectoryLock { path, lock_file })
            }
            Err(e) => {
                OPEN_DIRECTORIES.remove(&path);
                Err(e)
            }
        }
    }

    fn lock_file(path: &Path) -> PotashResult<File> {
        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(LOCK_FILE))
            .map_err(|e| io_error("Failed to open lock file", e))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(already_open(path));
        }
        Ok(lock_file)
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DirectoryLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.lock_file) {
            log::warn!("Failed to unlock {}: {}", self.path.display(), e);
        }
        OPEN_DIRECTORIES.remove(&self.path);
        log::debug!("Released database directory {}", self.path.display());
    }
}
