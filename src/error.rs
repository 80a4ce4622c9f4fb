//! Error types for the dsync pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for dsync operations.
pub type Result<T> = std::result::Result<T, DsyncError>;

/// Errors surfaced by the synchronization core.
///
/// Every entry-level variant here is handled by its caller without
/// aborting the run: the traversal and the per-file sync decision log
/// through [`crate::diagnostics`] and continue. Only [`DsyncError::NotADirectory`]
/// and queue-allocation failure (`OutOfMemory`) are fatal at startup.
#[derive(Error, Debug)]
pub enum DsyncError {
    /// Underlying filesystem/syscall failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Destination argument is not a directory.
    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    /// Allocation or size-overflow failure.
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// Source is neither a regular file nor a symbolic link.
    #[error("unsupported file type for {0}")]
    UnsupportedType(PathBuf),

    /// `readlink` returned a length that disagreed with the stat size.
    #[error("symlink read size mismatch for {0}")]
    SizeMismatch(PathBuf),

    /// A directory cycle was detected during the walk.
    #[error("directory cycle detected at {0}")]
    CycleDetected(PathBuf),

    /// A directory could not be opened or read.
    #[error("unreadable directory {0}")]
    UnreadableDirectory(PathBuf),
}

impl From<nix::Error> for DsyncError {
    fn from(err: nix::Error) -> Self {
        DsyncError::Io(std::io::Error::from_raw_os_error(err as i32))
    }
}
