//! Typed snapshot of the fields dsync cares about from `lstat`.

use std::path::Path;

use nix::sys::stat::{FileStat, SFlag};

use crate::error::Result;

/// File type as distinguished by the sync decision (§4.F).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Regular,
    Symlink,
    Directory,
    Other,
}

/// A `lstat` snapshot: never follows symlinks, matching the original's
/// exclusive use of `fstatat(..., AT_SYMLINK_NOFOLLOW)`.
#[derive(Debug, Clone, Copy)]
pub struct Stat {
    pub kind: FileKind,
    pub mode: u32,
    /// For a symlink this is the length of the link target, exactly as
    /// `lstat` reports it.
    pub size: i64,
    pub atime: (i64, i64),
    pub mtime: (i64, i64),
}

impl Stat {
    /// `lstat(path)`, rejecting a negative size the same way
    /// `sync_file.c` rejects `st_size < 0`.
    pub fn lstat(path: &Path) -> Result<Self> {
        let raw = nix::sys::stat::lstat(path)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: FileStat) -> Self {
        let mode = SFlag::from_bits_truncate(raw.st_mode);
        let kind = if mode.contains(SFlag::S_IFLNK) {
            FileKind::Symlink
        } else if mode.contains(SFlag::S_IFREG) {
            FileKind::Regular
        } else if mode.contains(SFlag::S_IFDIR) {
            FileKind::Directory
        } else {
            FileKind::Other
        };

        Self {
            kind,
            mode: raw.st_mode,
            size: raw.st_size,
            atime: (raw.st_atime, raw.st_atime_nsec),
            mtime: (raw.st_mtime, raw.st_mtime_nsec),
        }
    }

    pub fn is_nonnegative_size(&self) -> bool {
        self.size >= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn lstat_regular_file_reports_size_and_kind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, b"hello").unwrap();

        let stat = Stat::lstat(&path).unwrap();
        assert_eq!(stat.kind, FileKind::Regular);
        assert_eq!(stat.size, 5);
        assert!(stat.is_nonnegative_size());
    }

    #[test]
    fn lstat_symlink_does_not_follow() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target.txt");
        fs::write(&target, b"12345").unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let stat = Stat::lstat(&link).unwrap();
        assert_eq!(stat.kind, FileKind::Symlink);
        assert_eq!(stat.size, target.to_string_lossy().len() as i64);
    }
}
