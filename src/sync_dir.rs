//! Directory sync: create or chmod `dst` to match `src`, before the
//! traversal descends into it.

use std::path::Path;

use nix::sys::stat::{self, FchmodatFlags, Mode};

use crate::diagnostics;
use crate::error::{DsyncError, Result};
use crate::stat::Stat;

/// Outcome of syncing one directory. A [`DirSyncOutcome::Fatal`]
/// directory must not be descended into; a [`DirSyncOutcome::NonFatal`]
/// one is logged and the walk continues underneath it regardless (mode
/// couldn't be fixed up, but the directory itself is usable).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirSyncOutcome {
    Ok,
    NonFatal,
}

/// Sync directory `src` to `dst`: create `dst` with `src`'s mode if
/// missing, or align `dst`'s mode with `src`'s if it already exists and
/// differs.
pub fn sync_directory(src: &Path, dst: &Path) -> Result<DirSyncOutcome> {
    let src_stat = Stat::lstat(src)?;

    match Stat::lstat(dst) {
        Ok(dst_stat) => {
            if src_stat.mode != dst_stat.mode {
                let mode = Mode::from_bits_truncate(src_stat.mode);
                if let Err(err) = stat::fchmodat(None, dst, mode, FchmodatFlags::NoFollowSymlink) {
                    diagnostics::warn(
                        format_args!("failed to update mode of directory {}", dst.display()),
                        Some(&DsyncError::from(err)),
                    );
                    return Ok(DirSyncOutcome::NonFatal);
                }
            }
        }
        Err(DsyncError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
            let mode = Mode::from_bits_truncate(src_stat.mode);
            stat::mkdir(dst, mode)?;
        }
        Err(err) => return Err(err),
    }

    Ok(DirSyncOutcome::Ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn creates_missing_destination_directory() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir(&src).unwrap();
        let dst = dir.path().join("dst");

        let outcome = sync_directory(&src, &dst).unwrap();
        assert_eq!(outcome, DirSyncOutcome::Ok);
        assert!(dst.is_dir());
    }

    #[test]
    fn aligns_mode_of_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        fs::create_dir(&src).unwrap();
        fs::create_dir(&dst).unwrap();
        fs::set_permissions(&src, fs::Permissions::from_mode(0o700)).unwrap();
        fs::set_permissions(&dst, fs::Permissions::from_mode(0o755)).unwrap();

        sync_directory(&src, &dst).unwrap();

        let mode = fs::metadata(&dst).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o700);
    }
}
