//! Per-file sync decision: the logic a worker runs for one [`crate::queue::WorkItem`].

use std::path::Path;

use nix::sys::stat::{self, FchmodatFlags, Mode, UtimensatFlags};
use nix::sys::time::TimeSpec;

use crate::copy::{copy_file, copy_symlink};
use crate::error::{DsyncError, Result};
use crate::stat::{FileKind, Stat};

/// Sync `src` to `dst`.
///
/// If `dst` doesn't exist, or its size and modification time don't
/// match `src`'s, `src` is copied to `dst` and `dst`'s mode and
/// timestamps are set to match. If `force_copy` is set this comparison
/// is skipped and `src` is always copied. When the metadata already
/// matches and only the mode differs, only the mode is updated.
pub fn sync_file(src: &Path, dst: &Path, force_copy: bool) -> Result<()> {
    let src_stat = Stat::lstat(src)?;

    if !src_stat.is_nonnegative_size() {
        return Err(DsyncError::UnsupportedType(src.to_path_buf()));
    }

    if !force_copy {
        match Stat::lstat(dst) {
            Ok(dst_stat) => {
                if src_stat.size == dst_stat.size && src_stat.mtime == dst_stat.mtime {
                    if src_stat.mode != dst_stat.mode {
                        sync_mode(dst, src_stat.mode)?;
                    }
                    return Ok(());
                }
            }
            Err(DsyncError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }
    }

    match src_stat.kind {
        FileKind::Symlink => copy_symlink(src, dst, src_stat.size)?,
        FileKind::Regular => copy_file(src, dst, src_stat.size as u64, src_stat.mode)?,
        FileKind::Directory | FileKind::Other => {
            return Err(DsyncError::UnsupportedType(src.to_path_buf()));
        }
    }

    sync_timestamps(dst, src_stat.atime, src_stat.mtime)
}

fn sync_mode(dst: &Path, mode: u32) -> Result<()> {
    let mode = Mode::from_bits_truncate(mode);
    stat::fchmodat(None, dst, mode, FchmodatFlags::NoFollowSymlink)?;
    Ok(())
}

fn sync_timestamps(dst: &Path, atime: (i64, i64), mtime: (i64, i64)) -> Result<()> {
    let atime = TimeSpec::new(atime.0, atime.1);
    let mtime = TimeSpec::new(mtime.0, mtime.1);
    stat::utimensat(None, dst, &atime, &mtime, UtimensatFlags::NoFollowSymlink)?;
    Ok(())
}
