//! Regular-file copier.
//!
//! On Linux this drives the kernel's `copy_file_range`, which can offload
//! the copy entirely (e.g. reflink on a copy-on-write filesystem) and
//! falls back to the portable read/write loop when the kernel reports the
//! syscall unsupported for this pair of descriptors. Every other target
//! goes straight to the read/write loop.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, IntoRawFd};
use std::path::Path;

use crate::constants::MAX_SINGLE_IO_CHUNK;
use crate::copy::read_write::copy_read_write;
use crate::error::Result;

fn open_pair(src: &Path, dst: &Path, mode: u32) -> Result<(File, File)> {
    let src_file = File::open(src)?;
    let dst_file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .mode(mode)
        .open(dst)?;
    Ok((src_file, dst_file))
}

/// Copy regular file `src` to `dst`, creating `dst` with `mode`
/// (`O_CREAT | O_TRUNC | O_WRONLY` semantics — an existing `dst` is
/// truncated and overwritten in place, matching the original).
pub fn copy_file(src: &Path, dst: &Path, size: u64, mode: u32) -> Result<()> {
    let (mut src_file, mut dst_file) = open_pair(src, dst, mode)?;

    #[cfg(target_os = "linux")]
    {
        linux::copy_file_range_loop(&mut src_file, &mut dst_file, size)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        copy_read_write(&mut src_file, &mut dst_file, size)?;
    }

    close_checked(dst_file)?;

    Ok(())
}

/// Explicitly closes `dst`'s descriptor and checks the result.
/// A delayed writeback failure (`EIO`, `ENOSPC`) can surface only here,
/// after every byte has already been accepted by `write`/`copy_file_range` —
/// dropping the `File` instead would silently swallow exactly that error,
/// matching `copy_file_linux.c:77-82`. The source descriptor has no such
/// hazard and is left to close on drop.
fn close_checked(file: File) -> Result<()> {
    let fd = file.into_raw_fd();
    // SAFETY: `fd` came from `into_raw_fd`, so it's valid and we own it
    // exclusively; this is the only close of it.
    let rc = unsafe { libc::close(fd) };
    if rc != 0 {
        return Err(io::Error::last_os_error().into());
    }
    Ok(())
}

#[cfg(target_os = "linux")]
mod linux {
    use super::*;
    use std::io;

    /// Drives `copy_file_range` until `size` bytes are copied, falling
    /// back to [`copy_read_write`] only when the very first call fails
    /// with `EOPNOTSUPP`/`EXDEV` — once any bytes have moved via
    /// `copy_file_range`, a later failure is reported as-is rather than
    /// restarting through the fallback.
    pub(super) fn copy_file_range_loop(src: &mut File, dst: &mut File, size: u64) -> Result<()> {
        // SAFETY: advisory hint only; ignoring its return value is correct.
        unsafe {
            libc::posix_fadvise(src.as_raw_fd(), 0, 0, libc::POSIX_FADV_SEQUENTIAL);
        }

        let mut bytes_left = size;
        while bytes_left > 0 {
            let chunk = bytes_left.min(MAX_SINGLE_IO_CHUNK as u64) as usize;
            // SAFETY: both fds are valid and owned by us for the duration
            // of this call; null offsets mean "use and advance the
            // current file offset" for both descriptors.
            let copied = unsafe {
                libc::copy_file_range(
                    src.as_raw_fd(),
                    std::ptr::null_mut(),
                    dst.as_raw_fd(),
                    std::ptr::null_mut(),
                    chunk,
                    0,
                )
            };

            if copied < 0 {
                let err = io::Error::last_os_error();
                let unsupported = matches!(
                    err.raw_os_error(),
                    Some(libc::EOPNOTSUPP) | Some(libc::EXDEV)
                );
                if bytes_left == size && unsupported {
                    return copy_read_write(src, dst, size);
                }
                return Err(err.into());
            }
            if copied == 0 {
                break;
            }

            bytes_left -= copied as u64;
        }

        Ok(())
    }
}
