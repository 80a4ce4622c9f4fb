//! Portable byte-copy loop, used directly on non-Linux targets and as the
//! Linux copier's fallback when `copy_file_range` isn't usable.

use std::fs::File;
use std::io::{Read, Write};

use crate::constants::{COPY_BUFFER_SIZE, MAX_SINGLE_IO_CHUNK};
use crate::error::Result;

/// Copy exactly `size` bytes from `src` to `dst`, starting at each file's
/// current offset.
///
/// Buffer size is 128 KiB, the same figure GNU coreutils picks in
/// `io_blksize.h` — large enough to amortize the read/write syscalls
/// without over-committing memory per in-flight copy.
pub fn copy_read_write(src: &mut File, dst: &mut File, size: u64) -> Result<()> {
    let buf_size = COPY_BUFFER_SIZE.min(MAX_SINGLE_IO_CHUNK);
    let mut buf = vec![0u8; buf_size];

    let mut bytes_left = size;
    while bytes_left > 0 {
        let want = bytes_left.min(buf_size as u64) as usize;
        let read = src.read(&mut buf[..want])?;
        if read == 0 {
            break;
        }
        dst.write_all(&buf[..read])?;
        bytes_left -= read as u64;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Seek;

    #[test]
    fn copies_exact_byte_count() {
        let dir = tempfile::tempdir().unwrap();
        let src_path = dir.path().join("src");
        let dst_path = dir.path().join("dst");
        std::fs::write(&src_path, vec![7u8; 300_000]).unwrap();

        let mut src = File::open(&src_path).unwrap();
        let mut dst = File::create(&dst_path).unwrap();
        copy_read_write(&mut src, &mut dst, 300_000).unwrap();
        dst.flush().unwrap();

        let copied = std::fs::read(&dst_path).unwrap();
        assert_eq!(copied.len(), 300_000);
        assert!(copied.iter().all(|&b| b == 7));
    }

    #[test]
    fn stops_early_on_short_source() {
        let dir = tempfile::tempdir().unwrap();
        let src_path = dir.path().join("src");
        let dst_path = dir.path().join("dst");
        std::fs::write(&src_path, b"abc").unwrap();

        let mut src = File::open(&src_path).unwrap();
        src.seek(std::io::SeekFrom::Start(0)).unwrap();
        let mut dst = File::create(&dst_path).unwrap();
        copy_read_write(&mut src, &mut dst, 10).unwrap();

        let copied = std::fs::read(&dst_path).unwrap();
        assert_eq!(copied, b"abc");
    }
}
