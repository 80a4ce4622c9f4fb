//! Tuning constants shared across the synchronization pipeline.

/// Capacity of the work-item ring queue. Must be a power of two.
///
/// 512 in-flight work items is enough to keep a handful of worker
/// threads fed without the traversal producer spinning on a full queue
/// under ordinary directory shapes.
pub const DEFAULT_QUEUE_CAPACITY: usize = 512;

/// Cache line size used to pad the queue's hot fields apart.
pub const CACHE_LINE_SIZE: usize = 64;

/// Maximum number of worker threads accepted by `-j`.
pub const MAX_WORKER_THREADS: u8 = 255;

/// Byte-copy loop buffer size, picked the same way GNU coreutils picks
/// its `io_blksize.h` default: large enough to amortize the read/write
/// syscall overhead without pinning an unreasonable amount of memory
/// per in-flight copy.
pub const COPY_BUFFER_SIZE: usize = 128 * 1024;

/// Upper bound on bytes requested from a single `copy_file_range` call.
/// The syscall's return type is a signed `ssize_t`; staying under
/// `isize::MAX` per call keeps partial-copy bookkeeping simple.
pub const MAX_SINGLE_IO_CHUNK: usize = isize::MAX as usize;
