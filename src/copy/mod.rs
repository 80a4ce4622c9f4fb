//! File-content copiers: the byte-copy loop, the regular-file copier
//! built on top of it, and the symlink copier.

pub mod file;
pub mod read_write;
pub mod symlink;

pub use file::copy_file;
pub use read_write::copy_read_write;
pub use symlink::copy_symlink;
