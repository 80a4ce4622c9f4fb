//! Top-level orchestrator: validates arguments, builds the queue and
//! shared control block, spawns workers, drives the traversal on the
//! calling thread, and joins everything back up.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::constants::DEFAULT_QUEUE_CAPACITY;
use crate::diagnostics;
use crate::error::{DsyncError, Result};
use crate::queue::{MpmcQueue, WorkItem};
use crate::stat::{FileKind, Stat};
use crate::traverse::traverse_and_queue;
use crate::worker;

/// State shared by the traversal producer and every worker: the queue
/// itself, the write-once force flag, and the traversal-done flag
/// (release on set, acquire on read).
struct Shared {
    queue: MpmcQueue<Box<WorkItem>>,
    force: bool,
    done: AtomicBool,
}

/// Runs one full sync: canonicalizes arguments, spawns `worker_count`
/// workers, traverses every source on the calling thread, and joins.
///
/// Returns `Ok(true)` for a clean run (no traversal errors, no worker
/// join failure), `Ok(false)` if the run completed but reported errors
/// (the caller should exit 1), or `Err` for a startup-fatal condition
/// (bad destination, queue allocation failure).
pub fn run(sources: &[PathBuf], dst: &Path, force: bool, worker_count: u8) -> Result<bool> {
    let dst_stat = Stat::lstat(dst)?;
    if dst_stat.kind != FileKind::Directory {
        return Err(DsyncError::NotADirectory(dst.to_path_buf()));
    }

    let canonical_dst = dst.canonicalize()?;

    let mut canonical_sources = Vec::with_capacity(sources.len());
    for src in sources {
        match src.canonicalize() {
            Ok(path) => canonical_sources.push(path),
            Err(err) => {
                diagnostics::error(
                    format_args!("failed to resolve source path {}", src.display()),
                    Some(&err),
                );
                return Err(DsyncError::Io(err));
            }
        }
    }

    let shared = Shared {
        queue: MpmcQueue::new(DEFAULT_QUEUE_CAPACITY),
        force,
        done: AtomicBool::new(false),
    };

    let mut join_failed = false;
    let traversal_ok = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..worker_count)
            .map(|_| {
                let shared = &shared;
                scope.spawn(move || {
                    worker::run(&shared.queue, &shared.done, shared.force);
                })
            })
            .collect();

        let traversal_ok = traverse_and_queue(&canonical_sources, &canonical_dst, &shared.queue);
        shared.done.store(true, Ordering::Release);

        for handle in handles {
            if handle.join().is_err() {
                join_failed = true;
                diagnostics::error("a worker thread panicked", None);
            }
        }

        traversal_ok
    });

    Ok(traversal_ok && !join_failed)
}
