//! Traversal producer: walks every source tree depth-first, syncs
//! directories inline, and enqueues per-file work for the workers.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::diagnostics;
use crate::queue::{MpmcQueue, WorkItem};
use crate::sync_dir::{sync_directory, DirSyncOutcome};

/// Returns the suffix of `src` that needs to be appended to the
/// destination root: the last `level + 1` non-empty, slash-separated
/// path segments, joined by single slashes (§4.H, GLOSSARY "Suffix at
/// level k"). Leading, trailing, and duplicate slashes are all
/// ignored when splitting into segments, so the result never contains
/// a run of slashes regardless of how `src` was written.
///
/// For `src = "/"` (no non-empty segments at all) returns `"/"`
/// verbatim — the traversal's root special case checks for exactly
/// this value.
pub fn suffix_at_level(src: &str, level: usize) -> String {
    let segments: Vec<&str> = src.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return src.to_string();
    }

    let take = (level + 1).min(segments.len());
    segments[segments.len() - take..].join("/")
}

fn destination_for(dst_root: &str, suffix: &str) -> PathBuf {
    let mut out = String::with_capacity(dst_root.len() + 1 + suffix.len());
    out.push_str(dst_root);
    out.push('/');
    out.push_str(suffix);
    PathBuf::from(out)
}

/// Walks `sources` (already-canonical absolute paths) and enqueues one
/// [`WorkItem`] per regular file or symlink found, syncing directories
/// inline via [`sync_directory`] as they're encountered in pre-order.
///
/// Returns `false` if any traversal-level error occurred (unreadable
/// directory, cycle, stat failure, fatal directory sync) — this drives
/// the process's exit code, independent of individual per-file copy
/// failures which are handled entirely inside the workers.
pub fn traverse_and_queue(sources: &[PathBuf], dst_root: &Path, queue: &MpmcQueue<Box<WorkItem>>) -> bool {
    let mut ok = true;
    let dst_root_str = dst_root.to_string_lossy().into_owned();

    for source in sources {
        if !traverse_one(source, &dst_root_str, queue) {
            ok = false;
        }
    }

    ok
}

fn traverse_one(root: &Path, dst_root: &str, queue: &MpmcQueue<Box<WorkItem>>) -> bool {
    let mut ok = true;
    let mut walker = WalkDir::new(root).follow_links(false).into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                ok = false;
                if err.loop_ancestor().is_some() {
                    diagnostics::warn(
                        format_args!(
                            "skipping sync of directory {}. directory causes cycle",
                            err.path().map(Path::display).map(|d| d.to_string()).unwrap_or_default()
                        ),
                        None,
                    );
                } else {
                    let path_desc = err
                        .path()
                        .map(Path::display)
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "<unknown>".to_string());
                    diagnostics::error(
                        format_args!("failure during traversing for {path_desc}"),
                        err.io_error().map(|e| e as &dyn std::error::Error),
                    );
                }
                continue;
            }
        };

        let path = entry.path();
        let path_str = path.to_string_lossy();
        // `walkdir`'s `depth()` numbers the root entry 0 and each
        // child one deeper, exactly matching `fts_level` in the
        // original traversal (`FTS_ROOTLEVEL` is 0).
        let level = entry.depth();

        let file_type = entry.file_type();

        if file_type.is_dir() {
            let suffix = suffix_at_level(&path_str, level);
            if level == 0 && path_str == "/" {
                // Root source maps onto the destination root itself;
                // don't create a "/" entry underneath it (spec.md §4.H).
                continue;
            }

            let dst = destination_for(dst_root, &suffix);
            match sync_directory(path, &dst) {
                Ok(DirSyncOutcome::Ok) | Ok(DirSyncOutcome::NonFatal) => {}
                Err(err) => {
                    ok = false;
                    diagnostics::error(
                        format_args!("skipping sync of directory {}", path.display()),
                        Some(&err),
                    );
                    // Mirrors `traverse.c`'s `try_skip_directory` (FTS_SKIP):
                    // a fatal directory sync means its subtree is never
                    // touched, not even to report per-entry failures.
                    walker.skip_current_dir();
                }
            }
        } else if file_type.is_file() || file_type.is_symlink() {
            let suffix = suffix_at_level(&path_str, level);
            let dst = destination_for(dst_root, &suffix);
            let item = Box::new(WorkItem {
                src: path.to_path_buf(),
                dst,
            });
            queue.enqueue_blocking(item);
        } else {
            diagnostics::warn(
                format_args!("skipping {}. unknown file type", path.display()),
                None,
            );
        }
    }

    ok
}
