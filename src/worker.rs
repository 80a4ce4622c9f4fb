//! Worker routine: dequeues work items and runs the per-file sync
//! decision, with the mandatory drain-on-shutdown protocol.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::diagnostics;
use crate::queue::{MpmcQueue, WorkItem};
use crate::sync_file::sync_file;

/// Runs one worker's dequeue loop to completion.
///
/// Ordinarily a worker spins on the queue until a dequeue succeeds,
/// processes the item, and repeats. When the queue goes empty it checks
/// `traversal_done`; if that's not set yet, it spins and retries.
///
/// Once `traversal_done` is observed true, the worker does **not** just
/// exit — it enters drain mode: dequeue in a tight loop until the queue
/// is genuinely empty, processing whatever it finds, before returning.
/// This closes a real race: the producer can stall, let every worker
/// observe an empty queue, get preempted before any of them reads
/// `traversal_done`, then resume, enqueue more work, and set the flag —
/// all before a worker's next read of it. Without the post-done drain
/// those late items would never be picked up.
pub fn run(queue: &MpmcQueue<Box<WorkItem>>, traversal_done: &AtomicBool, force_copy: bool) {
    loop {
        match queue.try_dequeue() {
            Ok(item) => process(item, force_copy),
            Err(_) => {
                if traversal_done.load(Ordering::Acquire) {
                    drain(queue, force_copy);
                    return;
                }
                std::hint::spin_loop();
            }
        }
    }
}

fn drain(queue: &MpmcQueue<Box<WorkItem>>, force_copy: bool) {
    while let Ok(item) = queue.try_dequeue() {
        process(item, force_copy);
    }
}

fn process(item: Box<WorkItem>, force_copy: bool) {
    if let Err(err) = sync_file(&item.src, &item.dst, force_copy) {
        diagnostics::error(
            format_args!("failed to sync {}", item.src.display()),
            Some(&err),
        );
    }
    // `item`'s `src`/`dst` `PathBuf`s and the `Box` itself are dropped
    // here, completing the ownership handoff producer -> queue -> worker.
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn drains_remaining_items_after_done_is_set() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.txt");
        std::fs::write(&src, b"hello").unwrap();
        let dst = dir.path().join("b.txt");

        let queue: Arc<MpmcQueue<Box<WorkItem>>> = Arc::new(MpmcQueue::new(8));
        queue
            .try_enqueue(Box::new(WorkItem {
                src: src.clone(),
                dst: dst.clone(),
            }))
            .unwrap();

        let done = AtomicBool::new(true);
        run(&queue, &done, false);

        assert_eq!(std::fs::read(&dst).unwrap(), b"hello");
    }

    #[test]
    fn exits_when_queue_empty_and_done_true() {
        let queue: MpmcQueue<Box<WorkItem>> = MpmcQueue::new(8);
        let done = AtomicBool::new(true);
        run(&queue, &done, false);
    }
}
