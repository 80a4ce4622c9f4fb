//! A bounded, lock-free multi-producer multi-consumer queue.
//!
//! This is a direct generalization of Dmitry Vyukov's bounded MPMC
//! queue — the same sequence-counter discipline the original C
//! implementation builds via a macro over a fixed payload type, here
//! expressed as a single type generic over the payload. Every ordering
//! below is load-bearing and should not be loosened:
//!
//! - the cursor read before the retry loop is `Relaxed`
//! - the per-slot sequence read inside the loop is `Acquire`
//! - the cursor CAS is `Relaxed` on both success and failure
//! - the slot's sequence publish after a successful claim is `Release`
//!
//! The `Acquire` slot read paired with the `Release` slot publish is
//! what makes a payload visible to whichever thread claims the slot
//! next, on either side of the queue.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

/// One file's worth of sync work: a source path and its derived
/// destination path. Dropped (and its two `PathBuf`s freed) by whichever
/// worker dequeues it, once `sync_file` has run.
#[derive(Debug)]
pub struct WorkItem {
    pub src: PathBuf,
    pub dst: PathBuf,
}

/// Returned by [`MpmcQueue::try_enqueue`] when every slot ahead of the
/// enqueue cursor is still pending, handing the value back to the
/// caller. Never surfaced to the user — it only drives the traversal
/// producer's spin loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFull<T>(pub T);

/// Returned by [`MpmcQueue::try_dequeue`] when no slot holds a published
/// payload. Never surfaced to the user — it only drives a worker's
/// spin/drain loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueEmpty;

struct Slot<T> {
    seq: AtomicU64,
    value: UnsafeCell<MaybeUninit<T>>,
}

/// Cache-line padding to keep a hot field from sharing a line with its
/// neighbors. Written the same way as this codebase's other padded
/// atomics: an explicit trailing byte array rather than relying on a
/// crate for it.
#[repr(align(64))]
struct Padded<T> {
    value: T,
}

impl<T> Padded<T> {
    const fn new(value: T) -> Self {
        Self { value }
    }
}

/// Fixed-capacity lock-free MPMC queue. Capacity must be a power of two.
///
/// The slot array base, the enqueue cursor, and the dequeue cursor each
/// get their own cache line so that one thread publishing a slot never
/// invalidates another thread's cached copy of a cursor it didn't touch.
pub struct MpmcQueue<T> {
    slots: Padded<Box<[Slot<T>]>>,
    mask: usize,
    enqueue_pos: Padded<AtomicU64>,
    dequeue_pos: Padded<AtomicU64>,
}

impl<T> MpmcQueue<T> {
    /// Builds a queue of the given capacity, which must be a power of
    /// two of at least 2 (§3's queue-capacity invariant).
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity >= 2 && capacity.is_power_of_two(),
            "queue capacity must be a power of two >= 2, got {capacity}"
        );

        let slots: Box<[Slot<T>]> = (0..capacity)
            .map(|i| Slot {
                seq: AtomicU64::new(i as u64),
                value: UnsafeCell::new(MaybeUninit::uninit()),
            })
            .collect();

        Self {
            slots: Padded::new(slots),
            mask: capacity - 1,
            enqueue_pos: Padded::new(AtomicU64::new(0)),
            dequeue_pos: Padded::new(AtomicU64::new(0)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.mask + 1
    }

    /// Attempt to enqueue `value`. Returns [`QueueFull`] (carrying
    /// `value` back) when every slot the enqueue cursor could claim is
    /// still awaiting a dequeue.
    pub fn try_enqueue(&self, value: T) -> Result<(), QueueFull<T>> {
        let mask = self.mask;
        let mut pos = self.enqueue_pos.value.load(Ordering::Relaxed);

        loop {
            let slot = &self.slots.value[(pos as usize) & mask];
            let seq = slot.seq.load(Ordering::Acquire);

            if seq == pos {
                match self.enqueue_pos.value.compare_exchange_weak(
                    pos,
                    pos + 1,
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // SAFETY: we own slot `pos` exclusively until we
                        // publish its sequence below.
                        unsafe { (*slot.value.get()).write(value) };
                        slot.seq.store(pos + 1, Ordering::Release);
                        return Ok(());
                    }
                    Err(actual) => pos = actual,
                }
            } else if seq < pos {
                return Err(QueueFull(value));
            } else {
                pos = self.enqueue_pos.value.load(Ordering::Relaxed);
            }
        }
    }

    /// Attempt to dequeue one payload. Returns [`QueueEmpty`] when no
    /// slot the dequeue cursor could claim holds a published payload.
    pub fn try_dequeue(&self) -> Result<T, QueueEmpty> {
        let mask = self.mask;
        let mut pos = self.dequeue_pos.value.load(Ordering::Relaxed);

        loop {
            let slot = &self.slots.value[(pos as usize) & mask];
            let seq = slot.seq.load(Ordering::Acquire);

            if seq == pos + 1 {
                match self.dequeue_pos.value.compare_exchange_weak(
                    pos,
                    pos + 1,
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // SAFETY: the Acquire load above observed the
                        // enqueuer's Release publish, so the payload is
                        // initialized and we own it exclusively.
                        let value = unsafe { (*slot.value.get()).assume_init_read() };
                        slot.seq
                            .store(pos + mask as u64 + 1, Ordering::Release);
                        return Ok(value);
                    }
                    Err(actual) => pos = actual,
                }
            } else if seq < pos + 1 {
                return Err(QueueEmpty);
            } else {
                pos = self.dequeue_pos.value.load(Ordering::Relaxed);
            }
        }
    }

    /// Spin until `value` is accepted. This is the traversal producer's
    /// sole backpressure mechanism (§4.H): it intentionally does not
    /// progress past a full queue.
    pub fn enqueue_blocking(&self, mut value: T) {
        loop {
            match self.try_enqueue(value) {
                Ok(()) => return,
                Err(QueueFull(v)) => {
                    value = v;
                    std::hint::spin_loop();
                }
            }
        }
    }
}

// `Send + Sync` follow from `T: Send`: at most one thread ever has
// access to a given slot's payload at a time (enforced by the cursor
// CAS), so sharing `&MpmcQueue<T>` across threads is sound without
// requiring `T: Sync`.
unsafe impl<T: Send> Send for MpmcQueue<T> {}
unsafe impl<T: Send> Sync for MpmcQueue<T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    #[test]
    fn enqueue_dequeue_round_trip() {
        let q: MpmcQueue<u32> = MpmcQueue::new(4);
        q.try_enqueue(1).unwrap();
        q.try_enqueue(2).unwrap();
        assert_eq!(q.try_dequeue().unwrap(), 1);
        assert_eq!(q.try_dequeue().unwrap(), 2);
        assert_eq!(q.try_dequeue(), Err(QueueEmpty));
    }

    #[test]
    fn full_when_capacity_exhausted() {
        let q: MpmcQueue<u32> = MpmcQueue::new(2);
        q.try_enqueue(1).unwrap();
        q.try_enqueue(2).unwrap();
        assert_eq!(q.try_enqueue(3), Err(QueueFull(3)));
        assert_eq!(q.try_dequeue().unwrap(), 1);
        q.try_enqueue(3).unwrap();
    }

    #[test]
    #[should_panic]
    fn capacity_must_be_power_of_two() {
        let _: MpmcQueue<u32> = MpmcQueue::new(3);
    }

    /// No loss, no duplication across many producers and consumers, at
    /// the smallest legal capacity. Mirrors §8 invariant 1.
    #[test]
    fn mpmc_stress_no_loss_no_duplication() {
        for &capacity in &[2usize, 512] {
            let q: MpmcQueue<u64> = MpmcQueue::new(capacity);
            let total = 20_000u64;
            let producers = 4u64;
            let consumers = 4usize;
            let next = AtomicUsize::new(0);

            thread::scope(|scope| {
                for p in 0..producers {
                    let q = &q;
                    let next = &next;
                    scope.spawn(move || {
                        let per_producer = total / producers;
                        let start = p * per_producer;
                        for i in start..start + per_producer {
                            loop {
                                if q.try_enqueue(i).is_ok() {
                                    break;
                                }
                                std::hint::spin_loop();
                            }
                        }
                        let _ = next;
                    });
                }

                let consumed = AtomicU64::new(0);
                let results: Vec<_> = (0..consumers)
                    .map(|_| {
                        let q = &q;
                        let consumed = &consumed;
                        scope.spawn(move || {
                            let mut seen = Vec::new();
                            let mut empties_in_a_row = 0;
                            // Gate draining on the shared total-consumed count,
                            // not a per-consumer quota: a shared queue gives no
                            // guarantee each consumer gets an even share, so a
                            // consumer that happens to drain fewer than
                            // `total / consumers` items must still be able to
                            // stop once every item has been accounted for.
                            while consumed.load(Ordering::Relaxed) < total || empties_in_a_row < 10_000 {
                                match q.try_dequeue() {
                                    Ok(v) => {
                                        seen.push(v);
                                        consumed.fetch_add(1, Ordering::Relaxed);
                                        empties_in_a_row = 0;
                                    }
                                    Err(QueueEmpty) => {
                                        empties_in_a_row += 1;
                                        std::hint::spin_loop();
                                    }
                                }
                            }
                            seen
                        })
                    })
                    .collect();

                let mut all = HashSet::new();
                let mut count = 0u64;
                for handle in results {
                    for v in handle.join().unwrap() {
                        assert!(all.insert(v), "duplicate dequeue of {v}");
                        count += 1;
                    }
                }
                assert_eq!(count, total);
            });
        }
    }
}
