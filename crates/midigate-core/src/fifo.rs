//! Wait-free single-producer single-consumer FIFO.
//!
//! [`Fifo`] transports fixed-size records from an asynchronous event thread
//! to a deadline-bound render thread. Slots are preallocated at construction
//! and reused in place; neither side ever blocks, allocates, or spins.
//!
//! The queue is split into a [`Producer`] and a [`Consumer`] half at
//! construction. Each half is `Send` but cannot be cloned, so the
//! one-producer/one-consumer contract is enforced by ownership rather than
//! by runtime checks.
//!
//! Writes are a two-step reserve/commit protocol: [`Producer::try_write`]
//! reserves the next free slot (no side effect on failure), and
//! [`WriteSlot::commit`] publishes it with a release store after the record
//! is fully written, so the consumer can never observe a partially written
//! record. Reads mirror this with [`Consumer::try_read`] and
//! [`ReadSlot::release`]; dropping a `ReadSlot` without releasing leaves
//! the record at the head of the queue.

use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Cache line size used to keep the two cursors from sharing a line.
const CACHE_LINE_SIZE: usize = 64;

/// Fixed-capacity SPSC queue storage shared by the two halves.
///
/// The cursors are monotonically increasing logical positions; the physical
/// slot is `position & mask`. Capacity is rounded up to a power of two so
/// the mask is a single AND.
#[repr(C)]
pub struct Fifo<T> {
    slots: Box<[UnsafeCell<T>]>,
    mask: usize,
    /// Producer cursor: next logical position to write.
    write_pos: AtomicUsize,
    /// Keeps the cursors on separate cache lines.
    _pad: [u8; CACHE_LINE_SIZE],
    /// Consumer cursor: next logical position to read.
    read_pos: AtomicUsize,
}

// SAFETY: slot access is mediated by the cursor protocol. The producer only
// writes the slot at `write_pos` before publishing it with a release store,
// and only after an acquire load of `read_pos` shows the slot is no longer
// in the consumer's window. The consumer only reads slots in
// `[read_pos, write_pos)` after an acquire load of `write_pos`. The two
// windows never overlap, so `&self` access from exactly one producer thread
// and one consumer thread is race-free for any `T: Send`.
unsafe impl<T: Send> Send for Fifo<T> {}
// SAFETY: see above.
unsafe impl<T: Send> Sync for Fifo<T> {}

impl<T: Copy + Default> Fifo<T> {
    /// Create a queue and split it into its producer and consumer halves.
    ///
    /// `capacity` is rounded up to the next power of two (minimum 1). The
    /// slot array is allocated here, once; nothing on either half ever
    /// allocates afterwards.
    pub fn with_capacity(capacity: usize) -> (Producer<T>, Consumer<T>) {
        let capacity = capacity.max(1).next_power_of_two();
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || UnsafeCell::new(T::default()));

        let fifo = Arc::new(Fifo {
            slots: slots.into_boxed_slice(),
            mask: capacity - 1,
            write_pos: AtomicUsize::new(0),
            _pad: [0; CACHE_LINE_SIZE],
            read_pos: AtomicUsize::new(0),
        });

        (
            Producer {
                fifo: Arc::clone(&fifo),
            },
            Consumer { fifo },
        )
    }
}

impl<T> Fifo<T> {
    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

/// The writing half of a [`Fifo`]. Exactly one thread may own it.
pub struct Producer<T> {
    fifo: Arc<Fifo<T>>,
}

impl<T> Producer<T> {
    /// Reserve the next free slot for writing.
    ///
    /// Returns `None` when the queue is full; a failed reservation has no
    /// side effect. The caller must fill the slot and then call
    /// [`WriteSlot::commit`]; dropping the slot uncommitted abandons the
    /// reservation.
    #[inline]
    pub fn try_write(&mut self) -> Option<WriteSlot<'_, T>> {
        let write = self.fifo.write_pos.load(Ordering::Relaxed);
        let read = self.fifo.read_pos.load(Ordering::Acquire);
        if write.wrapping_sub(read) == self.fifo.capacity() {
            return None;
        }

        let index = write & self.fifo.mask;
        // SAFETY: `write` is outside the consumer's read window (checked
        // above with an acquire load of `read_pos`), and this producer is
        // the only writer, so no other reference to this slot exists.
        let slot = unsafe { &mut *self.fifo.slots[index].get() };

        Some(WriteSlot {
            fifo: &self.fifo,
            position: write,
            slot,
        })
    }

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.fifo.capacity()
    }

    /// Returns true if a reservation would currently fail.
    #[inline]
    pub fn is_full(&self) -> bool {
        let write = self.fifo.write_pos.load(Ordering::Relaxed);
        let read = self.fifo.read_pos.load(Ordering::Acquire);
        write.wrapping_sub(read) == self.fifo.capacity()
    }
}

/// A reserved, writable slot. Publish with [`commit`](Self::commit).
pub struct WriteSlot<'a, T> {
    fifo: &'a Fifo<T>,
    position: usize,
    slot: &'a mut T,
}

impl<T> WriteSlot<'_, T> {
    /// Publish the record to the consumer.
    ///
    /// The release store orders all writes to the slot before the cursor
    /// update, so the consumer never sees a half-written record.
    #[inline]
    pub fn commit(self) {
        self.fifo
            .write_pos
            .store(self.position.wrapping_add(1), Ordering::Release);
    }
}

impl<T> Deref for WriteSlot<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        self.slot
    }
}

impl<T> DerefMut for WriteSlot<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        self.slot
    }
}

/// The reading half of a [`Fifo`]. Exactly one thread may own it.
pub struct Consumer<T> {
    fifo: Arc<Fifo<T>>,
}

impl<T> Consumer<T> {
    /// Borrow the oldest unread record.
    ///
    /// Returns `None` when the queue is empty. Call [`ReadSlot::release`]
    /// after copying out what is needed; dropping the slot without
    /// releasing leaves the record queued for the next read.
    #[inline]
    pub fn try_read(&mut self) -> Option<ReadSlot<'_, T>> {
        let read = self.fifo.read_pos.load(Ordering::Relaxed);
        let write = self.fifo.write_pos.load(Ordering::Acquire);
        if read == write {
            return None;
        }

        let index = read & self.fifo.mask;
        // SAFETY: `read < write` was established with an acquire load of
        // `write_pos`, so the producer has fully published this slot and
        // will not touch it again until `read_pos` moves past it.
        let slot = unsafe { &*self.fifo.slots[index].get() };

        Some(ReadSlot {
            fifo: &self.fifo,
            position: read,
            slot,
        })
    }

    /// Number of records currently queued.
    #[inline]
    pub fn len(&self) -> usize {
        let read = self.fifo.read_pos.load(Ordering::Relaxed);
        let write = self.fifo.write_pos.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }

    /// Returns true if no records are queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.fifo.capacity()
    }
}

/// A borrowed, unread record. Free the slot with [`release`](Self::release).
pub struct ReadSlot<'a, T> {
    fifo: &'a Fifo<T>,
    position: usize,
    slot: &'a T,
}

impl<T> ReadSlot<'_, T> {
    /// Mark the record consumed and return its slot to the producer.
    ///
    /// The slot's contents become undefined the instant a subsequent
    /// reservation reuses it, so copy everything out before releasing.
    #[inline]
    pub fn release(self) {
        self.fifo
            .read_pos
            .store(self.position.wrapping_add(1), Ordering::Release);
    }
}

impl<T> Deref for ReadSlot<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        self.slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let (mut producer, mut consumer) = Fifo::<u32>::with_capacity(8);

        for value in 0..5u32 {
            let mut slot = producer.try_write().unwrap();
            *slot = value;
            slot.commit();
        }

        for expected in 0..5u32 {
            let slot = consumer.try_read().unwrap();
            assert_eq!(*slot, expected);
            slot.release();
        }
        assert!(consumer.try_read().is_none());
    }

    #[test]
    fn test_capacity_bound() {
        let (mut producer, mut consumer) = Fifo::<u32>::with_capacity(4);

        for value in 0..4u32 {
            let mut slot = producer.try_write().unwrap();
            *slot = value;
            slot.commit();
        }

        // The (capacity + 1)-th reservation fails and has no side effect.
        assert!(producer.is_full());
        assert!(producer.try_write().is_none());

        // The first `capacity` records are intact.
        for expected in 0..4u32 {
            let slot = consumer.try_read().unwrap();
            assert_eq!(*slot, expected);
            slot.release();
        }
    }

    #[test]
    fn test_abandoned_reservation_has_no_effect() {
        let (mut producer, mut consumer) = Fifo::<u32>::with_capacity(4);

        {
            let mut slot = producer.try_write().unwrap();
            *slot = 99;
            // Dropped without commit.
        }
        assert!(consumer.try_read().is_none());

        let mut slot = producer.try_write().unwrap();
        *slot = 1;
        slot.commit();
        let slot = consumer.try_read().unwrap();
        assert_eq!(*slot, 1);
        slot.release();
    }

    #[test]
    fn test_unreleased_read_leaves_record_queued() {
        let (mut producer, mut consumer) = Fifo::<u32>::with_capacity(4);

        let mut slot = producer.try_write().unwrap();
        *slot = 42;
        slot.commit();

        {
            let slot = consumer.try_read().unwrap();
            assert_eq!(*slot, 42);
            // Dropped without release: still at the head.
        }

        let slot = consumer.try_read().unwrap();
        assert_eq!(*slot, 42);
        slot.release();
        assert!(consumer.try_read().is_none());
    }

    #[test]
    fn test_wraparound_reuse() {
        let (mut producer, mut consumer) = Fifo::<u32>::with_capacity(2);

        // Cycle through the slots several times.
        for value in 0..10u32 {
            let mut slot = producer.try_write().unwrap();
            *slot = value;
            slot.commit();

            let slot = consumer.try_read().unwrap();
            assert_eq!(*slot, value);
            slot.release();
        }
    }

    #[test]
    fn test_capacity_rounds_to_power_of_two() {
        let (producer, _consumer) = Fifo::<u32>::with_capacity(5);
        assert_eq!(producer.capacity(), 8);

        let (producer, _consumer) = Fifo::<u32>::with_capacity(0);
        assert_eq!(producer.capacity(), 1);
    }

    /// A record wide enough that a torn read would be visible: every lane
    /// must carry the same sequence number.
    #[derive(Clone, Copy, Default)]
    struct WideRecord {
        lanes: [u64; 4],
    }

    impl WideRecord {
        fn new(seq: u64) -> Self {
            Self { lanes: [seq; 4] }
        }

        fn check(&self, seq: u64) -> bool {
            self.lanes.iter().all(|&lane| lane == seq)
        }
    }

    #[test]
    fn test_concurrent_spsc() {
        const COUNT: u64 = 50_000;
        let (mut producer, mut consumer) = Fifo::<WideRecord>::with_capacity(8);

        let writer = std::thread::spawn(move || {
            let mut seq = 0u64;
            while seq < COUNT {
                if let Some(mut slot) = producer.try_write() {
                    *slot = WideRecord::new(seq);
                    slot.commit();
                    seq += 1;
                } else {
                    std::thread::yield_now();
                }
            }
        });

        let mut expected = 0u64;
        while expected < COUNT {
            if let Some(slot) = consumer.try_read() {
                assert!(slot.check(expected), "torn or out-of-order record");
                slot.release();
                expected += 1;
            } else {
                std::thread::yield_now();
            }
        }

        writer.join().unwrap();
        assert!(consumer.is_empty());
    }
}
