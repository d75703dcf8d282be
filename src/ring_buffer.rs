//! Bounded sample queues
//!
//! Each channel keeps its most recent samples in a [`RingBuffer`] with
//! overwrite-oldest semantics. The backing storage is a fixed
//! [`heapless::Deque`]; the logical capacity can be changed at runtime
//! anywhere in `[1, N]`.
//!
//! The producer runs in timer context while readers run in thread context, so
//! the driver wraps each buffer in a [`SampleQueue`] guarded by a
//! `critical_section::Mutex`.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

use crate::sensors::Sample;

/// Largest queue depth a channel can be configured for
pub const MAX_QUEUE_DEPTH: usize = 100;

/// Queue depth of a freshly constructed queue
pub const DEFAULT_QUEUE_DEPTH: usize = 2;

/// Requested capacity is outside `[1, N]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CapacityError;

/// Fixed-storage FIFO that overwrites its oldest entry when full
#[derive(Debug)]
pub struct RingBuffer<T, const N: usize> {
    items: Deque<T, N>,
    capacity: usize,
}

impl<T, const N: usize> RingBuffer<T, N> {
    /// Create an empty buffer with the given logical capacity
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError`] if `capacity` is zero or larger than `N`.
    pub fn new(capacity: usize) -> Result<Self, CapacityError> {
        if capacity == 0 || capacity > N {
            return Err(CapacityError);
        }
        Ok(Self {
            items: Deque::new(),
            capacity,
        })
    }

    /// Append an item, dropping the oldest one if the buffer is full
    ///
    /// Returns `true` if an item was overwritten.
    pub fn push_overwrite(&mut self, item: T) -> bool {
        let overwrote = self.items.len() >= self.capacity;
        if overwrote {
            self.items.pop_front();
        }
        // len < capacity <= N, so there is always room
        let _ = self.items.push_back(item);
        overwrote
    }

    /// Remove and return the oldest item
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Change the logical capacity
    ///
    /// When shrinking below the current fill level, the oldest items are
    /// dropped so that the newest `capacity` remain.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError`] if `capacity` is zero or larger than `N`;
    /// the buffer is left untouched.
    pub fn resize(&mut self, capacity: usize) -> Result<(), CapacityError> {
        if capacity == 0 || capacity > N {
            return Err(CapacityError);
        }
        while self.items.len() > capacity {
            self.items.pop_front();
        }
        self.capacity = capacity;
        Ok(())
    }

    /// Drop all items; the capacity is kept
    pub fn flush(&mut self) {
        self.items.clear();
    }

    /// Number of items currently stored
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the buffer holds no items
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Logical capacity
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate from oldest to newest without removing anything
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

/// A channel's sample buffer, shared between timer and thread context
pub struct SampleQueue {
    inner: Mutex<RefCell<RingBuffer<Sample, MAX_QUEUE_DEPTH>>>,
}

impl SampleQueue {
    /// Create an empty queue with the default depth
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(RingBuffer {
                items: Deque::new(),
                capacity: DEFAULT_QUEUE_DEPTH,
            })),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut RingBuffer<Sample, MAX_QUEUE_DEPTH>) -> R) -> R {
        critical_section::with(|cs| f(&mut *self.inner.borrow_ref_mut(cs)))
    }

    /// Append a sample, overwriting the oldest if full
    pub fn push_overwrite(&self, sample: Sample) -> bool {
        self.with(|buffer| buffer.push_overwrite(sample))
    }

    /// Remove and return the oldest sample
    pub fn pop(&self) -> Option<Sample> {
        self.with(RingBuffer::pop)
    }

    /// Move up to `out.len()` samples into `out`, oldest first
    ///
    /// Returns the number of samples written.
    pub fn drain_into(&self, out: &mut [Sample]) -> usize {
        self.with(|buffer| {
            let mut count = 0;
            for slot in out.iter_mut() {
                match buffer.pop() {
                    Some(sample) => {
                        *slot = sample;
                        count += 1;
                    }
                    None => break,
                }
            }
            count
        })
    }

    /// Change the queue depth
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError`] outside `[1, MAX_QUEUE_DEPTH]`.
    pub fn resize(&self, capacity: usize) -> Result<(), CapacityError> {
        self.with(|buffer| buffer.resize(capacity))
    }

    /// Drop all queued samples
    pub fn flush(&self) {
        self.with(RingBuffer::flush);
    }

    /// Number of queued samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.with(|buffer| buffer.len())
    }

    /// Whether the queue is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.with(|buffer| buffer.is_empty())
    }

    /// Current queue depth
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.with(|buffer| buffer.capacity())
    }
}

impl Default for SampleQueue {
    fn default() -> Self {
        Self::new()
    }
}
