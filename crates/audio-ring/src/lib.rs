//! A lock-free single-producer/single-consumer byte ring buffer.
//!
//! The producer is driven by the protocol demuxer pushing decoded PCM samples;
//! the consumer is the real-time audio engine's callback thread. Neither side
//! ever blocks or spins: [`AudioProducer::write`] returns fewer bytes than
//! requested when the ring is full, and [`AudioConsumer::read`] returns fewer
//! bytes than requested when the ring is starved. Callers are responsible for
//! logging the former and zero-padding the latter.

use std::cell::UnsafeCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct Shared {
    buf: UnsafeCell<Box<[u8]>>,
    capacity: usize,
    /// Bytes currently occupied. Producer publishes with `Release`, consumer
    /// observes with `Acquire` and publishes its own decrement the same way.
    size: AtomicUsize,
}

// SAFETY: `buf` is only ever written in the byte range owned by the producer
// (the free region) and only ever read in the byte range owned by the
// consumer (the occupied region); `size` is the single point of handoff
// between the two and is always updated after the corresponding memcpy.
unsafe impl Sync for Shared {}

/// Creates a ring of the given byte capacity, returning its producer and consumer halves.
pub fn ring(capacity: usize) -> (AudioProducer, AudioConsumer) {
    let shared = Arc::new(Shared {
        buf: UnsafeCell::new(vec![0u8; capacity].into_boxed_slice()),
        capacity,
        size: AtomicUsize::new(0),
    });
    (
        AudioProducer {
            shared: shared.clone(),
            write_idx: 0,
        },
        AudioConsumer { shared, read_idx: 0 },
    )
}

/// The producer half of an [`AudioProducer`]/[`AudioConsumer`] pair.
///
/// Owned by whatever decodes PCM out of the protocol stream; `write_idx` is
/// only ever touched from this side.
pub struct AudioProducer {
    shared: Arc<Shared>,
    write_idx: usize,
}

/// The consumer half, owned by the real-time audio callback thread.
pub struct AudioConsumer {
    shared: Arc<Shared>,
    read_idx: usize,
}

impl AudioProducer {
    /// Non-blocking write. Returns the number of bytes actually copied, which
    /// is less than `src.len()` when the ring doesn't have enough free space;
    /// the excess is simply dropped, matching the source's overflow behaviour.
    pub fn write(&mut self, src: &[u8]) -> usize {
        let capacity = self.shared.capacity;
        if capacity == 0 || src.is_empty() {
            return 0;
        }

        let occupied = self.shared.size.load(Ordering::Acquire);
        let free = capacity - occupied;
        let n = src.len().min(free);
        if n == 0 {
            return 0;
        }

        // SAFETY: the producer only ever writes into the `n <= free` bytes
        // starting at `write_idx`, which the consumer cannot be reading
        // (those bytes aren't counted in `size` yet).
        let buf = unsafe { &mut *self.shared.buf.get() };
        let first_run = (capacity - self.write_idx).min(n);
        buf[self.write_idx..self.write_idx + first_run].copy_from_slice(&src[..first_run]);
        if n > first_run {
            buf[..n - first_run].copy_from_slice(&src[first_run..n]);
        }

        self.write_idx = (self.write_idx + n) % capacity;
        self.shared.size.fetch_add(n, Ordering::Release);
        n
    }

    /// Ring capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }
}

impl AudioConsumer {
    /// Non-blocking read. Returns the number of bytes actually copied, which
    /// is less than `dst.len()` on underflow; the caller must zero-pad the
    /// remainder of `dst` itself (this crate never allocates or blocks to do
    /// it for them, since the real-time callback must not allocate).
    pub fn read(&mut self, dst: &mut [u8]) -> usize {
        let capacity = self.shared.capacity;
        if capacity == 0 || dst.is_empty() {
            return 0;
        }

        let occupied = self.shared.size.load(Ordering::Acquire);
        let n = dst.len().min(occupied);
        if n == 0 {
            return 0;
        }

        // SAFETY: symmetric with `AudioProducer::write`: only the first `n
        // <= occupied` bytes from `read_idx` are read, and those were
        // already published by the producer's `Release` store to `size`.
        let buf = unsafe { &*self.shared.buf.get() };
        let first_run = (capacity - self.read_idx).min(n);
        dst[..first_run].copy_from_slice(&buf[self.read_idx..self.read_idx + first_run]);
        if n > first_run {
            dst[first_run..n].copy_from_slice(&buf[..n - first_run]);
        }

        self.read_idx = (self.read_idx + n) % capacity;
        self.shared.size.fetch_sub(n, Ordering::Release);
        n
    }

    /// Reads into `dst`, zero-padding any tail left by an underflow. Returns
    /// the number of bytes that were genuinely available (as opposed to
    /// padding), so the caller can account for it in a latency estimate.
    pub fn read_or_pad(&mut self, dst: &mut [u8]) -> usize {
        let n = self.read(dst);
        dst[n..].fill(0);
        n
    }

    /// Ring capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Bytes currently available to read, observed with `Acquire`.
    pub fn available(&self) -> usize {
        self.shared.size.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let (mut tx, mut rx) = ring(16);
        let written = tx.write(b"hello");
        assert_eq!(written, 5);

        let mut out = [0u8; 5];
        let read = rx.read(&mut out);
        assert_eq!(read, 5);
        assert_eq!(&out, b"hello");
    }

    #[test]
    fn write_wraps_around_in_two_segments() {
        let (mut tx, mut rx) = ring(4);
        assert_eq!(tx.write(&[1, 2, 3]), 3);
        let mut buf = [0u8; 2];
        assert_eq!(rx.read(&mut buf), 2);
        assert_eq!(buf, [1, 2]);

        // write_idx is now at 3; this write must wrap: one byte at index 3, two at 0..2.
        assert_eq!(tx.write(&[4, 5, 6]), 3);

        let mut out = [0u8; 4];
        assert_eq!(rx.read(&mut out), 4);
        assert_eq!(out, [3, 4, 5, 6]);
    }

    #[test]
    fn overflow_truncates_write() {
        let (mut tx, _rx) = ring(4);
        assert_eq!(tx.write(&[1, 2, 3, 4, 5]), 4);
    }

    #[test]
    fn underflow_truncates_read_and_pad_zero_fills_tail() {
        let (mut tx, mut rx) = ring(960);
        assert_eq!(tx.write(&[0xAAu8; 200]), 200);

        let mut out = [0xFFu8; 960];
        let actual = rx.read_or_pad(&mut out);
        assert_eq!(actual, 200);
        assert!(out[..200].iter().all(|&b| b == 0xAA));
        assert!(out[200..].iter().all(|&b| b == 0));
        assert_eq!(rx.available(), 0);
    }

    #[test]
    fn byte_count_invariant_holds_across_interleaved_ops() {
        let (mut tx, mut rx) = ring(8);
        let mut total_written = 0usize;
        let mut total_read = 0usize;

        for i in 0..100u8 {
            let chunk = [i; 3];
            total_written += tx.write(&chunk);
            assert_eq!(total_written - total_read, rx.available());

            let mut out = [0u8; 2];
            total_read += rx.read(&mut out);
            assert_eq!(total_written - total_read, rx.available());
            assert!(rx.available() <= 8);
        }
    }
}
