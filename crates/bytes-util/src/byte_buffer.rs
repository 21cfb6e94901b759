use bytes::{Buf, BytesMut};

/// Minimum amount of spare capacity the buffer keeps available before an
/// [`ByteBuffer::append_from_reader`] call, doubling capacity otherwise.
const MIN_SPARE: usize = 4 * 1024;

/// A growable, append-from-reader byte buffer with an in-place discard-prefix operation.
///
/// Backed by [`bytes::BytesMut`], mirroring the receive-buffer idiom used by
/// the session drivers this crate descends from: data accumulates at the
/// tail and is consumed from the front via [`ByteBuffer::discard`].
#[derive(Debug, Default)]
pub struct ByteBuffer {
    inner: BytesMut,
}

impl ByteBuffer {
    pub fn new() -> Self {
        Self { inner: BytesMut::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: BytesMut::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.inner
    }

    /// Ensures at least [`MIN_SPARE`] bytes of spare capacity before a read, doubling
    /// the allocation if there is less.
    fn reserve_for_read(&mut self) {
        if self.inner.capacity() - self.inner.len() < MIN_SPARE {
            let new_capacity = (self.inner.capacity().max(MIN_SPARE)) * 2;
            self.inner.reserve(new_capacity - self.inner.len());
        }
    }

    /// Performs one bounded synchronous read from `reader` into spare capacity.
    ///
    /// Returns `Ok(0)` on EOF, `Ok(n)` for `n` bytes appended, mirroring the
    /// `append_from_fd` contract of returning the number of bytes transferred
    /// (errors are carried by `Result` rather than a sentinel `-1`).
    pub fn append_from_reader<R: std::io::Read>(&mut self, reader: &mut R) -> std::io::Result<usize> {
        self.reserve_for_read();
        let before = self.inner.len();
        let spare = self.inner.spare_capacity_mut();
        // SAFETY: we only ever read into bytes the reader promises to initialise via the
        // return value; uninitialised slack past what was actually read is never exposed
        // because we only advance `set_len` by the reported byte count below.
        let spare: &mut [u8] = unsafe { std::slice::from_raw_parts_mut(spare.as_mut_ptr().cast(), spare.len()) };
        let n = reader.read(spare)?;
        // SAFETY: the first `n` bytes of `spare` were just initialised by `reader.read`.
        unsafe { self.inner.set_len(before + n) };
        Ok(n)
    }

    /// Appends a complete slice, growing capacity as needed. Used by the async read path,
    /// which already has a fully-read chunk in hand rather than a raw fd to read from.
    pub fn append_slice(&mut self, data: &[u8]) {
        self.inner.extend_from_slice(data);
    }

    /// Discards the first `n` bytes, shifting the remaining tail down in place.
    ///
    /// # Panics
    /// Panics if `n` exceeds the current length, matching the source's assertion.
    pub fn discard(&mut self, n: usize) {
        assert!(n <= self.inner.len(), "discard({n}) exceeds buffer length {}", self.inner.len());
        self.inner.advance(n);
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn append_then_discard_prefix() {
        let mut buf = ByteBuffer::new();
        let mut src = Cursor::new(vec![1u8, 2, 3, 4, 5]);
        let n = buf.append_from_reader(&mut src).unwrap();
        assert_eq!(n, 5);
        assert_eq!(buf.as_slice(), &[1, 2, 3, 4, 5]);

        buf.discard(2);
        assert_eq!(buf.as_slice(), &[3, 4, 5]);
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn append_from_reader_reports_eof() {
        let mut buf = ByteBuffer::new();
        let mut src = Cursor::new(Vec::<u8>::new());
        let n = buf.append_from_reader(&mut src).unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    #[should_panic]
    fn discard_past_length_panics() {
        let mut buf = ByteBuffer::new();
        buf.append_slice(&[1, 2]);
        buf.discard(3);
    }
}
