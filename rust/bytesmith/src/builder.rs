//! A reusable, growable accumulator for building [`Bytes`] values.

use std::fmt;
use std::io::{self, Cursor, Read, Write};

use bytesmith_common::Result;
use bytesmith_common::error::Error;

use crate::bytes::Bytes;
use crate::charset::Charset;
use crate::sequence::ByteSequence;

/// An easy, efficient, reusable mechanism for building immutable [`Bytes`].
///
/// Content is accumulated through the `append_*`/[`push`](BytesBuilder::push)
/// methods, which grow the internal buffer by doubling as needed, and turned
/// into an immutable value with [`to_bytes`](BytesBuilder::to_bytes), which
/// copies only the populated prefix. The builder can keep being mutated and
/// finalized again without affecting anything produced earlier.
///
/// The builder is single-owner: all mutation takes `&mut self` and there is
/// no internal synchronization.
pub struct BytesBuilder {
    buf: Vec<u8>,
}

impl BytesBuilder {
    /// Initial capacity used by [`BytesBuilder::new`].
    pub const DEFAULT_CAPACITY: usize = 32;

    /// Creates a builder with the default initial capacity.
    pub fn new() -> BytesBuilder {
        BytesBuilder::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a builder with the specified initial capacity.
    pub fn with_capacity(capacity: usize) -> BytesBuilder {
        BytesBuilder {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of bytes accumulated so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if nothing has been accumulated.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Returns the capacity of the internal buffer.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    fn ensure_capacity(&mut self, min: usize) {
        let capacity = self.buf.capacity();
        if capacity < min {
            let new_capacity = (capacity * 2).max(min);
            self.buf.reserve_exact(new_capacity - self.buf.len());
        }
    }

    /// Appends a single byte. Callers holding a wider integer keep its low
    /// 8 bits with an `as u8` cast.
    pub fn push(&mut self, b: u8) -> &mut Self {
        self.ensure_capacity(self.buf.len() + 1);
        self.buf.push(b);
        self
    }

    /// Appends a slice of bytes. A sub-range of a larger buffer is appended
    /// by slicing the source.
    pub fn append_slice(&mut self, bytes: &[u8]) -> &mut Self {
        self.ensure_capacity(self.buf.len() + bytes.len());
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Appends the content of a [`Bytes`].
    pub fn append_bytes(&mut self, bytes: &Bytes) -> &mut Self {
        self.append_slice(bytes.as_slice())
    }

    /// Encodes `text` as UTF-8 and appends the resulting bytes.
    pub fn append_str(&mut self, text: &str) -> &mut Self {
        self.append_slice(text.as_bytes())
    }

    /// Encodes `text` under the given charset and appends the resulting
    /// bytes.
    pub fn append_encoded(&mut self, text: &str, charset: Charset) -> &mut Self {
        if charset.is_utf8() {
            return self.append_str(text);
        }
        let encoded = charset.encode(text);
        self.append_slice(&encoded)
    }

    /// Appends the remaining content of a positioned read-only view without
    /// altering the view's position.
    pub fn append_cursor<T: AsRef<[u8]>>(&mut self, cursor: &Cursor<T>) -> &mut Self {
        let slice = cursor.get_ref().as_ref();
        let pos = usize::try_from(cursor.position())
            .unwrap_or(usize::MAX)
            .min(slice.len());
        self.append_slice(&slice[pos..])
    }

    /// Appends exactly `length` bytes read from `reader`.
    ///
    /// A failure of the reader is propagated immediately and never retried.
    /// The builder's state after a failed append is unspecified; discard the
    /// builder on error.
    pub fn append_reader<R: Read>(&mut self, mut reader: R, length: usize) -> Result<&mut Self> {
        self.ensure_capacity(self.buf.len() + length);
        let start = self.buf.len();
        self.buf.resize(start + length, 0);
        match reader.read_exact(&mut self.buf[start..]) {
            Ok(()) => Ok(self),
            Err(e) => {
                self.buf.truncate(start);
                Err(Error::io("append_reader", e))
            }
        }
    }

    /// Sets the logical length, from which appending will continue.
    ///
    /// Shrinks or grows the builder. Growing past the current capacity
    /// resizes the buffer exactly to `new_len` (an explicit resize, not an
    /// append, so no doubling); growing past the current length zero-fills
    /// the newly exposed bytes.
    pub fn set_len(&mut self, new_len: usize) {
        if new_len > self.buf.capacity() {
            let len = self.buf.len();
            self.buf.reserve_exact(new_len - len);
        }
        self.buf.resize(new_len, 0);
    }

    /// Shortens the accumulated content to `len` bytes. Has no effect when
    /// `len` is not below the current length.
    pub fn truncate(&mut self, len: usize) {
        self.buf.truncate(len);
    }

    /// Removes all accumulated content, keeping the capacity.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Reserves capacity for at least `additional` more bytes, growing by
    /// the same doubling policy as the appends.
    pub fn reserve(&mut self, additional: usize) {
        self.ensure_capacity(self.buf.len() + additional);
    }

    /// Produces a [`Bytes`] holding a copy of exactly the accumulated
    /// content. The builder is unaffected and can be reused; later mutation
    /// never shows through previously produced values.
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.buf)
    }

    /// Consumes the builder, producing a [`Bytes`] from the accumulated
    /// content without an intermediate copy of the populated prefix.
    pub fn into_bytes(self) -> Bytes {
        Bytes::from(self.buf)
    }
}

impl ByteSequence for BytesBuilder {
    #[inline]
    fn as_slice(&self) -> &[u8] {
        &self.buf
    }
}

impl Default for BytesBuilder {
    fn default() -> BytesBuilder {
        BytesBuilder::new()
    }
}

impl Write for BytesBuilder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Debug for BytesBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BytesBuilder")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl<'a> IntoIterator for &'a BytesBuilder {
    type Item = u8;
    type IntoIter = crate::sequence::Iter<'a>;

    fn into_iter(self) -> crate::sequence::Iter<'a> {
        self.bytes()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use super::*;
    use crate::charset;

    #[test]
    fn test_new_and_with_capacity() {
        let builder = BytesBuilder::new();
        assert_eq!(builder.len(), 0);
        assert!(builder.is_empty());
        assert!(builder.capacity() >= BytesBuilder::DEFAULT_CAPACITY);

        let builder = BytesBuilder::with_capacity(0);
        assert_eq!(builder.capacity(), 0);
    }

    #[test]
    fn test_append_chaining() {
        let mut builder = BytesBuilder::new();
        builder
            .append_str("ab")
            .push(b'c')
            .append_slice(b"de")
            .append_bytes(&Bytes::from("f"));
        assert_eq!(builder.to_bytes(), Bytes::from("abcdef"));
    }

    #[test]
    fn test_growth_never_corrupts_content() {
        // Start from zero capacity and append progressively larger
        // payloads; earlier content must survive every reallocation.
        let mut builder = BytesBuilder::with_capacity(0);
        let mut expected = Vec::new();
        for round in 0..12u32 {
            let payload = vec![round as u8; 1 << round];
            builder.append_slice(&payload);
            expected.extend_from_slice(&payload);
        }
        assert_eq!(builder.len(), expected.len());
        assert_eq!(builder.to_bytes().as_slice(), expected.as_slice());
    }

    #[test]
    fn test_growth_doubles() {
        let mut builder = BytesBuilder::with_capacity(1);
        let mut last_capacity = builder.capacity();
        for i in 0..200u8 {
            builder.push(i);
            let capacity = builder.capacity();
            assert!(
                capacity == last_capacity || capacity >= last_capacity * 2,
                "capacity = {capacity}, last_capacity = {last_capacity}, i = {i}"
            );
            last_capacity = capacity;
        }
        assert_eq!(builder.len(), 200);
    }

    #[test]
    fn test_set_len_zero_fills() {
        let mut builder = BytesBuilder::new();
        builder.append_str("ab");
        builder.set_len(4);
        assert_eq!(builder.to_bytes().as_slice(), &[b'a', b'b', 0, 0]);
    }

    #[test]
    fn test_set_len_truncates() {
        let mut builder = BytesBuilder::new();
        builder.append_str("abcd");
        builder.set_len(1);
        assert_eq!(builder.to_bytes(), Bytes::from("a"));

        builder.set_len(0);
        assert_eq!(builder.to_bytes(), Bytes::empty());
    }

    #[test]
    fn test_set_len_grows_past_capacity() {
        let mut builder = BytesBuilder::with_capacity(2);
        builder.append_str("ab");
        builder.set_len(100);
        assert_eq!(builder.len(), 100);
        assert!(builder.capacity() >= 100);
        let bytes = builder.to_bytes();
        assert_eq!(&bytes.as_slice()[..2], b"ab");
        assert!(bytes.as_slice()[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_zeroes_stale_content() {
        // Bytes beyond the logical length are unspecified until set_len
        // exposes them, at which point they must read as zero.
        let mut builder = BytesBuilder::new();
        builder.append_str("sensitive");
        builder.set_len(2);
        builder.set_len(9);
        assert_eq!(builder.to_bytes().as_slice(), b"se\0\0\0\0\0\0\0");
    }

    #[test]
    fn test_to_bytes_is_reusable_and_detached() {
        let mut builder = BytesBuilder::new();
        builder.append_str("hello");
        let first = builder.to_bytes();
        builder.append_str(" world");
        let second = builder.to_bytes();

        assert_eq!(first, Bytes::from("hello"));
        assert_eq!(second, Bytes::from("hello world"));
    }

    #[test]
    fn test_to_bytes_copies_only_logical_prefix() {
        let mut builder = BytesBuilder::with_capacity(1024);
        builder.append_str("abc");
        let bytes = builder.to_bytes();
        assert_eq!(bytes.len(), 3);
        assert_eq!(bytes, Bytes::from("abc"));
    }

    #[test]
    fn test_into_bytes() {
        let mut builder = BytesBuilder::new();
        builder.append_str("consumed");
        assert_eq!(builder.into_bytes(), Bytes::from("consumed"));
    }

    #[test]
    fn test_append_encoded() {
        let mut builder = BytesBuilder::new();
        builder.append_encoded("1234", charset::UTF_16BE);
        assert_eq!(
            builder.to_bytes().as_slice(),
            &[0, b'1', 0, b'2', 0, b'3', 0, b'4']
        );

        let mut builder = BytesBuilder::new();
        builder.append_encoded("plain", charset::UTF_8);
        assert_eq!(builder.to_bytes(), Bytes::from("plain"));
    }

    #[test]
    fn test_append_cursor_leaves_position_untouched() {
        let mut cursor = Cursor::new(b"0123456789".to_vec());
        cursor.set_position(6);
        let mut builder = BytesBuilder::new();
        builder.append_str("tail: ").append_cursor(&cursor);
        assert_eq!(builder.to_bytes(), Bytes::from("tail: 6789"));
        assert_eq!(cursor.position(), 6);
    }

    #[test]
    fn test_append_reader() {
        let mut builder = BytesBuilder::new();
        builder
            .append_reader(Cursor::new(b"0123456789".to_vec()), 4)
            .unwrap()
            .append_str("!");
        assert_eq!(builder.to_bytes(), Bytes::from("0123!"));
    }

    #[test]
    fn test_append_reader_failure_is_propagated() {
        let mut builder = BytesBuilder::new();
        builder.append_str("kept");
        let err = builder
            .append_reader(Cursor::new(b"ab".to_vec()), 5)
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            bytesmith_common::error::ErrorKind::Io { .. }
        ));
    }

    #[test]
    fn test_write_impl() {
        let mut builder = BytesBuilder::new();
        write!(builder, "x = {}", 5).unwrap();
        builder.flush().unwrap();
        assert_eq!(builder.to_bytes(), Bytes::from("x = 5"));
    }

    #[test]
    fn test_sequence_view_of_live_content() {
        let mut builder = BytesBuilder::new();
        builder.append_slice(&[9, 8, 7]);
        assert_eq!(builder.len(), 3);
        assert_eq!(builder.byte_at(1), 8);
        assert_eq!(builder.bytes().collect::<Vec<u8>>(), vec![9, 8, 7]);
        assert!(builder.content_equals(&[9, 8, 7]));
        assert!(builder.compare_with(&[9, 9]) < 0);
    }

    #[test]
    fn test_clear_and_truncate() {
        let mut builder = BytesBuilder::new();
        builder.append_str("abcdef");
        builder.truncate(3);
        assert_eq!(builder.to_bytes(), Bytes::from("abc"));
        builder.truncate(10);
        assert_eq!(builder.len(), 3);

        let capacity = builder.capacity();
        builder.clear();
        assert!(builder.is_empty());
        assert_eq!(builder.capacity(), capacity);
    }

    #[test]
    fn test_randomized_appends_match_mirror() {
        let mut rng = fastrand::Rng::with_seed(0x5EED);
        let mut builder = BytesBuilder::with_capacity(0);
        let mut mirror = Vec::new();
        for _ in 0..500 {
            match rng.usize(0..4) {
                0 => {
                    let b = rng.u8(..);
                    builder.push(b);
                    mirror.push(b);
                }
                1 => {
                    let chunk: Vec<u8> = (0..rng.usize(0..64)).map(|_| rng.u8(..)).collect();
                    builder.append_slice(&chunk);
                    mirror.extend_from_slice(&chunk);
                }
                2 => {
                    let new_len = rng.usize(0..mirror.len() + 32);
                    builder.set_len(new_len);
                    mirror.resize(new_len, 0);
                }
                _ => {
                    assert_eq!(builder.to_bytes().as_slice(), mirror.as_slice());
                }
            }
        }
        assert_eq!(builder.len(), mirror.len());
        assert_eq!(builder.to_bytes().as_slice(), mirror.as_slice());
    }
}
