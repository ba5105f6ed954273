//! The immutable byte-sequence value type.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::{self, Cursor, Write};
use std::ops::Deref;
use std::sync::atomic::AtomicI32;
use std::sync::atomic::Ordering::Relaxed;
use std::sync::{Arc, LazyLock, OnceLock};

use crate::charset::Charset;
use crate::sequence::{self, ByteSequence, Iter};

/// An immutable sequence of bytes.
///
/// `Bytes` is a byte analog of an immutable string: it always copies on
/// creation when the source is borrowed, and it never lets its internal
/// buffer escape mutably. All accessors return copies or read-only views,
/// so a `Bytes` can be handed between components, stored as a map key, and
/// ordered or hashed without defensive copies on either side.
///
/// Cloning is cheap: clones share the underlying buffer (and its caches)
/// behind an [`Arc`]. The buffer itself is exclusively owned by that shared
/// inner value for its entire lifetime.
///
/// The zero-length sequence is a process-wide singleton, [`Bytes::empty`];
/// every zero-length construction returns it without allocating.
#[derive(Clone)]
pub struct Bytes {
    inner: Arc<Inner>,
}

struct Inner {
    data: Box<[u8]>,
    /// Cached content hash; 0 means "not yet computed". 0 is also a valid
    /// hash for some inputs, which makes those inputs recompute on every
    /// call. Accepted ambiguity, never an incorrectness.
    hash: AtomicI32,
    /// Cached UTF-8 decoding of `data`, populated on first request (or
    /// pre-seeded when constructed from owned text). A plain once-cell
    /// stands in for a collectable weak cache: the value is idempotent and
    /// cheap to recompute, so weakness would only ever be a memory hint.
    utf8: OnceLock<String>,
}

impl Inner {
    fn new(data: Box<[u8]>) -> Inner {
        Inner {
            data,
            hash: AtomicI32::new(0),
            utf8: OnceLock::new(),
        }
    }

    fn with_utf8(data: Box<[u8]>, text: String) -> Inner {
        let inner = Inner::new(data);
        let _ = inner.utf8.set(text);
        inner
    }
}

static EMPTY: LazyLock<Bytes> =
    LazyLock::new(|| Bytes::from_inner(Inner::new(Vec::new().into_boxed_slice())));

impl Bytes {
    fn from_inner(inner: Inner) -> Bytes {
        Bytes {
            inner: Arc::new(inner),
        }
    }

    /// Returns the shared zero-length instance.
    pub fn empty() -> Bytes {
        EMPTY.clone()
    }

    /// Creates a `Bytes` holding a copy of `data`.
    ///
    /// A sub-range of a larger buffer is copied by slicing the source:
    /// `Bytes::copy_from_slice(&data[offset..offset + len])`.
    pub fn copy_from_slice(data: &[u8]) -> Bytes {
        if data.is_empty() {
            return Bytes::empty();
        }
        Bytes::from_inner(Inner::new(data.to_vec().into_boxed_slice()))
    }

    /// Creates a `Bytes` by encoding `text` under the given charset.
    ///
    /// When the charset is UTF-8, the text is retained as the pre-seeded
    /// decoded-text cache, since it is already known.
    pub fn encode(text: &str, charset: Charset) -> Bytes {
        if text.is_empty() {
            return Bytes::empty();
        }
        if charset.is_utf8() {
            return Bytes::from(text);
        }
        Bytes::from(charset.encode(text))
    }

    /// Creates a `Bytes` holding a copy of the remaining content of a
    /// positioned read-only view, without altering the view's position.
    pub fn from_cursor<T: AsRef<[u8]>>(cursor: &Cursor<T>) -> Bytes {
        let slice = cursor.get_ref().as_ref();
        let pos = usize::try_from(cursor.position())
            .unwrap_or(usize::MAX)
            .min(slice.len());
        Bytes::copy_from_slice(&slice[pos..])
    }

    /// Returns the length of the sequence.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.data.len()
    }

    /// Returns `true` if the sequence is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.data.is_empty()
    }

    /// Returns a read-only view of the content.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.inner.data
    }

    /// Returns a fresh copy of the content. Mutating the returned vector
    /// never affects this instance.
    pub fn to_vec(&self) -> Vec<u8> {
        self.inner.data.to_vec()
    }

    /// Returns a readable, seekable source over the content.
    ///
    /// The cursor is backed by a copy-free clone of this handle; its
    /// position is its own and never affects the source.
    pub fn to_cursor(&self) -> Cursor<Bytes> {
        Cursor::new(self.clone())
    }

    /// Writes the full content to `out`.
    ///
    /// Failures of the sink are propagated unmodified; nothing is retried.
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(&self.inner.data)
    }

    /// Decodes the content as UTF-8, caching the result.
    ///
    /// Malformed sequences decode to U+FFFD. Repeated calls return the same
    /// cached value; concurrent first calls may decode twice, with one
    /// result discarded.
    pub fn as_utf8(&self) -> &str {
        self.inner
            .utf8
            .get_or_init(|| String::from_utf8_lossy(&self.inner.data).into_owned())
    }

    /// Decodes the content under the given charset.
    ///
    /// UTF-8 requests are served from (and populate) the decoded-text
    /// cache; other charsets decode through the codec collaborator on every
    /// call.
    pub fn decode(&self, charset: Charset) -> String {
        if charset.is_utf8() {
            return self.as_utf8().to_owned();
        }
        charset.decode(&self.inner.data)
    }

    /// Returns the cached content hash, computing it on first use.
    ///
    /// The hash is order-sensitive over the full content and stable for the
    /// lifetime of the process: content-equal instances hash equal. A
    /// cached value of 0 is indistinguishable from "not yet computed", so a
    /// sequence whose true hash is 0 recomputes on every call.
    pub fn hash_code(&self) -> i32 {
        let cached = self.inner.hash.load(Relaxed);
        if cached != 0 {
            return cached;
        }
        let computed = hash_bytes(&self.inner.data);
        self.inner.hash.store(computed, Relaxed);
        computed
    }

    /// Returns `true` if this sequence starts with `prefix`, byte-exact.
    pub fn begins_with(&self, prefix: &Bytes) -> bool {
        self.inner.data.starts_with(&prefix.inner.data)
    }

    /// Returns `true` if this sequence ends with `suffix`, byte-exact.
    pub fn ends_with(&self, suffix: &Bytes) -> bool {
        self.inner.data.ends_with(&suffix.inner.data)
    }

    /// Copies the entire content into `dest` starting at `dest_pos`.
    ///
    /// # Panics
    ///
    /// Panics if the copy would write outside `dest`.
    pub fn copy_to(&self, dest: &mut [u8], dest_pos: usize) {
        self.copy_range_to(0, self.len(), dest, dest_pos);
    }

    /// Copies the bytes in `[begin, end)` into `dest` starting at
    /// `dest_pos`.
    ///
    /// # Panics
    ///
    /// Panics if `begin > end`, if `end > len()`, or if the copy would
    /// write outside `dest`.
    pub fn copy_range_to(&self, begin: usize, end: usize, dest: &mut [u8], dest_pos: usize) {
        if begin > end {
            panic!("End position ({end}) occurs before begin position ({begin})");
        }
        sequence::check_end(self.len(), end);
        let count = end - begin;
        let dest_len = dest.len();
        match dest_pos.checked_add(count) {
            Some(dest_end) if dest_end <= dest_len => {
                dest[dest_pos..dest_end].copy_from_slice(&self.inner.data[begin..end]);
            }
            _ => panic!(
                "destination range [{dest_pos},{dest_pos}+{count}) not valid for \
                 destination of length {dest_len}"
            ),
        }
    }
}

/// Order-sensitive byte-array hash: seed 1, multiplier 31, signed byte
/// values. Kept for its well-known observable values.
fn hash_bytes(data: &[u8]) -> i32 {
    let mut h: i32 = 1;
    for &b in data {
        h = h.wrapping_mul(31).wrapping_add((b as i8) as i32);
    }
    h
}

impl ByteSequence for Bytes {
    #[inline]
    fn as_slice(&self) -> &[u8] {
        &self.inner.data
    }
}

impl PartialEq for Bytes {
    fn eq(&self, other: &Bytes) -> bool {
        if Arc::ptr_eq(&self.inner, &other.inner) {
            return true;
        }
        // Computed hash codes are a cheap inequality witness; they are
        // never trusted to claim equality.
        let (h1, h2) = (self.inner.hash.load(Relaxed), other.inner.hash.load(Relaxed));
        if h1 != 0 && h2 != 0 && h1 != h2 {
            return false;
        }
        sequence::content_eq(&self.inner.data, &other.inner.data)
    }
}

impl Eq for Bytes {}

impl Ord for Bytes {
    fn cmp(&self, other: &Bytes) -> Ordering {
        if Arc::ptr_eq(&self.inner, &other.inner) {
            return Ordering::Equal;
        }
        self.inner.data.cmp(&other.inner.data)
    }
}

impl PartialOrd for Bytes {
    fn partial_cmp(&self, other: &Bytes) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for Bytes {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.data.hash(state);
    }
}

impl Deref for Bytes {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        &self.inner.data
    }
}

impl AsRef<[u8]> for Bytes {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.inner.data
    }
}

impl Borrow<[u8]> for Bytes {
    #[inline]
    fn borrow(&self) -> &[u8] {
        &self.inner.data
    }
}

impl Default for Bytes {
    fn default() -> Bytes {
        Bytes::empty()
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_slice().fmt(f)
    }
}

impl fmt::Display for Bytes {
    /// Renders the UTF-8 decoding of the content.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_utf8())
    }
}

impl From<&[u8]> for Bytes {
    fn from(data: &[u8]) -> Bytes {
        Bytes::copy_from_slice(data)
    }
}

impl From<Vec<u8>> for Bytes {
    /// Takes ownership of the vector; no copy is needed since the storage
    /// was never shared.
    fn from(data: Vec<u8>) -> Bytes {
        if data.is_empty() {
            return Bytes::empty();
        }
        Bytes::from_inner(Inner::new(data.into_boxed_slice()))
    }
}

impl From<Box<[u8]>> for Bytes {
    fn from(data: Box<[u8]>) -> Bytes {
        if data.is_empty() {
            return Bytes::empty();
        }
        Bytes::from_inner(Inner::new(data))
    }
}

impl From<&str> for Bytes {
    /// Encodes as UTF-8 and pre-seeds the decoded-text cache.
    fn from(text: &str) -> Bytes {
        if text.is_empty() {
            return Bytes::empty();
        }
        Bytes::from_inner(Inner::with_utf8(
            text.as_bytes().to_vec().into_boxed_slice(),
            text.to_owned(),
        ))
    }
}

impl From<String> for Bytes {
    /// Encodes as UTF-8, retaining the string as the decoded-text cache.
    fn from(text: String) -> Bytes {
        if text.is_empty() {
            return Bytes::empty();
        }
        let data = text.as_bytes().to_vec().into_boxed_slice();
        Bytes::from_inner(Inner::with_utf8(data, text))
    }
}

impl<'a> IntoIterator for &'a Bytes {
    type Item = u8;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.bytes()
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use serde::de::{SeqAccess, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Bytes;

    impl Serialize for Bytes {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_bytes(self.as_slice())
        }
    }

    impl<'de> Deserialize<'de> for Bytes {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
            struct BytesVisitor;

            impl<'de> Visitor<'de> for BytesVisitor {
                type Value = Bytes;

                fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str("a byte array")
                }

                fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> Result<Bytes, E> {
                    Ok(Bytes::copy_from_slice(v))
                }

                fn visit_byte_buf<E: serde::de::Error>(self, v: Vec<u8>) -> Result<Bytes, E> {
                    Ok(Bytes::from(v))
                }

                fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Bytes, E> {
                    Ok(Bytes::from(v))
                }

                fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Bytes, A::Error> {
                    let mut buf = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                    while let Some(b) = seq.next_element::<u8>()? {
                        buf.push(b);
                    }
                    Ok(Bytes::from(buf))
                }
            }

            deserializer.deserialize_bytes(BytesVisitor)
        }
    }
}
