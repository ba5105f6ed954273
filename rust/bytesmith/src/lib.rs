//! Immutable byte sequences and a reusable builder for constructing them.
//!
//! [`Bytes`] is an immutable wrapper around a byte buffer, modeled after an
//! immutable string type. It always copies on creation and never lets its
//! internal buffer escape mutably, which makes it safe to share between
//! components and to use as a map key. [`BytesBuilder`] is the mutable
//! counterpart for accumulating content incrementally; [`ByteSequence`] is
//! the capability contract implemented by both.

pub mod builder;
pub mod bytes;
pub mod charset;
pub mod sequence;

pub use builder::BytesBuilder;
pub use bytes::Bytes;
pub use charset::Charset;
pub use sequence::ByteSequence;
