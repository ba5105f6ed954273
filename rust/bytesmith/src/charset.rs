//! The text codec collaborator: named charsets for encoding text to bytes
//! and decoding bytes back to text.
//!
//! Charset tables are not implemented here; everything delegates to the
//! [`encoding_rs`] registry. The one exception is the *encode* direction for
//! UTF-16: the WHATWG Encoding Standard (and therefore `encoding_rs`)
//! defines no UTF-16 encoders, so UTF-16BE/LE encoding packs the
//! [`str::encode_utf16`] code units directly, big- or little-endian, with no
//! byte-order mark.

use std::fmt;

use bytesmith_common::Result;
use bytesmith_common::error::Error;
use encoding_rs::Encoding;

/// A named text encoding.
///
/// Obtain one from the statics in this module ([`UTF_8`], [`UTF_16BE`],
/// [`UTF_16LE`], [`WINDOWS_1252`]) or by WHATWG label via
/// [`Charset::for_label`].
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Charset {
    encoding: &'static Encoding,
}

/// The UTF-8 charset.
pub static UTF_8: Charset = Charset {
    encoding: &encoding_rs::UTF_8_INIT,
};

/// The UTF-16 big-endian charset. Encodes without a byte-order mark.
pub static UTF_16BE: Charset = Charset {
    encoding: &encoding_rs::UTF_16BE_INIT,
};

/// The UTF-16 little-endian charset. Encodes without a byte-order mark.
pub static UTF_16LE: Charset = Charset {
    encoding: &encoding_rs::UTF_16LE_INIT,
};

/// The windows-1252 charset, the WHATWG superset of ISO-8859-1 and US-ASCII.
pub static WINDOWS_1252: Charset = Charset {
    encoding: &encoding_rs::WINDOWS_1252_INIT,
};

impl Charset {
    /// Looks up a charset by WHATWG label, e.g. `"utf-8"`, `"utf-16be"`,
    /// `"latin1"`. Matching is ASCII-case-insensitive.
    pub fn for_label(label: &str) -> Result<Charset> {
        Encoding::for_label(label.trim().as_bytes())
            .map(|encoding| Charset { encoding })
            .ok_or_else(|| Error::unsupported_charset(label))
    }

    /// The canonical name of this charset.
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    pub fn is_utf8(&self) -> bool {
        self.encoding == encoding_rs::UTF_8
    }

    /// Encodes `text` under this charset.
    ///
    /// Unmappable characters are substituted rather than rejected, matching
    /// the replacement behavior of common charset APIs.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        if self.is_utf8() {
            return text.as_bytes().to_vec();
        }
        if self.encoding == encoding_rs::UTF_16BE {
            return encode_utf16_with(text, u16::to_be_bytes);
        }
        if self.encoding == encoding_rs::UTF_16LE {
            return encode_utf16_with(text, u16::to_le_bytes);
        }
        let (encoded, _, _) = self.encoding.encode(text);
        encoded.into_owned()
    }

    /// Decodes `bytes` under this charset.
    ///
    /// Malformed input is replaced with U+FFFD; decoding never fails. No
    /// byte-order-mark sniffing is performed, the charset is taken at its
    /// word.
    pub fn decode(&self, bytes: &[u8]) -> String {
        if self.is_utf8() {
            return String::from_utf8_lossy(bytes).into_owned();
        }
        let (decoded, _) = self.encoding.decode_without_bom_handling(bytes);
        decoded.into_owned()
    }
}

fn encode_utf16_with(text: &str, pack: fn(u16) -> [u8; 2]) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for unit in text.encode_utf16() {
        out.extend_from_slice(&pack(unit));
    }
    out
}

impl fmt::Debug for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Charset").field(&self.name()).finish()
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
