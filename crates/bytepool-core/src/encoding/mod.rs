//! Text ⇄ byte transcoding for a closed set of encodings.
//!
//! Every supported scheme is a variant of [`Encoding`]; alias strings are
//! normalized once through [`FromStr`] and everything after that dispatches on
//! the enum.
//!
//! ## Lengths
//!
//! Text lengths are counted the way the fixed-width encodings consume them:
//! in UTF-16 code units. [`byte_length`] is exact for `ascii`, `latin1`,
//! `ucs2` and `utf8`, and an upper bound for `base64` and `hex`, whose
//! decoders skip characters that are not part of the encoding. Callers that
//! allocate from the estimate must trust the count returned by
//! [`write_text`], not the estimate.

mod lenient;

use crate::error::{Error, Result};
use crate::view::View;
use std::fmt;
use std::str::FromStr;

/// A named text ⇄ bytes conversion scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    /// UTF-8
    #[default]
    Utf8,
    /// 7-bit ASCII; decoding keeps the low byte of each code unit
    Ascii,
    /// ISO-8859-1, also known as `binary`
    Latin1,
    /// UTF-16 little-endian code units, also known as `utf16le`
    Ucs2,
    /// Base64, standard alphabet on output, both alphabets on input
    Base64,
    /// Lowercase hexadecimal pairs
    Hex,
}

/// Accepted names, compared case-insensitively
const ALIASES: &[(&str, Encoding)] = &[
    ("utf8", Encoding::Utf8),
    ("utf-8", Encoding::Utf8),
    ("ascii", Encoding::Ascii),
    ("latin1", Encoding::Latin1),
    ("binary", Encoding::Latin1),
    ("ucs2", Encoding::Ucs2),
    ("ucs-2", Encoding::Ucs2),
    ("utf16le", Encoding::Ucs2),
    ("utf-16le", Encoding::Ucs2),
    ("base64", Encoding::Base64),
    ("hex", Encoding::Hex),
];

impl Encoding {
    /// All supported encodings
    pub const ALL: [Encoding; 6] = [
        Encoding::Utf8,
        Encoding::Ascii,
        Encoding::Latin1,
        Encoding::Ucs2,
        Encoding::Base64,
        Encoding::Hex,
    ];

    /// Returns the canonical name
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf8",
            Encoding::Ascii => "ascii",
            Encoding::Latin1 => "latin1",
            Encoding::Ucs2 => "ucs2",
            Encoding::Base64 => "base64",
            Encoding::Hex => "hex",
        }
    }

    /// Returns every accepted alias of this encoding
    pub fn aliases(&self) -> impl Iterator<Item = &'static str> + '_ {
        ALIASES
            .iter()
            .filter(move |(_, encoding)| encoding == self)
            .map(|(name, _)| *name)
    }

    /// Returns true if `name` is a supported encoding or alias
    pub fn is_encoding(name: &str) -> bool {
        name.parse::<Encoding>().is_ok()
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ALIASES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|(_, encoding)| *encoding)
            .ok_or_else(|| Error::unknown_encoding(s))
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the number of bytes `text` occupies once decoded with `encoding`.
///
/// Exact except for `base64` and `hex`, where it is an upper bound.
pub fn byte_length(text: &str, encoding: Encoding) -> usize {
    match encoding {
        Encoding::Utf8 => text.len(),
        Encoding::Ascii | Encoding::Latin1 => text.encode_utf16().count(),
        Encoding::Ucs2 => text.encode_utf16().count() * 2,
        Encoding::Base64 => base64_byte_length(text),
        Encoding::Hex => text.encode_utf16().count() >> 1,
    }
}

/// Character count minus up to two trailing `=`, times 3/4
fn base64_byte_length(text: &str) -> usize {
    let mut units = text.encode_utf16().count();
    let bytes = text.as_bytes();
    if bytes.last() == Some(&b'=') {
        units -= 1;
        if units > 1 && bytes.get(bytes.len() - 2) == Some(&b'=') {
            units -= 1;
        }
    }
    (units * 3) >> 2
}

/// Decodes `text` into `dst`, writing only whole units that fit.
///
/// Returns the number of bytes written, which may be smaller than
/// [`byte_length`] reported.
pub fn write_text(text: &str, encoding: Encoding, dst: &mut [u8]) -> usize {
    match encoding {
        Encoding::Utf8 => {
            let mut written = 0;
            for c in text.chars() {
                let width = c.len_utf8();
                if written + width > dst.len() {
                    break;
                }
                c.encode_utf8(&mut dst[written..written + width]);
                written += width;
            }
            written
        }
        Encoding::Ascii | Encoding::Latin1 => dst
            .iter_mut()
            .zip(text.encode_utf16())
            .map(|(slot, unit)| *slot = unit as u8)
            .count(),
        Encoding::Ucs2 => {
            dst.chunks_exact_mut(2)
                .zip(text.encode_utf16())
                .map(|(pair, unit)| pair.copy_from_slice(&unit.to_le_bytes()))
                .count()
                * 2
        }
        Encoding::Base64 => {
            let decoded = lenient::decode_base64(text);
            let count = decoded.len().min(dst.len());
            dst[..count].copy_from_slice(&decoded[..count]);
            count
        }
        Encoding::Hex => lenient::decode_hex_into(text, dst),
    }
}

/// Decodes `text` into a freshly allocated vector
pub fn decode(text: &str, encoding: Encoding) -> Vec<u8> {
    let mut out = vec![0; byte_length(text, encoding)];
    let written = write_text(text, encoding, &mut out);
    out.truncate(written);
    out
}

/// Encodes bytes as text; invalid sequences become U+FFFD
pub fn encode(bytes: &[u8], encoding: Encoding) -> String {
    match encoding {
        Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        Encoding::Ascii => bytes.iter().map(|&b| (b & 0x7F) as char).collect(),
        Encoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
        Encoding::Ucs2 => char::decode_utf16(
            bytes
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]])),
        )
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect(),
        Encoding::Base64 => lenient::encode_base64(bytes),
        Encoding::Hex => hex::encode(bytes),
    }
}

impl View {
    /// Encodes `[start, end)` of this view as text.
    ///
    /// Out-of-range bounds clamp: a missing or negative `start` becomes 0, a
    /// `start` at or past the end yields empty text, and a missing or too
    /// large `end` becomes the length.
    pub fn to_text(&self, encoding: Encoding, start: Option<i64>, end: Option<i64>) -> String {
        let len = self.len() as i64;
        if len == 0 {
            return String::new();
        }
        let start = match start {
            Some(s) if s >= len => return String::new(),
            Some(s) if s > 0 => s,
            _ => 0,
        };
        let end = match end {
            Some(e) if e <= 0 => return String::new(),
            Some(e) if e < len => e,
            _ => len,
        };
        if end <= start {
            return String::new();
        }
        self.read(|bytes| encode(&bytes[start as usize..end as usize], encoding))
    }

    /// Writes `text` at `offset`, limited to `length` bytes and the end of the view.
    ///
    /// Only whole encoded units are written. Returns the byte count written.
    pub fn write_str(
        &self,
        text: &str,
        offset: usize,
        length: Option<usize>,
        encoding: Encoding,
    ) -> Result<usize> {
        if offset > self.len() {
            return Err(Error::buffer_out_of_bounds(Some("offset")));
        }
        let remaining = self.len() - offset;
        let length = length.map_or(remaining, |l| l.min(remaining));
        Ok(self.write(|bytes| write_text(text, encoding, &mut bytes[offset..offset + length])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::pool::Arena;
    use pretty_assertions::assert_eq;

    fn view_of(bytes: &[u8]) -> View {
        View::whole(Arena::from_vec(bytes.to_vec()))
    }

    #[test]
    fn test_alias_normalization() {
        assert_eq!("utf-8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("UTF8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("Binary".parse::<Encoding>().unwrap(), Encoding::Latin1);
        assert_eq!("UTF-16LE".parse::<Encoding>().unwrap(), Encoding::Ucs2);
        assert_eq!("ucs-2".parse::<Encoding>().unwrap(), Encoding::Ucs2);
        assert_eq!("HEX".parse::<Encoding>().unwrap(), Encoding::Hex);
    }

    #[test]
    fn test_unknown_encoding() {
        let err = "utf-7".parse::<Encoding>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownEncoding);
        assert!(!Encoding::is_encoding(""));
        assert!(Encoding::is_encoding("latin1"));
    }

    #[test]
    fn test_aliases() {
        let aliases: Vec<_> = Encoding::Ucs2.aliases().collect();
        assert_eq!(aliases, vec!["ucs2", "ucs-2", "utf16le", "utf-16le"]);
        for encoding in Encoding::ALL {
            assert_eq!(encoding.name().parse::<Encoding>().unwrap(), encoding);
        }
    }

    #[test]
    fn test_byte_length() {
        assert_eq!(byte_length("héllo", Encoding::Utf8), 6);
        assert_eq!(byte_length("héllo", Encoding::Latin1), 5);
        assert_eq!(byte_length("héllo", Encoding::Ucs2), 10);
        assert_eq!(byte_length("😀", Encoding::Ucs2), 4);
        assert_eq!(byte_length("aGVsbG8=", Encoding::Base64), 5);
        assert_eq!(byte_length("aGk=", Encoding::Base64), 2);
        assert_eq!(byte_length("YQ==", Encoding::Base64), 1);
        assert_eq!(byte_length("abcde", Encoding::Hex), 2);
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode("héllo", Encoding::Utf8), "héllo".as_bytes().to_vec());
        assert_eq!(decode("hé", Encoding::Latin1), vec![b'h', 0xE9]);
        assert_eq!(decode("hé", Encoding::Ascii), vec![b'h', 0xE9]);
        assert_eq!(decode("hi", Encoding::Ucs2), vec![b'h', 0, b'i', 0]);
        assert_eq!(decode("aGk=", Encoding::Base64), b"hi".to_vec());
        assert_eq!(decode("6869zz", Encoding::Hex), b"hi".to_vec());
    }

    #[test]
    fn test_write_text_whole_units_only() {
        let mut dst = [0u8; 3];
        assert_eq!(write_text("aé", Encoding::Utf8, &mut dst), 3);
        let mut dst = [0u8; 2];
        assert_eq!(write_text("aé", Encoding::Utf8, &mut dst), 1);
        let mut dst = [0u8; 3];
        assert_eq!(write_text("ab", Encoding::Ucs2, &mut dst), 2);
    }

    #[test]
    fn test_encode() {
        assert_eq!(encode(&[0x68, 0xFF, 0x69], Encoding::Utf8), "h\u{FFFD}i");
        assert_eq!(encode(&[0xE9], Encoding::Latin1), "é");
        assert_eq!(encode(&[0xE9], Encoding::Ascii), "i");
        assert_eq!(encode(&[b'h', 0, b'i', 0, b'x'], Encoding::Ucs2), "hi");
        assert_eq!(encode(&[0x00, 0xD8], Encoding::Ucs2), "\u{FFFD}");
        assert_eq!(encode(b"hi", Encoding::Base64), "aGk=");
        assert_eq!(encode(&[0xDE, 0xAD], Encoding::Hex), "dead");
    }

    #[test]
    fn test_to_text_clamps() {
        let view = view_of(b"hello");
        assert_eq!(view.to_text(Encoding::Utf8, None, None), "hello");
        assert_eq!(view.to_text(Encoding::Utf8, Some(-3), Some(2)), "he");
        assert_eq!(view.to_text(Encoding::Utf8, Some(1), Some(100)), "ello");
        assert_eq!(view.to_text(Encoding::Utf8, Some(5), None), "");
        assert_eq!(view.to_text(Encoding::Utf8, None, Some(0)), "");
        assert_eq!(view.to_text(Encoding::Utf8, Some(3), Some(2)), "");
        assert_eq!(view.to_text(Encoding::Hex, Some(0), Some(2)), "6865");
        assert_eq!(View::empty().to_text(Encoding::Utf8, None, None), "");
    }

    #[test]
    fn test_write_str() {
        let view = view_of(&[0; 6]);
        assert_eq!(view.write_str("abcdef", 2, None, Encoding::Utf8).unwrap(), 4);
        assert_eq!(view.to_vec(), b"\0\0abcd".to_vec());
        assert_eq!(view.write_str("ffff", 0, Some(1), Encoding::Hex).unwrap(), 1);
        assert_eq!(view.get(0), Some(0xFF));
        assert!(view.write_str("x", 7, None, Encoding::Utf8).is_err());
        assert_eq!(view.write_str("x", 6, None, Encoding::Utf8).unwrap(), 0);
    }
}
