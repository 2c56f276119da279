//! Forward and backward search within a view.
//!
//! A [`Needle`] is a single byte, a byte sequence, another view, or text that
//! is first decoded with the requested [`Encoding`]. Offsets are coerced the
//! forgiving way: clamped to the signed 32-bit range, negative values counted
//! back from the end, and a missing or NaN offset meaning "the whole view"
//! in the direction of the search.

mod find;

use crate::encoding::{self, Encoding};
use crate::offset::Offset;
use crate::view::View;
use std::borrow::Cow;
use tracing::trace;

/// The value being searched for
#[derive(Debug, Clone, Copy)]
pub enum Needle<'a> {
    /// A numeric byte; only the low 8 bits are matched
    Byte(i64),
    /// A raw byte sequence
    Bytes(&'a [u8]),
    /// The contents of another view
    View(&'a View),
    /// Text, decoded with the search encoding before matching
    Text(&'a str),
}

impl From<u8> for Needle<'_> {
    fn from(value: u8) -> Self {
        Needle::Byte(value as i64)
    }
}

impl From<i32> for Needle<'_> {
    fn from(value: i32) -> Self {
        Needle::Byte(value as i64)
    }
}

impl From<i64> for Needle<'_> {
    fn from(value: i64) -> Self {
        Needle::Byte(value)
    }
}

impl<'a> From<&'a [u8]> for Needle<'a> {
    fn from(value: &'a [u8]) -> Self {
        Needle::Bytes(value)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Needle<'a> {
    fn from(value: &'a [u8; N]) -> Self {
        Needle::Bytes(value)
    }
}

impl<'a> From<&'a View> for Needle<'a> {
    fn from(value: &'a View) -> Self {
        Needle::View(value)
    }
}

impl<'a> From<&'a str> for Needle<'a> {
    fn from(value: &'a str) -> Self {
        Needle::Text(value)
    }
}

impl<'a> From<&'a String> for Needle<'a> {
    fn from(value: &'a String) -> Self {
        Needle::Text(value)
    }
}

impl View {
    /// Returns the lowest index at or after `offset` where `needle` starts
    pub fn index_of<'a>(
        &self,
        needle: impl Into<Needle<'a>>,
        offset: impl Into<Offset>,
        encoding: Encoding,
    ) -> Option<usize> {
        search(self, needle.into(), offset.into(), encoding, true)
    }

    /// Returns the highest index at or before `offset` where `needle` starts
    pub fn last_index_of<'a>(
        &self,
        needle: impl Into<Needle<'a>>,
        offset: impl Into<Offset>,
        encoding: Encoding,
    ) -> Option<usize> {
        search(self, needle.into(), offset.into(), encoding, false)
    }

    /// Returns true if `needle` occurs at or after `offset`
    pub fn includes<'a>(
        &self,
        needle: impl Into<Needle<'a>>,
        offset: impl Into<Offset>,
        encoding: Encoding,
    ) -> bool {
        self.index_of(needle, offset, encoding).is_some()
    }
}

fn search(
    view: &View,
    needle: Needle<'_>,
    offset: Offset,
    encoding: Encoding,
    forward: bool,
) -> Option<usize> {
    let len = view.len() as i64;
    let offset = offset
        .coerce_i32()
        .unwrap_or(if forward { 0 } else { len });

    let bytes: Cow<'_, [u8]> = match needle {
        Needle::Byte(value) => {
            let byte = (value & 0xFF) as u8;
            let start = start_position(len, offset, 1, forward)?;
            return view.read(|haystack| {
                if forward {
                    find::find_byte(haystack, byte, start)
                } else {
                    find::rfind_byte(haystack, byte, start)
                }
            });
        }
        Needle::Bytes(bytes) => Cow::Borrowed(bytes),
        Needle::View(other) => Cow::Owned(other.to_vec()),
        Needle::Text(text) => Cow::Owned(encoding::decode(text, encoding)),
    };

    let start = start_position(len, offset, bytes.len(), forward);
    if bytes.is_empty() {
        return start;
    }
    let start = start?;
    trace!(
        "Searching {} bytes {} from {} for a {}-byte needle ({})",
        len,
        if forward { "forward" } else { "backward" },
        start,
        bytes.len(),
        encoding
    );

    view.read(|haystack| match encoding {
        Encoding::Ucs2 => find::find_aligned(haystack, &bytes, start, forward),
        _ if forward => find::find(haystack, &bytes, start),
        _ => find::rfind(haystack, &bytes, start),
    })
}

/// Resolves a coerced offset into the first candidate index, or `None` when
/// no candidate exists
fn start_position(len: i64, offset: i64, needle_len: usize, forward: bool) -> Option<usize> {
    let needle_len = needle_len as i64;
    if offset < 0 {
        if offset + len >= 0 {
            Some((len + offset) as usize)
        } else if forward || needle_len == 0 {
            Some(0)
        } else {
            None
        }
    } else if offset + needle_len <= len {
        Some(offset as usize)
    } else if needle_len == 0 {
        Some(len as usize)
    } else if forward || len == 0 {
        None
    } else {
        Some((len - 1) as usize)
    }
}
