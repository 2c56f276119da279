//! Zero-copy windows over arena memory.
//!
//! A [`View`] is a `(backing, byte_offset, length)` triple. It never copies its
//! backing: slicing yields another window over the same arena, so a write
//! through one view is visible through every view overlapping that region.
//! Callers that need isolation copy explicitly ([`View::to_vec`],
//! [`Pool::from_view`](crate::Pool::from_view)).
//!
//! The numeric codec, encoding, search and swap/fill operations are added to
//! `View` by their own modules; this module holds the window arithmetic,
//! copying, comparison and presentation.

use crate::error::{Error, Result};
use crate::offset::Offset;
use crate::pool::Arena;
use crate::INSPECT_MAX_BYTES;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// A window into an [`Arena`] or a standalone allocation
#[derive(Clone, Default)]
pub struct View {
    backing: Option<Arena>,
    byte_offset: usize,
    length: usize,
}

/// Serializable array-of-bytes form of a view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BufferJson {
    /// Always `"Buffer"`
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// The byte values in order
    pub data: Vec<u8>,
}

impl View {
    /// Returns an empty view with no backing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a view over `[byte_offset, byte_offset + length)` of `arena`.
    ///
    /// Fails with [`Error::BufferOutOfBounds`] when the window does not fit.
    pub fn new(arena: Arena, byte_offset: usize, length: usize) -> Result<Self> {
        if byte_offset > arena.capacity() {
            return Err(Error::buffer_out_of_bounds(Some("offset")));
        }
        if length > arena.capacity() - byte_offset {
            return Err(Error::buffer_out_of_bounds(Some("length")));
        }
        Ok(Self::from_parts(arena, byte_offset, length))
    }

    /// Creates a view covering the whole arena
    pub fn whole(arena: Arena) -> Self {
        let length = arena.capacity();
        Self::from_parts(arena, 0, length)
    }

    pub(crate) fn from_parts(arena: Arena, byte_offset: usize, length: usize) -> Self {
        debug_assert!(byte_offset + length <= arena.capacity());
        Self {
            backing: Some(arena),
            byte_offset,
            length,
        }
    }

    /// Returns the length of the window in bytes
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns true if the window holds no bytes
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the start of the window within its backing
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    /// Returns the backing arena, if any
    pub fn backing(&self) -> Option<&Arena> {
        self.backing.as_ref()
    }

    /// Returns true if both views are windows into the same arena
    pub fn shares_backing(&self, other: &View) -> bool {
        match (&self.backing, &other.backing) {
            (Some(a), Some(b)) => Arena::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Runs `f` over the bytes of the window
    pub fn read<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        match &self.backing {
            Some(arena) => arena.read(|bytes| f(&bytes[self.range()])),
            None => f(&[]),
        }
    }

    /// Runs `f` over the bytes of the window, mutably.
    ///
    /// Writes are visible through every view sharing this region.
    pub fn write<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> R {
        match &self.backing {
            Some(arena) => arena.write(|bytes| f(&mut bytes[self.range()])),
            None => f(&mut []),
        }
    }

    fn range(&self) -> std::ops::Range<usize> {
        self.byte_offset..self.byte_offset + self.length
    }

    /// Narrows the window to its first `length` bytes
    pub(crate) fn truncate(&mut self, length: usize) {
        self.length = self.length.min(length);
    }

    /// Returns the byte at `index`, or `None` past the end
    pub fn get(&self, index: usize) -> Option<u8> {
        self.read(|bytes| bytes.get(index).copied())
    }

    /// Stores `value` at `index`; returns false past the end
    pub fn set(&self, index: usize, value: u8) -> bool {
        self.write(|bytes| match bytes.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        })
    }

    /// Copies the window out into a vector
    pub fn to_vec(&self) -> Vec<u8> {
        self.read(<[u8]>::to_vec)
    }

    /// Copies the window out into an immutable [`bytes::Bytes`]
    pub fn to_bytes(&self) -> bytes::Bytes {
        bytes::Bytes::from(self.to_vec())
    }

    /// Returns a view over `[start, end)` sharing this view's backing.
    ///
    /// Negative indices count back from the end; everything is clamped to
    /// `[0, len]` and an inverted range yields an empty view.
    pub fn slice(&self, start: impl Into<Offset>, end: impl Into<Offset>) -> View {
        let len = self.length;
        let start = relative_index(start.into(), len);
        let end = match end.into() {
            Offset::Missing => len,
            end => relative_index(end, len),
        };
        let length = end.saturating_sub(start);
        View {
            backing: self.backing.clone(),
            byte_offset: self.byte_offset + start,
            length,
        }
    }

    /// Alias of [`View::slice`]
    pub fn subarray(&self, start: impl Into<Offset>, end: impl Into<Offset>) -> View {
        self.slice(start, end)
    }

    /// Copies `[source_start, source_end)` of this view into `target` at
    /// `target_start`, returning the number of bytes copied.
    ///
    /// The copy is clamped to both views; overlapping regions of one arena are
    /// handled like `memmove`.
    pub fn copy_to(
        &self,
        target: &View,
        target_start: usize,
        source_start: usize,
        source_end: Option<usize>,
    ) -> Result<usize> {
        if source_start > self.length {
            return Err(Error::out_of_range("sourceStart", 0, self.length, source_start));
        }
        let source_end = source_end.unwrap_or(self.length).min(self.length);
        if target_start >= target.length || source_start >= source_end {
            return Ok(0);
        }
        let count = (source_end - source_start).min(target.length - target_start);
        let src = self.byte_offset + source_start;
        let dst = target.byte_offset + target_start;

        match (&self.backing, &target.backing) {
            (Some(a), Some(b)) if Arena::ptr_eq(a, b) => {
                a.write(|bytes| bytes.copy_within(src..src + count, dst));
            }
            (Some(a), Some(b)) => {
                let copy = |from: &[u8], to: &mut [u8]| {
                    to[dst..dst + count].copy_from_slice(&from[src..src + count]);
                };
                // Take locks in id order so concurrent copies cannot deadlock.
                if a.id() < b.id() {
                    a.read(|from| b.write(|to| copy(from, to)));
                } else {
                    b.write(|to| a.read(|from| copy(from, to)));
                }
            }
            _ => return Ok(0),
        }
        Ok(count)
    }

    /// Compares the bytes of both views lexicographically
    pub fn compare(&self, other: &View) -> Ordering {
        if self.shares_backing(other)
            && self.byte_offset == other.byte_offset
            && self.length == other.length
        {
            return Ordering::Equal;
        }
        self.with_both(other, |a, b| a.cmp(b))
    }

    /// Compares `[source_start, source_end)` of this view with
    /// `[target_start, target_end)` of `target`.
    ///
    /// Absent bounds default to the whole view. Ends past the view length are
    /// rejected with [`Error::OutOfRange`].
    pub fn compare_range(
        &self,
        target: &View,
        target_start: Option<usize>,
        target_end: Option<usize>,
        source_start: Option<usize>,
        source_end: Option<usize>,
    ) -> Result<Ordering> {
        let target_start = target_start.unwrap_or(0);
        let target_end = checked_end("targetEnd", target_end, target.length)?;
        let source_start = source_start.unwrap_or(0);
        let source_end = checked_end("sourceEnd", source_end, self.length)?;

        if source_start >= source_end {
            return Ok(if target_start >= target_end {
                Ordering::Equal
            } else {
                Ordering::Less
            });
        }
        if target_start >= target_end {
            return Ok(Ordering::Greater);
        }
        Ok(self.with_both(target, |a, b| {
            a[source_start..source_end].cmp(&b[target_start..target_end])
        }))
    }

    /// Returns true if both views hold the same bytes
    pub fn equals(&self, other: &View) -> bool {
        self.length == other.length && self.compare(other) == Ordering::Equal
    }

    fn with_both<R>(&self, other: &View, f: impl FnOnce(&[u8], &[u8]) -> R) -> R {
        self.read(|a| other.read(|b| f(a, b)))
    }

    /// Returns the array-of-byte-values form
    pub fn to_json(&self) -> BufferJson {
        BufferJson {
            kind: "Buffer",
            data: self.to_vec(),
        }
    }

    /// Renders up to [`INSPECT_MAX_BYTES`] bytes as `<Buffer 01 02 ...>`
    pub fn inspect(&self) -> String {
        let shown = self.read(|bytes| {
            bytes
                .iter()
                .take(INSPECT_MAX_BYTES)
                .map(|b| format!("{b:02x}"))
                .collect::<Vec<_>>()
                .join(" ")
        });
        if self.length > INSPECT_MAX_BYTES {
            format!("<Buffer {shown} ... >")
        } else {
            format!("<Buffer {shown}>")
        }
    }
}

/// Compares two views byte-lexicographically
pub fn compare(a: &View, b: &View) -> Ordering {
    a.compare(b)
}

/// Resolves a possibly-negative index against `len`, clamping to `[0, len]`
fn relative_index(index: Offset, len: usize) -> usize {
    let len_i = len as i64;
    let index = match index {
        Offset::Missing => return 0,
        Offset::Int(v) => v,
        Offset::Number(v) if v.is_nan() => return 0,
        Offset::Number(v) if v == f64::INFINITY => return len,
        Offset::Number(v) if v == f64::NEG_INFINITY => return 0,
        Offset::Number(v) => v.trunc() as i64,
    };
    if index < 0 {
        (index + len_i).max(0) as usize
    } else {
        index.min(len_i) as usize
    }
}

fn checked_end(name: &'static str, end: Option<usize>, len: usize) -> Result<usize> {
    match end {
        None => Ok(len),
        Some(end) if end <= len => Ok(end),
        Some(end) => Err(Error::out_of_range(name, 0, len, end)),
    }
}

impl PartialEq for View {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for View {}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inspect())
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("arena", &self.backing.as_ref().map(Arena::id))
            .field("byte_offset", &self.byte_offset)
            .field("length", &self.length)
            .finish()
    }
}

impl From<&View> for bytes::Bytes {
    fn from(view: &View) -> Self {
        view.to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn view_of(bytes: &[u8]) -> View {
        View::whole(Arena::from_vec(bytes.to_vec()))
    }

    #[test]
    fn test_new_checks_bounds() {
        let arena = Arena::new(8).unwrap();
        assert!(View::new(arena.clone(), 2, 6).is_ok());
        assert_eq!(
            View::new(arena.clone(), 9, 0).unwrap_err(),
            Error::buffer_out_of_bounds(Some("offset"))
        );
        assert_eq!(
            View::new(arena, 2, 7).unwrap_err(),
            Error::buffer_out_of_bounds(Some("length"))
        );
    }

    #[test]
    fn test_slice_shares_memory() {
        let parent = view_of(b"abcdef");
        let child = parent.slice(2, 4);
        assert_eq!(child.to_vec(), b"cd".to_vec());
        assert!(child.shares_backing(&parent));

        child.set(0, b'X');
        assert_eq!(parent.to_vec(), b"abXdef".to_vec());

        parent.set(3, b'Y');
        assert_eq!(child.to_vec(), b"XY".to_vec());
    }

    #[test]
    fn test_slice_relative_indices() {
        let view = view_of(b"abcdef");
        assert_eq!(view.slice(-2, Offset::Missing).to_vec(), b"ef".to_vec());
        assert_eq!(view.slice(1, -1).to_vec(), b"bcde".to_vec());
        assert_eq!(view.slice(-100, 2).to_vec(), b"ab".to_vec());
        assert_eq!(view.slice(4, 2).len(), 0);
        assert_eq!(view.slice(0, 100).len(), 6);
        assert_eq!(view.slice(f64::NAN, 3).to_vec(), b"abc".to_vec());
    }

    #[test]
    fn test_copy_to_clamps() {
        let source = view_of(b"hello");
        let target = view_of(&[0; 3]);
        assert_eq!(source.copy_to(&target, 1, 0, None).unwrap(), 2);
        assert_eq!(target.to_vec(), vec![0, b'h', b'e']);
        assert_eq!(source.copy_to(&target, 3, 0, None).unwrap(), 0);
        assert!(source.copy_to(&target, 0, 6, None).is_err());
    }

    #[test]
    fn test_copy_within_one_arena_overlaps() {
        let view = view_of(b"abcdef");
        let head = view.slice(0, 4);
        let tail = view.slice(2, Offset::Missing);
        assert_eq!(head.copy_to(&tail, 0, 0, None).unwrap(), 4);
        assert_eq!(view.to_vec(), b"ababcd".to_vec());
    }

    #[test]
    fn test_compare() {
        let a = view_of(b"abc");
        let b = view_of(b"abd");
        let c = view_of(b"ab");
        assert_eq!(a.compare(&b), Ordering::Less);
        assert_eq!(b.compare(&a), Ordering::Greater);
        assert_eq!(a.compare(&c), Ordering::Greater);
        assert_eq!(a.compare(&a.clone()), Ordering::Equal);
        assert!(a.equals(&view_of(b"abc")));
        assert_ne!(a, b);
    }

    #[test]
    fn test_compare_range() {
        let a = view_of(b"xxabc");
        let b = view_of(b"abc");
        assert_eq!(
            a.compare_range(&b, None, None, Some(2), None).unwrap(),
            Ordering::Equal
        );
        assert_eq!(
            a.compare_range(&b, Some(1), Some(1), Some(0), Some(0)).unwrap(),
            Ordering::Equal
        );
        assert_eq!(
            a.compare_range(&b, None, None, Some(3), Some(3)).unwrap(),
            Ordering::Less
        );
        assert_eq!(
            a.compare_range(&b, Some(2), Some(2), None, None).unwrap(),
            Ordering::Greater
        );
        assert!(a.compare_range(&b, None, Some(4), None, None).is_err());
    }

    #[test]
    fn test_inspect() {
        assert_eq!(view_of(b"hi").inspect(), "<Buffer 68 69>");
        assert_eq!(View::empty().to_string(), "<Buffer >");
        let long = view_of(&[0xAB; 60]);
        assert!(long.inspect().ends_with("ab ... >"));
        assert_eq!(long.inspect().matches("ab").count(), INSPECT_MAX_BYTES);
    }

    #[test]
    fn test_to_json() {
        let json = view_of(&[1, 2, 255]).to_json();
        assert_eq!(json.kind, "Buffer");
        assert_eq!(json.data, vec![1, 2, 255]);
        assert_eq!(
            serde_json::to_string(&json).unwrap(),
            r#"{"type":"Buffer","data":[1,2,255]}"#
        );
    }

    #[test]
    fn test_empty_view() {
        let view = View::empty();
        assert!(view.is_empty());
        assert!(view.backing().is_none());
        assert_eq!(view.get(0), None);
        assert!(!view.set(0, 1));
        assert_eq!(view.to_json().data, Vec::<u8>::new());
    }
}
