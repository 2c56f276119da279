//! In-place bulk operations: byte-order swapping and pattern fill.

mod fill;
mod swap;

use crate::view::View;

/// A fill pattern
#[derive(Debug, Clone, Copy)]
pub enum Pattern<'a> {
    /// A numeric byte; masked to its low 8 bits
    Number(i64),
    /// A byte sequence repeated across the range
    Bytes(&'a [u8]),
    /// The contents of another view, repeated across the range
    View(&'a View),
    /// Text, encoded with the fill encoding and repeated across the range
    Text(&'a str),
}

impl From<u8> for Pattern<'_> {
    fn from(value: u8) -> Self {
        Pattern::Number(value as i64)
    }
}

impl From<i32> for Pattern<'_> {
    fn from(value: i32) -> Self {
        Pattern::Number(value as i64)
    }
}

impl From<i64> for Pattern<'_> {
    fn from(value: i64) -> Self {
        Pattern::Number(value)
    }
}

impl<'a> From<&'a [u8]> for Pattern<'a> {
    fn from(value: &'a [u8]) -> Self {
        Pattern::Bytes(value)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Pattern<'a> {
    fn from(value: &'a [u8; N]) -> Self {
        Pattern::Bytes(value)
    }
}

impl<'a> From<&'a View> for Pattern<'a> {
    fn from(value: &'a View) -> Self {
        Pattern::View(value)
    }
}

impl<'a> From<&'a str> for Pattern<'a> {
    fn from(value: &'a str) -> Self {
        Pattern::Text(value)
    }
}

impl<'a> From<&'a String> for Pattern<'a> {
    fn from(value: &'a String) -> Self {
        Pattern::Text(value)
    }
}
