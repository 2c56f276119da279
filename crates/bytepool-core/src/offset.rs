//! Loosely-typed offset arguments.
//!
//! Collaborators such as interactive shells hand offsets over as whatever the
//! user typed: an integer, a floating number, or nothing at all. [`Offset`]
//! keeps that distinction so the numeric codec can reject a missing offset
//! with a type error and a fractional one with a range error, while the search
//! engine coerces both into its default starting point.

use crate::error::{Error, Result};
use std::fmt;

/// An offset argument as supplied by a caller
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Offset {
    /// No offset was supplied
    #[default]
    Missing,
    /// An integral offset (may be negative)
    Int(i64),
    /// A floating offset (may be fractional, infinite or NaN)
    Number(f64),
}

impl Offset {
    /// Validates this offset for a fixed-width access of `width` bytes into a
    /// buffer of `len` bytes.
    ///
    /// Checks run in order: presence, integrality, buffer large enough for
    /// one access, then `0 <= offset <= len - width`.
    pub(crate) fn checked(self, name: &'static str, len: usize, width: usize) -> Result<usize> {
        let value = self.require_integer(name)?;
        if len < width {
            return Err(Error::buffer_out_of_bounds(None));
        }
        let max = len - width;
        match value {
            Integral::Int(v) if v >= 0 && (v as u64) <= max as u64 => Ok(v as usize),
            _ => Err(Error::out_of_range(name, 0, max, self)),
        }
    }

    /// Rejects missing and non-integral offsets, keeping infinities for the range check
    pub(crate) fn require_integer(self, name: &'static str) -> Result<Integral> {
        match self {
            Offset::Missing => Err(Error::invalid_argument_type(name, "number", "undefined")),
            Offset::Int(v) => Ok(Integral::Int(v)),
            Offset::Number(v) if v.is_infinite() => Ok(Integral::Infinite),
            Offset::Number(v) if v.is_nan() || v.fract() != 0.0 => {
                Err(Error::not_an_integer(name, self))
            }
            Offset::Number(v) => Ok(Integral::Int(v as i64)),
        }
    }

    /// Coerces this offset for searching: clamped to the signed 32-bit range,
    /// truncated toward zero, or `None` when absent or NaN.
    pub(crate) fn coerce_i32(self) -> Option<i64> {
        match self {
            Offset::Missing => None,
            Offset::Int(v) => Some(v.clamp(i32::MIN as i64, i32::MAX as i64)),
            Offset::Number(v) if v.is_nan() => None,
            Offset::Number(v) => Some(v.clamp(i32::MIN as f64, i32::MAX as f64).trunc() as i64),
        }
    }
}

/// An offset that passed the integrality check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Integral {
    Int(i64),
    Infinite,
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Offset::Missing => f.write_str("undefined"),
            Offset::Int(v) => write!(f, "{v}"),
            Offset::Number(v) if v.is_infinite() && *v > 0.0 => f.write_str("Infinity"),
            Offset::Number(v) if v.is_infinite() => f.write_str("-Infinity"),
            Offset::Number(v) if v.is_nan() => f.write_str("NaN"),
            Offset::Number(v) => write!(f, "{v}"),
        }
    }
}

macro_rules! offset_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Offset {
                fn from(value: $ty) -> Self {
                    Offset::Int(value as i64)
                }
            }
        )*
    };
}

offset_from_int!(i8, i16, i32, i64, u8, u16, u32, isize);

impl From<usize> for Offset {
    fn from(value: usize) -> Self {
        i64::try_from(value).map_or(Offset::Number(value as f64), Offset::Int)
    }
}

impl From<u64> for Offset {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or(Offset::Number(value as f64), Offset::Int)
    }
}

impl From<f64> for Offset {
    fn from(value: f64) -> Self {
        Offset::Number(value)
    }
}

impl From<f32> for Offset {
    fn from(value: f32) -> Self {
        Offset::Number(value as f64)
    }
}

impl<T: Into<Offset>> From<Option<T>> for Offset {
    fn from(value: Option<T>) -> Self {
        value.map_or(Offset::Missing, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_checked_accepts_valid_range() {
        assert_eq!(Offset::from(0).checked("offset", 8, 4).unwrap(), 0);
        assert_eq!(Offset::from(4usize).checked("offset", 8, 4).unwrap(), 4);
        assert_eq!(Offset::from(2.0).checked("offset", 8, 4).unwrap(), 2);
    }

    #[test]
    fn test_checked_rejects_missing() {
        let err = Offset::Missing.checked("offset", 8, 4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgumentType);
    }

    #[test]
    fn test_checked_rejects_fraction_and_nan() {
        for value in [1.01, f64::NAN] {
            let err = Offset::from(value).checked("offset", 8, 4).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::OutOfRange);
            assert!(err.to_string().contains("It must be an integer"));
        }
    }

    #[test]
    fn test_checked_states_range() {
        for value in [Offset::from(-1), Offset::from(5), Offset::from(f64::INFINITY)] {
            let err = value.checked("offset", 8, 4).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!(
                    "The value of \"offset\" is out of range. It must be >= 0 and <= 4. Received {}",
                    value
                )
            );
        }
    }

    #[test]
    fn test_checked_short_buffer() {
        let err = Offset::from(0).checked("offset", 1, 4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BufferOutOfBounds);
    }

    #[test]
    fn test_coerce_i32() {
        assert_eq!(Offset::Missing.coerce_i32(), None);
        assert_eq!(Offset::from(f64::NAN).coerce_i32(), None);
        assert_eq!(Offset::from(1.9).coerce_i32(), Some(1));
        assert_eq!(Offset::from(i64::MAX).coerce_i32(), Some(i32::MAX as i64));
        assert_eq!(Offset::from(f64::NEG_INFINITY).coerce_i32(), Some(i32::MIN as i64));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Offset::from(None::<usize>), Offset::Missing);
        assert_eq!(Offset::from(Some(3u32)), Offset::Int(3));
    }
}
