//! Bounds-checked fixed-width numeric access.
//!
//! Integers of 1 to 6 bytes and IEEE-754 floats of 4 and 8 bytes can be read
//! from and written to any [`View`] in either byte order. Every access is
//! validated before a byte is touched:
//!
//! 1. the offset must be present and integral ([`Offset`]),
//! 2. for integer writes the value must fit the width,
//! 3. the view must hold at least one access of that width,
//! 4. the offset must lie in `[0, len - width]`.
//!
//! A failed write therefore never leaves a partially written value behind.

use crate::error::{Error, Result};
use crate::offset::Offset;
use crate::view::View;

/// Widest integer access in bytes
pub const MAX_INT_WIDTH: usize = 6;

/// Quiet NaN with the sign bit clear, written for every f32 NaN
const CANONICAL_NAN_F32: u32 = 0x7FC0_0000;

/// Quiet NaN with the sign bit clear, written for every f64 NaN
const CANONICAL_NAN_F64: u64 = 0x7FF8_0000_0000_0000;

/// Byte order of a multi-byte access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endian {
    /// Least significant byte first
    #[default]
    Little,
    /// Most significant byte first
    Big,
}

/// Inclusive value bounds of an integer of `width` bytes
fn int_bounds(width: usize, signed: bool) -> (i64, i64) {
    let bits = width as u32 * 8;
    if signed {
        (-(1i64 << (bits - 1)), (1i64 << (bits - 1)) - 1)
    } else {
        (0, (1i64 << bits) - 1)
    }
}

fn check_width(width: usize) -> Result<()> {
    if !(1..=MAX_INT_WIDTH).contains(&width) {
        return Err(Error::out_of_range("byteLength", 1, MAX_INT_WIDTH, width));
    }
    Ok(())
}

fn load(bytes: &[u8], endian: Endian) -> u64 {
    let fold = |acc: u64, &b: &u8| (acc << 8) | b as u64;
    match endian {
        Endian::Big => bytes.iter().fold(0, fold),
        Endian::Little => bytes.iter().rev().fold(0, fold),
    }
}

fn store(value: u64, dst: &mut [u8], endian: Endian) {
    let width = dst.len();
    let le = value.to_le_bytes();
    match endian {
        Endian::Little => dst.copy_from_slice(&le[..width]),
        Endian::Big => {
            for (slot, &b) in dst.iter_mut().zip(le[..width].iter().rev()) {
                *slot = b;
            }
        }
    }
}

impl View {
    /// Reads a `width`-byte integer at `offset`.
    ///
    /// Signed reads sign-extend from the top bit of the accessed width.
    pub fn read_int(
        &self,
        offset: impl Into<Offset>,
        width: usize,
        signed: bool,
        endian: Endian,
    ) -> Result<i64> {
        check_width(width)?;
        let at = offset.into().checked("offset", self.len(), width)?;
        let raw = self.read(|bytes| load(&bytes[at..at + width], endian));
        if signed {
            let shift = 64 - width as u32 * 8;
            Ok(((raw << shift) as i64) >> shift)
        } else {
            Ok(raw as i64)
        }
    }

    /// Writes `value` as a `width`-byte integer at `offset`.
    ///
    /// Returns the offset just past the written bytes.
    pub fn write_int(
        &self,
        value: i64,
        offset: impl Into<Offset>,
        width: usize,
        signed: bool,
        endian: Endian,
    ) -> Result<usize> {
        check_width(width)?;
        let offset = offset.into();
        offset.require_integer("offset")?;
        let (min, max) = int_bounds(width, signed);
        if value < min || value > max {
            return Err(Error::out_of_range("value", min, max, value));
        }
        let at = offset.checked("offset", self.len(), width)?;
        self.write(|bytes| store(value as u64, &mut bytes[at..at + width], endian));
        Ok(at + width)
    }

    /// Reads an IEEE-754 single-precision float at `offset`
    pub fn read_f32(&self, offset: impl Into<Offset>, endian: Endian) -> Result<f32> {
        let at = offset.into().checked("offset", self.len(), 4)?;
        let bits = self.read(|bytes| load(&bytes[at..at + 4], endian));
        Ok(f32::from_bits(bits as u32))
    }

    /// Writes an IEEE-754 single-precision float at `offset`.
    ///
    /// NaN is always written as `7F C0 00 00` (in the requested byte order).
    pub fn write_f32(&self, value: f32, offset: impl Into<Offset>, endian: Endian) -> Result<usize> {
        let at = offset.into().checked("offset", self.len(), 4)?;
        let bits = if value.is_nan() {
            CANONICAL_NAN_F32
        } else {
            value.to_bits()
        };
        self.write(|bytes| store(bits as u64, &mut bytes[at..at + 4], endian));
        Ok(at + 4)
    }

    /// Reads an IEEE-754 double-precision float at `offset`
    pub fn read_f64(&self, offset: impl Into<Offset>, endian: Endian) -> Result<f64> {
        let at = offset.into().checked("offset", self.len(), 8)?;
        let bits = self.read(|bytes| load(&bytes[at..at + 8], endian));
        Ok(f64::from_bits(bits))
    }

    /// Writes an IEEE-754 double-precision float at `offset`.
    ///
    /// NaN is always written as `7F F8 00 00 00 00 00 00` (in the requested byte order).
    pub fn write_f64(&self, value: f64, offset: impl Into<Offset>, endian: Endian) -> Result<usize> {
        let at = offset.into().checked("offset", self.len(), 8)?;
        let bits = if value.is_nan() {
            CANONICAL_NAN_F64
        } else {
            value.to_bits()
        };
        self.write(|bytes| store(bits, &mut bytes[at..at + 8], endian));
        Ok(at + 8)
    }
}

macro_rules! int_accessors {
    ($($read:ident, $write:ident => $width:literal, $signed:literal, $endian:ident, $desc:literal;)*) => {
        impl View {
            $(
                #[doc = concat!("Reads a ", $desc, " integer at `offset`")]
                pub fn $read(&self, offset: impl Into<Offset>) -> Result<i64> {
                    self.read_int(offset, $width, $signed, Endian::$endian)
                }

                #[doc = concat!("Writes a ", $desc, " integer at `offset`, returning the offset past it")]
                pub fn $write(&self, value: i64, offset: impl Into<Offset>) -> Result<usize> {
                    self.write_int(value, offset, $width, $signed, Endian::$endian)
                }
            )*
        }
    };
}

int_accessors! {
    read_u8, write_u8 => 1, false, Little, "8-bit unsigned";
    read_i8, write_i8 => 1, true, Little, "8-bit signed";
    read_u16_le, write_u16_le => 2, false, Little, "16-bit unsigned little-endian";
    read_u16_be, write_u16_be => 2, false, Big, "16-bit unsigned big-endian";
    read_i16_le, write_i16_le => 2, true, Little, "16-bit signed little-endian";
    read_i16_be, write_i16_be => 2, true, Big, "16-bit signed big-endian";
    read_u24_le, write_u24_le => 3, false, Little, "24-bit unsigned little-endian";
    read_u24_be, write_u24_be => 3, false, Big, "24-bit unsigned big-endian";
    read_i24_le, write_i24_le => 3, true, Little, "24-bit signed little-endian";
    read_i24_be, write_i24_be => 3, true, Big, "24-bit signed big-endian";
    read_u32_le, write_u32_le => 4, false, Little, "32-bit unsigned little-endian";
    read_u32_be, write_u32_be => 4, false, Big, "32-bit unsigned big-endian";
    read_i32_le, write_i32_le => 4, true, Little, "32-bit signed little-endian";
    read_i32_be, write_i32_be => 4, true, Big, "32-bit signed big-endian";
    read_u40_le, write_u40_le => 5, false, Little, "40-bit unsigned little-endian";
    read_u40_be, write_u40_be => 5, false, Big, "40-bit unsigned big-endian";
    read_i40_le, write_i40_le => 5, true, Little, "40-bit signed little-endian";
    read_i40_be, write_i40_be => 5, true, Big, "40-bit signed big-endian";
    read_u48_le, write_u48_le => 6, false, Little, "48-bit unsigned little-endian";
    read_u48_be, write_u48_be => 6, false, Big, "48-bit unsigned big-endian";
    read_i48_le, write_i48_le => 6, true, Little, "48-bit signed little-endian";
    read_i48_be, write_i48_be => 6, true, Big, "48-bit signed big-endian";
}

macro_rules! float_accessors {
    ($($read:ident, $write:ident => $ty:ty, $base_read:ident, $base_write:ident, $endian:ident;)*) => {
        impl View {
            $(
                #[doc = concat!("Reads an `", stringify!($ty), "` at `offset` (", stringify!($endian), " endian)")]
                pub fn $read(&self, offset: impl Into<Offset>) -> Result<$ty> {
                    self.$base_read(offset, Endian::$endian)
                }

                #[doc = concat!("Writes an `", stringify!($ty), "` at `offset` (", stringify!($endian), " endian)")]
                pub fn $write(&self, value: $ty, offset: impl Into<Offset>) -> Result<usize> {
                    self.$base_write(value, offset, Endian::$endian)
                }
            )*
        }
    };
}

float_accessors! {
    read_f32_le, write_f32_le => f32, read_f32, write_f32, Little;
    read_f32_be, write_f32_be => f32, read_f32, write_f32, Big;
    read_f64_le, write_f64_le => f64, read_f64, write_f64, Little;
    read_f64_be, write_f64_be => f64, read_f64, write_f64, Big;
}
