//! In-place byte-order reversal of 16, 32 and 64-bit groups.

use crate::error::{Error, Result};
use crate::view::View;

/// Views shorter than this swap 16-bit groups with a plain index loop
const SWAP16_LOOP_THRESHOLD: usize = 128;

/// Views shorter than this swap 32/64-bit groups with a plain index loop
const SWAP_WIDE_LOOP_THRESHOLD: usize = 192;

impl View {
    /// Reverses the byte order of every 16-bit group in place
    pub fn swap16(&self) -> Result<&Self> {
        self.swap(2)
    }

    /// Reverses the byte order of every 32-bit group in place
    pub fn swap32(&self) -> Result<&Self> {
        self.swap(4)
    }

    /// Reverses the byte order of every 64-bit group in place
    pub fn swap64(&self) -> Result<&Self> {
        self.swap(8)
    }

    /// Reverses the byte order of every `width`-byte group in place.
    ///
    /// `width` must be 2, 4 or 8 and must divide the view length.
    pub fn swap(&self, width: usize) -> Result<&Self> {
        if !matches!(width, 2 | 4 | 8) {
            return Err(Error::invalid_argument_value("width", width.to_string()));
        }
        if self.len() % width != 0 {
            return Err(Error::invalid_buffer_size(width));
        }
        let threshold = if width == 2 {
            SWAP16_LOOP_THRESHOLD
        } else {
            SWAP_WIDE_LOOP_THRESHOLD
        };
        self.write(|bytes| {
            if bytes.len() < threshold {
                swap_loop(bytes, width);
            } else {
                bytes.chunks_exact_mut(width).for_each(<[u8]>::reverse);
            }
        });
        Ok(self)
    }
}

fn swap_loop(bytes: &mut [u8], width: usize) {
    let mut group = 0;
    while group < bytes.len() {
        for i in 0..width / 2 {
            bytes.swap(group + i, group + width - 1 - i);
        }
        group += width;
    }
}
