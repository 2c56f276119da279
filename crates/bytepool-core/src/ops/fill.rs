//! Range fill with a repeating pattern.

use super::Pattern;
use crate::encoding::{self, Encoding};
use crate::error::{Error, Result};
use crate::view::View;
use std::borrow::Cow;

impl View {
    /// Fills `[start, end)` with `pattern`, repeating it cyclically.
    ///
    /// `start` and `end` default to the whole view. Numbers are masked to a
    /// byte, empty text fills with zero, and text is encoded with `encoding`
    /// first. A pattern with no bytes to repeat is rejected. An empty or
    /// inverted range leaves the view untouched.
    pub fn fill<'a>(
        &self,
        pattern: impl Into<Pattern<'a>>,
        start: Option<i64>,
        end: Option<i64>,
        encoding: Encoding,
    ) -> Result<&Self> {
        let len = self.len();
        let start = start.unwrap_or(0);
        if start < 0 {
            return Err(Error::out_of_range("offset", 0, len, start));
        }
        let end = end.unwrap_or(len as i64);
        if end < 0 || end > len as i64 {
            return Err(Error::out_of_range("end", 0, len, end));
        }
        if start >= end {
            return Ok(self);
        }
        let (start, end) = (start as usize, end as usize);

        let bytes = pattern_bytes(pattern.into(), encoding)?;
        self.write(|dst| {
            let dst = &mut dst[start..end];
            match bytes.as_ref() {
                [byte] => dst.fill(*byte),
                bytes => {
                    for (slot, &b) in dst.iter_mut().zip(bytes.iter().cycle()) {
                        *slot = b;
                    }
                }
            }
        });
        Ok(self)
    }
}

/// Materializes a pattern before the target is locked, since it may alias the target
fn pattern_bytes(pattern: Pattern<'_>, encoding: Encoding) -> Result<Cow<'_, [u8]>> {
    let bytes = match pattern {
        Pattern::Number(value) => return Ok(Cow::Owned(vec![(value & 0xFF) as u8])),
        Pattern::Text("") => return Ok(Cow::Owned(vec![0])),
        Pattern::Text(text) => {
            let bytes = encoding::decode(text, encoding);
            if bytes.is_empty() {
                return Err(Error::invalid_argument_value("value", format!("'{text}'")));
            }
            Cow::Owned(bytes)
        }
        Pattern::Bytes(bytes) => Cow::Borrowed(bytes),
        Pattern::View(view) => Cow::Owned(view.to_vec()),
    };
    if bytes.is_empty() {
        return Err(Error::invalid_argument_value("value", "<Buffer >"));
    }
    Ok(bytes)
}
