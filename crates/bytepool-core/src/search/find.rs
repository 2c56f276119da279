//! Slice-level search primitives.
//!
//! All functions return the start index of a match. `start` is the lowest
//! candidate for forward searches and the highest candidate for backward
//! ones; callers normalize it beforehand.

/// Needles at least this long use the skip table instead of a window scan
pub(crate) const HORSPOOL_MIN_NEEDLE: usize = 4;

/// Finds `byte` at or after `start`
pub(crate) fn find_byte(haystack: &[u8], byte: u8, start: usize) -> Option<usize> {
    haystack
        .get(start..)?
        .iter()
        .position(|&b| b == byte)
        .map(|i| i + start)
}

/// Finds `byte` at or before `start`
pub(crate) fn rfind_byte(haystack: &[u8], byte: u8, start: usize) -> Option<usize> {
    let end = start.checked_add(1)?.min(haystack.len());
    haystack[..end].iter().rposition(|&b| b == byte)
}

/// Finds `needle` starting at or after `start`
pub(crate) fn find(haystack: &[u8], needle: &[u8], start: usize) -> Option<usize> {
    let m = needle.len();
    if m > haystack.len() || start > haystack.len() - m {
        return None;
    }
    match m {
        0 => Some(start),
        1 => find_byte(haystack, needle[0], start),
        m if m < HORSPOOL_MIN_NEEDLE => haystack[start..]
            .windows(m)
            .position(|w| w == needle)
            .map(|i| i + start),
        _ => horspool_forward(haystack, needle, start),
    }
}

/// Finds `needle` starting at or before `start`
pub(crate) fn rfind(haystack: &[u8], needle: &[u8], start: usize) -> Option<usize> {
    let m = needle.len();
    if m > haystack.len() {
        return None;
    }
    let start = start.min(haystack.len() - m);
    match m {
        0 => Some(start),
        1 => rfind_byte(haystack, needle[0], start),
        m if m < HORSPOOL_MIN_NEEDLE => haystack[..start + m]
            .windows(m)
            .rposition(|w| w == needle),
        _ => horspool_backward(haystack, needle, start),
    }
}

fn horspool_forward(haystack: &[u8], needle: &[u8], start: usize) -> Option<usize> {
    let m = needle.len();
    let mut skip = [m; 256];
    for (i, &b) in needle[..m - 1].iter().enumerate() {
        skip[b as usize] = m - 1 - i;
    }

    let last = haystack.len() - m;
    let mut pos = start;
    while pos <= last {
        if &haystack[pos..pos + m] == needle {
            return Some(pos);
        }
        pos += skip[haystack[pos + m - 1] as usize];
    }
    None
}

/// Mirror image of [`horspool_forward`]: the window's first byte drives the shift
fn horspool_backward(haystack: &[u8], needle: &[u8], start: usize) -> Option<usize> {
    let m = needle.len();
    let mut skip = [m; 256];
    for i in (1..m).rev() {
        skip[needle[i] as usize] = i;
    }

    let mut pos = start;
    loop {
        if &haystack[pos..pos + m] == needle {
            return Some(pos);
        }
        pos = pos.checked_sub(skip[haystack[pos] as usize])?;
    }
}

/// Finds `needle` at even offsets only, treating both sides as UTF-16 units.
///
/// An odd `start` moves to the next even offset going forward and to the
/// previous one going backward. A trailing odd byte of either side is ignored.
pub(crate) fn find_aligned(
    haystack: &[u8],
    needle: &[u8],
    start: usize,
    forward: bool,
) -> Option<usize> {
    let haystack = &haystack[..haystack.len() & !1];
    let needle = &needle[..needle.len() & !1];
    let m = needle.len();
    if m == 0 || m > haystack.len() {
        return None;
    }
    let last = haystack.len() - m;
    let matches = |pos: &usize| &haystack[*pos..*pos + m] == needle;

    if forward {
        // Round up so no match lands before `start`.
        let first = start.saturating_add(1) & !1;
        (first..=last).step_by(2).find(matches)
    } else {
        let first = start.min(last) & !1;
        (0..=first).rev().step_by(2).find(matches)
    }
}
