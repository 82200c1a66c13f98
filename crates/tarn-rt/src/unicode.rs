//! Code-point indexing over UTF-8 byte buffers.
//!
//! Strings are stored as their UTF-8 bytes. Indices handed to these functions are
//! code-point indices, already normalised by the caller (no negative wrap-around);
//! every function preserves multi-byte sequences intact.

use crate::raise::{self, RtResult};

/// True if `byte` starts a code point, i.e. it is not a continuation byte.
#[inline]
pub fn is_boundary(byte: u8) -> bool {
    byte & 0xC0 != 0x80
}

/// Number of code points in `bytes`.
pub fn length(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| is_boundary(b)).count()
}

/// Byte offset of the code point after the one starting at `from`.
fn next_pos(bytes: &[u8], from: usize) -> usize {
    let mut i = from;
    while i < bytes.len() {
        i += 1;
        if i == bytes.len() || is_boundary(bytes[i]) {
            break;
        }
    }
    i
}

/// Byte offset of the code point before the one starting at `from`.
fn prev_pos(bytes: &[u8], from: usize) -> usize {
    let mut i = from;
    while i > 0 {
        i -= 1;
        if is_boundary(bytes[i]) {
            break;
        }
    }
    i
}

/// Number of indices `start, start+step, ...` before reaching `end`.
pub fn slice_count(start: i64, end: i64, step: i64) -> RtResult<usize> {
    if step == 0 {
        return raise::zero_division_error();
    }
    let Some(span) = end.checked_sub(start) else {
        return raise::overflow_error();
    };
    if span == 0 || span.signum() != step.signum() {
        return Ok(0);
    }
    // `span` and `step` share a sign here, so this is a ceiling division.
    let n = (span - step.signum()) / step + 1;
    Ok(usize::try_from(n).unwrap_or(0))
}

/// Code points at `start, start+step, ...` up to but excluding `end`, as bytes.
///
/// A negative `step` walks backwards. Selection stops early at an index outside
/// the string. The result is allocated once, at its exact size.
pub fn substring(bytes: &[u8], start: i64, end: i64, step: i64) -> RtResult<Vec<u8>> {
    let nchar = slice_count(start, end, step)?;
    let count = length(bytes) as i64;
    if nchar == 0 || !(0..count).contains(&start) {
        return Ok(Vec::new());
    }

    let mut cursor = 0;
    for _ in 0..start {
        cursor = next_pos(bytes, cursor);
    }

    let mut offsets: Vec<usize> = Vec::with_capacity(nchar.min(count as usize));
    let mut total = 0;
    let mut index = start;
    loop {
        offsets.push(cursor);
        total += next_pos(bytes, cursor) - cursor;

        if offsets.len() == nchar {
            break;
        }
        match index.checked_add(step) {
            Some(next) if (0..count).contains(&next) => index = next,
            _ => break,
        }
        if step > 0 {
            for _ in 0..step {
                cursor = next_pos(bytes, cursor);
            }
        } else {
            for _ in 0..step.unsigned_abs() {
                cursor = prev_pos(bytes, cursor);
            }
        }
    }

    let mut out = Vec::with_capacity(total);
    for &from in &offsets {
        out.extend_from_slice(&bytes[from..next_pos(bytes, from)]);
    }
    debug_assert_eq!(out.len(), total);
    Ok(out)
}
