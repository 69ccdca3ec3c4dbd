//! Character windows around a match.
//!
//! Offsets passed in are byte offsets into `text` (as produced by
//! [`regex::Match`]); the radius is counted in characters so windows never
//! split a multi-byte character.

/// Default radius, in characters, of the snippet reported with each number.
pub const CONTEXT_RADIUS: usize = 100;

/// Returns the slice of `text` from `radius` characters before `start` to
/// `radius` characters after `end`, clipped to the bounds of `text`.
///
/// `start` and `end` are clamped to `text.len()` and rounded down to the
/// nearest character boundary. If `end < start` the window is taken around
/// `start` alone.
#[must_use]
pub fn context_window(text: &str, start: usize, end: usize, radius: usize) -> &str {
    let start = floor_char_boundary(text, start);
    let end = floor_char_boundary(text, end).max(start);

    let from = chars_before(text, start, radius);
    let to = chars_after(text, end, radius);

    &text[from..to]
}

/// Byte offset `n` characters before `at`, or `0` if there are fewer.
fn chars_before(text: &str, at: usize, n: usize) -> usize {
    if n == 0 {
        return at;
    }
    text[..at]
        .char_indices()
        .rev()
        .take(n)
        .last()
        .map_or(at, |(i, _)| i)
}

/// Byte offset `n` characters after `at`, or `text.len()` if there are fewer.
fn chars_after(text: &str, at: usize, n: usize) -> usize {
    text[at..]
        .char_indices()
        .nth(n)
        .map_or(text.len(), |(i, _)| at + i)
}

fn floor_char_boundary(text: &str, at: usize) -> usize {
    let mut at = at.min(text.len());
    while !text.is_char_boundary(at) {
        at -= 1;
    }
    at
}
