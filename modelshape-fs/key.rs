//! Helpers for listing keys: local paths or object-storage keys, separated by
//! a single delimiter.
//!
//! Keys are treated as plain strings. Empty segments (as in `a//b`) and `.`
//! segments are skipped, and a key ending with the delimiter is a directory
//! marker (as created by some object-storage consoles) rather than a file.

/// The delimiter used by object-storage keys and by relative listings.
pub const DELIMITER: char = '/';

/// Iterate over the non-empty segments of a key.
pub fn segments(key: &str, delimiter: char) -> impl DoubleEndedIterator<Item = &str> {
    key.split(delimiter)
        .filter(|segment| !segment.is_empty() && *segment != ".")
}

/// True if the key denotes a directory rather than a file.
#[inline]
#[must_use]
pub fn is_directory_marker(key: &str, delimiter: char) -> bool {
    key.ends_with(delimiter)
}

/// Strip a root prefix from a key, on a segment boundary.
///
/// Returns `None` if the key is not below the root. Note that for the root
/// `models/a`, the key `models/ab/1/x` is not below it, even though a prefix
/// listing may return it. An empty root contains every key.
#[must_use]
pub fn strip_root<'a>(key: &'a str, root: &str, delimiter: char) -> Option<&'a str> {
    let root = root.trim_end_matches(delimiter);
    if root.is_empty() {
        return Some(key.trim_start_matches(delimiter));
    }

    let rest = key.strip_prefix(root)?;
    if rest.is_empty() {
        return Some(rest);
    }
    rest.strip_prefix(delimiter)
        .map(|rest| rest.trim_start_matches(delimiter))
}

/// Join segments with the delimiter.
pub fn join_segments<I, S>(segments: I, delimiter: char) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for (i, segment) in segments.into_iter().enumerate() {
        if i != 0 {
            joined.push(delimiter);
        }
        joined.push_str(segment.as_ref());
    }
    joined
}
