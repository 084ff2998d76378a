//! Input sanitisation for user-edited waypoint fields.
//!
//! Names are corrected, never rejected. Sanitisation runs once, when an edit
//! is saved.

pub const NAME_MAX_CHARS: usize = 64;
pub const FALLBACK_NAME: &str = "Unnamed Waypoint";

/// Trim, fall back to [`FALLBACK_NAME`] when blank, cap at [`NAME_MAX_CHARS`].
///
/// Truncation counts Unicode scalar values. Whitespace exposed by the cut is
/// trimmed again so the result is a fixed point.
#[must_use]
pub fn sanitize_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return FALLBACK_NAME.to_string();
    }

    match trimmed.char_indices().nth(NAME_MAX_CHARS) {
        Some((cut, _)) => trimmed[..cut].trim_end().to_string(),
        None => trimmed.to_string(),
    }
}

/// Notes may be empty; only surrounding whitespace is dropped.
#[must_use]
pub fn sanitize_notes(raw: &str) -> String {
    raw.trim().to_string()
}

/// Default name for the next waypoint, 1-indexed on the current list length.
#[must_use]
pub fn default_name(existing: usize) -> String {
    format!("Waypoint {}", existing + 1)
}
