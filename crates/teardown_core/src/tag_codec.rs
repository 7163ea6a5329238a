//! Reversible mangling of digit-leading tag names.
//!
//! Teardown writes elements such as `<3 value="1"/>` under the reward
//! section. Names like that are not legal XML, so the whole document text is
//! passed through [`sanitize`] before parsing (`<3` becomes `<_3`) and through
//! [`desanitize`] after serializing.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Character inserted between `<`/`</` and a leading digit.
pub const MARKER: char = '_';

static OPEN_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/?)(\d)").expect("static pattern is valid"));
static OPEN_MARKED_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/?)_(\d)").expect("static pattern is valid"));

/// Inserts [`MARKER`] into every opening or closing tag whose name starts
/// with a digit. Text content and attribute values are left alone.
pub fn sanitize(raw: &str) -> Cow<'_, str> {
    OPEN_DIGIT.replace_all(raw, "<${1}_${2}")
}

/// Inverse of [`sanitize`]: strips [`MARKER`] where it sits between
/// `<`/`</` and a digit.
pub fn desanitize(safe: &str) -> Cow<'_, str> {
    OPEN_MARKED_DIGIT.replace_all(safe, "<${1}${2}")
}

fn is_numeral(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
}

/// Maps an in-tree element name to the name callers address it by.
///
/// `_3` becomes `3`; every other name is returned unchanged.
pub fn canonical_name(tree_name: &str) -> &str {
    match tree_name.strip_prefix(MARKER) {
        Some(rest) if is_numeral(rest) => rest,
        _ => tree_name,
    }
}

/// Maps a caller-facing identifier back to the in-tree element name.
///
/// Only purely numeric identifiers gain the marker.
pub fn tree_name(canonical: &str) -> Cow<'_, str> {
    if is_numeral(canonical) {
        Cow::Owned(format!("{MARKER}{canonical}"))
    } else {
        Cow::Borrowed(canonical)
    }
}
