use std::borrow::Cow;

use crate::static_regex;

static_regex!(EXCESS_WHITESPACE <- r"[ \t]{2,}");

/// Collapses runs of spaces and tabs into a single space, keeping line breaks.
pub fn remove_excess_whitespace(s: &str) -> Cow<'_, str> {
    EXCESS_WHITESPACE.replace_all(s, " ")
}
