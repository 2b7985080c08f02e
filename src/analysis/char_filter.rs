//! Character-level filtering applied before tokenization.
//!
//! Forum posts arrive as HTML fragments. This filter reduces them to plain
//! text: tags are removed, the common entities are decoded, whitespace runs
//! collapse to single spaces, and the result is trimmed. It runs identically
//! on documents and on query text so both sides of the match see the same
//! characters.
//!
//! # Examples
//!
//! ```
//! use threadfin::analysis::char_filter::strip_html;
//!
//! let plain = strip_html("<p>Hello &amp; welcome</p>");
//! assert_eq!(plain, "Hello & welcome");
//! ```

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

static NUMERIC_ENTITY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(\d{1,7});").expect("entity pattern is valid"));

static WHITESPACE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Named entities worth decoding in forum text. Anything else is left as-is.
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&nbsp;", " "),
];

/// Strip markup and entities from `text`, collapse whitespace runs to single
/// spaces, and trim. Empty input yields an empty string.
pub fn strip_html(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let without_tags = TAG_PATTERN.replace_all(text, " ");

    let mut decoded = without_tags.into_owned();
    for (entity, replacement) in NAMED_ENTITIES {
        if decoded.contains(entity) {
            decoded = decoded.replace(entity, replacement);
        }
    }
    let decoded = decode_numeric_entities(&decoded);

    WHITESPACE_PATTERN
        .replace_all(decoded.as_ref(), " ")
        .trim()
        .to_string()
}

/// Decode decimal character references (`&#65;` → `A`). Invalid code points
/// are left untouched.
fn decode_numeric_entities(text: &str) -> Cow<'_, str> {
    NUMERIC_ENTITY_PATTERN.replace_all(text, |caps: &regex::Captures| {
        caps[1]
            .parse::<u32>()
            .ok()
            .and_then(char::from_u32)
            .map(|c| c.to_string())
            .unwrap_or_else(|| caps[0].to_string())
    })
}
