//! Snippet extraction and query-term highlighting.
//!
//! A snippet is a window of the document's plain text around the first token
//! whose stem matches a query term. The character offset of that token is
//! re-derived by summing whitespace-delimited word lengths up to its
//! position, which keeps this stage independent of tokenizer offsets at the
//! cost of being approximate around punctuation. Whole-word occurrences of
//! any query term are wrapped in `**` emphasis markers.

use regex::Regex;

use crate::analysis::token::Token;

/// Characters of context kept on each side of the first match.
pub const DEFAULT_SNIPPET_CONTEXT: usize = 60;

const ELLIPSIS: &str = "...";

/// Build a snippet of `text` around the first token in `doc_tokens` whose
/// stem appears in `query_stems`. Falls back to the head of the text when no
/// token matches. `highlight_terms` should carry both the query stems and
/// their surface forms so verbatim occurrences are always emphasized.
pub fn generate_snippet(
    text: &str,
    doc_tokens: &[Token],
    query_stems: &[String],
    highlight_terms: &[String],
    context: usize,
) -> String {
    let window = match doc_tokens
        .iter()
        .find(|token| query_stems.iter().any(|stem| *stem == token.stem))
    {
        Some(token) => {
            let offset = approximate_offset(text, token.position);
            extract_window(text, offset, token.text.len(), context)
        }
        None => extract_head(text, 2 * context),
    };

    highlight(&window, highlight_terms)
}

/// Approximate the character offset of the token at `position` by summing the
/// lengths of the whitespace-delimited words before it (plus one separator
/// each).
fn approximate_offset(text: &str, position: usize) -> usize {
    text.split_whitespace()
        .take(position)
        .map(|word| word.len() + 1)
        .sum()
}

/// Extract `[offset - context, offset + match_len + context]`, clamped to
/// char boundaries, with ellipses marking truncation.
fn extract_window(text: &str, offset: usize, match_len: usize, context: usize) -> String {
    let start = floor_char_boundary(text, offset.saturating_sub(context));
    let end = floor_char_boundary(text, (offset + match_len + context).min(text.len()));

    let mut snippet = String::new();
    if start > 0 {
        snippet.push_str(ELLIPSIS);
    }
    snippet.push_str(text[start..end].trim());
    if end < text.len() {
        snippet.push_str(ELLIPSIS);
    }
    snippet
}

fn extract_head(text: &str, len: usize) -> String {
    if text.len() <= len {
        return text.trim().to_string();
    }
    let end = floor_char_boundary(text, len);
    format!("{}{ELLIPSIS}", text[..end].trim())
}

/// Wrap every case-insensitive whole-word occurrence of any term in `**`.
fn highlight(text: &str, terms: &[String]) -> String {
    let mut escaped: Vec<String> = terms
        .iter()
        .filter(|term| !term.is_empty())
        .map(|term| regex::escape(term))
        .collect();
    if escaped.is_empty() {
        return text.to_string();
    }
    // Longer alternatives first so "machines" is not half-matched by "machine".
    escaped.sort_by_key(|b| std::cmp::Reverse(b.len()));

    let pattern = format!(r"(?i)\b({})\b", escaped.join("|"));
    match Regex::new(&pattern) {
        Ok(re) => re.replace_all(text, "**$1**").into_owned(),
        // An unbuildable pattern only loses emphasis, never the snippet.
        Err(_) => text.to_string(),
    }
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
