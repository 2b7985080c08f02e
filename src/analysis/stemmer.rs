//! Porter stemming algorithm.
//!
//! Reduces English words to their root forms so that inflected variants
//! match each other at query time ("machine", "machines" → "machin").
//!
//! The algorithm applies five ordered groups of rewrite rules, each gated on
//! the *measure* of the candidate stem (the number of vowel-consonant spans
//! it contains).
//!
//! # Examples
//!
//! ```
//! use threadfin::analysis::stemmer::{PorterStemmer, Stemmer};
//!
//! let stemmer = PorterStemmer::new();
//! assert_eq!(stemmer.stem("running"), "run");
//! assert_eq!(stemmer.stem("machine"), "machin");
//! assert_eq!(stemmer.stem("ponies"), "poni");
//! ```

/// Trait for stemming algorithms.
pub trait Stemmer: Send + Sync {
    /// Stem a word to its root form.
    fn stem(&self, word: &str) -> String;

    /// Get the name of this stemmer.
    fn name(&self) -> &'static str;
}

/// Porter stemming algorithm implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PorterStemmer;

impl PorterStemmer {
    /// Create a new Porter stemmer.
    pub fn new() -> Self {
        PorterStemmer
    }
}

impl Stemmer for PorterStemmer {
    fn stem(&self, word: &str) -> String {
        let word = word.to_ascii_lowercase();
        // Words of one or two letters, and anything non-ASCII, are left alone.
        if word.len() <= 2 || !word.is_ascii() {
            return word;
        }

        let word = step_1a(word);
        let word = step_1b(word);
        let word = step_1c(word);
        let word = step_2(word);
        let word = step_3(word);
        let word = step_4(word);
        step_5(word)
    }

    fn name(&self) -> &'static str {
        "porter"
    }
}

/// Is the letter at `i` a consonant? `y` counts as a consonant only when it
/// follows a vowel (or starts the word).
fn is_consonant(bytes: &[u8], i: usize) -> bool {
    match bytes[i] {
        b'a' | b'e' | b'i' | b'o' | b'u' => false,
        b'y' => i == 0 || !is_consonant(bytes, i - 1),
        _ => true,
    }
}

/// The measure m of a word: the number of VC spans in its C?(VC)^m V? form.
fn measure(word: &str) -> usize {
    let bytes = word.as_bytes();
    let n = bytes.len();
    let mut m = 0;
    let mut i = 0;

    while i < n && is_consonant(bytes, i) {
        i += 1;
    }
    while i < n {
        while i < n && !is_consonant(bytes, i) {
            i += 1;
        }
        if i >= n {
            break;
        }
        m += 1;
        while i < n && is_consonant(bytes, i) {
            i += 1;
        }
    }
    m
}

fn contains_vowel(word: &str) -> bool {
    let bytes = word.as_bytes();
    (0..bytes.len()).any(|i| !is_consonant(bytes, i))
}

/// Does the word end in a doubled consonant ("tt", "ss", ...)?
fn ends_double_consonant(word: &str) -> bool {
    let bytes = word.as_bytes();
    let n = bytes.len();
    n >= 2 && bytes[n - 1] == bytes[n - 2] && is_consonant(bytes, n - 1)
}

/// Does the word end consonant-vowel-consonant, where the final consonant is
/// not w, x, or y? Used to decide whether a final `e` should be restored.
fn ends_cvc(word: &str) -> bool {
    let bytes = word.as_bytes();
    let n = bytes.len();
    if n < 3 {
        return false;
    }
    is_consonant(bytes, n - 3)
        && !is_consonant(bytes, n - 2)
        && is_consonant(bytes, n - 1)
        && !matches!(bytes[n - 1], b'w' | b'x' | b'y')
}

/// Strip `suffix` and append `replacement` when the remaining stem measures
/// above `threshold`. Returns `None` when the suffix does not match at all,
/// so callers can distinguish "no match" from "condition failed".
fn try_replace(word: &str, suffix: &str, replacement: &str, threshold: usize) -> Option<String> {
    let stem = word.strip_suffix(suffix)?;
    if measure(stem) > threshold {
        Some(format!("{stem}{replacement}"))
    } else {
        Some(word.to_string())
    }
}

/// Plural reduction: sses → ss, ies → i, trailing s dropped.
fn step_1a(word: String) -> String {
    if let Some(stem) = word.strip_suffix("sses") {
        format!("{stem}ss")
    } else if let Some(stem) = word.strip_suffix("ies") {
        format!("{stem}i")
    } else if word.ends_with("ss") {
        word
    } else if let Some(stem) = word.strip_suffix('s') {
        stem.to_string()
    } else {
        word
    }
}

/// Past-tense and progressive suffixes: eed, ed, ing.
fn step_1b(word: String) -> String {
    if let Some(stem) = word.strip_suffix("eed") {
        if measure(stem) > 0 {
            return format!("{stem}ee");
        }
        return word;
    }

    let stripped = word
        .strip_suffix("ed")
        .filter(|stem| contains_vowel(stem))
        .or_else(|| word.strip_suffix("ing").filter(|stem| contains_vowel(stem)))
        .map(str::to_string);

    let Some(stem) = stripped else {
        return word;
    };

    // Tidy up what the removal exposed.
    if stem.ends_with("at") || stem.ends_with("bl") || stem.ends_with("iz") {
        format!("{stem}e")
    } else if ends_double_consonant(&stem) && !stem.ends_with(['l', 's', 'z']) {
        stem[..stem.len() - 1].to_string()
    } else if measure(&stem) == 1 && ends_cvc(&stem) {
        format!("{stem}e")
    } else {
        stem.to_string()
    }
}

/// Terminal y → i when the stem has another vowel.
fn step_1c(word: String) -> String {
    match word.strip_suffix('y') {
        Some(stem) if contains_vowel(stem) => format!("{stem}i"),
        _ => word,
    }
}

const STEP_2_RULES: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("enci", "ence"),
    ("anci", "ance"),
    ("izer", "ize"),
    ("abli", "able"),
    ("alli", "al"),
    ("entli", "ent"),
    ("eli", "e"),
    ("ousli", "ous"),
    ("ization", "ize"),
    ("ation", "ate"),
    ("ator", "ate"),
    ("alism", "al"),
    ("iveness", "ive"),
    ("fulness", "ful"),
    ("ousness", "ous"),
    ("aliti", "al"),
    ("iviti", "ive"),
    ("biliti", "ble"),
];

const STEP_3_RULES: &[(&str, &str)] = &[
    ("icate", "ic"),
    ("ative", ""),
    ("alize", "al"),
    ("iciti", "ic"),
    ("ical", "ic"),
    ("ful", ""),
    ("ness", ""),
];

fn step_2(word: String) -> String {
    for (suffix, replacement) in STEP_2_RULES {
        if let Some(result) = try_replace(&word, suffix, replacement, 0) {
            return result;
        }
    }
    word
}

fn step_3(word: String) -> String {
    for (suffix, replacement) in STEP_3_RULES {
        if let Some(result) = try_replace(&word, suffix, replacement, 0) {
            return result;
        }
    }
    word
}

/// Longer suffixes listed before their tails so "ement" wins over "ment".
const STEP_4_SUFFIXES: &[&str] = &[
    "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ion", "ou",
    "ism", "ate", "iti", "ous", "ive", "ize",
];

fn step_4(word: String) -> String {
    for suffix in STEP_4_SUFFIXES {
        let Some(stem) = word.strip_suffix(suffix) else {
            continue;
        };
        // "ion" only drops after s or t.
        if *suffix == "ion" && !stem.ends_with(['s', 't']) {
            return word;
        }
        if measure(stem) > 1 {
            return stem.to_string();
        }
        return word;
    }
    word
}

/// Final-e removal and -ll reduction.
fn step_5(word: String) -> String {
    let word = match word.strip_suffix('e') {
        Some(stem) => {
            let m = measure(stem);
            if m > 1 || (m == 1 && !ends_cvc(stem)) {
                stem.to_string()
            } else {
                word
            }
        }
        None => word,
    };

    if word.ends_with("ll") && measure(&word) > 1 {
        word[..word.len() - 1].to_string()
    } else {
        word
    }
}
