//! Text canonicalization.
//!
//! Every comparison in the engine happens on normalized text. Normalization is
//! total: odd encodings, stray symbols and empty input all produce a string,
//! never an error.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Punctuation kept by [`normalize`] in addition to word characters and whitespace.
const KEPT_PUNCTUATION: &[char] = &['-', '\'', '"', '(', ')', '&', '.', ',', '@'];

pub(crate) fn fold_typographic(c: char) -> char {
    match c {
        '\u{2018}' | '\u{2019}' | '\u{201B}' | '`' | '\u{00B4}' | '\u{2032}' => '\'',
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' => '"',
        '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}' | '\u{2212}' => '-',
        other => other,
    }
}

fn is_kept(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c.is_whitespace() || KEPT_PUNCTUATION.contains(&c)
}

/// Collapses whitespace runs to a single space and trims both ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonicalizes a raw string for matching.
///
/// Lower-cases, folds typographic quotes and dashes to ASCII, strips accents
/// through compatibility decomposition, replaces anything outside the kept
/// character set with a space, and collapses whitespace.
///
/// # Examples
///
/// ```
/// use contact_resolve::normalize;
///
/// assert_eq!(normalize("  Zoë  O\u{2019}Kane!! "), "zoe o'kane");
/// assert_eq!(normalize(""), "");
/// ```
#[must_use]
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    // Fold before decomposing: NFKD would split the acute accent into a space
    // plus a combining mark.
    let folded: String = text.chars().map(fold_typographic).collect();

    let decomposed: String = folded
        .to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    // Compatibility forms such as U+210C decompose to capitals, so lower-case again.
    let cleaned: String = decomposed
        .to_lowercase()
        .chars()
        .map(|c| if is_kept(c) { c } else { ' ' })
        .collect();

    collapse_whitespace(&cleaned)
}
