//! Word-level overlap.

use std::collections::BTreeSet;

/// Splits normalized text into its distinct whitespace-separated tokens.
#[must_use]
pub fn tokens(normalized: &str) -> BTreeSet<String> {
    normalized.split_whitespace().map(str::to_owned).collect()
}

fn shares(left: &str, right: &str, min_containment_len: usize) -> bool {
    if left == right {
        return true;
    }
    let (short, long) = if left.chars().count() <= right.chars().count() {
        (left, right)
    } else {
        (right, left)
    };
    short.chars().count() >= min_containment_len && long.contains(short)
}

/// Fraction of tokens shared between two token sets, undamped.
///
/// A token of `a` is shared when some token of `b` equals it or one contains
/// the other; containment only counts when the shorter token has at least
/// `min_containment_len` characters, so stray initials do not match everything.
/// The count is divided by the larger set size.
#[must_use]
pub fn overlap(a: &BTreeSet<String>, b: &BTreeSet<String>, min_containment_len: usize) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let denom = a.len().max(b.len());

    let shared = a
        .iter()
        .filter(|left| b.iter().any(|right| shares(left, right, min_containment_len)))
        .count();

    #[allow(clippy::cast_precision_loss)]
    let score = shared as f64 / denom as f64;
    score.clamp(0.0, 1.0)
}
