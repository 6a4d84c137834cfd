//! Character-level sequence similarity.
//!
//! Ratcliff/Obershelp "gestalt" matching: find the longest common block, recurse
//! on the unmatched text to its left and right, and score `2·M / (|a| + |b|)`
//! where `M` is the total size of all matched blocks.

/// Finds the longest common block in `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Returns `(i, j, size)`. Ties go to the block that ends first in `a`, then in `b`.
fn longest_block(
    a: &[char],
    b: &[char],
    (alo, ahi): (usize, usize),
    (blo, bhi): (usize, usize),
) -> (usize, usize, usize) {
    let width = bhi - blo;
    let mut best = (alo, blo, 0usize);
    let mut prev = vec![0usize; width + 1];
    let mut cur = vec![0usize; width + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            let col = j - blo + 1;
            if a[i] == b[j] {
                let k = prev[col - 1] + 1;
                cur[col] = k;
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
            } else {
                cur[col] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    best
}

/// Total number of characters covered by matching blocks.
fn matched_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![((0, a.len()), (0, b.len()))];

    while let Some(((alo, ahi), (blo, bhi))) = pending.pop() {
        if alo >= ahi || blo >= bhi {
            continue;
        }
        let (i, j, k) = longest_block(a, b, (alo, ahi), (blo, bhi));
        if k == 0 {
            continue;
        }
        total += k;
        pending.push(((alo, i), (blo, j)));
        pending.push(((i + k, ahi), (j + k, bhi)));
    }

    total
}

/// Similarity ratio of two strings in `[0, 1]`.
///
/// Identical strings score exactly `1.0`; strings with no character in common
/// score `0.0`. Two empty strings are considered identical.
#[must_use]
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let score = (2 * matched_chars(&a, &b)) as f64 / total as f64;
    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn identical_strings_score_one() {
        assert!(approx(ratio("matt o'kane", "matt o'kane"), 1.0));
        assert!(approx(ratio("", ""), 1.0));
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert!(approx(ratio("abc", "xyz"), 0.0));
        assert!(approx(ratio("abc", ""), 0.0));
    }

    #[test]
    fn classic_gestalt_example() {
        // One block "bcd": M = 3 over 8 characters.
        assert!(approx(ratio("abcd", "bcde"), 0.75));
        assert!(approx(ratio("abxcd", "abcd"), 8.0 / 9.0));
    }

    #[test]
    fn reordered_words_match_one_block() {
        // "o'kane" is the longest block; "matt" sits on opposite sides and is lost.
        assert!(approx(ratio("o'kane matt", "matt o'kane"), 12.0 / 22.0));
    }

    #[test]
    fn single_typo() {
        let score = ratio("micheal", "michael");
        assert!(score > 0.8 && score < 1.0);
    }
}
