//! Name similarity scoring.
//!
//! No single metric handles both typos and reordering. The scorer computes
//! three sub-scores and keeps the best:
//!
//! - **direct**: sequence ratio of the two normalized strings
//! - **variation**: best sequence ratio across both sides' variations
//! - **token**: damped word overlap, so word-only evidence never beats a strong
//!   whole-string match

pub mod sequence;
pub mod token;

use std::collections::BTreeSet;

use serde::Serialize;

use crate::normalize::{collapse_whitespace, normalize};
use crate::variation::variations_of_normalized;

/// Default multiplier applied to the token sub-score.
pub const DEFAULT_TOKEN_DAMPING: f64 = 0.9;

/// Default minimum length of a token that may match by containment.
pub const DEFAULT_MIN_CONTAINMENT_LEN: usize = 2;

/// A name expanded once for repeated comparison.
///
/// Scoring one query against thousands of candidates would otherwise
/// re-normalize and re-expand the query for every candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedName {
    normalized: String,
    variations: BTreeSet<String>,
    tokens: BTreeSet<String>,
}

impl PreparedName {
    /// Normalizes and expands `text`.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let normalized = normalize(text);
        let variations = variations_of_normalized(&normalized);
        let tokens = token::tokens(&normalized);
        Self {
            normalized,
            variations,
            tokens,
        }
    }

    /// Wraps one stored name candidate that is already normalized and
    /// expanded.
    ///
    /// Its only variation is itself: candidates are members of a variation
    /// set, and expanding them again would let an annotated candidate score
    /// through its own stripped form.
    #[must_use]
    pub fn candidate(name: &str) -> Self {
        let normalized = collapse_whitespace(name);
        let variations = std::iter::once(normalized.clone())
            .filter(|n| !n.is_empty())
            .collect();
        let tokens = token::tokens(&normalized);
        Self {
            normalized,
            variations,
            tokens,
        }
    }

    /// The normalized form.
    #[must_use]
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// The variation set.
    #[must_use]
    pub const fn variations(&self) -> &BTreeSet<String> {
        &self.variations
    }

    /// Returns true if the name normalizes to nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }
}

/// Per-metric scores behind a similarity value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScoreBreakdown {
    /// Sequence ratio of the normalized strings.
    pub direct: f64,
    /// Best sequence ratio across the variation cross-product.
    pub variation: f64,
    /// Damped token overlap.
    pub token: f64,
}

impl ScoreBreakdown {
    /// The combined score: the best sub-score, clamped to `[0, 1]`.
    #[must_use]
    pub fn best(&self) -> f64 {
        self.direct.max(self.variation).max(self.token).clamp(0.0, 1.0)
    }
}

/// Multi-strategy name scorer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityScorer {
    token_damping: f64,
    min_containment_len: usize,
}

impl Default for SimilarityScorer {
    fn default() -> Self {
        Self {
            token_damping: DEFAULT_TOKEN_DAMPING,
            min_containment_len: DEFAULT_MIN_CONTAINMENT_LEN,
        }
    }
}

impl SimilarityScorer {
    /// Creates a scorer. The damping factor is clamped to `[0, 1]`.
    #[must_use]
    pub fn new(token_damping: f64, min_containment_len: usize) -> Self {
        let token_damping = if token_damping.is_finite() {
            token_damping.clamp(0.0, 1.0)
        } else {
            DEFAULT_TOKEN_DAMPING
        };
        Self {
            token_damping,
            min_containment_len,
        }
    }

    /// The token damping factor.
    #[must_use]
    pub const fn token_damping(&self) -> f64 {
        self.token_damping
    }

    /// Scores two prepared names, keeping each sub-score.
    #[must_use]
    pub fn breakdown_prepared(&self, a: &PreparedName, b: &PreparedName) -> ScoreBreakdown {
        if a.is_empty() || b.is_empty() {
            return ScoreBreakdown::default();
        }

        let direct = sequence::ratio(&a.normalized, &b.normalized);

        let mut variation = 0.0f64;
        'outer: for va in &a.variations {
            for vb in &b.variations {
                variation = variation.max(sequence::ratio(va, vb));
                if variation >= 1.0 {
                    break 'outer;
                }
            }
        }

        let token = token::overlap(&a.tokens, &b.tokens, self.min_containment_len) * self.token_damping;

        ScoreBreakdown {
            direct,
            variation,
            token,
        }
    }

    /// Scores two prepared names.
    #[must_use]
    pub fn score_prepared(&self, a: &PreparedName, b: &PreparedName) -> f64 {
        self.breakdown_prepared(a, b).best()
    }

    /// Scores two raw strings, keeping each sub-score.
    #[must_use]
    pub fn breakdown(&self, a: &str, b: &str) -> ScoreBreakdown {
        self.breakdown_prepared(&PreparedName::new(a), &PreparedName::new(b))
    }

    /// Scores two raw strings in `[0, 1]`.
    #[must_use]
    pub fn score(&self, a: &str, b: &str) -> f64 {
        self.breakdown(a, b).best()
    }
}

/// Similarity of two names in `[0, 1]` with default tuning.
///
/// # Examples
///
/// ```
/// use contact_resolve::similarity;
///
/// assert_eq!(similarity("Agnes Chan", "agnes  CHAN"), 1.0);
/// assert_eq!(similarity("", "Agnes Chan"), 0.0);
/// assert!(similarity("O'Kane Matt", "Matt O'Kane") >= 0.8);
/// ```
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    SimilarityScorer::default().score(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflexive_on_non_empty() {
        for s in ["Agnes Chan", "Michael (Jackson's Dad) Ghirawoo", "o'kane"] {
            assert!((similarity(s, s) - 1.0).abs() < f64::EPSILON, "{s}");
        }
    }

    #[test]
    fn empty_side_scores_zero() {
        assert!(similarity("", "Agnes").abs() < f64::EPSILON);
        assert!(similarity("Agnes", "").abs() < f64::EPSILON);
        assert!(similarity("!!", "!!").abs() < f64::EPSILON);
    }

    #[test]
    fn reordered_name_scores_via_tokens() {
        let b = SimilarityScorer::default().breakdown("O'Kane Matt", "Matt O'Kane");
        assert!((b.token - 0.9).abs() < 1e-9);
        assert!(b.direct < 0.6);
        assert!((b.best() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn parenthetical_scores_via_variations() {
        let b = SimilarityScorer::default()
            .breakdown("Michael Ghirawoo", "Michael (Jackson's Dad VisionEd) Ghirawoo");
        assert!((b.variation - 1.0).abs() < f64::EPSILON);
        assert!(b.variation > b.direct);
    }

    #[test]
    fn damping_is_applied() {
        let undamped = SimilarityScorer::new(1.0, 2).breakdown("Luke Kerr", "Kerr Luke");
        let damped = SimilarityScorer::new(0.5, 2).breakdown("Luke Kerr", "Kerr Luke");
        assert!((undamped.token - 1.0).abs() < 1e-9);
        assert!((damped.token - 0.5).abs() < 1e-9);
    }

    #[test]
    fn damping_is_clamped() {
        assert!((SimilarityScorer::new(3.0, 2).token_damping() - 1.0).abs() < f64::EPSILON);
        assert!(SimilarityScorer::new(-1.0, 2).token_damping().abs() < f64::EPSILON);
        assert!(
            (SimilarityScorer::new(f64::NAN, 2).token_damping() - DEFAULT_TOKEN_DAMPING).abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn prepared_and_raw_agree() {
        let scorer = SimilarityScorer::default();
        let a = PreparedName::new("Shamini Sivayogan");
        let b = PreparedName::new("Shivayogan Shamini");
        assert!(
            (scorer.score_prepared(&a, &b) - scorer.score("Shamini Sivayogan", "Shivayogan Shamini"))
                .abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn candidate_is_not_expanded_again() {
        let scorer = SimilarityScorer::default();
        let query = PreparedName::new("Michael Ghirawoo");

        let annotated = PreparedName::candidate("michael (jackson's dad visioned) ghirawoo");
        assert_eq!(annotated.variations().len(), 1);
        let b = scorer.breakdown_prepared(&query, &annotated);
        assert!((b.variation - b.direct).abs() < f64::EPSILON);
        assert!(b.best() < 0.9);

        let clean = PreparedName::candidate("michael ghirawoo");
        assert!((scorer.score_prepared(&query, &clean) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn scores_stay_in_unit_interval() {
        let pairs = [
            ("a", "b"),
            ("Bec Lock", "Lock Murray"),
            ("Carol O'Carol", "carol ocarol"),
            ("x (y) z", "(y)"),
        ];
        for (a, b) in pairs {
            let s = similarity(a, b);
            assert!((0.0..=1.0).contains(&s), "{a} vs {b}: {s}");
        }
    }
}
