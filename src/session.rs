//! Invitee sessions.
//!
//! A session walks an explicit roster of invitee names, skips unnamed plus-one
//! entries, matches everyone else and sorts the outcomes into confidence bands.
//! It performs no I/O; rendering and review are left to the caller.

use std::fmt;

use serde::Serialize;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use crate::config::{MatcherConfig, DEFAULT_HIGH_CONFIDENCE};
use crate::engine::Matcher;
use crate::error::ResolveResult;
use crate::normalize::fold_typographic;
use crate::ranker::{MatchCandidate, MatchResult};

/// Comparison key for plus-one markers: compatibility-folded, lower-cased,
/// with all whitespace removed. Unlike [`crate::normalize::normalize`] it keeps
/// symbols such as `+`, which markers depend on.
fn marker_key(text: &str) -> String {
    text.nfkc()
        .map(fold_typographic)
        .flat_map(char::to_lowercase)
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// How far a best match can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    /// Safe to accept without review.
    High,
    /// Plausible, but a person should confirm it.
    NeedsReview,
}

impl ConfidenceBand {
    /// Band of `score` against a high-confidence cutoff (inclusive).
    #[must_use]
    pub fn classify(score: f64, high_confidence: f64) -> Self {
        if score >= high_confidence {
            Self::High
        } else {
            Self::NeedsReview
        }
    }
}

impl fmt::Display for ConfidenceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::NeedsReview => write!(f, "needs_review"),
        }
    }
}

/// Caller policy applied on top of raw match results.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPolicy {
    /// Cutoff for [`ConfidenceBand::High`].
    pub high_confidence: f64,
    /// Lower-cased query suffixes that mark an unnamed plus-one.
    pub plus_one_markers: Vec<String>,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self::from_config(&MatcherConfig::default())
    }
}

impl SessionPolicy {
    /// Takes the cutoff and markers from a matcher config.
    #[must_use]
    pub fn from_config(config: &MatcherConfig) -> Self {
        Self {
            high_confidence: config.high_confidence,
            plus_one_markers: config
                .plus_one_markers
                .iter()
                .map(|m| m.trim().to_lowercase())
                .collect(),
        }
    }

    /// Overrides the high-confidence cutoff.
    #[must_use]
    pub fn with_high_confidence(mut self, high_confidence: f64) -> Self {
        self.high_confidence = if high_confidence.is_nan() {
            DEFAULT_HIGH_CONFIDENCE
        } else {
            high_confidence.clamp(0.0, 1.0)
        };
        self
    }
}

/// What happened to one invitee.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InviteeOutcome {
    /// An unnamed guest entry; not matched.
    PlusOne,
    /// Nothing in the corpus cleared the acceptance floor.
    NoMatch,
    /// At least one candidate; `band` describes the best one.
    Matched {
        /// Band of the best candidate.
        band: ConfidenceBand,
        /// All returned candidates, best first.
        result: MatchResult,
    },
}

impl InviteeOutcome {
    /// The best candidate, if the invitee matched.
    #[must_use]
    pub fn best(&self) -> Option<&MatchCandidate> {
        match self {
            Self::Matched { result, .. } => result.best(),
            Self::PlusOne | Self::NoMatch => None,
        }
    }

    /// The band, if the invitee matched.
    #[must_use]
    pub const fn band(&self) -> Option<ConfidenceBand> {
        match self {
            Self::Matched { band, .. } => Some(*band),
            Self::PlusOne | Self::NoMatch => None,
        }
    }
}

/// One roster line and its outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InviteeEntry {
    /// The invitee name as given.
    pub invitee: String,
    /// The outcome.
    #[serde(flatten)]
    pub outcome: InviteeOutcome,
}

/// Per-band counts of a session report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Total roster entries.
    pub total: usize,
    /// Best match in the high band.
    pub high_confidence: usize,
    /// Best match below the high band.
    pub needs_review: usize,
    /// No candidate at all.
    pub no_match: usize,
    /// Skipped plus-one entries.
    pub plus_one: usize,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} invitees: {} high confidence, {} needs review, {} no match, {} plus-one",
            self.total, self.high_confidence, self.needs_review, self.no_match, self.plus_one
        )
    }
}

/// Outcomes for a whole roster, in roster order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SessionReport {
    entries: Vec<InviteeEntry>,
}

impl SessionReport {
    /// Entries in roster order.
    #[must_use]
    pub fn entries(&self) -> &[InviteeEntry] {
        &self.entries
    }

    /// Counts per outcome kind.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        let mut summary = SessionSummary {
            total: self.entries.len(),
            ..SessionSummary::default()
        };
        for entry in &self.entries {
            match &entry.outcome {
                InviteeOutcome::PlusOne => summary.plus_one += 1,
                InviteeOutcome::NoMatch => summary.no_match += 1,
                InviteeOutcome::Matched {
                    band: ConfidenceBand::High,
                    ..
                } => summary.high_confidence += 1,
                InviteeOutcome::Matched {
                    band: ConfidenceBand::NeedsReview,
                    ..
                } => summary.needs_review += 1,
            }
        }
        summary
    }

    /// Invitees whose best match is in the high band, with that match.
    pub fn auto_resolved(&self) -> impl Iterator<Item = (&str, &MatchCandidate)> + '_ {
        self.entries.iter().filter_map(|entry| match &entry.outcome {
            InviteeOutcome::Matched {
                band: ConfidenceBand::High,
                result,
            } => result.best().map(|best| (entry.invitee.as_str(), best)),
            _ => None,
        })
    }

    /// Invitees that need a person to look at them.
    pub fn needs_review(&self) -> impl Iterator<Item = &InviteeEntry> + '_ {
        self.entries
            .iter()
            .filter(|entry| entry.outcome.band() == Some(ConfidenceBand::NeedsReview))
    }
}

/// A roster plus the policy to judge it by.
#[derive(Debug, Clone)]
pub struct MatchSession {
    roster: Vec<String>,
    policy: SessionPolicy,
}

impl MatchSession {
    /// Creates a session over an explicit roster.
    #[must_use]
    pub fn new(roster: Vec<String>, policy: SessionPolicy) -> Self {
        Self { roster, policy }
    }

    /// The roster in order.
    #[must_use]
    pub fn roster(&self) -> &[String] {
        &self.roster
    }

    /// The policy in use.
    #[must_use]
    pub const fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    /// Returns true if `invitee` denotes an unnamed plus-one guest.
    ///
    /// Case, spacing and fullwidth forms are ignored: "Moses ( Partner )"
    /// ends with the marker "(partner)".
    #[must_use]
    pub fn is_plus_one(&self, invitee: &str) -> bool {
        let key = marker_key(invitee);
        self.policy.plus_one_markers.iter().any(|marker| {
            let marker = marker_key(marker);
            !marker.is_empty() && key.ends_with(&marker)
        })
    }

    /// Matches every invitee in roster order.
    ///
    /// # Errors
    ///
    /// Propagates the first error from `matcher`; in-thread matching never fails.
    pub fn run<M: Matcher + ?Sized>(&self, matcher: &M, top_n: usize) -> ResolveResult<SessionReport> {
        let mut entries = Vec::with_capacity(self.roster.len());
        for invitee in &self.roster {
            let outcome = if self.is_plus_one(invitee) {
                InviteeOutcome::PlusOne
            } else {
                let result = matcher.find_matches(invitee, top_n)?;
                match result.best().map(|best| best.score) {
                    Some(score) => InviteeOutcome::Matched {
                        band: ConfidenceBand::classify(score, self.policy.high_confidence),
                        result,
                    },
                    None => InviteeOutcome::NoMatch,
                }
            };
            entries.push(InviteeEntry {
                invitee: invitee.clone(),
                outcome,
            });
        }

        let report = SessionReport { entries };
        debug!(summary = %report.summary(), "session complete");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::engine::MatchEngine;
    use crate::record::RawRecord;

    fn engine() -> MatchEngine {
        let mut engine = MatchEngine::default();
        engine.load(&[
            RawRecord::builder("yahoo").field("Name", "Matt O'Kane").build(),
            RawRecord::builder("outlook")
                .field("First Name", "Gemma")
                .field("Last Name", "Foster")
                .build(),
        ]);
        engine
    }

    fn session(roster: &[&str]) -> MatchSession {
        MatchSession::new(
            roster.iter().map(ToString::to_string).collect(),
            SessionPolicy::default(),
        )
    }

    #[test]
    fn classify_is_inclusive() {
        assert_eq!(ConfidenceBand::classify(0.8, 0.8), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::classify(0.79, 0.8), ConfidenceBand::NeedsReview);
    }

    #[test]
    fn plus_one_markers_match_suffixes() {
        let s = session(&[]);
        assert!(s.is_plus_one("Gemma Foster (Partner)"));
        assert!(s.is_plus_one("  Matt O'Kane +1 "));
        assert!(!s.is_plus_one("Partner Smith"));
        assert!(!s.is_plus_one("Matt O'Kane"));
    }

    #[test]
    fn plus_one_markers_ignore_spacing_and_width() {
        let s = session(&[]);
        assert!(s.is_plus_one("Moses ( Partner )"));
        assert!(s.is_plus_one("Moses (partner)\t"));
        assert!(s.is_plus_one("Moses \u{FF08}partner\u{FF09}"));
        assert!(s.is_plus_one("Bianca \u{FF0B}1"));
        assert!(!s.is_plus_one("Room 101"));
        assert!(!s.is_plus_one("Moses Partner"));
    }

    #[test]
    fn run_preserves_roster_order_and_bands() {
        let report = session(&["O'Kane Matt", "Gemma Foster (partner)", "Foster Gemma"])
            .run(&engine(), 3)
            .unwrap();

        let invitees: Vec<&str> = report.entries().iter().map(|e| e.invitee.as_str()).collect();
        assert_eq!(invitees, ["O'Kane Matt", "Gemma Foster (partner)", "Foster Gemma"]);
        assert_eq!(report.entries()[1].outcome, InviteeOutcome::PlusOne);
        assert_eq!(report.entries()[0].outcome.band(), Some(ConfidenceBand::High));

        let summary = report.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.plus_one, 1);
        assert_eq!(summary.high_confidence, 2);
    }

    #[test]
    fn empty_query_is_no_match() {
        let report = session(&["???"]).run(&engine(), 3).unwrap();
        assert_eq!(report.entries()[0].outcome, InviteeOutcome::NoMatch);
        assert_eq!(report.summary().no_match, 1);
    }

    #[test]
    fn strict_cutoff_sends_matches_to_review() {
        let s = MatchSession::new(
            vec!["Gemma Fostr".to_string()],
            SessionPolicy::default().with_high_confidence(1.0),
        );
        let report = s.run(&engine(), 3).unwrap();
        assert_eq!(report.summary().needs_review, 1);
        assert_eq!(report.needs_review().count(), 1);
        assert_eq!(report.auto_resolved().count(), 0);
    }

    #[test]
    fn auto_resolved_yields_best_matches() {
        let report = session(&["Matt OKane"]).run(&engine(), 3).unwrap();
        let resolved: Vec<_> = report.auto_resolved().collect();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].0, "Matt OKane");
        assert_eq!(resolved[0].1.contact.source, "yahoo");
    }

    #[test]
    fn summary_display() {
        let summary = SessionSummary {
            total: 4,
            high_confidence: 1,
            needs_review: 1,
            no_match: 1,
            plus_one: 1,
        };
        assert_eq!(
            summary.to_string(),
            "4 invitees: 1 high confidence, 1 needs review, 1 no match, 1 plus-one"
        );
    }
}
