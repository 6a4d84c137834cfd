//! Ranked candidate retrieval.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::trace;

use crate::config::{MatcherConfig, DEFAULT_ACCEPTANCE_FLOOR};
use crate::resolver::ResolvedContact;
use crate::similarity::{PreparedName, SimilarityScorer};

/// One scored contact for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchCandidate {
    /// The matched contact.
    pub contact: Arc<ResolvedContact>,
    /// Best similarity across the contact's names, in `[0, 1]`.
    pub score: f64,
    /// The name candidate that produced `score`.
    pub matched_name: String,
}

impl MatchCandidate {
    /// Flattens the candidate into an output row.
    #[must_use]
    pub fn row(&self) -> MatchRow {
        MatchRow {
            source: self.contact.source.clone(),
            matched_name: self.matched_name.clone(),
            score: self.score,
            email: self.contact.email.clone(),
            phone: self.contact.phone.clone(),
            company: self.contact.company.clone(),
        }
    }
}

impl fmt::Display for MatchCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score: {:.3} | {}", self.score, self.contact)
    }
}

/// Flat output row for rendering or CSV/JSON serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRow {
    /// Source tag of the matched record.
    pub source: String,
    /// Name candidate that matched.
    pub matched_name: String,
    /// Match score in `[0, 1]`.
    pub score: f64,
    /// Email, if known.
    pub email: Option<String>,
    /// Phone, if known.
    pub phone: Option<String>,
    /// Company, if known.
    pub company: Option<String>,
}

/// Candidates for one query, best first.
///
/// Ordered by score descending; equal scores keep corpus encounter order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MatchResult {
    candidates: Vec<MatchCandidate>,
}

impl MatchResult {
    /// An empty result.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            candidates: Vec::new(),
        }
    }

    /// The ranked candidates.
    #[must_use]
    pub fn candidates(&self) -> &[MatchCandidate] {
        &self.candidates
    }

    /// The top candidate, if any.
    #[must_use]
    pub fn best(&self) -> Option<&MatchCandidate> {
        self.candidates.first()
    }

    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Returns true if nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Output rows in rank order.
    #[must_use]
    pub fn rows(&self) -> Vec<MatchRow> {
        self.candidates.iter().map(MatchCandidate::row).collect()
    }
}

impl IntoIterator for MatchResult {
    type Item = MatchCandidate;
    type IntoIter = std::vec::IntoIter<MatchCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.into_iter()
    }
}

/// Scores a query against every contact and keeps the best few.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchRanker {
    scorer: SimilarityScorer,
    acceptance_floor: f64,
}

impl Default for MatchRanker {
    fn default() -> Self {
        Self {
            scorer: SimilarityScorer::default(),
            acceptance_floor: DEFAULT_ACCEPTANCE_FLOOR,
        }
    }
}

impl MatchRanker {
    /// Creates a ranker with an explicit scorer and floor.
    ///
    /// The floor is clamped to `[0, 1]`; NaN falls back to the default floor.
    #[must_use]
    pub fn new(scorer: SimilarityScorer, acceptance_floor: f64) -> Self {
        let acceptance_floor = if acceptance_floor.is_nan() {
            DEFAULT_ACCEPTANCE_FLOOR
        } else {
            acceptance_floor.clamp(0.0, 1.0)
        };
        Self {
            scorer,
            acceptance_floor,
        }
    }

    /// The lowest score a candidate needs to be returned.
    #[must_use]
    pub const fn acceptance_floor(&self) -> f64 {
        self.acceptance_floor
    }

    /// Creates a ranker from configuration.
    #[must_use]
    pub fn from_config(config: &MatcherConfig) -> Self {
        Self::new(
            SimilarityScorer::new(config.token_damping, config.min_containment_len),
            config.acceptance_floor,
        )
    }

    /// The scorer in use.
    #[must_use]
    pub const fn scorer(&self) -> &SimilarityScorer {
        &self.scorer
    }

    /// Best score of one contact against a prepared query.
    ///
    /// The query's variations are compared with the contact's stored name
    /// candidates as they are. Returns the score and the first name, in set
    /// order, that reached it.
    #[must_use]
    pub fn score_contact(&self, query: &PreparedName, contact: &ResolvedContact) -> Option<(f64, String)> {
        let mut best: Option<(f64, &str)> = None;
        for name in contact.prepared_names() {
            let score = self.scorer.score_prepared(query, name);
            if best.map_or(true, |(b, _)| score > b) {
                best = Some((score, name.normalized()));
            }
            if score >= 1.0 {
                break;
            }
        }
        best.map(|(score, name)| (score, name.to_string()))
    }

    /// Ranks `contacts` against `query`, returning at most `top_n` candidates.
    ///
    /// Never fails: an empty query, `top_n == 0` or no contact above the
    /// acceptance floor all give an empty result.
    #[must_use]
    pub fn find_matches<'c, I>(&self, query: &str, contacts: I, top_n: usize) -> MatchResult
    where
        I: IntoIterator<Item = &'c Arc<ResolvedContact>>,
    {
        let prepared = PreparedName::new(query);
        if prepared.is_empty() || top_n == 0 {
            return MatchResult::empty();
        }

        let mut candidates: Vec<MatchCandidate> = contacts
            .into_iter()
            .filter_map(|contact| {
                let (score, matched_name) = self.score_contact(&prepared, contact)?;
                (score >= self.acceptance_floor).then(|| MatchCandidate {
                    contact: Arc::clone(contact),
                    score,
                    matched_name,
                })
            })
            .collect();

        let accepted = candidates.len();
        // Stable: equal scores stay in encounter order.
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates.truncate(top_n);

        trace!(
            query = prepared.normalized(),
            accepted,
            returned = candidates.len(),
            "ranked query"
        );
        MatchResult { candidates }
    }
}

/// Ranks `contacts` against `query` with default tuning.
#[must_use]
pub fn find_matches<'c, I>(query: &str, contacts: I, top_n: usize) -> MatchResult
where
    I: IntoIterator<Item = &'c Arc<ResolvedContact>>,
{
    MatchRanker::default().find_matches(query, contacts, top_n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawRecord;
    use crate::resolver::FieldResolver;

    fn contacts(names: &[(&str, &str)]) -> Vec<Arc<ResolvedContact>> {
        let resolver = FieldResolver::default();
        names
            .iter()
            .map(|(source, name)| {
                let r = RawRecord::builder(*source).field("Name", *name).build();
                Arc::new(resolver.resolve(&r))
            })
            .collect()
    }

    #[test]
    fn best_match_comes_first() {
        let corpus = contacts(&[
            ("a", "Kathy Rothwell"),
            ("a", "Iain Rothwell"),
            ("a", "Kathy Rothwel"),
        ]);
        let result = find_matches("Rothwell Kathy", &corpus, 3);
        assert_eq!(result.len(), 3);
        assert_eq!(result.best().unwrap().contact.display_name.as_deref(), Some("Kathy Rothwell"));
        let scores: Vec<f64> = result.candidates().iter().map(|c| c.score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn truncates_to_top_n() {
        let corpus = contacts(&[("a", "Sarah Carlon"), ("a", "Sarah Cranney"), ("a", "Sara Ghirawoo")]);
        assert_eq!(find_matches("Sarah", &corpus, 2).len(), 2);
        assert!(find_matches("Sarah", &corpus, 0).is_empty());
    }

    #[test]
    fn ties_keep_encounter_order() {
        let corpus = contacts(&[("first", "Luke Kerr"), ("second", "Luke Kerr"), ("third", "Luke Kerr")]);
        let result = find_matches("Luke Kerr", &corpus, 3);
        let sources: Vec<&str> = result.candidates().iter().map(|c| c.contact.source.as_str()).collect();
        assert_eq!(sources, ["first", "second", "third"]);
    }

    #[test]
    fn empty_query_gives_empty_result() {
        let corpus = contacts(&[("a", "Luke Kerr")]);
        assert!(find_matches("", &corpus, 3).is_empty());
        assert!(find_matches("  ?? ", &corpus, 3).is_empty());
    }

    #[test]
    fn floor_drops_weak_candidates() {
        let corpus = contacts(&[("a", "Jim Bidd")]);
        let strict = MatchRanker::new(SimilarityScorer::default(), 0.99);
        assert!(strict.find_matches("Jim Bid", &corpus, 3).is_empty());
        let lenient = MatchRanker::new(SimilarityScorer::default(), 0.0);
        assert_eq!(lenient.find_matches("Jim Bid", &corpus, 3).len(), 1);
    }

    #[test]
    fn contacts_without_names_never_match() {
        let resolver = FieldResolver::default();
        let r = RawRecord::builder("s").field("Email", "someone@x.com").build();
        let corpus = vec![Arc::new(resolver.resolve(&r))];
        let lenient = MatchRanker::new(SimilarityScorer::default(), 0.0);
        assert!(lenient.find_matches("someone", &corpus, 3).is_empty());
    }

    #[test]
    fn matched_name_prefers_the_clean_candidate() {
        let corpus = contacts(&[("yahoo", "Michael (Jackson's Dad VisionEd) Ghirawoo")]);
        let result = find_matches("Michael Ghirawoo", &corpus, 1);
        let best = result.best().unwrap();
        assert!((best.score - 1.0).abs() < f64::EPSILON);
        assert_eq!(best.matched_name, "michael ghirawoo");
    }

    #[test]
    fn floor_is_sanitized() {
        let scorer = SimilarityScorer::default();
        assert!((MatchRanker::new(scorer, f64::NAN).acceptance_floor() - DEFAULT_ACCEPTANCE_FLOOR).abs() < f64::EPSILON);
        assert!((MatchRanker::new(scorer, 1.5).acceptance_floor() - 1.0).abs() < f64::EPSILON);
        assert!(MatchRanker::new(scorer, -0.2).acceptance_floor().abs() < f64::EPSILON);

        let corpus = contacts(&[("a", "Luke Kerr")]);
        assert_eq!(MatchRanker::new(scorer, f64::NAN).find_matches("Luke Kerr", &corpus, 3).len(), 1);
    }

    #[test]
    fn matched_name_is_a_contact_name() {
        let corpus = contacts(&[("a", "Coorey Dao (Cathy's Mum)")]);
        let result = find_matches("Dao Coorey", &corpus, 1);
        let best = result.best().unwrap();
        assert!(best.contact.names.contains(&best.matched_name));
    }

    #[test]
    fn rows_flatten_candidates() {
        let resolver = FieldResolver::default();
        let r = RawRecord::builder("yahoo")
            .field("Name", "Bianca Moses")
            .field("Email", "bianca@moses.net")
            .build();
        let corpus = vec![Arc::new(resolver.resolve(&r))];
        let rows = find_matches("Moses Bianca", &corpus, 3).rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].source, "yahoo");
        assert_eq!(rows[0].email.as_deref(), Some("bianca@moses.net"));
        assert!(rows[0].phone.is_none());

        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["matched_name"], "bianca moses");
    }
}
