//! Match engine.
//!
//! The `MatchEngine` owns the configuration and the resolved corpus. Records are
//! resolved once at load time; every query afterwards only scores and ranks.
//! Queries do not mutate the engine, so repeated queries give identical output.

pub mod runtime;

use std::sync::Arc;

use tracing::debug;

use crate::config::MatcherConfig;
use crate::error::{ResolveResult, ValidationError};
use crate::ranker::{MatchRanker, MatchResult};
use crate::record::RawRecord;
use crate::resolver::{ContactIndex, FieldResolver, ResolvedContact};

/// Anything that can answer a name query with ranked candidates.
///
/// Implemented by [`MatchEngine`] for in-thread matching and by
/// [`runtime::MatchRuntime`] for pooled matching.
pub trait Matcher {
    /// Ranks the corpus against `query`, returning at most `top_n` candidates.
    ///
    /// # Errors
    ///
    /// In-thread matching never fails; pooled matching fails if the query
    /// cannot be scheduled or its worker goes away.
    fn find_matches(&self, query: &str, top_n: usize) -> ResolveResult<MatchResult>;
}

/// Resolved corpus plus matching policy.
///
/// # Examples
///
/// ```
/// use contact_resolve::{MatchEngine, RawRecord};
///
/// let mut engine = MatchEngine::default();
/// engine.load(&[RawRecord::builder("yahoo")
///     .field("Name", "Matt O'Kane")
///     .field("Email", "matt@okane.com.au")
///     .build()]);
///
/// let result = engine.find_matches("O'Kane Matt", 3);
/// let best = result.best().unwrap();
/// assert!(best.score >= 0.8);
/// assert_eq!(best.contact.email.as_deref(), Some("matt@okane.com.au"));
/// ```
#[derive(Debug, Clone)]
pub struct MatchEngine {
    config: MatcherConfig,
    ranker: MatchRanker,
    index: ContactIndex,
}

impl Default for MatchEngine {
    fn default() -> Self {
        let config = MatcherConfig::default();
        Self::build(config)
    }
}

impl MatchEngine {
    /// Creates an engine with validated configuration.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` in `config`.
    pub fn new(config: MatcherConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: MatcherConfig) -> Self {
        let ranker = MatchRanker::from_config(&config);
        let index = ContactIndex::new(FieldResolver::new(config.aliases.clone()));
        Self {
            config,
            ranker,
            index,
        }
    }

    /// Resolves and appends records to the corpus, in order.
    ///
    /// Records already seen (same source and fields) reuse their resolution.
    pub fn load<'r, I>(&mut self, records: I)
    where
        I: IntoIterator<Item = &'r RawRecord>,
    {
        self.index.extend(records);
        debug!(contacts = self.index.len(), "corpus loaded");
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// The resolved corpus in encounter order.
    #[must_use]
    pub fn contacts(&self) -> &[Arc<ResolvedContact>] {
        self.index.contacts()
    }

    /// The ranker in use.
    #[must_use]
    pub const fn ranker(&self) -> &MatchRanker {
        &self.ranker
    }

    /// Ranks the corpus against `query`, keeping at most `top_n` candidates.
    #[must_use]
    pub fn find_matches(&self, query: &str, top_n: usize) -> MatchResult {
        self.ranker.find_matches(query, self.index.contacts(), top_n)
    }

    /// Ranks the corpus against `query` using the configured default size.
    #[must_use]
    pub fn find_matches_default(&self, query: &str) -> MatchResult {
        self.find_matches(query, self.config.default_top_n)
    }
}

impl Matcher for MatchEngine {
    fn find_matches(&self, query: &str, top_n: usize) -> ResolveResult<MatchResult> {
        Ok(Self::find_matches(self, query, top_n))
    }
}
