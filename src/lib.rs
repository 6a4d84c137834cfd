//! # contact-resolve - Fuzzy identity resolution for contact records
//!
//! contact-resolve answers one question: given a free-text person name, which
//! records in a heterogeneous contact corpus most likely refer to that person?
//! Records come from exports that disagree on column labels, name order,
//! diacritics, punctuation and parenthetical annotations.
//!
//! ## Core Concepts
//!
//! - **Normalizer**: canonical, idempotent text form used for comparison
//! - **Variations**: equivalent spellings of one name (parentheticals, apostrophes)
//! - **Similarity**: a `[0, 1]` score combining direct, variation and token-overlap views
//! - **Resolver**: turns a raw labelled record into a matchable contact via an alias table
//! - **Ranker**: scores a query against every contact and keeps the best few
//!
//! ## Usage
//!
//! ```rust
//! use contact_resolve::{MatchEngine, RawRecord};
//!
//! let mut engine = MatchEngine::default();
//! engine.load(&[
//!     RawRecord::builder("yahoo")
//!         .field("Name", "Michael Ghirawoo (Katrina's partner)")
//!         .field("Email", "michael@example.com")
//!         .build(),
//!     RawRecord::builder("outlook")
//!         .field("First Name", "Wayne")
//!         .field("Last Name", "Chung")
//!         .build(),
//! ]);
//!
//! let result = engine.find_matches("Michael Ghirawoo", 3);
//! let best = result.best().unwrap();
//! assert_eq!(best.contact.source, "yahoo");
//! assert!(best.score > 0.99);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Text layer
pub mod normalize;
pub mod similarity;
pub mod variation;

// Records and resolution
pub mod fields;
pub mod record;
pub mod resolver;

// Matching
pub mod config;
pub mod engine;
pub mod error;
pub mod ranker;
pub mod session;

// Re-export primary types at crate root for convenience
pub use config::MatcherConfig;
pub use engine::runtime::{MatchHandle, MatchRuntime, RuntimeConfig};
pub use engine::{MatchEngine, Matcher};
pub use error::{ConfigError, ExecutionError, ResolveError, ResolveResult, ValidationError};
pub use fields::{AliasTable, LogicalField};
pub use normalize::normalize;
pub use ranker::{find_matches, MatchCandidate, MatchRanker, MatchResult, MatchRow};
pub use record::{RawField, RawRecord, RawRecordBuilder, RecordId};
pub use resolver::{ContactIndex, FieldResolver, ResolvedContact};
pub use session::{
    ConfidenceBand, InviteeEntry, InviteeOutcome, MatchSession, SessionPolicy, SessionReport,
    SessionSummary,
};
pub use similarity::{similarity, PreparedName, ScoreBreakdown, SimilarityScorer};
pub use variation::variations;
