//! Matcher configuration.
//!
//! The token damping factor and the acceptance floor were picked empirically.
//! They are tuning knobs, so they live here with the other thresholds instead
//! of being baked into the scorer.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ValidationError};
use crate::fields::AliasTable;
use crate::similarity::{DEFAULT_MIN_CONTAINMENT_LEN, DEFAULT_TOKEN_DAMPING};

/// Default lowest score a contact needs to appear in a result at all.
pub const DEFAULT_ACCEPTANCE_FLOOR: f64 = 0.1;

/// Default number of candidates returned per query.
pub const DEFAULT_TOP_N: usize = 3;

/// Default score at or above which a best match is safe to auto-resolve.
pub const DEFAULT_HIGH_CONFIDENCE: f64 = 0.8;

fn default_token_damping() -> f64 {
    DEFAULT_TOKEN_DAMPING
}

fn default_acceptance_floor() -> f64 {
    DEFAULT_ACCEPTANCE_FLOOR
}

fn default_min_containment_len() -> usize {
    DEFAULT_MIN_CONTAINMENT_LEN
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_high_confidence() -> f64 {
    DEFAULT_HIGH_CONFIDENCE
}

fn default_plus_one_markers() -> Vec<String> {
    vec!["(partner)".to_string(), "+1".to_string()]
}

/// Tunable matcher settings.
///
/// Every field has a default, so a config file only needs the values it
/// changes:
///
/// ```
/// use contact_resolve::MatcherConfig;
///
/// let config = MatcherConfig::from_json_str(r#"{ "acceptance_floor": 0.25 }"#).unwrap();
/// assert_eq!(config.acceptance_floor, 0.25);
/// assert_eq!(config.default_top_n, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatcherConfig {
    /// Multiplier on the token-overlap sub-score.
    #[serde(default = "default_token_damping")]
    pub token_damping: f64,

    /// Contacts scoring below this are dropped from results. Bounds output
    /// size; it is not a confidence threshold.
    #[serde(default = "default_acceptance_floor")]
    pub acceptance_floor: f64,

    /// Shortest token allowed to match another token by containment.
    #[serde(default = "default_min_containment_len")]
    pub min_containment_len: usize,

    /// Result size when the caller does not pass one.
    #[serde(default = "default_top_n")]
    pub default_top_n: usize,

    /// Cutoff for the high-confidence band.
    #[serde(default = "default_high_confidence")]
    pub high_confidence: f64,

    /// Query suffixes that denote an unnamed plus-one guest.
    #[serde(default = "default_plus_one_markers")]
    pub plus_one_markers: Vec<String>,

    /// Column-label aliases per logical field.
    #[serde(default)]
    pub aliases: AliasTable,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            token_damping: DEFAULT_TOKEN_DAMPING,
            acceptance_floor: DEFAULT_ACCEPTANCE_FLOOR,
            min_containment_len: DEFAULT_MIN_CONTAINMENT_LEN,
            default_top_n: DEFAULT_TOP_N,
            high_confidence: DEFAULT_HIGH_CONFIDENCE,
            plus_one_markers: default_plus_one_markers(),
            aliases: AliasTable::default(),
        }
    }
}

fn check_unit(name: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::ThresholdOutOfRange { name, value })
    }
}

impl MatcherConfig {
    /// Parses and validates a JSON config.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed JSON or unknown keys and
    /// `ConfigError::Invalid` for out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, otherwise as
    /// [`MatcherConfig::from_json_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&text)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_unit("token_damping", self.token_damping)?;
        check_unit("acceptance_floor", self.acceptance_floor)?;
        check_unit("high_confidence", self.high_confidence)?;
        if self.default_top_n == 0 {
            return Err(ValidationError::ZeroLimit {
                name: "default_top_n",
            });
        }
        if self.plus_one_markers.iter().any(|m| m.trim().is_empty()) {
            return Err(ValidationError::EmptyMarker);
        }
        self.aliases.validate()
    }
}
