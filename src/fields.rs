//! Declarative field-label aliases.
//!
//! Each export format spells its columns differently ("Email", "email_address",
//! "E-mail Address"). All label knowledge lives in one [`AliasTable`]: one
//! ordered alias list per logical field, consulted by the resolver.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::normalize::collapse_whitespace;

/// Values that export tools write for missing cells.
const PLACEHOLDER_VALUES: &[&str] = &["nan"];

/// A logical contact field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalField {
    /// A combined name ("Name", "Full Name", "DisplayName").
    FullName,
    /// Given name.
    FirstName,
    /// Middle name.
    MiddleName,
    /// Family name.
    LastName,
    /// Email address.
    Email,
    /// Phone number.
    Phone,
    /// Company or organization.
    Company,
}

impl LogicalField {
    /// All logical fields.
    pub const ALL: [Self; 7] = [
        Self::FullName,
        Self::FirstName,
        Self::MiddleName,
        Self::LastName,
        Self::Email,
        Self::Phone,
        Self::Company,
    ];
}

impl fmt::Display for LogicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FullName => write!(f, "full_name"),
            Self::FirstName => write!(f, "first_name"),
            Self::MiddleName => write!(f, "middle_name"),
            Self::LastName => write!(f, "last_name"),
            Self::Email => write!(f, "email"),
            Self::Phone => write!(f, "phone"),
            Self::Company => write!(f, "company"),
        }
    }
}

/// Canonical form of a column label: lower-case, `_` and `-` read as spaces,
/// whitespace collapsed. "Email_Address", "email address" and "EMAIL-ADDRESS"
/// all become `"email address"`.
#[must_use]
pub fn canonical_label(label: &str) -> String {
    let spaced: String = label
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect();
    collapse_whitespace(&spaced.to_lowercase())
}

/// Returns true if a cell value should be treated as missing.
#[must_use]
pub fn is_placeholder(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || PLACEHOLDER_VALUES.iter().any(|p| trimmed.eq_ignore_ascii_case(p))
}

/// Ordered label aliases per logical field.
///
/// Earlier aliases win when a record carries more than one of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawAliases", into = "RawAliases")]
pub struct AliasTable {
    aliases: RawAliases,
}

type RawAliases = BTreeMap<LogicalField, Vec<String>>;

// Fields missing from a deserialized map keep their default aliases.
impl From<RawAliases> for AliasTable {
    fn from(raw: RawAliases) -> Self {
        let mut table = Self::default();
        for (field, list) in raw {
            table = table.with_aliases(field, list);
        }
        table
    }
}

impl From<AliasTable> for RawAliases {
    fn from(table: AliasTable) -> Self {
        table.aliases
    }
}

fn labels(list: &[&str]) -> Vec<String> {
    list.iter().map(|l| canonical_label(l)).collect()
}

impl Default for AliasTable {
    fn default() -> Self {
        let mut aliases = BTreeMap::new();
        aliases.insert(
            LogicalField::FullName,
            labels(&["Name", "Full Name", "Display Name", "DisplayName", "Contact Name"]),
        );
        aliases.insert(
            LogicalField::FirstName,
            labels(&["First Name", "FirstName", "Given Name"]),
        );
        aliases.insert(
            LogicalField::MiddleName,
            labels(&["Middle Name", "MiddleName", "Additional Name"]),
        );
        aliases.insert(
            LogicalField::LastName,
            labels(&["Last Name", "LastName", "Surname", "Family Name"]),
        );
        aliases.insert(
            LogicalField::Email,
            labels(&[
                "Email",
                "Email Address",
                "E-mail Address",
                "E-mail",
                "Primary Email",
                "E-mail 1 - Value",
                "E-mail 2 Address",
            ]),
        );
        aliases.insert(
            LogicalField::Phone,
            labels(&[
                "Phone",
                "Phone Number",
                "Mobile Phone",
                "Mobile",
                "Primary Phone",
                "Home Phone",
                "Business Phone",
                "Phone 1 - Value",
            ]),
        );
        aliases.insert(
            LogicalField::Company,
            labels(&["Company", "Organization", "Organisation", "Company Name", "Organization 1 - Name"]),
        );
        Self { aliases }
    }
}

impl AliasTable {
    /// Creates an empty table.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            aliases: BTreeMap::new(),
        }
    }

    /// Replaces the aliases for a field. Labels are canonicalized.
    #[must_use]
    pub fn with_aliases<I, S>(mut self, field: LogicalField, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let list = aliases.into_iter().map(|a| canonical_label(a.as_ref())).collect();
        self.aliases.insert(field, list);
        self
    }

    /// Appends a lowest-priority alias for a field.
    #[must_use]
    pub fn push_alias(mut self, field: LogicalField, alias: &str) -> Self {
        let canonical = canonical_label(alias);
        let list = self.aliases.entry(field).or_default();
        if !list.contains(&canonical) {
            list.push(canonical);
        }
        self
    }

    /// Aliases for a field in priority order (canonical form).
    #[must_use]
    pub fn aliases(&self, field: LogicalField) -> &[String] {
        self.aliases.get(&field).map_or(&[], Vec::as_slice)
    }

    /// Checks that every logical field has at least one alias.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyAliasList` naming the first field without aliases.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for field in LogicalField::ALL {
            if self.aliases(field).iter().all(String::is_empty) {
                return Err(ValidationError::EmptyAliasList {
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }
}
