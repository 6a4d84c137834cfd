//! Raw contact records as exported by source systems.
//!
//! A [`RawRecord`] is one row of one export, labels and values untouched. It is
//! built once when the corpus is loaded and never mutated afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fields::{canonical_label, is_placeholder};

/// Content-derived identity of a [`RawRecord`].
///
/// Two records with the same source tag and the same fields share an id, which
/// is what resolution memoizes on: resolving either yields the same contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(blake3::Hash);

impl RecordId {
    fn compute(source: &str, fields: &[RawField]) -> Self {
        let mut h = blake3::Hasher::new();
        // Length-prefix every part so ("ab","c") and ("a","bc") differ.
        let mut part = |bytes: &[u8]| {
            h.update(&(bytes.len() as u64).to_le_bytes());
            h.update(bytes);
        };
        part(source.as_bytes());
        for field in fields {
            part(field.label.as_bytes());
            match &field.value {
                Some(v) => {
                    part(&[1]);
                    part(v.as_bytes());
                }
                None => part(&[0]),
            }
        }
        Self(h.finalize())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

/// One labelled cell of a raw record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawField {
    /// Column label exactly as exported.
    pub label: String,
    /// Cell value, `None` when the export had no value at all.
    pub value: Option<String>,
}

/// A contact row exactly as exported from a source system.
///
/// # Examples
///
/// ```
/// use contact_resolve::RawRecord;
///
/// let record = RawRecord::builder("outlook.csv")
///     .field("First Name", "Matt")
///     .field("Last Name", "O'Kane")
///     .field("E-mail Address", "matt@okane.com.au")
///     .build();
///
/// assert_eq!(record.source(), "outlook.csv");
/// assert_eq!(record.get("e-mail address"), Some("matt@okane.com.au"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RecordParts", into = "RecordParts")]
pub struct RawRecord {
    id: RecordId,
    source: String,
    fields: Vec<RawField>,
}

#[derive(Clone, Serialize, Deserialize)]
struct RecordParts {
    source: String,
    fields: Vec<RawField>,
}

impl From<RecordParts> for RawRecord {
    fn from(parts: RecordParts) -> Self {
        Self::new(parts.source, parts.fields)
    }
}

impl From<RawRecord> for RecordParts {
    fn from(record: RawRecord) -> Self {
        Self {
            source: record.source,
            fields: record.fields,
        }
    }
}

impl RawRecord {
    /// Creates a record from its source tag and fields.
    #[must_use]
    pub fn new(source: impl Into<String>, fields: Vec<RawField>) -> Self {
        let source = source.into();
        let id = RecordId::compute(&source, &fields);
        Self { id, source, fields }
    }

    /// Starts building a record for `source`.
    #[must_use]
    pub fn builder(source: impl Into<String>) -> RawRecordBuilder {
        RawRecordBuilder {
            source: source.into(),
            fields: Vec::new(),
        }
    }

    /// Creates a record from a JSON object of label → value.
    ///
    /// Strings are kept as-is, numbers and booleans are stringified, `null`
    /// becomes an absent value. Nested arrays and objects are rendered as JSON
    /// text. Returns `None` if `value` is not an object.
    #[must_use]
    pub fn from_json(source: impl Into<String>, value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        let fields = object
            .iter()
            .map(|(label, v)| RawField {
                label: label.clone(),
                value: match v {
                    serde_json::Value::Null => None,
                    serde_json::Value::String(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                },
            })
            .collect();
        Some(Self::new(source, fields))
    }

    /// The record's content-derived identity.
    #[must_use]
    pub const fn id(&self) -> RecordId {
        self.id
    }

    /// Tag of the corpus this record came from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// All fields in export order.
    #[must_use]
    pub fn fields(&self) -> &[RawField] {
        &self.fields
    }

    /// Looks up a value by label, ignoring case and `_`/`-` separators.
    ///
    /// Returns the first field whose canonical label matches and whose value is
    /// present and not a placeholder such as `"nan"`.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&str> {
        let wanted = canonical_label(label);
        self.get_canonical(&wanted)
    }

    /// Like [`RawRecord::get`] for a label already in canonical form.
    #[must_use]
    pub fn get_canonical(&self, canonical: &str) -> Option<&str> {
        self.get_all_canonical(canonical).next()
    }

    /// Every present, non-placeholder value whose label canonicalizes to
    /// `canonical`, in export order.
    pub fn get_all_canonical<'a, 'c>(&'a self, canonical: &'c str) -> impl Iterator<Item = &'a str> + 'c
    where
        'a: 'c,
    {
        self.fields
            .iter()
            .filter(move |f| canonical_label(&f.label) == canonical)
            .filter_map(|f| f.value.as_deref().filter(|v| !is_placeholder(v)))
    }
}

/// Builder for [`RawRecord`].
#[derive(Debug, Clone)]
pub struct RawRecordBuilder {
    source: String,
    fields: Vec<RawField>,
}

impl RawRecordBuilder {
    /// Adds a field with a value.
    #[must_use]
    pub fn field(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(RawField {
            label: label.into(),
            value: Some(value.into()),
        });
        self
    }

    /// Adds a field that may be absent.
    #[must_use]
    pub fn optional_field(mut self, label: impl Into<String>, value: Option<String>) -> Self {
        self.fields.push(RawField {
            label: label.into(),
            value,
        });
        self
    }

    /// Builds the record.
    #[must_use]
    pub fn build(self) -> RawRecord {
        RawRecord::new(self.source, self.fields)
    }
}
