//! Field resolution: raw export rows to typed, matchable contacts.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace};

use crate::fields::{AliasTable, LogicalField};
use crate::record::{RawRecord, RecordId};
use crate::similarity::PreparedName;
use crate::variation::variations;

/// The derived, matchable view of a [`RawRecord`].
///
/// `names` holds every normalized, variation-expanded name candidate. It is
/// non-empty whenever the record carried a name-like field with real text.
/// Each candidate is prepared for scoring once, at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedContact {
    /// Identity of the record this contact was resolved from.
    #[serde(skip)]
    pub id: RecordId,
    /// Source tag of the originating record.
    pub source: String,
    /// Name candidates used for matching.
    pub names: BTreeSet<String>,
    /// Human-readable name: the full-name field, or first and last joined.
    pub display_name: Option<String>,
    /// Email address, unchanged from the record.
    pub email: Option<String>,
    /// Phone number, unchanged from the record.
    pub phone: Option<String>,
    /// Company or organization, unchanged from the record.
    pub company: Option<String>,
    #[serde(skip)]
    prepared: Vec<PreparedName>,
}

impl ResolvedContact {
    /// Name candidates ready for scoring, in the same order as `names`.
    #[must_use]
    pub fn prepared_names(&self) -> &[PreparedName] {
        &self.prepared
    }
}

impl fmt::Display for ResolvedContact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name: {}", self.display_name.as_deref().unwrap_or("Unknown"))?;
        if let Some(email) = &self.email {
            write!(f, " | Email: {email}")?;
        }
        if let Some(phone) = &self.phone {
            write!(f, " | Phone: {phone}")?;
        }
        if let Some(company) = &self.company {
            write!(f, " | Company: {company}")?;
        }
        write!(f, " | Source: {}", self.source)
    }
}

/// Resolves raw records through an [`AliasTable`].
#[derive(Debug, Clone, Default)]
pub struct FieldResolver {
    aliases: AliasTable,
}

impl FieldResolver {
    /// Creates a resolver over the given alias table.
    #[must_use]
    pub const fn new(aliases: AliasTable) -> Self {
        Self { aliases }
    }

    /// The alias table in use.
    #[must_use]
    pub const fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// First alias, in priority order, with a present value.
    #[must_use]
    pub fn first<'r>(&self, record: &'r RawRecord, field: LogicalField) -> Option<&'r str> {
        self.aliases
            .aliases(field)
            .iter()
            .find_map(|alias| record.get_canonical(alias))
    }

    /// Every present value across all aliases of a field, in priority order.
    ///
    /// A label that appears more than once ("Name" and "name") contributes
    /// every one of its values.
    fn all<'r>(&self, record: &'r RawRecord, field: LogicalField) -> Vec<&'r str> {
        self.aliases
            .aliases(field)
            .iter()
            .flat_map(|alias| record.get_all_canonical(alias))
            .collect()
    }

    /// Resolves a record into a contact. Pure: the same record always gives
    /// the same contact.
    #[must_use]
    pub fn resolve(&self, record: &RawRecord) -> ResolvedContact {
        let mut names = BTreeSet::new();

        let full_names = self.all(record, LogicalField::FullName);
        let name_values = full_names
            .iter()
            .copied()
            .chain(self.all(record, LogicalField::FirstName))
            .chain(self.all(record, LogicalField::LastName));
        for value in name_values {
            names.extend(variations(value));
        }

        let first = self.first(record, LogicalField::FirstName).map(str::trim);
        let middle = self.first(record, LogicalField::MiddleName).map(str::trim);
        let last = self.first(record, LogicalField::LastName).map(str::trim);

        // Sources that only export split name parts still need a combined name.
        let synthesized = match (first, last) {
            (Some(first), Some(last)) => {
                names.extend(variations(&format!("{first} {last}")));
                if let Some(middle) = middle {
                    names.extend(variations(&format!("{first} {middle} {last}")));
                }
                Some(format!("{first} {last}"))
            }
            (Some(part), None) | (None, Some(part)) => Some(part.to_string()),
            (None, None) => None,
        };

        let display_name = full_names
            .first()
            .map(|n| n.trim().to_string())
            .or(synthesized);

        let prepared = names.iter().map(|name| PreparedName::candidate(name)).collect();
        let contact = ResolvedContact {
            id: record.id(),
            source: record.source().to_string(),
            names,
            display_name,
            email: self.first(record, LogicalField::Email).map(str::to_string),
            phone: self.first(record, LogicalField::Phone).map(str::to_string),
            company: self.first(record, LogicalField::Company).map(str::to_string),
            prepared,
        };
        trace!(record = %contact.id, names = contact.names.len(), "resolved record");
        contact
    }
}

/// Resolved corpus in encounter order, memoized by record identity.
#[derive(Debug, Clone, Default)]
pub struct ContactIndex {
    resolver: FieldResolver,
    contacts: Vec<Arc<ResolvedContact>>,
    cache: HashMap<RecordId, Arc<ResolvedContact>>,
    cache_hits: usize,
}

impl ContactIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new(resolver: FieldResolver) -> Self {
        Self {
            resolver,
            ..Self::default()
        }
    }

    /// Resolves a record, reusing a previous resolution of the same record.
    pub fn resolve(&mut self, record: &RawRecord) -> Arc<ResolvedContact> {
        if let Some(hit) = self.cache.get(&record.id()) {
            self.cache_hits += 1;
            return Arc::clone(hit);
        }
        let contact = Arc::new(self.resolver.resolve(record));
        self.cache.insert(record.id(), Arc::clone(&contact));
        contact
    }

    /// Resolves and appends records in order.
    pub fn extend<'r, I>(&mut self, records: I)
    where
        I: IntoIterator<Item = &'r RawRecord>,
    {
        let before = self.contacts.len();
        for record in records {
            let contact = self.resolve(record);
            self.contacts.push(contact);
        }
        debug!(
            added = self.contacts.len() - before,
            total = self.contacts.len(),
            cache_hits = self.cache_hits,
            "indexed contact records"
        );
    }

    /// Contacts in encounter order.
    #[must_use]
    pub fn contacts(&self) -> &[Arc<ResolvedContact>] {
        &self.contacts
    }

    /// Number of indexed contacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// Returns true if nothing has been indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Number of resolutions answered from the cache.
    #[must_use]
    pub const fn cache_hits(&self) -> usize {
        self.cache_hits
    }
}
