//! Security requirements.
//!
//! A [`SecurityModel`] maps security-scheme names to ordered lists of
//! required scope values. Insertion order is preserved so documentation
//! output is stable across runs. The map itself is never exposed; callers
//! use the dedicated require/merge operations.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::serialize::{Document, SerializationSettings};

/// A type that can supply a human-readable label for itself.
///
/// Scope enums implement this so documentation can render a description next
/// to each scope value (the same capability enum schemas use for their
/// variant labels).
pub trait Described {
    /// The human-readable label.
    fn description(&self) -> &'static str;
}

/// A scope value usable in a [`SecurityModel`] requirement.
pub trait SecurityScope: Described {
    /// The wire value of the scope (`"read:pets"`).
    fn value(&self) -> &'static str;
}

/// Per-route declaration of required credential schemes and scopes.
///
/// An entry with an empty scope list means "authenticated, no specific
/// scope". Scheme order and scope order are both preserved.
///
/// # Example
///
/// ```rust
/// use hypatia_schema::{SecurityModel, SerializationSettings};
///
/// let mut security = SecurityModel::new();
/// security.require("bearerAuth");
/// security.require_scopes("oauth", ["read:pets", "write:pets"]);
///
/// let doc = security.serialize(&SerializationSettings::new());
/// assert_eq!(doc["bearerAuth"], serde_json::json!([]));
/// assert_eq!(doc["oauth"], serde_json::json!(["read:pets", "write:pets"]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityModel {
    requirements: IndexMap<String, Vec<String>>,
}

impl SecurityModel {
    /// Creates an empty model (no credentials required).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires a scheme with no specific scope.
    pub fn require(&mut self, scheme: impl Into<String>) {
        self.requirements.entry(scheme.into()).or_default();
    }

    /// Requires a scheme with the given scope values, in order.
    pub fn require_scopes<I, S>(&mut self, scheme: impl Into<String>, scopes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.requirements.entry(scheme.into()).or_default();
        for scope in scopes {
            let scope = scope.into();
            if !entry.contains(&scope) {
                entry.push(scope);
            }
        }
    }

    /// Requires a scheme with typed scope values.
    pub fn require_described<S: SecurityScope>(
        &mut self,
        scheme: impl Into<String>,
        scopes: &[S],
    ) {
        self.require_scopes(scheme, scopes.iter().map(|s| s.value().to_string()));
    }

    /// Merges another model into this one, preserving this model's order and
    /// appending unseen schemes/scopes.
    pub fn merge(&mut self, other: &Self) {
        for (scheme, scopes) in &other.requirements {
            self.require_scopes(scheme.clone(), scopes.iter().cloned());
        }
    }

    /// Returns `true` when no scheme is required.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Number of required schemes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    /// Iterates over `(scheme, scopes)` in insertion order.
    pub fn schemes(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.requirements
            .iter()
            .map(|(scheme, scopes)| (scheme.as_str(), scopes.as_slice()))
    }

    /// Serializes the model into a generic document under the given elision
    /// policy.
    ///
    /// An entry whose scope list is empty still participates unless
    /// `skip_empty_sequence` is active.
    #[must_use]
    pub fn serialize(&self, settings: &SerializationSettings) -> Document {
        let mut doc = Map::new();
        for (scheme, scopes) in &self.requirements {
            if settings.skip_empty_sequence && scopes.is_empty() {
                continue;
            }
            doc.insert(
                scheme.clone(),
                Value::Array(scopes.iter().map(|s| Value::from(s.clone())).collect()),
            );
        }
        Value::Object(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    enum PetScope {
        Read,
        Write,
    }

    impl Described for PetScope {
        fn description(&self) -> &'static str {
            match self {
                Self::Read => "Read pet records",
                Self::Write => "Create and update pet records",
            }
        }
    }

    impl SecurityScope for PetScope {
        fn value(&self) -> &'static str {
            match self {
                Self::Read => "read:pets",
                Self::Write => "write:pets",
            }
        }
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut model = SecurityModel::new();
        model.require("zeta");
        model.require("alpha");

        let schemes: Vec<&str> = model.schemes().map(|(s, _)| s).collect();
        assert_eq!(schemes, ["zeta", "alpha"]);
    }

    #[test]
    fn test_empty_scope_list_means_authenticated() {
        let mut model = SecurityModel::new();
        model.require("bearerAuth");

        let doc = model.serialize(&SerializationSettings::new());
        assert_eq!(doc, json!({"bearerAuth": []}));
    }

    #[test]
    fn test_skip_empty_sequence_drops_scopeless_entry() {
        let mut model = SecurityModel::new();
        model.require("bearerAuth");
        model.require_scopes("oauth", ["read:pets"]);

        let settings = SerializationSettings::new().skip_empty_sequence(true);
        assert_eq!(model.serialize(&settings), json!({"oauth": ["read:pets"]}));
    }

    #[test]
    fn test_described_scopes() {
        let mut model = SecurityModel::new();
        model.require_described("oauth", &[PetScope::Read, PetScope::Write]);

        let doc = model.serialize(&SerializationSettings::new());
        assert_eq!(doc["oauth"], json!(["read:pets", "write:pets"]));
        assert_eq!(PetScope::Read.description(), "Read pet records");
    }

    #[test]
    fn test_merge_appends_without_reordering() {
        let mut base = SecurityModel::new();
        base.require_scopes("oauth", ["read:pets"]);

        let mut other = SecurityModel::new();
        other.require_scopes("oauth", ["read:pets", "write:pets"]);
        other.require("bearerAuth");

        base.merge(&other);

        let doc = base.serialize(&SerializationSettings::new());
        assert_eq!(
            doc,
            json!({"oauth": ["read:pets", "write:pets"], "bearerAuth": []})
        );
    }
}
