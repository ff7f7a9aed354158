//! Method table and request factories.
//!
//! A [`MethodTable`] maps method names to an "is notification" flag. The
//! client turns each entry into a [`MethodFactory`] that builds requests for
//! that method with the right id handling. Dotted names such as
//! `math.add` are plain keys.
//!
//! # Table Formats
//!
//! Deserializes from either form:
//!
//! ```json
//! { "math.add": false, "log.write": true }
//! ```
//!
//! ```json
//! [["math.add"], ["log.write", true]]
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::btree_map::Iter;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::IdGenerator;
use crate::protocol::Request;

// ============================================================================
// MethodTable
// ============================================================================

/// Known methods and whether each is a notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MethodTable {
    entries: BTreeMap<String, bool>,
}

impl MethodTable {
    /// Creates an empty table.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a method.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMethod`] if `name` is empty.
    pub fn insert(&mut self, name: impl Into<String>, is_notification: bool) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::invalid_method("method name must not be empty"));
        }
        self.entries.insert(name, is_notification);
        Ok(())
    }

    /// Returns the notification flag of `name`, if known.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<bool> {
        self.entries.get(name).copied()
    }

    /// Returns `true` if `name` is known.
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the number of methods.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no method is known.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, is_notification)` in name order.
    #[inline]
    pub fn iter(&self) -> Iter<'_, String, bool> {
        self.entries.iter()
    }

    /// Merges `other` into this table; entries in `other` win.
    pub fn extend(&mut self, other: MethodTable) {
        self.entries.extend(other.entries);
    }
}

impl<'a> IntoIterator for &'a MethodTable {
    type Item = (&'a String, &'a bool);
    type IntoIter = Iter<'a, String, bool>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// MethodTable - Deserialization
// ============================================================================

/// Accepted table layouts.
#[derive(Deserialize)]
#[serde(untagged)]
enum TableRepr {
    Map(BTreeMap<String, bool>),
    List(Vec<EntryRepr>),
}

/// One entry of the list layout.
#[derive(Deserialize)]
#[serde(untagged)]
enum EntryRepr {
    Flagged(String, bool),
    Named((String,)),
    Bare(String),
}

impl<'de> Deserialize<'de> for MethodTable {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pairs: Vec<(String, bool)> = match TableRepr::deserialize(deserializer)? {
            TableRepr::Map(map) => map.into_iter().collect(),
            TableRepr::List(list) => list
                .into_iter()
                .map(|entry| match entry {
                    EntryRepr::Flagged(name, flag) => (name, flag),
                    EntryRepr::Named((name,)) | EntryRepr::Bare(name) => (name, false),
                })
                .collect(),
        };

        let mut table = MethodTable::new();
        for (name, is_notification) in pairs {
            table
                .insert(name, is_notification)
                .map_err(serde::de::Error::custom)?;
        }
        Ok(table)
    }
}

// ============================================================================
// MethodFactory
// ============================================================================

/// Builds requests for one method.
#[derive(Clone)]
pub struct MethodFactory {
    method: String,
    is_notification: bool,
    ids: Arc<dyn IdGenerator>,
}

impl MethodFactory {
    pub(crate) fn new(
        method: impl Into<String>,
        is_notification: bool,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            method: method.into(),
            is_notification,
            ids,
        }
    }

    /// Builds a request with the given params.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`] if `params` is neither array nor object.
    pub fn create(&self, params: Option<Value>) -> Result<Request> {
        Request::build(&self.method, params, self.is_notification, self.ids.as_ref())
    }

    /// Returns the method name.
    #[inline]
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns `true` if this factory builds notifications.
    #[inline]
    #[must_use]
    pub fn is_notification(&self) -> bool {
        self.is_notification
    }
}

impl std::fmt::Debug for MethodFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodFactory")
            .field("method", &self.method)
            .field("is_notification", &self.is_notification)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::identifiers::{RequestId, SequenceIdGenerator};

    #[test]
    fn test_insert_and_lookup() {
        let mut table = MethodTable::new();
        table.insert("math.add", false).expect("insert");
        table.insert("log.write", true).expect("insert");

        assert_eq!(table.get("math.add"), Some(false));
        assert_eq!(table.get("log.write"), Some(true));
        assert_eq!(table.get("missing"), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut table = MethodTable::new();
        assert!(matches!(table.insert("", false), Err(Error::InvalidMethod { .. })));
        assert!(table.is_empty());
    }

    #[test]
    fn test_deserialize_map() {
        let table: MethodTable =
            serde_json::from_value(json!({"math.add": false, "log": true})).expect("parse");
        assert_eq!(table.get("math.add"), Some(false));
        assert_eq!(table.get("log"), Some(true));
    }

    #[test]
    fn test_deserialize_list() {
        let table: MethodTable =
            serde_json::from_value(json!([["math.add"], ["log", true], "ping"])).expect("parse");
        assert_eq!(table.get("math.add"), Some(false));
        assert_eq!(table.get("log"), Some(true));
        assert_eq!(table.get("ping"), Some(false));
    }

    #[test]
    fn test_deserialize_rejects_bad_entries() {
        assert!(serde_json::from_value::<MethodTable>(json!([[5, true]])).is_err());
        assert!(serde_json::from_value::<MethodTable>(json!([["log", "yes"]])).is_err());
        assert!(serde_json::from_value::<MethodTable>(json!({"": true})).is_err());
    }

    #[test]
    fn test_extend_overrides() {
        let mut table = MethodTable::new();
        table.insert("log", false).expect("insert");

        let mut other = MethodTable::new();
        other.insert("log", true).expect("insert");
        table.extend(other);

        assert_eq!(table.get("log"), Some(true));
    }

    #[test]
    fn test_factory_builds_requests() {
        let ids: Arc<dyn IdGenerator> = Arc::new(SequenceIdGenerator::starting_at(5));
        let call = MethodFactory::new("math.add", false, Arc::clone(&ids));
        let notify = MethodFactory::new("log", true, ids);

        let request = call.create(Some(json!([1, 2]))).expect("create");
        assert_eq!(request.id(), Some(RequestId::new(5)));
        assert_eq!(request.method(), "math.add");

        let notification = notify.create(None).expect("create");
        assert!(notification.is_notification());

        let next = call.create(None).expect("create");
        assert_eq!(next.id(), Some(RequestId::new(6)));
    }

    #[test]
    fn test_factory_validates_params() {
        let factory = MethodFactory::new("math.add", false, Arc::new(SequenceIdGenerator::default()));
        assert!(matches!(
            factory.create(Some(json!(3))),
            Err(Error::InvalidParams { .. })
        ));
    }
}
