//! Resolved configuration snapshot.
//!
//! A snapshot mirrors the registry exactly: every declared field is present,
//! nothing else is. It is never mutated; a reload builds a new one.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::value::ConfigValue;

/// Where a snapshot value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Provenance {
    AsProvided,
    Fixed,
    Defaulted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedField {
    pub value: ConfigValue,
    pub provenance: Provenance,
}

/// Errors raised when reading typed values out of a snapshot.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("configuration field `{namespace}.{key}` is not declared")]
    MissingField { namespace: String, key: String },

    #[error("configuration field `{namespace}.{key}` holds {actual}, expected {expected}")]
    TypeMismatch {
        namespace: String,
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("configuration field `{namespace}.{key}` value {value} is out of range")]
    OutOfRange { namespace: String, key: String, value: i64 },
}

/// Immutable result of one resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigSnapshot {
    namespaces: IndexMap<String, IndexMap<String, ResolvedField>>,
}

impl ConfigSnapshot {
    pub(crate) fn from_namespaces(
        namespaces: IndexMap<String, IndexMap<String, ResolvedField>>,
    ) -> Self {
        Self { namespaces }
    }

    pub fn get(&self, namespace: &str, key: &str) -> Option<&ResolvedField> {
        self.namespaces.get(namespace).and_then(|fields| fields.get(key))
    }

    pub fn namespace(&self, namespace: &str) -> Option<&IndexMap<String, ResolvedField>> {
        self.namespaces.get(namespace)
    }

    /// Iterate every `(namespace, key, field)` in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &ResolvedField)> {
        self.namespaces.iter().flat_map(|(ns, fields)| {
            fields
                .iter()
                .map(move |(key, field)| (ns.as_str(), key.as_str(), field))
        })
    }

    pub fn len(&self) -> usize {
        self.namespaces.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn value(&self, namespace: &str, key: &str) -> Result<&ConfigValue, SnapshotError> {
        self.get(namespace, key)
            .map(|field| &field.value)
            .ok_or_else(|| SnapshotError::MissingField {
                namespace: namespace.to_string(),
                key: key.to_string(),
            })
    }

    fn mismatch(namespace: &str, key: &str, expected: &'static str, actual: &ConfigValue) -> SnapshotError {
        SnapshotError::TypeMismatch {
            namespace: namespace.to_string(),
            key: key.to_string(),
            expected,
            actual: actual.type_name(),
        }
    }

    pub fn string(&self, namespace: &str, key: &str) -> Result<&str, SnapshotError> {
        let value = self.value(namespace, key)?;
        value
            .as_str()
            .ok_or_else(|| Self::mismatch(namespace, key, "string", value))
    }

    pub fn boolean(&self, namespace: &str, key: &str) -> Result<bool, SnapshotError> {
        let value = self.value(namespace, key)?;
        value
            .as_bool()
            .ok_or_else(|| Self::mismatch(namespace, key, "bool", value))
    }

    pub fn integer(&self, namespace: &str, key: &str) -> Result<i64, SnapshotError> {
        let value = self.value(namespace, key)?;
        value
            .as_integer()
            .ok_or_else(|| Self::mismatch(namespace, key, "integer", value))
    }

    /// Normalised raw document: every field with its resolved value.
    pub fn to_document(&self) -> Value {
        let mut root = Map::new();
        for (ns, fields) in &self.namespaces {
            let section: Map<String, Value> = fields
                .iter()
                .map(|(key, field)| (key.clone(), field.value.to_json()))
                .collect();
            root.insert(ns.clone(), Value::Object(section));
        }
        Value::Object(root)
    }
}
