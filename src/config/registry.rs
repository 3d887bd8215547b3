//! Schema registry: the single source of truth for which fields exist.

use indexmap::IndexMap;
use thiserror::Error;

use crate::config::field::FieldSpec;

/// Schema definition errors. These are programmer errors and abort startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("duplicate configuration field `{namespace}.{key}`")]
    DuplicateKey { namespace: String, key: String },

    #[error("default value of `{namespace}.{key}` fails its own validator")]
    InvalidDefault { namespace: String, key: String },
}

/// Ordered fields of one namespace.
pub type Namespace = IndexMap<&'static str, FieldSpec>;

/// Immutable, ordered collection of field specs grouped into namespaces.
///
/// Built once through [`SchemaRegistryBuilder`]; there is no way to add or
/// remove fields afterwards.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    namespaces: IndexMap<&'static str, Namespace>,
}

impl SchemaRegistry {
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::default()
    }

    /// Fields of a namespace in declaration order.
    pub fn get(&self, namespace: &str) -> Option<&Namespace> {
        self.namespaces.get(namespace)
    }

    pub fn field(&self, namespace: &str, key: &str) -> Option<&FieldSpec> {
        self.get(namespace).and_then(|fields| fields.get(key))
    }

    pub fn all_namespaces(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.namespaces.keys().copied()
    }

    /// Iterate every `(namespace, key, spec)` triple in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str, &FieldSpec)> {
        self.namespaces
            .iter()
            .flat_map(|(ns, fields)| fields.iter().map(move |(key, spec)| (*ns, *key, spec)))
    }

    pub fn field_count(&self) -> usize {
        self.namespaces.values().map(IndexMap::len).sum()
    }
}

/// Collects registrations and checks them before producing a registry.
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    namespaces: IndexMap<&'static str, Namespace>,
}

impl SchemaRegistryBuilder {
    /// Register a field. Fails on a duplicate key or a default that does not
    /// pass its own validator.
    pub fn register(
        mut self,
        namespace: &'static str,
        key: &'static str,
        spec: FieldSpec,
    ) -> Result<Self, SchemaError> {
        if !spec.default_is_valid() {
            return Err(SchemaError::InvalidDefault {
                namespace: namespace.to_string(),
                key: key.to_string(),
            });
        }
        let fields = self.namespaces.entry(namespace).or_default();
        if fields.contains_key(key) {
            return Err(SchemaError::DuplicateKey {
                namespace: namespace.to_string(),
                key: key.to_string(),
            });
        }
        fields.insert(key, spec);
        Ok(self)
    }

    pub fn build(self) -> SchemaRegistry {
        SchemaRegistry {
            namespaces: self.namespaces,
        }
    }
}
