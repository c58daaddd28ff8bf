//! Registry of the built-in schemas
//!
//! Schemas are hand-authored in code and built once per process. The
//! global registry is read-only after initialization, so lookups from any
//! number of threads need no locking.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use super::errors::RegistryError;
use super::types::Schema;

static REGISTRY: OnceLock<Result<SchemaRegistry, RegistryError>> = OnceLock::new();

/// Schemas indexed by id.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, &'static Schema>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in podlet schema.
    ///
    /// # Errors
    ///
    /// Fails if a built-in schema is malformed or two share an id.
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for schema in crate::podlet::builtin_schemas() {
            registry.register(schema)?;
        }
        Ok(registry)
    }

    /// Returns the process-wide registry of built-in schemas.
    ///
    /// Built on first use; a failed build is reported to every caller.
    pub fn global() -> Result<&'static SchemaRegistry, RegistryError> {
        REGISTRY.get_or_init(Self::builtin).as_ref().map_err(Clone::clone)
    }

    /// Registers a schema.
    ///
    /// # Errors
    ///
    /// Fails if the schema is structurally invalid or its id is taken;
    /// registered schemas are never replaced.
    pub fn register(&mut self, schema: &'static Schema) -> Result<(), RegistryError> {
        schema
            .validate_structure()
            .map_err(|reason| RegistryError::Malformed {
                id: schema.id.clone(),
                reason,
            })?;

        if self.schemas.contains_key(&schema.id) {
            return Err(RegistryError::Duplicate(schema.id.clone()));
        }

        self.schemas.insert(schema.id.clone(), schema);
        Ok(())
    }

    /// Gets a schema by id.
    pub fn get(&self, id: &str) -> Option<&'static Schema> {
        self.schemas.get(id).copied()
    }

    /// Checks if a schema exists.
    pub fn exists(&self, id: &str) -> bool {
        self.schemas.contains_key(id)
    }

    /// Returns registered ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Returns all registered schemas, sorted by id.
    pub fn all_schemas(&self) -> impl Iterator<Item = &'static Schema> + '_ {
        self.schemas.values().copied()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{FieldDef, Rule};

    fn leaked(schema: Schema) -> &'static Schema {
        Box::leak(Box::new(schema))
    }

    #[test]
    fn test_global_registry_has_builtin_schemas() {
        let registry = SchemaRegistry::global().unwrap();
        let ids: Vec<&str> = registry.ids().collect();
        assert_eq!(
            ids,
            vec!["content", "host-options", "manifest", "metadata", "response"]
        );
    }

    #[test]
    fn test_builtin_schemas_are_well_formed() {
        for schema in SchemaRegistry::global().unwrap().all_schemas() {
            assert!(
                schema.validate_structure().is_ok(),
                "schema '{}' is malformed",
                schema.id
            );
        }
    }

    #[test]
    fn test_builtin_registers_every_schema() {
        let mut registry = SchemaRegistry::builtin().unwrap();
        assert_eq!(registry.len(), crate::podlet::builtin_schemas().len());

        let err = registry
            .register(crate::podlet::manifest_schema())
            .unwrap_err();
        assert_eq!(err, RegistryError::Duplicate("manifest".into()));
    }

    #[test]
    fn test_global_registry_is_shared() {
        let a = SchemaRegistry::global().unwrap().get("manifest").unwrap();
        let b = SchemaRegistry::global().unwrap().get("manifest").unwrap();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = SchemaRegistry::new();
        assert!(registry.is_empty());

        registry
            .register(leaked(Schema::new("custom", vec![FieldDef::required("id", Rule::string())])))
            .unwrap();

        assert!(registry.exists("custom"));
        assert_eq!(registry.len(), 1);
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_register_is_immutable() {
        let mut registry = SchemaRegistry::new();
        let schema = leaked(Schema::new("custom", vec![]));

        registry.register(schema).unwrap();
        let err = registry.register(schema).unwrap_err();
        assert_eq!(err, RegistryError::Duplicate("custom".into()));
    }

    #[test]
    fn test_register_rejects_malformed_schema() {
        let mut registry = SchemaRegistry::new();
        let schema = leaked(Schema::new(
            "dup",
            vec![
                FieldDef::required("id", Rule::string()),
                FieldDef::required("id", Rule::string()),
            ],
        ));

        let err = registry.register(schema).unwrap_err();
        assert!(matches!(err, RegistryError::Malformed { .. }));
    }
}
