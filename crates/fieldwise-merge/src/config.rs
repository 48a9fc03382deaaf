//! TOML schema files.
//!
//! A schema file declares dynamic schemas and their field policies:
//!
//! ```toml
//! [[schemas]]
//! name = "person"
//! fields = [
//!     { name = "id", policy = "ignored", sealed = true },
//!     { name = "email" },
//!     { name = "nickname", policy = "mandatory" },
//! ]
//! ```
//!
//! Field order in the file is the schema's declaration order.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use fieldwise_types::MergePolicy;
use serde::{Deserialize, Serialize};

use crate::dynamic::DynamicSchema;
use crate::error::ConfigError;

/// Top-level layout of a schema file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SchemaFile {
    /// Declared schemas.
    #[serde(default)]
    pub schemas: Vec<SchemaConfig>,
}

/// One schema declaration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Unique schema name.
    pub name: String,
    /// Fields in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

/// One field declaration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Field name, unique within the schema.
    pub name: String,
    /// Declared policy; `required` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<MergePolicy>,
    /// Whether merges may write this field.
    #[serde(default)]
    pub sealed: bool,
}

impl SchemaFile {
    /// Parse a schema file from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a schema file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Validate the declarations and build a catalog.
    pub fn into_catalog(self) -> Result<SchemaCatalog, ConfigError> {
        let mut catalog = SchemaCatalog::default();
        for schema in self.schemas {
            let name = schema.name.trim().to_string();
            if name.is_empty() {
                return Err(ConfigError::BlankName("schema".into()));
            }
            if catalog.schemas.contains_key(&name) {
                return Err(ConfigError::DuplicateSchema(name));
            }

            let mut built = DynamicSchema::new(name.clone());
            for field in schema.fields {
                let field_name = field.name.trim().to_string();
                if field_name.is_empty() {
                    return Err(ConfigError::BlankName(format!("field of schema '{name}'")));
                }
                if built.declares(&field_name) {
                    return Err(ConfigError::DuplicateField {
                        schema: name,
                        field: field_name,
                    });
                }
                built = if field.sealed {
                    built.with_sealed_field(field_name, field.policy)
                } else {
                    built.with_field(field_name, field.policy)
                };
            }
            catalog.schemas.insert(name, Arc::new(built));
        }
        Ok(catalog)
    }
}

/// Validated dynamic schemas, looked up by name.
#[derive(Clone, Debug, Default)]
pub struct SchemaCatalog {
    schemas: BTreeMap<String, Arc<DynamicSchema>>,
}

impl SchemaCatalog {
    /// Load and validate a schema file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        SchemaFile::load(path)?.into_catalog()
    }

    /// Parse and validate schema-file text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        SchemaFile::from_toml_str(text)?.into_catalog()
    }

    /// Look up a schema by name.
    pub fn get(&self, name: &str) -> Option<Arc<DynamicSchema>> {
        self.schemas.get(name).cloned()
    }

    /// Schema names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Schemas in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<DynamicSchema>> {
        self.schemas.values()
    }

    /// Number of schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns `true` if no schemas are declared.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PERSON: &str = r#"
[[schemas]]
name = "person"
fields = [
    { name = "id", policy = "ignored", sealed = true },
    { name = "email" },
    { name = "nickname", policy = "mandatory" },
]

[[schemas]]
name = "marker"
"#;

    #[test]
    fn parses_fields_in_order() {
        let catalog = SchemaCatalog::from_toml_str(PERSON).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.names().collect::<Vec<_>>(), ["marker", "person"]);

        let person = catalog.get("person").unwrap();
        let names: Vec<&str> = person.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, ["id", "email", "nickname"]);
        assert_eq!(person.fields()[0].policy(), MergePolicy::Ignored);
        assert_eq!(person.fields()[1].declared_policy(), None);
        assert_eq!(person.fields()[2].policy(), MergePolicy::Mandatory);
        assert!(person.is_sealed("id"));
        assert!(!person.is_sealed("email"));

        assert!(catalog.get("marker").unwrap().fields().is_empty());
    }

    #[test]
    fn rejects_duplicate_field() {
        let text = r#"
[[schemas]]
name = "p"
fields = [{ name = "a" }, { name = "a", policy = "ignored" }]
"#;
        let err = SchemaCatalog::from_toml_str(text).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateField { ref field, .. } if field == "a"));
    }

    #[test]
    fn rejects_duplicate_schema() {
        let text = "[[schemas]]\nname = \"p\"\n[[schemas]]\nname = \"p\"\n";
        let err = SchemaCatalog::from_toml_str(text).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateSchema(ref name) if name == "p"));
    }

    #[test]
    fn rejects_blank_names() {
        let err = SchemaCatalog::from_toml_str("[[schemas]]\nname = \"  \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::BlankName(_)));
    }

    #[test]
    fn rejects_unknown_policy() {
        let text = r#"
[[schemas]]
name = "p"
fields = [{ name = "a", policy = "sometimes" }]
"#;
        let err = SchemaCatalog::from_toml_str(text).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn empty_file_is_empty_catalog() {
        assert!(SchemaCatalog::from_toml_str("").unwrap().is_empty());
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PERSON.as_bytes()).unwrap();
        let catalog = SchemaCatalog::load(file.path()).unwrap();
        assert!(catalog.get("person").is_some());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SchemaCatalog::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
