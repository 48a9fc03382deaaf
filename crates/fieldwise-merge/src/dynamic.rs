//! Records whose schema is only known at runtime.
//!
//! A [`DynamicSchema`] names a schema and lists its fields in declaration
//! order, each with an optional policy. A [`DynamicRecord`] binds a map of
//! JSON values to a schema. Missing and `null` values are absent. Sealed
//! fields can be read but refuse writes, so merging into one fails.
//!
//! Every schema definition has its own identity. Two schemas built separately
//! never merge, even when they share a name, and adding a field yields a new
//! definition. Clones of a finished schema keep its identity.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use fieldwise_types::{MergePolicy, Presence, SchemaId};
use serde_json::{Map, Value};

use crate::error::AccessFault;
use crate::record::{FieldDescriptor, Record};

// ---------------------------------------------------------------------------
// DynamicSchema
// ---------------------------------------------------------------------------

/// A named schema declared at runtime.
#[derive(Clone, Debug)]
pub struct DynamicSchema {
    id: SchemaId,
    fields: Vec<FieldDescriptor>,
    sealed: BTreeSet<String>,
}

impl DynamicSchema {
    /// Create a schema with no fields.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            id: SchemaId::unique::<DynamicRecord>(name),
            fields: Vec::new(),
            sealed: BTreeSet::new(),
        }
    }

    /// Append a field with an optional declared policy.
    ///
    /// A name that is already declared is ignored; the first declaration wins.
    pub fn with_field(mut self, name: impl Into<String>, policy: Option<MergePolicy>) -> Self {
        let name = name.into();
        if self.declares(&name) {
            return self;
        }
        self.fields.push(FieldDescriptor::new(name, policy));
        self.id = self.id.reissue();
        self
    }

    /// Append a field that may be read but never written.
    ///
    /// Duplicates are ignored as in [`Self::with_field`].
    pub fn with_sealed_field(mut self, name: impl Into<String>, policy: Option<MergePolicy>) -> Self {
        let name = name.into();
        if self.declares(&name) {
            return self;
        }
        self.sealed.insert(name.clone());
        self.with_field(name, policy)
    }

    /// The schema identity.
    pub fn id(&self) -> &SchemaId {
        &self.id
    }

    /// The schema name.
    pub fn name(&self) -> &str {
        self.id.name()
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Returns `true` if the schema declares this field.
    pub fn declares(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Returns `true` if the field refuses writes.
    pub fn is_sealed(&self, name: &str) -> bool {
        self.sealed.contains(name)
    }

    fn check(&self, name: &str) -> Result<(), AccessFault> {
        if self.declares(name) {
            Ok(())
        } else {
            Err(AccessFault::unknown(name))
        }
    }
}

// ---------------------------------------------------------------------------
// DynamicRecord
// ---------------------------------------------------------------------------

/// A JSON-valued record bound to a [`DynamicSchema`].
#[derive(Clone, Debug)]
pub struct DynamicRecord {
    schema: Arc<DynamicSchema>,
    values: BTreeMap<String, Value>,
}

impl DynamicRecord {
    /// Create a record with every field absent.
    pub fn new(schema: Arc<DynamicSchema>) -> Self {
        Self {
            schema,
            values: BTreeMap::new(),
        }
    }

    /// Build a record from a JSON object.
    ///
    /// Every key must be declared by the schema. Sealed fields may be
    /// populated here; they only refuse writes during a merge.
    pub fn from_json(schema: Arc<DynamicSchema>, json: Value) -> Result<Self, AccessFault> {
        let object = match json {
            Value::Object(object) => object,
            other => {
                return Err(AccessFault::TypeMismatch {
                    expected: "object".into(),
                    found: json_kind(&other).into(),
                })
            }
        };
        let mut record = Self::new(schema);
        for (key, value) in object {
            record.schema.check(&key)?;
            record.values.insert(key, value);
        }
        Ok(record)
    }

    /// The bound schema.
    pub fn schema_def(&self) -> &Arc<DynamicSchema> {
        &self.schema
    }

    /// Current value of a field, if any.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Set a field, returning the previous value.
    pub fn set(&mut self, field: &str, value: Value) -> Result<Option<Value>, AccessFault> {
        self.schema.check(field)?;
        Ok(self.values.insert(field.to_string(), value))
    }

    /// Render as a JSON object in declaration order; absent fields are `null`.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        for field in self.schema.fields() {
            let value = self.values.get(field.name()).cloned().unwrap_or(Value::Null);
            object.insert(field.name().to_string(), value);
        }
        Value::Object(object)
    }
}

impl PartialEq for DynamicRecord {
    fn eq(&self, other: &Self) -> bool {
        self.schema.id() == other.schema.id() && self.to_json() == other.to_json()
    }
}

impl Record for DynamicRecord {
    fn schema(&self) -> SchemaId {
        self.schema.id().clone()
    }

    fn fields(&self) -> Vec<FieldDescriptor> {
        self.schema.fields().to_vec()
    }

    fn is_present(&self, field: &str) -> Result<bool, AccessFault> {
        self.schema.check(field)?;
        Ok(self.values.get(field).is_some_and(|v| v.is_present()))
    }

    fn assign(&mut self, field: &str, source: &Self) -> Result<(), AccessFault> {
        self.schema.check(field)?;
        if self.schema.is_sealed(field) {
            return Err(AccessFault::Restricted(format!("field '{field}' is sealed")));
        }
        match source.values.get(field) {
            Some(value) if value.is_present() => {
                self.values.insert(field.to_string(), value.clone());
            }
            _ => {
                self.values.remove(field);
            }
        }
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{merge_into, FieldOutcome, Merger};
    use crate::error::MergeError;
    use serde_json::json;

    fn entity_schema() -> Arc<DynamicSchema> {
        Arc::new(
            DynamicSchema::new("entity")
                .with_field("string", Some(MergePolicy::Ignored))
                .with_field("intVal", None)
                .with_field("list", Some(MergePolicy::Mandatory))
                .with_field("arr", Some(MergePolicy::Required)),
        )
    }

    #[test]
    fn entity_scenario_over_json() {
        let schema = entity_schema();
        let mut base = DynamicRecord::from_json(
            schema.clone(),
            json!({
                "string": "string",
                "intVal": 1,
                "list": ["a", "b", "c"],
                "arr": ["sArr1", "sArr2"],
            }),
        )
        .unwrap();
        let incoming = DynamicRecord::from_json(
            schema,
            json!({
                "string": "newString",
                "intVal": 2,
                "list": null,
                "arr": ["newS1", "newS2", "newS3"],
            }),
        )
        .unwrap();

        merge_into(&mut base, &incoming).unwrap();

        assert_eq!(
            base.to_json(),
            json!({
                "string": "string",
                "intVal": 2,
                "list": null,
                "arr": ["newS1", "newS2", "newS3"],
            })
        );
    }

    #[test]
    fn missing_value_is_absent() {
        let schema = entity_schema();
        let mut base = DynamicRecord::from_json(schema.clone(), json!({"arr": [1]})).unwrap();
        let incoming = DynamicRecord::new(schema);
        let report = Merger::new().merge(&mut base, &incoming).unwrap();
        assert_eq!(report.outcome("arr"), Some(FieldOutcome::Kept));
        assert_eq!(base.get("arr"), Some(&json!([1])));
    }

    #[test]
    fn different_schemas_do_not_merge() {
        let person = Arc::new(DynamicSchema::new("person").with_field("name", None));
        let contact = Arc::new(DynamicSchema::new("contact").with_field("name", None));
        let mut base = DynamicRecord::from_json(person, json!({"name": "Ada"})).unwrap();
        let before = base.clone();
        let incoming = DynamicRecord::from_json(contact, json!({"name": "Bob"})).unwrap();

        let err = merge_into(&mut base, &incoming).unwrap_err();
        match err {
            MergeError::SchemaMismatch { base: b, incoming } => {
                assert_eq!(b.name(), "person");
                assert_eq!(incoming.name(), "contact");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(base, before);
    }

    #[test]
    fn same_name_different_definition_is_mismatch() {
        let full = Arc::new(
            DynamicSchema::new("person")
                .with_field("email", None)
                .with_field("id", None),
        );
        let partial = Arc::new(DynamicSchema::new("person").with_field("email", None));
        let mut base = DynamicRecord::from_json(full, json!({"email": "old", "id": 1})).unwrap();
        let before = base.clone();
        let incoming = DynamicRecord::from_json(partial, json!({"email": "new"})).unwrap();

        let err = merge_into(&mut base, &incoming).unwrap_err();
        assert!(err.is_schema_mismatch());
        assert_eq!(base.get("email"), Some(&json!("old")));
        assert_eq!(base, before);
    }

    #[test]
    fn same_fields_different_policies_is_mismatch() {
        let keep = Arc::new(DynamicSchema::new("flag").with_field("on", Some(MergePolicy::Ignored)));
        let take = Arc::new(DynamicSchema::new("flag").with_field("on", Some(MergePolicy::Mandatory)));
        let mut base = DynamicRecord::from_json(keep, json!({"on": true})).unwrap();
        let incoming = DynamicRecord::from_json(take, json!({"on": false})).unwrap();

        let err = merge_into(&mut base, &incoming).unwrap_err();
        assert!(err.is_schema_mismatch());
        assert_eq!(base.get("on"), Some(&json!(true)));
    }

    #[test]
    fn shared_and_cloned_schemas_keep_identity() {
        let schema = entity_schema();
        let copy = Arc::new(DynamicSchema::clone(&schema));
        assert_eq!(schema.id(), copy.id());

        let mut base = DynamicRecord::from_json(schema, json!({"intVal": 1})).unwrap();
        let incoming = DynamicRecord::from_json(copy, json!({"intVal": 2})).unwrap();
        merge_into(&mut base, &incoming).unwrap();
        assert_eq!(base.get("intVal"), Some(&json!(2)));
    }

    #[test]
    fn adding_a_field_changes_identity() {
        let base = DynamicSchema::new("account").with_field("owner", None);
        let extended = base.clone().with_field("email", None);
        assert_ne!(base.id(), extended.id());
        assert_eq!(extended.name(), "account");
    }

    #[test]
    fn duplicate_fields_are_ignored_by_builder() {
        let schema = DynamicSchema::new("account")
            .with_field("owner", Some(MergePolicy::Ignored))
            .with_field("owner", Some(MergePolicy::Mandatory))
            .with_sealed_field("owner", None);
        let id = schema.id().clone();
        let schema = schema.with_field("owner", None);

        assert_eq!(schema.fields().len(), 1);
        assert_eq!(schema.fields()[0].policy(), MergePolicy::Ignored);
        assert!(!schema.is_sealed("owner"));
        assert_eq!(schema.id(), &id);
    }

    #[test]
    fn sealed_field_aborts_merge() {
        let schema = Arc::new(
            DynamicSchema::new("account")
                .with_field("owner", None)
                .with_sealed_field("id", Some(MergePolicy::Mandatory))
                .with_field("email", None),
        );
        let mut base =
            DynamicRecord::from_json(schema.clone(), json!({"owner": "a", "id": 1, "email": "x"}))
                .unwrap();
        let incoming =
            DynamicRecord::from_json(schema, json!({"owner": "b", "id": 2, "email": "y"})).unwrap();

        let err = merge_into(&mut base, &incoming).unwrap_err();
        assert_eq!(err.field(), Some("id"));
        assert_eq!(base.get("owner"), Some(&json!("b")));
        assert_eq!(base.get("id"), Some(&json!(1)));
        assert_eq!(base.get("email"), Some(&json!("x")));
    }

    #[test]
    fn undeclared_keys_are_rejected() {
        let err = DynamicRecord::from_json(entity_schema(), json!({"bogus": 1})).unwrap_err();
        assert_eq!(err, AccessFault::unknown("bogus"));

        let mut record = DynamicRecord::new(entity_schema());
        assert!(record.set("bogus", json!(1)).is_err());
        assert_eq!(record.is_present("bogus"), Err(AccessFault::unknown("bogus")));
        assert_eq!(record.set("intVal", json!(3)).unwrap(), None);
    }

    #[test]
    fn non_object_json_is_rejected() {
        let err = DynamicRecord::from_json(entity_schema(), json!([1, 2])).unwrap_err();
        assert!(matches!(err, AccessFault::TypeMismatch { found, .. } if found == "array"));
    }

    #[test]
    fn to_json_follows_declaration_order_with_nulls() {
        let record = DynamicRecord::new(entity_schema());
        let json = record.to_json();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["string", "intVal", "list", "arr"]);
        assert!(json.as_object().unwrap().values().all(Value::is_null));
    }
}
