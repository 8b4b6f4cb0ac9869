//! Declarative response schemas, checked with `jsonschema`
//!
//! A schema is declared as a tree of [`ObjectSchema`]s whose properties each
//! accept a union of [`JsonType`]s. The declaration is rendered to a JSON
//! Schema document (draft 2020-12) and compiled once into a
//! [`SchemaValidator`]. Validation is a pure function over a
//! [`serde_json::Value`]; it never sees the transport response, so bodies that
//! were decoded earlier (list elements, fixture records) validate the same way
//! as fresh responses.
//!
//! # Example
//!
//! ```rust
//! use objectcheck::schema::{self, FieldSchema, JsonType, ObjectSchema};
//! use serde_json::json;
//!
//! let schema = ObjectSchema::new()
//!     .required("id", FieldSchema::new([JsonType::String]))
//!     .optional("price", FieldSchema::nullable(JsonType::Number))
//!     .compile()?;
//!
//! assert!(schema::validate(&json!({"id": "7", "price": 1849.99}), &schema).is_ok());
//!
//! let err = schema::validate(&json!({"id": 7}), &schema).unwrap_err();
//! assert_eq!(err.path(), "/id");
//! # Ok::<(), objectcheck::Error>(())
//! ```

use jsonschema::error::{TypeKind, ValidationErrorKind};
use jsonschema::{Draft, ValidationError, Validator};
use serde_json::{Map, Value, json};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

use crate::error::{Error, Result};

/// Runtime type of a JSON value, as JSON Schema names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonType {
    /// `null`
    Null,
    /// `true` / `false`
    Boolean,
    /// A number with no fractional part
    Integer,
    /// Any number
    Number,
    /// A string
    String,
    /// An array
    Array,
    /// An object
    Object,
}

impl JsonType {
    /// The most specific type of `value`. Integral numbers report `Integer`.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => JsonType::Null,
            Value::Bool(_) => JsonType::Boolean,
            Value::Number(n)
                if n.is_i64()
                    || n.is_u64()
                    || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0) =>
            {
                JsonType::Integer
            }
            Value::Number(_) => JsonType::Number,
            Value::String(_) => JsonType::String,
            Value::Array(_) => JsonType::Array,
            Value::Object(_) => JsonType::Object,
        }
    }

    /// Parse a JSON Schema `type` keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "null" => Some(JsonType::Null),
            "boolean" => Some(JsonType::Boolean),
            "integer" => Some(JsonType::Integer),
            "number" => Some(JsonType::Number),
            "string" => Some(JsonType::String),
            "array" => Some(JsonType::Array),
            "object" => Some(JsonType::Object),
            _ => None,
        }
    }

    /// JSON Schema keyword for this type.
    pub fn as_str(self) -> &'static str {
        match self {
            JsonType::Null => "null",
            JsonType::Boolean => "boolean",
            JsonType::Integer => "integer",
            JsonType::Number => "number",
            JsonType::String => "string",
            JsonType::Array => "array",
            JsonType::Object => "object",
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constraint on a single property: an accepted type union, plus a nested
/// object schema applied when the value is an object.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    types: Vec<JsonType>,
    object: Option<ObjectSchema>,
}

impl FieldSchema {
    /// Accept any of `types`.
    pub fn new(types: impl IntoIterator<Item = JsonType>) -> Self {
        Self {
            types: types.into_iter().collect(),
            object: None,
        }
    }

    /// Accept `ty` or `null`.
    pub fn nullable(ty: JsonType) -> Self {
        Self::new([ty, JsonType::Null])
    }

    /// Apply `schema` to object values of this field.
    ///
    /// `Object` is added to the accepted union if it is not there already.
    pub fn with_object(mut self, schema: ObjectSchema) -> Self {
        if !self.types.contains(&JsonType::Object) {
            self.types.insert(0, JsonType::Object);
        }
        self.object = Some(schema);
        self
    }

    /// The accepted type union.
    pub fn types(&self) -> &[JsonType] {
        &self.types
    }

    /// Nested schema for object values, if any.
    pub fn object(&self) -> Option<&ObjectSchema> {
        self.object.as_ref()
    }

    fn to_json_schema(&self) -> Value {
        let mut out = match &self.object {
            Some(nested) => nested.to_json_schema(),
            None => json!({}),
        };
        if let Some(map) = out.as_object_mut() {
            map.insert("type".to_string(), render_types(&self.types));
        }
        out
    }
}

fn render_types(types: &[JsonType]) -> Value {
    match types {
        [single] => Value::String(single.as_str().to_string()),
        many => Value::Array(
            many.iter()
                .map(|ty| Value::String(ty.as_str().to_string()))
                .collect(),
        ),
    }
}

/// Schema for a JSON object: named properties, which of them are required,
/// and whether unknown keys are allowed.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSchema {
    properties: Vec<(String, FieldSchema)>,
    required: Vec<String>,
    additional_properties: bool,
}

impl Default for ObjectSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectSchema {
    /// An empty schema that accepts any object.
    pub fn new() -> Self {
        Self {
            properties: Vec::new(),
            required: Vec::new(),
            additional_properties: true,
        }
    }

    /// Declare a property that must be present.
    pub fn required(mut self, name: impl Into<String>, field: FieldSchema) -> Self {
        let name = name.into();
        self.required.push(name.clone());
        self.properties.push((name, field));
        self
    }

    /// Declare a property that may be absent.
    pub fn optional(mut self, name: impl Into<String>, field: FieldSchema) -> Self {
        self.properties.push((name.into(), field));
        self
    }

    /// Allow or reject keys that are not declared. Allowed by default.
    pub fn additional_properties(mut self, allowed: bool) -> Self {
        self.additional_properties = allowed;
        self
    }

    /// Look up a declared property.
    pub fn property(&self, name: &str) -> Option<&FieldSchema> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, field)| field)
    }

    /// Names of the required properties, in declaration order.
    pub fn required_keys(&self) -> &[String] {
        &self.required
    }

    /// Render as a JSON Schema document.
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .properties
            .iter()
            .map(|(name, field)| (name.clone(), field.to_json_schema()))
            .collect();

        let mut out = Map::new();
        out.insert("type".to_string(), json!("object"));
        out.insert("properties".to_string(), Value::Object(properties));
        if !self.required.is_empty() {
            out.insert("required".to_string(), json!(self.required));
        }
        out.insert(
            "additionalProperties".to_string(),
            Value::Bool(self.additional_properties),
        );
        Value::Object(out)
    }

    /// Compile into a [`SchemaValidator`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSchema`] if the rendered document is rejected
    /// by the JSON Schema compiler.
    pub fn compile(self) -> Result<SchemaValidator> {
        SchemaValidator::new(self)
    }
}

/// A compiled [`ObjectSchema`], able to check single records and arrays of
/// records.
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    descriptor: ObjectSchema,
    document: Value,
    collection_document: Value,
    record: Validator,
    collection: Validator,
}

impl SchemaValidator {
    /// Render and compile `descriptor`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSchema`] if the rendered document does not
    /// compile.
    pub fn new(descriptor: ObjectSchema) -> Result<Self> {
        let document = descriptor.to_json_schema();
        let collection_document = json!({"type": "array", "items": document});
        let record = compile(&document)?;
        let collection = compile(&collection_document)?;
        Ok(Self {
            descriptor,
            document,
            collection_document,
            record,
            collection,
        })
    }

    /// The declaration this validator was compiled from.
    pub fn descriptor(&self) -> &ObjectSchema {
        &self.descriptor
    }

    /// The rendered JSON Schema document for a single record.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Check one record.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaViolation`] the engine reports.
    pub fn validate(&self, value: &Value) -> std::result::Result<(), SchemaViolation> {
        self.record
            .validate(value)
            .map_err(|error| violation_from(&error, &self.document))
    }

    /// Check that `value` is an array whose every element is a valid record.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaViolation`], with the element index as the
    /// first pointer segment.
    pub fn validate_collection(&self, value: &Value) -> std::result::Result<(), SchemaViolation> {
        self.collection
            .validate(value)
            .map_err(|error| violation_from(&error, &self.collection_document))
    }
}

fn compile(document: &Value) -> Result<Validator> {
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(document)
        .map_err(|err| Error::InvalidSchema(err.to_string()))
}

fn violation_from(error: &ValidationError<'_>, document: &Value) -> SchemaViolation {
    let path = error.instance_path().as_str().to_string();
    let schema_path = error.schema_path().as_str();

    match error.kind() {
        ValidationErrorKind::Type { kind } => {
            let mut expected = declared_types(document.pointer(schema_path));
            if expected.is_empty() {
                expected = engine_types(kind);
            }
            SchemaViolation::type_mismatch(path, expected, JsonType::of(error.instance()))
        }
        ValidationErrorKind::Required { property } => {
            let key = property.as_str().unwrap_or_default();
            let declared = schema_path
                .strip_suffix("/required")
                .and_then(|parent| document.pointer(parent))
                .and_then(|parent| parent.get("properties"))
                .and_then(|properties| properties.get(key))
                .and_then(|field| field.get("type"));
            SchemaViolation::missing(pointer_push(&path, key), declared_types(declared))
        }
        ValidationErrorKind::AdditionalProperties { unexpected } => {
            let key = unexpected.first().map(String::as_str).unwrap_or_default();
            let actual = error
                .instance()
                .get(key)
                .map_or(JsonType::Null, JsonType::of);
            SchemaViolation::unexpected(pointer_push(&path, key), actual)
        }
        _ => SchemaViolation::other(path, error.to_string()),
    }
}

fn declared_types(keyword: Option<&Value>) -> Vec<JsonType> {
    match keyword {
        Some(Value::String(single)) => JsonType::from_keyword(single).into_iter().collect(),
        Some(Value::Array(many)) => many
            .iter()
            .filter_map(Value::as_str)
            .filter_map(JsonType::from_keyword)
            .collect(),
        _ => Vec::new(),
    }
}

fn engine_types(kind: &TypeKind) -> Vec<JsonType> {
    let keywords: Vec<String> = match kind {
        TypeKind::Single(ty) => vec![ty.to_string()],
        TypeKind::Multiple(set) => set.iter().map(|ty| ty.to_string()).collect(),
    };
    keywords
        .iter()
        .filter_map(|keyword| JsonType::from_keyword(keyword))
        .collect()
}

fn pointer_push(base: &str, key: &str) -> String {
    format!("{}/{}", base, key.replace('~', "~0").replace('/', "~1"))
}

/// What was wrong at a [`SchemaViolation`]'s path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// A required key was absent.
    Missing {
        /// Types the key would have accepted
        expected: Vec<JsonType>,
    },
    /// The value's type is not in the accepted union.
    TypeMismatch {
        /// Accepted type union
        expected: Vec<JsonType>,
        /// Type actually found
        actual: JsonType,
    },
    /// An undeclared key appeared where additional properties are not allowed.
    Unexpected {
        /// Type of the undeclared value
        actual: JsonType,
    },
    /// Any other keyword failure, as the engine described it.
    Other {
        /// Engine message
        message: String,
    },
}

/// A single schema failure, located by JSON pointer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Schema violation at {}: {}", display_path(.path), describe(.kind))]
pub struct SchemaViolation {
    path: String,
    kind: ViolationKind,
}

impl SchemaViolation {
    /// A required key is missing.
    pub fn missing(path: String, expected: Vec<JsonType>) -> Self {
        Self {
            path,
            kind: ViolationKind::Missing { expected },
        }
    }

    /// A value has the wrong type.
    pub fn type_mismatch(path: String, expected: Vec<JsonType>, actual: JsonType) -> Self {
        Self {
            path,
            kind: ViolationKind::TypeMismatch { expected, actual },
        }
    }

    /// An undeclared key is present.
    pub fn unexpected(path: String, actual: JsonType) -> Self {
        Self {
            path,
            kind: ViolationKind::Unexpected { actual },
        }
    }

    fn other(path: String, message: String) -> Self {
        Self {
            path,
            kind: ViolationKind::Other { message },
        }
    }

    /// JSON pointer to the offending value (empty for the document root).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The failure detail.
    pub fn kind(&self) -> &ViolationKind {
        &self.kind
    }

    /// Accepted types at the path, empty for undeclared keys.
    pub fn expected(&self) -> &[JsonType] {
        match &self.kind {
            ViolationKind::Missing { expected } | ViolationKind::TypeMismatch { expected, .. } => {
                expected
            }
            ViolationKind::Unexpected { .. } | ViolationKind::Other { .. } => &[],
        }
    }

    /// Type found at the path, `None` when the key was absent.
    pub fn actual(&self) -> Option<JsonType> {
        match &self.kind {
            ViolationKind::Missing { .. } | ViolationKind::Other { .. } => None,
            ViolationKind::TypeMismatch { actual, .. } | ViolationKind::Unexpected { actual } => {
                Some(*actual)
            }
        }
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() { "(root)" } else { path }
}

fn describe(kind: &ViolationKind) -> String {
    match kind {
        ViolationKind::Missing { expected } => {
            format!("required key missing (expected {})", join_types(expected))
        }
        ViolationKind::TypeMismatch { expected, actual } => {
            format!("expected {}, got {}", join_types(expected), actual)
        }
        ViolationKind::Unexpected { actual } => {
            format!("undeclared key with {} value", actual)
        }
        ViolationKind::Other { message } => message.clone(),
    }
}

fn join_types(types: &[JsonType]) -> String {
    if types.is_empty() {
        return "any".to_string();
    }
    types
        .iter()
        .map(|ty| ty.as_str())
        .collect::<Vec<_>>()
        .join("|")
}

/// Validate a decoded value against a compiled schema.
///
/// # Errors
///
/// Returns the first [`SchemaViolation`] found.
pub fn validate(value: &Value, schema: &SchemaValidator) -> std::result::Result<(), SchemaViolation> {
    schema.validate(value)
}

/// Validate that `value` is an array whose every element satisfies `schema`.
///
/// # Errors
///
/// Returns the first [`SchemaViolation`], with the element index as the first
/// pointer segment.
pub fn validate_collection(
    value: &Value,
    schema: &SchemaValidator,
) -> std::result::Result<(), SchemaViolation> {
    schema.validate_collection(value)
}

/// Declaration every object record returned by the service must satisfy.
///
/// `id`, `name` and `data` are required; `data` may be `null` or an object
/// whose known attributes have fixed type unions and whose other attributes
/// are accepted as-is.
pub fn product_descriptor() -> ObjectSchema {
    let data = ObjectSchema::new()
        .optional("color", FieldSchema::nullable(JsonType::String))
        .optional("capacity", FieldSchema::nullable(JsonType::String))
        .optional("capacity GB", FieldSchema::nullable(JsonType::Integer))
        .optional("price", FieldSchema::nullable(JsonType::Number))
        .optional("generation", FieldSchema::nullable(JsonType::String))
        .optional("year", FieldSchema::nullable(JsonType::Integer))
        .optional("CPU model", FieldSchema::nullable(JsonType::String))
        .optional("Hard disk size", FieldSchema::nullable(JsonType::String))
        .optional("Strap Colour", FieldSchema::nullable(JsonType::String))
        .optional("Case Size", FieldSchema::nullable(JsonType::String))
        .optional("Color", FieldSchema::nullable(JsonType::String))
        .optional("Description", FieldSchema::nullable(JsonType::String))
        .optional("Screen size", FieldSchema::nullable(JsonType::Number))
        .optional("Capacity", FieldSchema::nullable(JsonType::String))
        .optional("Generation", FieldSchema::nullable(JsonType::String))
        .optional("Price", FieldSchema::nullable(JsonType::String))
        .additional_properties(true);

    ObjectSchema::new()
        .required("id", FieldSchema::new([JsonType::String]))
        .required("name", FieldSchema::new([JsonType::String]))
        .required("data", FieldSchema::new([JsonType::Null]).with_object(data))
}

/// The compiled product schema, built on first use.
pub fn product_schema() -> &'static SchemaValidator {
    static SCHEMA: OnceLock<SchemaValidator> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        product_descriptor()
            .compile()
            .expect("product schema renders a valid draft 2020-12 document")
    })
}
