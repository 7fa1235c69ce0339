//! JSON Schema validation of course definition files.
//!
//! Schema documents are embedded at build time and compiled once into a
//! [`SchemaRegistry`]. Question options are validated against a secondary,
//! type-dependent schema whose name is `prefix + type + suffix`.

use std::collections::HashMap;
use std::path::Path;

use jsonschema::Validator;
use serde_json::Value;
use uuid::Uuid;

use crate::error::SyncError;

const SCHEMA_SOURCES: &[(&str, &str)] = &[
    ("infoCourse", include_str!("../../schemas/infoCourse.json")),
    ("infoQuestion", include_str!("../../schemas/infoQuestion.json")),
    (
        "infoCourseInstance",
        include_str!("../../schemas/infoCourseInstance.json"),
    ),
    ("infoAssessment", include_str!("../../schemas/infoAssessment.json")),
    (
        "questionOptionsMultipleChoice",
        include_str!("../../schemas/questionOptionsMultipleChoice.json"),
    ),
    (
        "questionOptionsCheckbox",
        include_str!("../../schemas/questionOptionsCheckbox.json"),
    ),
    (
        "questionOptionsFile",
        include_str!("../../schemas/questionOptionsFile.json"),
    ),
    (
        "questionOptionsMultipleTrueFalse",
        include_str!("../../schemas/questionOptionsMultipleTrueFalse.json"),
    ),
];

/// The primary schema of a definition file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaRef {
    Course,
    Question,
    CourseInstance,
    Assessment,
}

impl SchemaRef {
    pub fn name(self) -> &'static str {
        match self {
            SchemaRef::Course => "infoCourse",
            SchemaRef::Question => "infoQuestion",
            SchemaRef::CourseInstance => "infoCourseInstance",
            SchemaRef::Assessment => "infoAssessment",
        }
    }
}

pub struct SchemaRegistry {
    validators: HashMap<&'static str, Validator>,
}

impl SchemaRegistry {
    pub fn new() -> Result<Self, SyncError> {
        let mut validators = HashMap::new();
        for (name, source) in SCHEMA_SOURCES {
            let file = format!("schemas/{name}.json");
            let document: Value = serde_json::from_str(source)
                .map_err(|e| SyncError::schema(&file, format!("Error parsing schema: {e}")))?;
            let validator = jsonschema::validator_for(&document)
                .map_err(|e| SyncError::schema(&file, format!("Invalid schema: {e}")))?;
            validators.insert(*name, validator);
        }
        Ok(Self { validators })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    /// Validates `instance` against the named schema. Every violation is
    /// reported in one message; unknown schema names are an error.
    pub fn validate(&self, name: &str, instance: &Value, file: &Path) -> Result<(), SyncError> {
        let validator = self
            .validators
            .get(name)
            .ok_or_else(|| SyncError::schema(file, format!("unknown schema \"{name}\"")))?;

        let messages: Vec<String> = validator
            .iter_errors(instance)
            .map(|e| e.to_string())
            .collect();
        if messages.is_empty() {
            Ok(())
        } else {
            Err(SyncError::schema(
                file,
                format!("schema validation failed: {}", messages.join("; ")),
            ))
        }
    }

    /// Reads and validates one definition file.
    ///
    /// When `option_schema_prefix` is given, the record's `type` selects a
    /// secondary schema for its `options` object. Types without a registered
    /// option schema are not checked further.
    pub fn load(
        &self,
        path: &Path,
        schema: SchemaRef,
        option_schema_prefix: Option<&str>,
        option_schema_suffix: Option<&str>,
    ) -> Result<Value, SyncError> {
        let contents = std::fs::read_to_string(path).map_err(|e| SyncError::io(path, e))?;
        let mut value: Value = serde_json::from_str(&contents)
            .map_err(|e| SyncError::schema(path, format!("Error parsing JSON: {e}")))?;

        normalize_uuid(&mut value, path)?;
        self.validate(schema.name(), &value, path)?;

        if let Some(prefix) = option_schema_prefix {
            if let Some(record_type) = value.get("type").and_then(Value::as_str) {
                let option_schema = format!(
                    "{prefix}{record_type}{}",
                    option_schema_suffix.unwrap_or_default()
                );
                if self.contains(&option_schema) {
                    let options = value.get("options").cloned().unwrap_or(Value::Null);
                    self.validate(&option_schema, &options, path)?;
                }
            }
        }

        Ok(value)
    }
}

/// Requires a well-formed `uuid` and stores it lower-cased.
fn normalize_uuid(value: &mut Value, path: &Path) -> Result<(), SyncError> {
    let raw = match value.get("uuid") {
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(SyncError::schema(path, "UUID must be a string")),
        None => return Err(SyncError::schema(path, "UUID is missing")),
    };
    let parsed = Uuid::parse_str(&raw)
        .map_err(|_| SyncError::schema(path, format!("UUID \"{raw}\" is not a valid v4 UUID")))?;
    if let Some(obj) = value.as_object_mut() {
        obj.insert("uuid".to_string(), Value::String(parsed.hyphenated().to_string()));
    }
    Ok(())
}
