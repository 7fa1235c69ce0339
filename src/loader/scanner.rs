//! Enumerates entity directories and loads one definition file per entry.

use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::debug;

use super::schema::{SchemaRef, SchemaRegistry};
use crate::error::SyncError;
use crate::models::{AssessmentInfo, CourseInstanceInfo, QuestionInfo};

/// A record stored as `<parent>/<id>/<INFO_FILENAME>`.
pub trait DefinitionRecord: DeserializeOwned {
    const KIND: &'static str;
    const INFO_FILENAME: &'static str;
    /// Field that receives the directory-derived identifier.
    const ID_FIELD: &'static str;
    const SCHEMA: SchemaRef;
    const OPTION_SCHEMA_PREFIX: Option<&'static str> = None;

    /// Values filled in for keys the file leaves out.
    fn defaults() -> Value {
        Value::Object(Map::new())
    }

    fn is_disabled(&self) -> bool;
}

impl DefinitionRecord for QuestionInfo {
    const KIND: &'static str = "question";
    const INFO_FILENAME: &'static str = "info.json";
    const ID_FIELD: &'static str = "qid";
    const SCHEMA: SchemaRef = SchemaRef::Question;
    const OPTION_SCHEMA_PREFIX: Option<&'static str> = Some("questionOptions");

    fn defaults() -> Value {
        json!({
            "type": "Calculation",
            "clientFiles": ["client.js", "question.html", "answer.html"]
        })
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }
}

impl DefinitionRecord for CourseInstanceInfo {
    const KIND: &'static str = "course instance";
    const INFO_FILENAME: &'static str = "infoCourseInstance.json";
    const ID_FIELD: &'static str = "ciid";
    const SCHEMA: SchemaRef = SchemaRef::CourseInstance;

    fn is_disabled(&self) -> bool {
        self.disabled
    }
}

impl DefinitionRecord for AssessmentInfo {
    const KIND: &'static str = "assessment";
    const INFO_FILENAME: &'static str = "infoAssessment.json";
    const ID_FIELD: &'static str = "tid";
    const SCHEMA: SchemaRef = SchemaRef::Assessment;

    fn is_disabled(&self) -> bool {
        self.disabled
    }
}

#[derive(Debug)]
pub struct ScanResult<T> {
    pub records: BTreeMap<String, T>,
    pub warnings: Vec<String>,
}

impl<T> Default for ScanResult<T> {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }
}

/// Loads every record below `parent_dir`.
///
/// A directory holding `T::INFO_FILENAME` is one record keyed by its path
/// relative to `parent_dir`. Other directories are searched recursively and
/// must contain at least one record. `validate` runs on each record before
/// the `disabled` filter and may return warnings. The first error aborts
/// the scan.
pub fn scan<T, F>(
    registry: &SchemaRegistry,
    parent_dir: &Path,
    validate: F,
) -> Result<ScanResult<T>, SyncError>
where
    T: DefinitionRecord,
    F: Fn(&T, &Path) -> Result<Vec<String>, SyncError>,
{
    let mut result = ScanResult::default();
    walk(registry, parent_dir, "", &validate, &mut result)?;
    Ok(result)
}

fn walk<T, F>(
    registry: &SchemaRegistry,
    dir: &Path,
    prefix: &str,
    validate: &F,
    result: &mut ScanResult<T>,
) -> Result<usize, SyncError>
where
    T: DefinitionRecord,
    F: Fn(&T, &Path) -> Result<Vec<String>, SyncError>,
{
    let mut children = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| SyncError::io(dir, e))? {
        let entry = entry.map_err(|e| SyncError::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| SyncError::io(entry.path(), e))?;
        if file_type.is_dir() {
            children.push(entry);
        }
    }
    children.sort_by_key(|entry| entry.file_name());

    let mut found = 0;
    for child in children {
        let name = child.file_name().to_string_lossy().into_owned();
        let id = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };
        let child_dir = child.path();
        let info_path = child_dir.join(T::INFO_FILENAME);

        if !info_path.is_file() {
            let nested = walk(registry, &child_dir, &id, validate, result)?;
            if nested == 0 {
                return Err(SyncError::schema(
                    &info_path,
                    format!("Missing JSON file for {} \"{id}\"", T::KIND),
                ));
            }
            found += nested;
            continue;
        }

        let record = load_record::<T>(registry, &info_path, &id)?;
        let warnings = validate(&record, &info_path)?;
        result.warnings.extend(
            warnings
                .into_iter()
                .map(|w| format!("{}: {w}", info_path.display())),
        );
        found += 1;

        if record.is_disabled() {
            debug!("Skipping disabled {} {}", T::KIND, id);
            continue;
        }
        result.records.insert(id, record);
    }

    Ok(found)
}

fn load_record<T: DefinitionRecord>(
    registry: &SchemaRegistry,
    info_path: &Path,
    id: &str,
) -> Result<T, SyncError> {
    let mut value = registry.load(info_path, T::SCHEMA, T::OPTION_SCHEMA_PREFIX, None)?;

    if let Some(obj) = value.as_object_mut() {
        obj.insert(T::ID_FIELD.to_string(), Value::String(id.to_string()));
        if let Value::Object(defaults) = T::defaults() {
            for (key, default) in defaults {
                obj.entry(key).or_insert(default);
            }
        }
    }

    serde_json::from_value(value).map_err(|e| SyncError::schema(info_path, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_question(root: &Path, id: &str, uuid: &str, extra: Value) {
        let dir = root.join(id);
        fs::create_dir_all(&dir).unwrap();
        let mut info = json!({ "uuid": uuid, "title": id, "topic": "Algebra" });
        if let (Value::Object(info), Value::Object(extra)) = (&mut info, extra) {
            info.extend(extra);
        }
        fs::write(dir.join("info.json"), info.to_string()).unwrap();
    }

    fn no_checks(_: &QuestionInfo, _: &Path) -> Result<Vec<String>, SyncError> {
        Ok(Vec::new())
    }

    #[test]
    fn nested_directories_use_relative_ids() {
        let root = tempfile::tempdir().unwrap();
        write_question(root.path(), "addition", "11111111-1111-4111-8111-111111111111", json!({}));
        write_question(root.path(), "unit/calc/limits", "22222222-2222-4222-8222-222222222222", json!({}));
        fs::write(root.path().join("README.md"), "stray file").unwrap();

        let registry = SchemaRegistry::new().unwrap();
        let result = scan::<QuestionInfo, _>(&registry, root.path(), no_checks).unwrap();

        let ids: Vec<_> = result.records.keys().cloned().collect();
        assert_eq!(ids, vec!["addition", "unit/calc/limits"]);
        assert_eq!(result.records["unit/calc/limits"].qid, "unit/calc/limits");
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let root = tempfile::tempdir().unwrap();
        write_question(root.path(), "legacy", "11111111-1111-4111-8111-111111111111", json!({}));

        let registry = SchemaRegistry::new().unwrap();
        let result = scan::<QuestionInfo, _>(&registry, root.path(), no_checks).unwrap();

        let question = &result.records["legacy"];
        assert_eq!(question.question_type, crate::models::QuestionType::Calculation);
        assert_eq!(question.client_files.len(), 3);
    }

    #[test]
    fn disabled_records_are_excluded() {
        let root = tempfile::tempdir().unwrap();
        write_question(root.path(), "live", "11111111-1111-4111-8111-111111111111", json!({}));
        write_question(
            root.path(),
            "hidden",
            "22222222-2222-4222-8222-222222222222",
            json!({ "disabled": true }),
        );

        let registry = SchemaRegistry::new().unwrap();
        let result = scan::<QuestionInfo, _>(&registry, root.path(), no_checks).unwrap();
        assert!(result.records.contains_key("live"));
        assert!(!result.records.contains_key("hidden"));
    }

    #[test]
    fn empty_directory_is_missing_info_file() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("orphan")).unwrap();

        let registry = SchemaRegistry::new().unwrap();
        let err = scan::<QuestionInfo, _>(&registry, root.path(), no_checks).unwrap_err();
        assert!(matches!(err, SyncError::Schema { .. }));
        assert!(err.to_string().contains("orphan"));
    }

    #[test]
    fn validator_errors_abort_the_scan() {
        let root = tempfile::tempdir().unwrap();
        write_question(root.path(), "a", "11111111-1111-4111-8111-111111111111", json!({}));

        let registry = SchemaRegistry::new().unwrap();
        let err = scan::<QuestionInfo, _>(&registry, root.path(), |q, _| {
            Err(SyncError::cross_reference(&q.qid, "rejected"))
        })
        .unwrap_err();
        assert!(matches!(err, SyncError::CrossReference { .. }));
    }
}
