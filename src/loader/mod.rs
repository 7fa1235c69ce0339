pub mod scanner;
pub mod schema;
pub mod validate;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::SyncError;
use crate::models::{AssessmentInfo, CourseInfo, CourseInstanceInfo, QuestionInfo};

pub use scanner::{DefinitionRecord, ScanResult, scan};
pub use schema::{SchemaRef, SchemaRegistry};
pub use validate::ValidationContext;

pub const COURSE_INFO_FILENAME: &str = "infoCourse.json";

/// In-memory graph of one course directory.
#[derive(Debug)]
pub struct CourseTree {
    pub path: PathBuf,
    pub course: CourseInfo,
    pub questions: BTreeMap<String, QuestionInfo>,
    pub course_instances: BTreeMap<String, CourseInstanceTree>,
    pub warnings: Vec<String>,
}

#[derive(Debug)]
pub struct CourseInstanceTree {
    pub info: CourseInstanceInfo,
    pub assessments: BTreeMap<String, AssessmentInfo>,
}

/// Reads and validates the whole course tree rooted at `dir`.
pub fn load_course_tree(dir: &Path, registry: &SchemaRegistry) -> Result<CourseTree, SyncError> {
    let info_path = dir.join(COURSE_INFO_FILENAME);
    let value = registry.load(&info_path, SchemaRef::Course, None, None)?;
    let mut course: CourseInfo = serde_json::from_value(value)
        .map_err(|e| SyncError::schema(&info_path, e.to_string()))?;

    let mut warnings: Vec<String> = course
        .apply_builtin_defaults()
        .into_iter()
        .map(|w| format!("{}: {w}", info_path.display()))
        .collect();
    for warning in &warnings {
        warn!("{}", warning);
    }

    let context = ValidationContext::new(&course);

    let questions = scan_optional::<QuestionInfo, _>(
        registry,
        &dir.join("questions"),
        |q, file| context.validate_question(q, file),
        &mut warnings,
    )?;
    debug!("Loaded {} questions from {}", questions.len(), dir.display());

    let context = context.with_questions(questions.keys());

    let instances = scan_optional::<CourseInstanceInfo, _>(
        registry,
        &dir.join("courseInstances"),
        |ci, file| context.validate_course_instance(ci, file),
        &mut warnings,
    )?;

    let mut course_instances = BTreeMap::new();
    for (ciid, info) in instances {
        let assessments_dir = dir.join("courseInstances").join(&ciid).join("assessments");
        let assessments = scan_optional::<AssessmentInfo, _>(
            registry,
            &assessments_dir,
            |a, file| context.validate_assessment(a, file),
            &mut warnings,
        )?;
        debug!("Loaded {} assessments for course instance {}", assessments.len(), ciid);
        course_instances.insert(ciid, CourseInstanceTree { info, assessments });
    }

    Ok(CourseTree {
        path: dir.to_path_buf(),
        course,
        questions,
        course_instances,
        warnings,
    })
}

/// Scans `parent_dir`, treating a missing directory as empty.
fn scan_optional<T, F>(
    registry: &SchemaRegistry,
    parent_dir: &Path,
    validate: F,
    warnings: &mut Vec<String>,
) -> Result<BTreeMap<String, T>, SyncError>
where
    T: DefinitionRecord,
    F: Fn(&T, &Path) -> Result<Vec<String>, SyncError>,
{
    if !parent_dir.is_dir() {
        let message = format!("{} directory not found", parent_dir.display());
        warn!("{}", message);
        warnings.push(message);
        return Ok(BTreeMap::new());
    }

    let result = scan(registry, parent_dir, validate)?;
    for warning in &result.warnings {
        warn!("{}", warning);
    }
    warnings.extend(result.warnings);
    Ok(result.records)
}
