pub mod assessments;
pub mod course;
pub mod course_instances;
pub mod identity;
pub mod order;
pub mod questions;
pub mod scheduler;
pub mod tags;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::db::{CourseStore, SqliteStore};
use crate::error::SyncError;
use crate::loader::{CourseTree, SchemaRegistry, load_course_tree};

pub use scheduler::SyncScheduler;

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub course_id: i64,
    pub questions: usize,
    pub course_instances: usize,
    pub assessments: usize,
    pub warnings: Vec<String>,
}

/// Outcome of one course in a multi-course run.
#[derive(Debug, Serialize)]
pub struct CourseSyncResult {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<SyncReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct SyncCoordinator {
    db: SqlitePool,
    registry: Arc<SchemaRegistry>,
}

impl SyncCoordinator {
    pub fn new(db: SqlitePool, registry: Arc<SchemaRegistry>) -> Self {
        Self { db, registry }
    }

    /// Loads the course at `dir` and writes it in one transaction. Nothing
    /// is written when any step fails.
    pub async fn sync_course(&self, dir: &Path) -> Result<SyncReport, SyncError> {
        let dir = std::fs::canonicalize(dir).map_err(|e| SyncError::io(dir, e))?;

        info!("Step 1: Loading course tree from {}", dir.display());
        let tree = load_course_tree(&dir, &self.registry)?;

        let mut store = SqliteStore::begin(&self.db).await?;
        let report = sync_course_tree(&mut store, &tree).await?;
        store.commit().await?;

        info!("Sync of {} completed: {:?}", dir.display(), report);
        Ok(report)
    }

    /// Syncs each course in turn. A failing course does not stop the others.
    pub async fn sync_all(&self, dirs: &[PathBuf]) -> Vec<CourseSyncResult> {
        let mut results = Vec::with_capacity(dirs.len());
        for dir in dirs {
            let path = dir.display().to_string();
            match self.sync_course(dir).await {
                Ok(report) => results.push(CourseSyncResult {
                    path,
                    report: Some(report),
                    error: None,
                }),
                Err(e) => {
                    error!("Sync of {} failed: {}", path, e);
                    results.push(CourseSyncResult {
                        path,
                        report: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }
        results
    }
}

/// Writes a loaded course tree through `store`, in dependency order.
pub async fn sync_course_tree(
    store: &mut dyn CourseStore,
    tree: &CourseTree,
) -> Result<SyncReport, SyncError> {
    let mut warnings = tree.warnings.clone();
    let path = tree.path.display().to_string();

    info!("Step 2: Syncing course info");
    let course_id = course::sync_course_info(store, &path, &tree.course).await?;

    info!("Step 3: Syncing course instances");
    let instance_ids = course_instances::sync_course_instances(
        store,
        course_id,
        &tree.course_instances,
        tree.course.timezone.as_deref(),
    )
    .await?;

    info!("Step 4: Syncing topics");
    let topic_ids = course::sync_topics(store, course_id, &tree.course.topics).await?;

    info!("Step 5: Syncing questions");
    let question_ids = questions::sync_questions(
        store,
        course_id,
        &tree.questions,
        &topic_ids,
        &mut warnings,
    )
    .await?;

    info!("Step 6: Syncing tags");
    tags::sync_tags(
        store,
        course_id,
        &tree.course.tags,
        &tree.questions,
        &question_ids,
    )
    .await?;

    info!("Step 7: Syncing assessment sets");
    let set_ids =
        course::sync_assessment_sets(store, course_id, &tree.course.assessment_sets).await?;

    info!("Step 8: Syncing course staff and assessments");
    assessments::check_assessment_uuids(store, course_id, &tree.course_instances, &instance_ids)
        .await?;
    let mut assessment_count = 0;
    for (ciid, instance) in &tree.course_instances {
        let Some(&ci_id) = instance_ids.get(ciid) else {
            continue;
        };
        course_instances::sync_course_staff(store, ci_id, &instance.info.user_roles).await?;
        assessment_count += assessments::sync_assessments(
            store,
            ci_id,
            &instance.assessments,
            &set_ids,
            &question_ids,
        )
        .await?;
    }

    Ok(SyncReport {
        course_id,
        questions: question_ids.len(),
        course_instances: instance_ids.len(),
        assessments: assessment_count,
        warnings,
    })
}
