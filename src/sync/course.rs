use std::collections::HashMap;

use tracing::debug;

use super::identity::check_uuid_unique;
use crate::db::{CourseStore, PruneScope, UuidScope};
use crate::error::SyncError;
use crate::models::{AssessmentSet, CourseInfo, Topic};

/// Upserts the course row, keyed by its directory path.
pub async fn sync_course_info(
    store: &mut dyn CourseStore,
    path: &str,
    info: &CourseInfo,
) -> Result<i64, SyncError> {
    let scope = UuidScope::Course {
        path: path.to_string(),
    };
    check_uuid_unique(store, &scope, "courses", path, &info.uuid).await?;
    let course_id = store.upsert_course(path, info).await?;
    debug!("Course {} at {} has id {}", info.name, path, course_id);
    Ok(course_id)
}

/// Returns topic ids by name.
pub async fn sync_topics(
    store: &mut dyn CourseStore,
    course_id: i64,
    topics: &[Topic],
) -> Result<HashMap<String, i64>, SyncError> {
    let mut ids = HashMap::with_capacity(topics.len());
    for (i, topic) in topics.iter().enumerate() {
        let id = store.upsert_topic(course_id, i as i64 + 1, topic).await?;
        ids.insert(topic.name.clone(), id);
    }

    let keep: Vec<i64> = ids.values().copied().collect();
    let removed = store.prune(PruneScope::Topics { course_id }, &keep).await?;
    debug!("Synced {} topics, removed {}", ids.len(), removed);
    Ok(ids)
}

/// Returns assessment set ids by name.
pub async fn sync_assessment_sets(
    store: &mut dyn CourseStore,
    course_id: i64,
    sets: &[AssessmentSet],
) -> Result<HashMap<String, i64>, SyncError> {
    let mut ids = HashMap::with_capacity(sets.len());
    for (i, set) in sets.iter().enumerate() {
        let id = store.upsert_assessment_set(course_id, i as i64 + 1, set).await?;
        ids.insert(set.name.clone(), id);
    }

    let keep: Vec<i64> = ids.values().copied().collect();
    let removed = store
        .prune(PruneScope::AssessmentSets { course_id }, &keep)
        .await?;
    debug!("Synced {} assessment sets, removed {}", ids.len(), removed);
    Ok(ids)
}
