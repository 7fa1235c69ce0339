use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::db::CourseStore;
use crate::error::SyncError;
use crate::models::{QuestionInfo, Tag};

/// Replaces the course's tag list and every question's tag associations.
///
/// All questions are checked against the tag list before anything is
/// written. The first offending question is reported with all of its
/// unknown tags.
pub async fn sync_tags(
    store: &mut dyn CourseStore,
    course_id: i64,
    tags: &[Tag],
    questions: &BTreeMap<String, QuestionInfo>,
    question_ids: &BTreeMap<String, i64>,
) -> Result<(), SyncError> {
    let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
    for (qid, question) in questions {
        let unknown = question.unknown_tags(|tag| names.contains(&tag));
        if !unknown.is_empty() {
            return Err(SyncError::UnknownTags {
                qid: qid.clone(),
                tags: unknown,
            });
        }
    }

    let tag_ids = store.replace_tag_set(course_id, tags).await?;
    let by_name: HashMap<&str, i64> = names.iter().copied().zip(tag_ids).collect();

    for (qid, question) in questions {
        let Some(&question_id) = question_ids.get(qid) else {
            continue;
        };
        let ids: Vec<i64> = question
            .tags
            .iter()
            .filter_map(|name| by_name.get(name.as_str()).copied())
            .collect();
        store.set_question_tags(question_id, &ids).await?;
    }

    debug!("Synced {} tags for {} questions", tags.len(), questions.len());
    Ok(())
}
