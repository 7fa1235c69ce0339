use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use super::identity::{check_catalog_uuids, check_uuid_unique};
use crate::db::{CourseStore, PruneScope, QuestionParams, UuidScope};
use crate::error::SyncError;
use crate::models::QuestionInfo;

/// Upserts every question and soft-deletes the ones no longer on disk.
/// Returns question ids by qid.
pub async fn sync_questions(
    store: &mut dyn CourseStore,
    course_id: i64,
    questions: &BTreeMap<String, QuestionInfo>,
    topic_ids: &HashMap<String, i64>,
    warnings: &mut Vec<String>,
) -> Result<BTreeMap<String, i64>, SyncError> {
    check_catalog_uuids(
        "questions",
        questions.iter().map(|(qid, q)| (qid.as_str(), q.uuid.as_str())),
    )?;

    let mut params = Vec::with_capacity(questions.len());
    for (qid, question) in questions {
        let (files, warning) = server_files(qid, question)?;
        if let Some(warning) = warning {
            warn!("{}", warning);
            warnings.push(warning);
        }
        params.push(question_params(question, topic_ids, files)?);
    }

    let scope = UuidScope::Question { course_id };
    for (qid, question) in questions {
        check_uuid_unique(store, &scope, "questions", qid, &question.uuid).await?;
    }

    let mut ids = BTreeMap::new();
    for p in &params {
        let id = store.upsert_question(course_id, p).await?;
        debug!("Question {} has id {}", p.qid, id);
        ids.insert(p.qid.to_string(), id);
    }

    let keep: Vec<i64> = ids.values().copied().collect();
    let removed = store.prune(PruneScope::Questions { course_id }, &keep).await?;
    debug!("Soft-deleted {} questions", removed);
    Ok(ids)
}

/// Resolves `serverFilesCourse` and its deprecated `files` spelling.
fn server_files<'a>(
    qid: &str,
    question: &'a QuestionInfo,
) -> Result<(Option<&'a Vec<String>>, Option<String>), SyncError> {
    let Some(options) = &question.external_grading_options else {
        return Ok((None, None));
    };
    match (&options.server_files_course, &options.files) {
        (Some(_), Some(_)) => Err(SyncError::structural(
            format!("question {qid}"),
            "Cannot specify both \"externalGradingOptions.files\" and \"externalGradingOptions.serverFilesCourse\"",
        )),
        (None, Some(files)) => Ok((
            Some(files),
            Some(format!(
                "question {qid}: \"externalGradingOptions.files\" is deprecated; use \"serverFilesCourse\" instead"
            )),
        )),
        (server_files, None) => Ok((server_files.as_ref(), None)),
    }
}

fn question_params<'a>(
    question: &'a QuestionInfo,
    topic_ids: &HashMap<String, i64>,
    files: Option<&Vec<String>>,
) -> Result<QuestionParams<'a>, SyncError> {
    let external = question.external_grading_options.as_ref();
    Ok(QuestionParams {
        uuid: &question.uuid,
        qid: &question.qid,
        question_type: question.question_type.as_str(),
        title: &question.title,
        topic_id: topic_ids.get(&question.topic).copied(),
        grading_method: question.grading_method.as_str(),
        partial_credit: question.partial_credit(),
        single_variant: question.single_variant,
        template_directory: question.template.as_deref(),
        options: question.options.as_ref().map(|o| o.to_string()),
        client_files: serde_json::to_string(&question.client_files)?,
        external_grading_enabled: external.is_some_and(|e| e.enabled),
        external_grading_image: external.and_then(|e| e.image.as_deref()),
        external_grading_entrypoint: external.and_then(|e| e.entrypoint.as_deref()),
        external_grading_files: files.map(serde_json::to_string).transpose()?,
        external_grading_timeout: external.and_then(|e| e.timeout),
        external_grading_enable_networking: external.is_some_and(|e| e.enable_networking),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question(external: serde_json::Value) -> QuestionInfo {
        serde_json::from_value(json!({
            "qid": "autograded",
            "uuid": "11111111-1111-4111-8111-111111111111",
            "type": "v3",
            "title": "Autograded",
            "topic": "Algebra",
            "externalGradingOptions": external
        }))
        .unwrap()
    }

    #[test]
    fn deprecated_files_warns() {
        let q = question(json!({ "enabled": true, "files": ["a.py"] }));
        let (files, warning) = server_files("autograded", &q).unwrap();
        assert_eq!(files.map(Vec::len), Some(1));
        assert!(warning.unwrap().contains("deprecated"));
    }

    #[test]
    fn both_file_lists_are_rejected() {
        let q = question(json!({ "files": ["a.py"], "serverFilesCourse": ["b.py"] }));
        assert!(matches!(
            server_files("autograded", &q),
            Err(SyncError::Structural { .. })
        ));
    }

    #[test]
    fn server_files_course_alone_is_silent() {
        let q = question(json!({ "serverFilesCourse": ["b.py"] }));
        let (files, warning) = server_files("autograded", &q).unwrap();
        assert!(files.is_some());
        assert!(warning.is_none());
    }
}
