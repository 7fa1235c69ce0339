//! Assessment sync: zones, alternative groups, assessment questions and
//! access rules.
//!
//! Each assessment is first resolved into an [`AssessmentPlan`] without
//! touching storage. Planning fixes the point model of every question and
//! the numbering of groups and questions, so identical input always yields
//! identical rows.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use super::identity::{check_catalog_uuids, check_uuid_unique};
use super::order::compare_numbered;
use crate::db::{
    AlternativeGroupParams, AssessmentAccessRuleParams, AssessmentParams,
    AssessmentQuestionParams, CourseStore, Positional, PruneScope, UuidScope, ZoneParams,
};
use crate::error::SyncError;
use crate::loader::CourseInstanceTree;
use crate::loader::validate::normalize_rule_date;
use crate::models::{AssessmentInfo, PointsModel, PointsValue, UserRole, ZoneQuestion};

#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentPlan {
    pub zones: Vec<ZonePlan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZonePlan {
    pub number: i64,
    pub groups: Vec<AlternativeGroupPlan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlternativeGroupPlan {
    /// Position among all groups of the assessment.
    pub number: i64,
    pub number_choose: Option<i64>,
    pub questions: Vec<AssessmentQuestionPlan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentQuestionPlan {
    pub qid: String,
    pub question_id: i64,
    /// Position among all questions of the assessment.
    pub number: i64,
    pub number_in_alternative_group: i64,
    pub points: PointsModel,
    pub force_max_points: bool,
    pub tries_per_variant: i64,
}

impl AssessmentPlan {
    pub fn group_count(&self) -> i64 {
        self.zones.iter().map(|z| z.groups.len() as i64).sum()
    }

    pub fn questions(&self) -> impl Iterator<Item = (&AlternativeGroupPlan, &AssessmentQuestionPlan)> {
        self.zones
            .iter()
            .flat_map(|z| z.groups.iter())
            .flat_map(|g| g.questions.iter().map(move |q| (g, q)))
    }
}

/// Resolves the zones of one assessment. Stops at the first structural
/// problem.
pub fn plan_assessment(
    info: &AssessmentInfo,
    question_ids: &BTreeMap<String, i64>,
) -> Result<AssessmentPlan, SyncError> {
    let context = format!("assessment {}", info.tid);
    check_duplicate_qids(info, &context)?;

    let mut zones = Vec::with_capacity(info.zones.len());
    let mut group_number = 0;
    let mut question_number = 0;

    for (zone_index, zone) in info.zones.iter().enumerate() {
        let mut groups = Vec::with_capacity(zone.questions.len());
        for zone_question in &zone.questions {
            group_number += 1;
            let mut questions = Vec::new();
            for (in_group, alternative) in resolve_alternatives(zone_question, &context)?
                .into_iter()
                .enumerate()
            {
                question_number += 1;
                let points = info
                    .assessment_type
                    .resolve_points(
                        alternative.points.as_ref(),
                        alternative.max_points,
                        info.allow_real_time_grading,
                    )
                    .map_err(|message| {
                        SyncError::structural(format!("{context}, question {}", alternative.qid), message)
                    })?;
                let question_id = *question_ids.get(&alternative.qid).ok_or_else(|| {
                    SyncError::cross_reference(
                        &context,
                        format!("question {} does not exist in this course", alternative.qid),
                    )
                })?;
                questions.push(AssessmentQuestionPlan {
                    qid: alternative.qid,
                    question_id,
                    number: question_number,
                    number_in_alternative_group: in_group as i64 + 1,
                    points,
                    force_max_points: alternative.force_max_points,
                    tries_per_variant: alternative.tries_per_variant,
                });
            }
            groups.push(AlternativeGroupPlan {
                number: group_number,
                number_choose: zone_question.number_choose,
                questions,
            });
        }
        zones.push(ZonePlan {
            number: zone_index as i64 + 1,
            groups,
        });
    }

    Ok(AssessmentPlan { zones })
}

/// One question of a slot after inheriting the slot's settings.
struct ResolvedAlternative {
    qid: String,
    points: Option<PointsValue>,
    max_points: Option<f64>,
    force_max_points: bool,
    tries_per_variant: i64,
}

fn resolve_alternatives(
    slot: &ZoneQuestion,
    context: &str,
) -> Result<Vec<ResolvedAlternative>, SyncError> {
    match (&slot.id, &slot.alternatives) {
        (Some(_), Some(_)) => Err(SyncError::structural(
            context,
            "Cannot specify both \"alternatives\" and \"id\" in one question",
        )),
        (None, None) => Err(SyncError::structural(
            context,
            "Must specify either \"alternatives\" or \"id\" in each question",
        )),
        (Some(id), None) => Ok(vec![ResolvedAlternative {
            qid: id.clone(),
            points: slot.points.clone(),
            max_points: slot.max_points,
            force_max_points: slot.force_max_points.unwrap_or(false),
            tries_per_variant: slot.tries_per_variant.unwrap_or(1),
        }]),
        (None, Some(alternatives)) => Ok(alternatives
            .iter()
            .map(|alt| ResolvedAlternative {
                qid: alt.id.clone(),
                points: alt.points.clone().or_else(|| slot.points.clone()),
                max_points: alt.max_points.or(slot.max_points),
                force_max_points: alt
                    .force_max_points
                    .or(slot.force_max_points)
                    .unwrap_or(false),
                tries_per_variant: alt
                    .tries_per_variant
                    .or(slot.tries_per_variant)
                    .unwrap_or(1),
            })
            .collect()),
    }
}

fn check_duplicate_qids(info: &AssessmentInfo, context: &str) -> Result<(), SyncError> {
    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();
    for zone_question in info.zones.iter().flat_map(|z| z.questions.iter()) {
        let qids = zone_question
            .id
            .iter()
            .chain(zone_question.alternatives.iter().flatten().map(|a| &a.id));
        for qid in qids {
            if !seen.insert(qid.as_str()) {
                duplicates.insert(qid.as_str());
            }
        }
    }
    if duplicates.is_empty() {
        Ok(())
    } else {
        let list: Vec<&str> = duplicates.into_iter().collect();
        Err(SyncError::structural(
            context,
            format!("The following questions are used more than once: {}", list.join(", ")),
        ))
    }
}

/// Rejects assessment UUIDs shared anywhere in the course. Runs once for
/// all instances before any assessment is written. Stored rows of the
/// instances in `synced_ids` are left to the in-memory check.
pub async fn check_assessment_uuids(
    store: &mut dyn CourseStore,
    course_id: i64,
    instances: &BTreeMap<String, CourseInstanceTree>,
    synced_ids: &BTreeMap<String, i64>,
) -> Result<(), SyncError> {
    let labelled: Vec<(String, &str)> = instances
        .iter()
        .flat_map(|(ciid, instance)| {
            instance.assessments.iter().map(move |(tid, info)| {
                (
                    format!("assessment {tid} in course instance {ciid}"),
                    info.uuid.as_str(),
                )
            })
        })
        .collect();
    check_catalog_uuids(
        "assessments",
        labelled.iter().map(|(label, uuid)| (label.as_str(), *uuid)),
    )?;

    let scope = UuidScope::Assessment {
        course_id,
        synced_instance_ids: synced_ids.values().copied().collect(),
    };
    for (label, uuid) in &labelled {
        check_uuid_unique(store, &scope, "assessments", label, uuid).await?;
    }
    Ok(())
}

/// Syncs the assessments of one course instance. Returns the number of
/// assessments written. UUIDs must already have passed
/// [`check_assessment_uuids`].
pub async fn sync_assessments(
    store: &mut dyn CourseStore,
    course_instance_id: i64,
    assessments: &BTreeMap<String, AssessmentInfo>,
    set_ids: &HashMap<String, i64>,
    question_ids: &BTreeMap<String, i64>,
) -> Result<usize, SyncError> {
    let mut ordered: Vec<&AssessmentInfo> = assessments.values().collect();
    ordered.sort_by(|a, b| compare_numbered(Some(a.number.as_str()), &a.tid, Some(b.number.as_str()), &b.tid));

    let plans = ordered
        .iter()
        .map(|info| plan_assessment(info, question_ids))
        .collect::<Result<Vec<_>, _>>()?;

    let mut keep = Vec::with_capacity(ordered.len());
    for (position, (info, plan)) in ordered.iter().zip(&plans).enumerate() {
        let id = sync_assessment(
            store,
            course_instance_id,
            position as i64 + 1,
            info,
            plan,
            set_ids,
        )
        .await?;
        keep.push(id);
    }

    let removed = store
        .prune(PruneScope::Assessments { course_instance_id }, &keep)
        .await?;
    debug!(
        "Course instance {}: {} assessments, {} soft-deleted",
        course_instance_id,
        keep.len(),
        removed
    );
    Ok(keep.len())
}

async fn sync_assessment(
    store: &mut dyn CourseStore,
    course_instance_id: i64,
    order_by: i64,
    info: &AssessmentInfo,
    plan: &AssessmentPlan,
    set_ids: &HashMap<String, i64>,
) -> Result<i64, SyncError> {
    let params = AssessmentParams {
        uuid: &info.uuid,
        tid: &info.tid,
        assessment_type: info.assessment_type.as_str(),
        number: &info.number,
        order_by,
        title: &info.title,
        assessment_set_id: set_ids.get(&info.set).copied(),
        text: info.text.as_deref(),
        multiple_instance: info.multiple_instance,
        shuffle_questions: info.shuffle_questions,
        allow_issue_reporting: info.allow_issue_reporting,
        allow_real_time_grading: info.allow_real_time_grading,
        auto_close: info.auto_close,
        constant_question_value: info.constant_question_value,
        max_points: info.max_points,
        max_bonus_points: info.max_bonus_points,
    };
    let assessment_id = store.upsert_assessment(course_instance_id, &params).await?;

    for (i, rule) in info.allow_access.iter().enumerate() {
        let rule_params = AssessmentAccessRuleParams {
            mode: rule.mode.as_deref(),
            role: rule.role.map(UserRole::as_str),
            uids: rule.uids.as_ref().map(serde_json::to_string).transpose()?,
            credit: rule.credit,
            start_date: rule.start_date.as_deref().and_then(normalize_rule_date),
            end_date: rule.end_date.as_deref().and_then(normalize_rule_date),
            time_limit_min: rule.time_limit_min,
            password: rule.password.as_deref(),
            exam_uuid: rule.exam_uuid.as_deref(),
            active: rule.active.unwrap_or(true),
        };
        store
            .upsert_assessment_access_rule(assessment_id, i as i64 + 1, &rule_params)
            .await?;
    }
    store
        .prune_positional(
            Positional::AssessmentAccessRules,
            assessment_id,
            info.allow_access.len() as i64,
        )
        .await?;

    let mut question_keep = Vec::new();
    for (zone, zone_plan) in info.zones.iter().zip(&plan.zones) {
        let zone_id = store
            .upsert_zone(
                assessment_id,
                &ZoneParams {
                    number: zone_plan.number,
                    title: zone.title.as_deref(),
                    number_choose: zone.number_choose,
                    max_points: zone.max_points,
                    best_questions: zone.best_questions,
                },
            )
            .await?;

        for group in &zone_plan.groups {
            let group_id = store
                .upsert_alternative_group(
                    assessment_id,
                    &AlternativeGroupParams {
                        zone_id,
                        number: group.number,
                        number_choose: group.number_choose,
                    },
                )
                .await?;

            for question in &group.questions {
                let points_list = question
                    .points
                    .points_list()
                    .map(serde_json::to_string)
                    .transpose()?;
                let id = store
                    .upsert_assessment_question(
                        assessment_id,
                        &AssessmentQuestionParams {
                            question_id: question.question_id,
                            alternative_group_id: group_id,
                            number: question.number,
                            number_in_alternative_group: question.number_in_alternative_group,
                            max_points: question.points.max_points(),
                            points_list,
                            init_points: question.points.init_points(),
                            force_max_points: question.force_max_points,
                            tries_per_variant: question.tries_per_variant,
                        },
                    )
                    .await?;
                question_keep.push(id);
            }
        }
    }

    store
        .prune_positional(Positional::Zones, assessment_id, plan.zones.len() as i64)
        .await?;
    store
        .prune_positional(Positional::AlternativeGroups, assessment_id, plan.group_count())
        .await?;
    store
        .prune(PruneScope::AssessmentQuestions { assessment_id }, &question_keep)
        .await?;

    debug!(
        "Assessment {} has id {} with {} questions",
        info.tid,
        assessment_id,
        question_keep.len()
    );
    Ok(assessment_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question_ids() -> BTreeMap<String, i64> {
        ["q1", "q2", "q3", "q4"]
            .iter()
            .enumerate()
            .map(|(i, qid)| (qid.to_string(), i as i64 + 100))
            .collect()
    }

    fn assessment(kind: &str, zones: serde_json::Value) -> AssessmentInfo {
        serde_json::from_value(json!({
            "tid": "exam1",
            "uuid": "33333333-3333-4333-8333-333333333333",
            "type": kind,
            "title": "Exam 1",
            "set": "Exam",
            "number": "1",
            "zones": zones
        }))
        .unwrap()
    }

    #[test]
    fn numbering_spans_zones_and_groups() {
        let info = assessment(
            "Exam",
            json!([
                { "questions": [
                    { "id": "q1", "points": [10, 5, 1] },
                    { "numberChoose": 1, "points": 3, "alternatives": [{ "id": "q2" }, { "id": "q3" }] }
                ]},
                { "questions": [{ "id": "q4", "points": 2 }] }
            ]),
        );
        let plan = plan_assessment(&info, &question_ids()).unwrap();

        assert_eq!(plan.zones.len(), 2);
        assert_eq!(plan.group_count(), 3);
        let rows: Vec<_> = plan
            .questions()
            .map(|(g, q)| (q.qid.as_str(), g.number, q.number, q.number_in_alternative_group))
            .collect();
        assert_eq!(
            rows,
            vec![("q1", 1, 1, 1), ("q2", 2, 2, 1), ("q3", 2, 3, 2), ("q4", 3, 4, 1)]
        );

        let first = &plan.zones[0].groups[0].questions[0];
        assert_eq!(first.points.points_list(), Some(&[10.0, 5.0, 1.0][..]));
        assert_eq!(first.points.max_points(), 10.0);
        assert_eq!(plan.zones[0].groups[1].number_choose, Some(1));
    }

    #[test]
    fn alternatives_inherit_slot_settings() {
        let info = assessment(
            "Homework",
            json!([{ "questions": [{
                "points": 4,
                "maxPoints": 12,
                "triesPerVariant": 3,
                "alternatives": [{ "id": "q1" }, { "id": "q2", "points": 2, "forceMaxPoints": true }]
            }]}]),
        );
        let plan = plan_assessment(&info, &question_ids()).unwrap();
        let group = &plan.zones[0].groups[0];

        assert_eq!(
            group.questions[0].points,
            PointsModel::Homework { init_points: 4.0, max_points: 12.0 }
        );
        assert_eq!(group.questions[0].tries_per_variant, 3);
        assert!(!group.questions[0].force_max_points);
        assert_eq!(group.questions[1].points.init_points(), Some(2.0));
        assert!(group.questions[1].force_max_points);
    }

    #[test]
    fn id_and_alternatives_together_are_rejected() {
        let info = assessment(
            "Homework",
            json!([{ "questions": [{ "id": "q1", "points": 1, "alternatives": [{ "id": "q2" }] }] }]),
        );
        let err = plan_assessment(&info, &question_ids()).unwrap_err();
        assert!(matches!(err, SyncError::Structural { .. }));
        assert!(err.to_string().contains("both \"alternatives\" and \"id\""));
    }

    #[test]
    fn exam_max_points_is_rejected() {
        let info = assessment(
            "Exam",
            json!([{ "questions": [{ "id": "q1", "points": 5, "maxPoints": 10 }] }]),
        );
        let err = plan_assessment(&info, &question_ids()).unwrap_err();
        assert!(err.to_string().contains("exam1, question q1"));
    }

    #[test]
    fn repeated_qids_are_listed() {
        let info = assessment(
            "Homework",
            json!([{ "questions": [
                { "id": "q1", "points": 1 },
                { "alternatives": [{ "id": "q1" }, { "id": "q2" }], "points": 1 },
                { "id": "q2", "points": 1 }
            ]}]),
        );
        let err = plan_assessment(&info, &question_ids()).unwrap_err();
        assert!(err.to_string().contains("used more than once: q1, q2"));
    }

    #[test]
    fn unknown_qid_is_a_cross_reference_error() {
        let info = assessment("Homework", json!([{ "questions": [{ "id": "nope", "points": 1 }] }]));
        assert!(matches!(
            plan_assessment(&info, &question_ids()),
            Err(SyncError::CrossReference { .. })
        ));
    }
}
