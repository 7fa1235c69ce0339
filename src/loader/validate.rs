//! Checks that references between definition files resolve.
//!
//! Each check stops at the first offending file; unknown tags of that
//! question are reported together. Warnings are returned to the
//! scanner, which prefixes them with the file path.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::SyncError;
use crate::models::{AssessmentInfo, CourseInfo, CourseInstanceInfo, QuestionInfo};

pub struct ValidationContext {
    topics: HashSet<String>,
    tags: HashSet<String>,
    assessment_sets: HashSet<String>,
    qids: HashSet<String>,
}

impl ValidationContext {
    /// Expects `course` to already carry the built-in defaults.
    pub fn new(course: &CourseInfo) -> Self {
        Self {
            topics: course.topics.iter().map(|t| t.name.clone()).collect(),
            tags: course.tags.iter().map(|t| t.name.clone()).collect(),
            assessment_sets: course.assessment_sets.iter().map(|s| s.name.clone()).collect(),
            qids: HashSet::new(),
        }
    }

    pub fn with_questions<'a>(mut self, qids: impl IntoIterator<Item = &'a String>) -> Self {
        self.qids = qids.into_iter().cloned().collect();
        self
    }

    pub fn validate_question(
        &self,
        question: &QuestionInfo,
        file: &Path,
    ) -> Result<Vec<String>, SyncError> {
        let context = file.display().to_string();
        if !self.topics.contains(&question.topic) {
            return Err(SyncError::cross_reference(
                context,
                format!("invalid \"topic\": \"{}\" is not defined in infoCourse.json", question.topic),
            ));
        }
        for topic in &question.secondary_topics {
            if !self.topics.contains(topic) {
                return Err(SyncError::cross_reference(
                    context,
                    format!("invalid \"secondaryTopics\": \"{topic}\" is not defined in infoCourse.json"),
                ));
            }
        }
        let unknown = question.unknown_tags(|tag| self.tags.contains(tag));
        if !unknown.is_empty() {
            return Err(SyncError::UnknownTags {
                qid: question.qid.clone(),
                tags: unknown,
            });
        }
        Ok(Vec::new())
    }

    pub fn validate_course_instance(
        &self,
        instance: &CourseInstanceInfo,
        file: &Path,
    ) -> Result<Vec<String>, SyncError> {
        let context = file.display().to_string();
        let mut warnings = Vec::new();

        match instance.allow_issue_reporting {
            Some(false) => {
                return Err(SyncError::structural(
                    context,
                    "\"allowIssueReporting\" is no longer supported in infoCourseInstance.json; \
                     set \"allowIssueReporting\": false in each infoAssessment.json instead",
                ));
            }
            Some(true) => warnings.push(
                "\"allowIssueReporting\" is no longer needed in infoCourseInstance.json and should be removed"
                    .to_string(),
            ),
            None => {}
        }

        for rule in &instance.allow_access {
            check_date_range(&context, rule.start_date.as_deref(), rule.end_date.as_deref())?;
        }
        Ok(warnings)
    }

    pub fn validate_assessment(
        &self,
        assessment: &AssessmentInfo,
        file: &Path,
    ) -> Result<Vec<String>, SyncError> {
        let context = file.display().to_string();
        if !self.assessment_sets.contains(&assessment.set) {
            return Err(SyncError::cross_reference(
                context,
                format!("invalid \"set\": \"{}\" is not defined in infoCourse.json", assessment.set),
            ));
        }
        for rule in &assessment.allow_access {
            check_date_range(&context, rule.start_date.as_deref(), rule.end_date.as_deref())?;
        }

        let missing: BTreeSet<&str> = referenced_qids(assessment)
            .filter(|qid| !self.qids.contains(*qid))
            .collect();
        if !missing.is_empty() {
            let list: Vec<&str> = missing.into_iter().collect();
            return Err(SyncError::cross_reference(
                context,
                format!("the following questions do not exist in this course: {}", list.join(", ")),
            ));
        }
        Ok(Vec::new())
    }
}

fn referenced_qids(assessment: &AssessmentInfo) -> impl Iterator<Item = &str> {
    assessment.zones.iter().flat_map(|zone| {
        zone.questions.iter().flat_map(|question| {
            question
                .id
                .as_deref()
                .into_iter()
                .chain(question.alternatives.iter().flatten().map(|alt| alt.id.as_str()))
        })
    })
}

fn check_date_range(
    context: &str,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<(), SyncError> {
    let parse = |field: &str, raw: &str| {
        parse_rule_date(raw).ok_or_else(|| {
            SyncError::cross_reference(context, format!("invalid allowAccess {field}: {raw}"))
        })
    };
    let start_date = start.map(|raw| parse("startDate", raw)).transpose()?;
    let end_date = end.map(|raw| parse("endDate", raw)).transpose()?;

    if let (Some(s), Some(e)) = (start_date, end_date) {
        if s > e {
            return Err(SyncError::cross_reference(
                context,
                format!(
                    "invalid allowAccess rule: startDate ({}) must not be after endDate ({})",
                    start.unwrap_or_default(),
                    end.unwrap_or_default()
                ),
            ));
        }
    }
    Ok(())
}

/// Parses the date formats accepted in access rules. Offsets are discarded;
/// dates are interpreted in the course timezone.
pub fn parse_rule_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed);
        }
    }
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_local());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Storage form of an access-rule date.
pub fn normalize_rule_date(raw: &str) -> Option<String> {
    parse_rule_date(raw).map(|d| d.format("%Y-%m-%dT%H:%M:%S").to_string())
}
