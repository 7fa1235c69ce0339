pub mod rows;
pub mod sqlite;

use async_trait::async_trait;

use crate::models::{AssessmentSet, CourseInfo, Tag, Topic, UserRole};

pub use rows::*;
pub use sqlite::SqliteStore;

/// Where a UUID must not already be in use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UuidScope {
    /// Courses stored under a different path.
    Course { path: String },
    /// Live questions of other courses.
    Question { course_id: i64 },
    /// Live course instances of other courses.
    CourseInstance { course_id: i64 },
    /// Live assessments of the same course outside `synced_instance_ids`.
    Assessment {
        course_id: i64,
        synced_instance_ids: Vec<i64>,
    },
}

/// Keep-list prunes. Content entities are soft-deleted, lookup lists are
/// deleted outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneScope {
    Topics { course_id: i64 },
    AssessmentSets { course_id: i64 },
    Questions { course_id: i64 },
    CourseInstances { course_id: i64 },
    Assessments { course_instance_id: i64 },
    AssessmentQuestions { assessment_id: i64 },
}

/// Child collections identified by their 1-based position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Positional {
    CourseInstanceAccessRules,
    AssessmentAccessRules,
    Zones,
    AlternativeGroups,
}

/// Storage operations a course sync depends on. Every upsert matches on the
/// entity's durable key, clears any deletion marker and returns the row id.
#[async_trait]
pub trait CourseStore: Send {
    /// Describes the entity already using `uuid` within `scope`, if any.
    async fn find_uuid_conflict(
        &mut self,
        scope: &UuidScope,
        uuid: &str,
    ) -> Result<Option<String>, sqlx::Error>;

    async fn upsert_course(&mut self, path: &str, info: &CourseInfo) -> Result<i64, sqlx::Error>;

    async fn upsert_topic(
        &mut self,
        course_id: i64,
        number: i64,
        topic: &Topic,
    ) -> Result<i64, sqlx::Error>;

    async fn upsert_assessment_set(
        &mut self,
        course_id: i64,
        number: i64,
        set: &AssessmentSet,
    ) -> Result<i64, sqlx::Error>;

    /// Makes the course's tags exactly `tags`, numbered by position.
    /// Returns the ids in input order.
    async fn replace_tag_set(&mut self, course_id: i64, tags: &[Tag])
    -> Result<Vec<i64>, sqlx::Error>;

    async fn set_question_tags(&mut self, question_id: i64, tag_ids: &[i64])
    -> Result<(), sqlx::Error>;

    async fn upsert_question(
        &mut self,
        course_id: i64,
        question: &QuestionParams<'_>,
    ) -> Result<i64, sqlx::Error>;

    async fn upsert_course_instance(
        &mut self,
        course_id: i64,
        instance: &CourseInstanceParams<'_>,
    ) -> Result<i64, sqlx::Error>;

    async fn upsert_course_instance_access_rule(
        &mut self,
        course_instance_id: i64,
        number: i64,
        rule: &CourseInstanceAccessRuleParams<'_>,
    ) -> Result<i64, sqlx::Error>;

    async fn upsert_staff_enrollment(
        &mut self,
        course_instance_id: i64,
        uid: &str,
        role: UserRole,
    ) -> Result<i64, sqlx::Error>;

    /// Sets every enrollment whose uid is not in `keep_uids` back to `Student`.
    async fn downgrade_other_enrollments(
        &mut self,
        course_instance_id: i64,
        keep_uids: &[String],
    ) -> Result<u64, sqlx::Error>;

    async fn upsert_assessment(
        &mut self,
        course_instance_id: i64,
        assessment: &AssessmentParams<'_>,
    ) -> Result<i64, sqlx::Error>;

    async fn upsert_assessment_access_rule(
        &mut self,
        assessment_id: i64,
        number: i64,
        rule: &AssessmentAccessRuleParams<'_>,
    ) -> Result<i64, sqlx::Error>;

    async fn upsert_zone(
        &mut self,
        assessment_id: i64,
        zone: &ZoneParams<'_>,
    ) -> Result<i64, sqlx::Error>;

    async fn upsert_alternative_group(
        &mut self,
        assessment_id: i64,
        group: &AlternativeGroupParams,
    ) -> Result<i64, sqlx::Error>;

    async fn upsert_assessment_question(
        &mut self,
        assessment_id: i64,
        question: &AssessmentQuestionParams,
    ) -> Result<i64, sqlx::Error>;

    /// Removes rows of `scope` whose id is not in `keep_ids`. Returns the
    /// number of rows affected.
    async fn prune(&mut self, scope: PruneScope, keep_ids: &[i64]) -> Result<u64, sqlx::Error>;

    /// Deletes rows of `kind` under `parent_id` numbered above `last_number`.
    async fn prune_positional(
        &mut self,
        kind: Positional,
        parent_id: i64,
        last_number: i64,
    ) -> Result<u64, sqlx::Error>;
}
