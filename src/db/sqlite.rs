use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::{
    AlternativeGroupParams, AssessmentAccessRuleParams, AssessmentParams, AssessmentQuestionParams,
    CourseInstanceAccessRuleParams, CourseInstanceParams, CourseStore, Positional, PruneScope,
    QuestionParams, UuidScope, ZoneParams,
};
use crate::models::{AssessmentSet, CourseInfo, Tag, Topic, UserRole};

/// `CourseStore` over one SQLite transaction. Dropping the store without
/// calling [`SqliteStore::commit`] rolls every write back.
pub struct SqliteStore {
    tx: Transaction<'static, Sqlite>,
}

impl SqliteStore {
    pub async fn begin(pool: &SqlitePool) -> Result<Self, sqlx::Error> {
        Ok(Self {
            tx: pool.begin().await?,
        })
    }

    pub async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }

    async fn soft_delete_assessment_children(&mut self, ids_json: &str, now: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE assessment_questions SET deleted_at = ?
            WHERE deleted_at IS NULL
              AND assessment_id IN (SELECT value FROM json_each(?))
            "#,
        )
        .bind(now)
        .bind(ids_json)
        .execute(&mut *self.tx)
        .await?;

        for table in ["assessment_access_rules", "zones", "alternative_groups"] {
            sqlx::query(&format!(
                "DELETE FROM {table} WHERE assessment_id IN (SELECT value FROM json_each(?))"
            ))
            .bind(ids_json)
            .execute(&mut *self.tx)
            .await?;
        }
        Ok(())
    }
}

fn json_list<T: Serialize>(items: &[T]) -> Result<String, sqlx::Error> {
    serde_json::to_string(items).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

#[async_trait]
impl CourseStore for SqliteStore {
    async fn find_uuid_conflict(
        &mut self,
        scope: &UuidScope,
        uuid: &str,
    ) -> Result<Option<String>, sqlx::Error> {
        let conflict = match scope {
            UuidScope::Course { path } => sqlx::query_scalar::<_, String>(
                "SELECT path FROM courses WHERE uuid = ? AND path != ? LIMIT 1",
            )
            .bind(uuid)
            .bind(path)
            .fetch_optional(&mut *self.tx)
            .await?
            .map(|other| format!("course at {other}")),

            UuidScope::Question { course_id } => sqlx::query_as::<_, (String, String)>(
                r#"
                SELECT q.qid, c.path
                FROM questions q
                JOIN courses c ON c.id = q.course_id
                WHERE q.uuid = ? AND q.course_id != ? AND q.deleted_at IS NULL
                LIMIT 1
                "#,
            )
            .bind(uuid)
            .bind(course_id)
            .fetch_optional(&mut *self.tx)
            .await?
            .map(|(qid, path)| format!("question {qid} in course at {path}")),

            UuidScope::CourseInstance { course_id } => sqlx::query_as::<_, (String, String)>(
                r#"
                SELECT ci.short_name, c.path
                FROM course_instances ci
                JOIN courses c ON c.id = ci.course_id
                WHERE ci.uuid = ? AND ci.course_id != ? AND ci.deleted_at IS NULL
                LIMIT 1
                "#,
            )
            .bind(uuid)
            .bind(course_id)
            .fetch_optional(&mut *self.tx)
            .await?
            .map(|(ciid, path)| format!("course instance {ciid} in course at {path}")),

            UuidScope::Assessment {
                course_id,
                synced_instance_ids,
            } => sqlx::query_as::<_, (String, String)>(
                r#"
                SELECT a.tid, ci.short_name
                FROM assessments a
                JOIN course_instances ci ON ci.id = a.course_instance_id
                WHERE a.uuid = ?
                  AND ci.course_id = ?
                  AND a.course_instance_id NOT IN (SELECT value FROM json_each(?))
                  AND a.deleted_at IS NULL
                  AND ci.deleted_at IS NULL
                LIMIT 1
                "#,
            )
            .bind(uuid)
            .bind(course_id)
            .bind(json_list(synced_instance_ids)?)
            .fetch_optional(&mut *self.tx)
            .await?
            .map(|(tid, ciid)| format!("assessment {tid} in course instance {ciid}")),
        };
        Ok(conflict)
    }

    async fn upsert_course(&mut self, path: &str, info: &CourseInfo) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO courses (path, uuid, short_name, title, display_timezone, synced_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(path) DO UPDATE SET
                uuid = excluded.uuid,
                short_name = excluded.short_name,
                title = excluded.title,
                display_timezone = excluded.display_timezone,
                synced_at = excluded.synced_at
            RETURNING id
            "#,
        )
        .bind(path)
        .bind(&info.uuid)
        .bind(&info.name)
        .bind(&info.title)
        .bind(&info.timezone)
        .bind(now())
        .fetch_one(&mut *self.tx)
        .await
    }

    async fn upsert_topic(
        &mut self,
        course_id: i64,
        number: i64,
        topic: &Topic,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO topics (course_id, number, name, color, description)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(course_id, name) DO UPDATE SET
                number = excluded.number,
                color = excluded.color,
                description = excluded.description
            RETURNING id
            "#,
        )
        .bind(course_id)
        .bind(number)
        .bind(&topic.name)
        .bind(&topic.color)
        .bind(&topic.description)
        .fetch_one(&mut *self.tx)
        .await
    }

    async fn upsert_assessment_set(
        &mut self,
        course_id: i64,
        number: i64,
        set: &AssessmentSet,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO assessment_sets (course_id, number, abbreviation, name, heading, color)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(course_id, name) DO UPDATE SET
                number = excluded.number,
                abbreviation = excluded.abbreviation,
                heading = excluded.heading,
                color = excluded.color
            RETURNING id
            "#,
        )
        .bind(course_id)
        .bind(number)
        .bind(&set.abbreviation)
        .bind(&set.name)
        .bind(&set.heading)
        .bind(&set.color)
        .fetch_one(&mut *self.tx)
        .await
    }

    async fn replace_tag_set(
        &mut self,
        course_id: i64,
        tags: &[Tag],
    ) -> Result<Vec<i64>, sqlx::Error> {
        let mut ids = Vec::with_capacity(tags.len());
        for (i, tag) in tags.iter().enumerate() {
            let id = sqlx::query_scalar::<_, i64>(
                r#"
                INSERT INTO tags (course_id, number, name, color, description)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(course_id, name) DO UPDATE SET
                    number = excluded.number,
                    color = excluded.color,
                    description = excluded.description
                RETURNING id
                "#,
            )
            .bind(course_id)
            .bind(i as i64 + 1)
            .bind(&tag.name)
            .bind(&tag.color)
            .bind(&tag.description)
            .fetch_one(&mut *self.tx)
            .await?;
            ids.push(id);
        }

        sqlx::query(
            "DELETE FROM tags WHERE course_id = ? AND id NOT IN (SELECT value FROM json_each(?))",
        )
        .bind(course_id)
        .bind(json_list(&ids)?)
        .execute(&mut *self.tx)
        .await?;

        Ok(ids)
    }

    async fn set_question_tags(
        &mut self,
        question_id: i64,
        tag_ids: &[i64],
    ) -> Result<(), sqlx::Error> {
        for (i, tag_id) in tag_ids.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO question_tags (question_id, tag_id, number)
                VALUES (?, ?, ?)
                ON CONFLICT(question_id, tag_id) DO UPDATE SET number = excluded.number
                "#,
            )
            .bind(question_id)
            .bind(tag_id)
            .bind(i as i64 + 1)
            .execute(&mut *self.tx)
            .await?;
        }

        sqlx::query(
            r#"
            DELETE FROM question_tags
            WHERE question_id = ? AND tag_id NOT IN (SELECT value FROM json_each(?))
            "#,
        )
        .bind(question_id)
        .bind(json_list(tag_ids)?)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn upsert_question(
        &mut self,
        course_id: i64,
        q: &QuestionParams<'_>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO questions (
                course_id, uuid, qid, type, title, topic_id, grading_method,
                partial_credit, single_variant, template_directory, options, client_files,
                external_grading_enabled, external_grading_image, external_grading_entrypoint,
                external_grading_files, external_grading_timeout,
                external_grading_enable_networking, deleted_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL)
            ON CONFLICT(course_id, uuid) DO UPDATE SET
                qid = excluded.qid,
                type = excluded.type,
                title = excluded.title,
                topic_id = excluded.topic_id,
                grading_method = excluded.grading_method,
                partial_credit = excluded.partial_credit,
                single_variant = excluded.single_variant,
                template_directory = excluded.template_directory,
                options = excluded.options,
                client_files = excluded.client_files,
                external_grading_enabled = excluded.external_grading_enabled,
                external_grading_image = excluded.external_grading_image,
                external_grading_entrypoint = excluded.external_grading_entrypoint,
                external_grading_files = excluded.external_grading_files,
                external_grading_timeout = excluded.external_grading_timeout,
                external_grading_enable_networking = excluded.external_grading_enable_networking,
                deleted_at = NULL
            RETURNING id
            "#,
        )
        .bind(course_id)
        .bind(q.uuid)
        .bind(q.qid)
        .bind(q.question_type)
        .bind(q.title)
        .bind(q.topic_id)
        .bind(q.grading_method)
        .bind(q.partial_credit)
        .bind(q.single_variant)
        .bind(q.template_directory)
        .bind(&q.options)
        .bind(&q.client_files)
        .bind(q.external_grading_enabled)
        .bind(q.external_grading_image)
        .bind(q.external_grading_entrypoint)
        .bind(&q.external_grading_files)
        .bind(q.external_grading_timeout)
        .bind(q.external_grading_enable_networking)
        .fetch_one(&mut *self.tx)
        .await
    }

    async fn upsert_course_instance(
        &mut self,
        course_id: i64,
        ci: &CourseInstanceParams<'_>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO course_instances (
                course_id, uuid, short_name, long_name, number, order_by,
                display_timezone, hide_in_enroll_page, deleted_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, NULL)
            ON CONFLICT(course_id, uuid) DO UPDATE SET
                short_name = excluded.short_name,
                long_name = excluded.long_name,
                number = excluded.number,
                order_by = excluded.order_by,
                display_timezone = excluded.display_timezone,
                hide_in_enroll_page = excluded.hide_in_enroll_page,
                deleted_at = NULL
            RETURNING id
            "#,
        )
        .bind(course_id)
        .bind(ci.uuid)
        .bind(ci.short_name)
        .bind(ci.long_name)
        .bind(ci.number)
        .bind(ci.order_by)
        .bind(ci.display_timezone)
        .bind(ci.hide_in_enroll_page)
        .fetch_one(&mut *self.tx)
        .await
    }

    async fn upsert_course_instance_access_rule(
        &mut self,
        course_instance_id: i64,
        number: i64,
        rule: &CourseInstanceAccessRuleParams<'_>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO course_instance_access_rules (
                course_instance_id, number, role, uids, start_date, end_date, institution
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(course_instance_id, number) DO UPDATE SET
                role = excluded.role,
                uids = excluded.uids,
                start_date = excluded.start_date,
                end_date = excluded.end_date,
                institution = excluded.institution
            RETURNING id
            "#,
        )
        .bind(course_instance_id)
        .bind(number)
        .bind(rule.role)
        .bind(&rule.uids)
        .bind(&rule.start_date)
        .bind(&rule.end_date)
        .bind(rule.institution)
        .fetch_one(&mut *self.tx)
        .await
    }

    async fn upsert_staff_enrollment(
        &mut self,
        course_instance_id: i64,
        uid: &str,
        role: UserRole,
    ) -> Result<i64, sqlx::Error> {
        let user_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (uid) VALUES (?)
            ON CONFLICT(uid) DO UPDATE SET uid = excluded.uid
            RETURNING id
            "#,
        )
        .bind(uid)
        .fetch_one(&mut *self.tx)
        .await?;

        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO enrollments (user_id, course_instance_id, role)
            VALUES (?, ?, ?)
            ON CONFLICT(user_id, course_instance_id) DO UPDATE SET role = excluded.role
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(course_instance_id)
        .bind(role.as_str())
        .fetch_one(&mut *self.tx)
        .await
    }

    async fn downgrade_other_enrollments(
        &mut self,
        course_instance_id: i64,
        keep_uids: &[String],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE enrollments SET role = 'Student'
            WHERE course_instance_id = ?
              AND role != 'Student'
              AND user_id NOT IN (
                  SELECT id FROM users WHERE uid IN (SELECT value FROM json_each(?))
              )
            "#,
        )
        .bind(course_instance_id)
        .bind(json_list(keep_uids)?)
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected())
    }

    async fn upsert_assessment(
        &mut self,
        course_instance_id: i64,
        a: &AssessmentParams<'_>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO assessments (
                course_instance_id, uuid, tid, type, number, order_by, title,
                assessment_set_id, text, multiple_instance, shuffle_questions,
                allow_issue_reporting, allow_real_time_grading, auto_close,
                constant_question_value, max_points, max_bonus_points, deleted_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL)
            ON CONFLICT(course_instance_id, uuid) DO UPDATE SET
                tid = excluded.tid,
                type = excluded.type,
                number = excluded.number,
                order_by = excluded.order_by,
                title = excluded.title,
                assessment_set_id = excluded.assessment_set_id,
                text = excluded.text,
                multiple_instance = excluded.multiple_instance,
                shuffle_questions = excluded.shuffle_questions,
                allow_issue_reporting = excluded.allow_issue_reporting,
                allow_real_time_grading = excluded.allow_real_time_grading,
                auto_close = excluded.auto_close,
                constant_question_value = excluded.constant_question_value,
                max_points = excluded.max_points,
                max_bonus_points = excluded.max_bonus_points,
                deleted_at = NULL
            RETURNING id
            "#,
        )
        .bind(course_instance_id)
        .bind(a.uuid)
        .bind(a.tid)
        .bind(a.assessment_type)
        .bind(a.number)
        .bind(a.order_by)
        .bind(a.title)
        .bind(a.assessment_set_id)
        .bind(a.text)
        .bind(a.multiple_instance)
        .bind(a.shuffle_questions)
        .bind(a.allow_issue_reporting)
        .bind(a.allow_real_time_grading)
        .bind(a.auto_close)
        .bind(a.constant_question_value)
        .bind(a.max_points)
        .bind(a.max_bonus_points)
        .fetch_one(&mut *self.tx)
        .await
    }

    async fn upsert_assessment_access_rule(
        &mut self,
        assessment_id: i64,
        number: i64,
        rule: &AssessmentAccessRuleParams<'_>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO assessment_access_rules (
                assessment_id, number, mode, role, uids, credit, start_date, end_date,
                time_limit_min, password, exam_uuid, active
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(assessment_id, number) DO UPDATE SET
                mode = excluded.mode,
                role = excluded.role,
                uids = excluded.uids,
                credit = excluded.credit,
                start_date = excluded.start_date,
                end_date = excluded.end_date,
                time_limit_min = excluded.time_limit_min,
                password = excluded.password,
                exam_uuid = excluded.exam_uuid,
                active = excluded.active
            RETURNING id
            "#,
        )
        .bind(assessment_id)
        .bind(number)
        .bind(rule.mode)
        .bind(rule.role)
        .bind(&rule.uids)
        .bind(rule.credit)
        .bind(&rule.start_date)
        .bind(&rule.end_date)
        .bind(rule.time_limit_min)
        .bind(rule.password)
        .bind(rule.exam_uuid)
        .bind(rule.active)
        .fetch_one(&mut *self.tx)
        .await
    }

    async fn upsert_zone(
        &mut self,
        assessment_id: i64,
        zone: &ZoneParams<'_>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO zones (assessment_id, number, title, number_choose, max_points, best_questions)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(assessment_id, number) DO UPDATE SET
                title = excluded.title,
                number_choose = excluded.number_choose,
                max_points = excluded.max_points,
                best_questions = excluded.best_questions
            RETURNING id
            "#,
        )
        .bind(assessment_id)
        .bind(zone.number)
        .bind(zone.title)
        .bind(zone.number_choose)
        .bind(zone.max_points)
        .bind(zone.best_questions)
        .fetch_one(&mut *self.tx)
        .await
    }

    async fn upsert_alternative_group(
        &mut self,
        assessment_id: i64,
        group: &AlternativeGroupParams,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO alternative_groups (assessment_id, zone_id, number, number_choose)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(assessment_id, number) DO UPDATE SET
                zone_id = excluded.zone_id,
                number_choose = excluded.number_choose
            RETURNING id
            "#,
        )
        .bind(assessment_id)
        .bind(group.zone_id)
        .bind(group.number)
        .bind(group.number_choose)
        .fetch_one(&mut *self.tx)
        .await
    }

    async fn upsert_assessment_question(
        &mut self,
        assessment_id: i64,
        aq: &AssessmentQuestionParams,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO assessment_questions (
                assessment_id, question_id, alternative_group_id, number,
                number_in_alternative_group, max_points, points_list, init_points,
                force_max_points, tries_per_variant, deleted_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL)
            ON CONFLICT(assessment_id, question_id) DO UPDATE SET
                alternative_group_id = excluded.alternative_group_id,
                number = excluded.number,
                number_in_alternative_group = excluded.number_in_alternative_group,
                max_points = excluded.max_points,
                points_list = excluded.points_list,
                init_points = excluded.init_points,
                force_max_points = excluded.force_max_points,
                tries_per_variant = excluded.tries_per_variant,
                deleted_at = NULL
            RETURNING id
            "#,
        )
        .bind(assessment_id)
        .bind(aq.question_id)
        .bind(aq.alternative_group_id)
        .bind(aq.number)
        .bind(aq.number_in_alternative_group)
        .bind(aq.max_points)
        .bind(&aq.points_list)
        .bind(aq.init_points)
        .bind(aq.force_max_points)
        .bind(aq.tries_per_variant)
        .fetch_one(&mut *self.tx)
        .await
    }

    async fn prune(&mut self, scope: PruneScope, keep_ids: &[i64]) -> Result<u64, sqlx::Error> {
        let keep = json_list(keep_ids)?;
        let now = now();

        let affected = match scope {
            PruneScope::Topics { course_id } => sqlx::query(
                "DELETE FROM topics WHERE course_id = ? AND id NOT IN (SELECT value FROM json_each(?))",
            )
            .bind(course_id)
            .bind(&keep)
            .execute(&mut *self.tx)
            .await?
            .rows_affected(),

            PruneScope::AssessmentSets { course_id } => sqlx::query(
                "DELETE FROM assessment_sets WHERE course_id = ? AND id NOT IN (SELECT value FROM json_each(?))",
            )
            .bind(course_id)
            .bind(&keep)
            .execute(&mut *self.tx)
            .await?
            .rows_affected(),

            PruneScope::Questions { course_id } => sqlx::query(
                r#"
                UPDATE questions SET deleted_at = ?
                WHERE course_id = ? AND deleted_at IS NULL
                  AND id NOT IN (SELECT value FROM json_each(?))
                "#,
            )
            .bind(&now)
            .bind(course_id)
            .bind(&keep)
            .execute(&mut *self.tx)
            .await?
            .rows_affected(),

            PruneScope::CourseInstances { course_id } => {
                let removed = sqlx::query_scalar::<_, i64>(
                    r#"
                    UPDATE course_instances SET deleted_at = ?
                    WHERE course_id = ? AND deleted_at IS NULL
                      AND id NOT IN (SELECT value FROM json_each(?))
                    RETURNING id
                    "#,
                )
                .bind(&now)
                .bind(course_id)
                .bind(&keep)
                .fetch_all(&mut *self.tx)
                .await?;

                if !removed.is_empty() {
                    let removed_json = json_list(&removed)?;
                    sqlx::query(
                        "DELETE FROM course_instance_access_rules WHERE course_instance_id IN (SELECT value FROM json_each(?))",
                    )
                    .bind(&removed_json)
                    .execute(&mut *self.tx)
                    .await?;

                    let assessments = sqlx::query_scalar::<_, i64>(
                        r#"
                        UPDATE assessments SET deleted_at = ?
                        WHERE deleted_at IS NULL
                          AND course_instance_id IN (SELECT value FROM json_each(?))
                        RETURNING id
                        "#,
                    )
                    .bind(&now)
                    .bind(&removed_json)
                    .fetch_all(&mut *self.tx)
                    .await?;
                    self.soft_delete_assessment_children(&json_list(&assessments)?, &now)
                        .await?;
                }
                removed.len() as u64
            }

            PruneScope::Assessments { course_instance_id } => {
                let removed = sqlx::query_scalar::<_, i64>(
                    r#"
                    UPDATE assessments SET deleted_at = ?
                    WHERE course_instance_id = ? AND deleted_at IS NULL
                      AND id NOT IN (SELECT value FROM json_each(?))
                    RETURNING id
                    "#,
                )
                .bind(&now)
                .bind(course_instance_id)
                .bind(&keep)
                .fetch_all(&mut *self.tx)
                .await?;

                if !removed.is_empty() {
                    self.soft_delete_assessment_children(&json_list(&removed)?, &now)
                        .await?;
                }
                removed.len() as u64
            }

            PruneScope::AssessmentQuestions { assessment_id } => sqlx::query(
                r#"
                UPDATE assessment_questions SET deleted_at = ?
                WHERE assessment_id = ? AND deleted_at IS NULL
                  AND id NOT IN (SELECT value FROM json_each(?))
                "#,
            )
            .bind(&now)
            .bind(assessment_id)
            .bind(&keep)
            .execute(&mut *self.tx)
            .await?
            .rows_affected(),
        };
        Ok(affected)
    }

    async fn prune_positional(
        &mut self,
        kind: Positional,
        parent_id: i64,
        last_number: i64,
    ) -> Result<u64, sqlx::Error> {
        let sql = match kind {
            Positional::CourseInstanceAccessRules => {
                "DELETE FROM course_instance_access_rules WHERE course_instance_id = ? AND number > ?"
            }
            Positional::AssessmentAccessRules => {
                "DELETE FROM assessment_access_rules WHERE assessment_id = ? AND number > ?"
            }
            Positional::Zones => "DELETE FROM zones WHERE assessment_id = ? AND number > ?",
            Positional::AlternativeGroups => {
                "DELETE FROM alternative_groups WHERE assessment_id = ? AND number > ?"
            }
        };
        let result = sqlx::query(sql)
            .bind(parent_id)
            .bind(last_number)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }
}
