use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

/// Column values for one `questions` upsert.
#[derive(Debug, Clone)]
pub struct QuestionParams<'a> {
    pub uuid: &'a str,
    pub qid: &'a str,
    pub question_type: &'static str,
    pub title: &'a str,
    pub topic_id: Option<i64>,
    pub grading_method: &'static str,
    pub partial_credit: bool,
    pub single_variant: bool,
    pub template_directory: Option<&'a str>,
    /// JSON text.
    pub options: Option<String>,
    /// JSON array text.
    pub client_files: String,
    pub external_grading_enabled: bool,
    pub external_grading_image: Option<&'a str>,
    pub external_grading_entrypoint: Option<&'a str>,
    pub external_grading_files: Option<String>,
    pub external_grading_timeout: Option<i64>,
    pub external_grading_enable_networking: bool,
}

#[derive(Debug, Clone)]
pub struct CourseInstanceParams<'a> {
    pub uuid: &'a str,
    pub short_name: &'a str,
    pub long_name: &'a str,
    pub number: Option<&'a str>,
    pub order_by: i64,
    pub display_timezone: Option<&'a str>,
    pub hide_in_enroll_page: bool,
}

#[derive(Debug, Clone)]
pub struct CourseInstanceAccessRuleParams<'a> {
    pub role: Option<&'static str>,
    pub uids: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub institution: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct AssessmentParams<'a> {
    pub uuid: &'a str,
    pub tid: &'a str,
    pub assessment_type: &'static str,
    pub number: &'a str,
    pub order_by: i64,
    pub title: &'a str,
    pub assessment_set_id: Option<i64>,
    pub text: Option<&'a str>,
    pub multiple_instance: bool,
    pub shuffle_questions: bool,
    pub allow_issue_reporting: bool,
    pub allow_real_time_grading: bool,
    pub auto_close: bool,
    pub constant_question_value: bool,
    pub max_points: Option<f64>,
    pub max_bonus_points: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct AssessmentAccessRuleParams<'a> {
    pub mode: Option<&'a str>,
    pub role: Option<&'static str>,
    pub uids: Option<String>,
    pub credit: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub time_limit_min: Option<i64>,
    pub password: Option<&'a str>,
    pub exam_uuid: Option<&'a str>,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct ZoneParams<'a> {
    pub number: i64,
    pub title: Option<&'a str>,
    pub number_choose: Option<i64>,
    pub max_points: Option<f64>,
    pub best_questions: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct AlternativeGroupParams {
    pub zone_id: i64,
    pub number: i64,
    pub number_choose: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct AssessmentQuestionParams {
    pub question_id: i64,
    pub alternative_group_id: i64,
    pub number: i64,
    pub number_in_alternative_group: i64,
    pub max_points: f64,
    /// JSON array text; set for Exam assessments only.
    pub points_list: Option<String>,
    /// Set for Homework assessments only.
    pub init_points: Option<f64>,
    pub force_max_points: bool,
    pub tries_per_variant: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CourseRow {
    pub id: i64,
    pub path: String,
    pub uuid: String,
    pub short_name: String,
    pub title: String,
    pub display_timezone: Option<String>,
    pub synced_at: String,
}

pub async fn fetch_courses(db: &SqlitePool) -> Result<Vec<CourseRow>, sqlx::Error> {
    sqlx::query_as::<_, CourseRow>(
        r#"
        SELECT id, path, uuid, short_name, title, display_timezone, synced_at
        FROM courses
        ORDER BY short_name, path
        "#,
    )
    .fetch_all(db)
    .await
}
