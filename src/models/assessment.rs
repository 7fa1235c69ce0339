use serde::{Deserialize, Serialize};

use super::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssessmentType {
    Exam,
    Homework,
}

impl AssessmentType {
    pub fn as_str(self) -> &'static str {
        match self {
            AssessmentType::Exam => "Exam",
            AssessmentType::Homework => "Homework",
        }
    }

    /// Resolves the declared point fields of one question slot into the point
    /// model of this assessment type.
    pub fn resolve_points(
        self,
        points: Option<&PointsValue>,
        max_points: Option<f64>,
        allow_real_time_grading: bool,
    ) -> Result<PointsModel, String> {
        match self {
            AssessmentType::Exam => {
                if max_points.is_some() {
                    return Err(
                        "Cannot specify \"maxPoints\" for a question in an \"Exam\" assessment"
                            .to_string(),
                    );
                }
                let points = points.ok_or_else(|| {
                    "Must specify \"points\" for a question in an \"Exam\" assessment".to_string()
                })?;
                let points_list = points.to_list();
                if !allow_real_time_grading && points_list.len() > 1 {
                    return Err("Cannot specify an array of multiple point values for a question if real-time grading is disabled".to_string());
                }
                let max_points = points_list.iter().copied().fold(f64::MIN, f64::max);
                Ok(PointsModel::Exam {
                    points_list,
                    max_points,
                })
            }
            AssessmentType::Homework => match points {
                None => Err(
                    "Must specify \"points\" for a question in a \"Homework\" assessment"
                        .to_string(),
                ),
                Some(PointsValue::List(_)) => Err(
                    "Cannot specify \"points\" as a list for a question in a \"Homework\" assessment"
                        .to_string(),
                ),
                Some(PointsValue::Single(p)) => Ok(PointsModel::Homework {
                    init_points: *p,
                    max_points: max_points.unwrap_or(*p),
                }),
            },
        }
    }
}

/// A `points` field: either one value or a per-attempt list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointsValue {
    Single(f64),
    List(Vec<f64>),
}

impl PointsValue {
    pub fn to_list(&self) -> Vec<f64> {
        match self {
            PointsValue::Single(p) => vec![*p],
            PointsValue::List(list) => list.clone(),
        }
    }
}

/// Grading semantics of one assessment question, fixed by the assessment type.
#[derive(Debug, Clone, PartialEq)]
pub enum PointsModel {
    Exam { points_list: Vec<f64>, max_points: f64 },
    Homework { init_points: f64, max_points: f64 },
}

impl PointsModel {
    pub fn max_points(&self) -> f64 {
        match self {
            PointsModel::Exam { max_points, .. } | PointsModel::Homework { max_points, .. } => {
                *max_points
            }
        }
    }

    pub fn points_list(&self) -> Option<&[f64]> {
        match self {
            PointsModel::Exam { points_list, .. } => Some(points_list),
            PointsModel::Homework { .. } => None,
        }
    }

    pub fn init_points(&self) -> Option<f64> {
        match self {
            PointsModel::Exam { .. } => None,
            PointsModel::Homework { init_points, .. } => Some(*init_points),
        }
    }
}

/// Contents of `infoAssessment.json`. `tid` is the directory name, injected on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentInfo {
    #[serde(default)]
    pub tid: String,
    pub uuid: String,
    #[serde(rename = "type")]
    pub assessment_type: AssessmentType,
    pub title: String,
    pub set: String,
    pub number: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub multiple_instance: bool,
    #[serde(default)]
    pub shuffle_questions: bool,
    #[serde(default = "default_true")]
    pub allow_issue_reporting: bool,
    #[serde(default = "default_true")]
    pub allow_real_time_grading: bool,
    #[serde(default = "default_true")]
    pub auto_close: bool,
    #[serde(default)]
    pub constant_question_value: bool,
    #[serde(default)]
    pub max_points: Option<f64>,
    #[serde(default)]
    pub max_bonus_points: Option<f64>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub allow_access: Vec<AssessmentAccessRule>,
    #[serde(default)]
    pub zones: Vec<Zone>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentAccessRule {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub exam_uuid: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub uids: Option<Vec<String>>,
    #[serde(default)]
    pub credit: Option<i64>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub time_limit_min: Option<i64>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub max_points: Option<f64>,
    #[serde(default)]
    pub number_choose: Option<i64>,
    #[serde(default)]
    pub best_questions: Option<i64>,
    #[serde(default)]
    pub questions: Vec<ZoneQuestion>,
}

/// One slot of a zone: a single question (`id`) or an alternative group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneQuestion {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub alternatives: Option<Vec<QuestionAlternative>>,
    #[serde(default)]
    pub points: Option<PointsValue>,
    #[serde(default)]
    pub max_points: Option<f64>,
    #[serde(default)]
    pub force_max_points: Option<bool>,
    #[serde(default)]
    pub number_choose: Option<i64>,
    #[serde(default)]
    pub tries_per_variant: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAlternative {
    pub id: String,
    #[serde(default)]
    pub points: Option<PointsValue>,
    #[serde(default)]
    pub max_points: Option<f64>,
    #[serde(default)]
    pub force_max_points: Option<bool>,
    #[serde(default)]
    pub tries_per_variant: Option<i64>,
}
