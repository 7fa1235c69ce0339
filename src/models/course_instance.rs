use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Student,
    TA,
    Instructor,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Student => "Student",
            UserRole::TA => "TA",
            UserRole::Instructor => "Instructor",
        }
    }
}

/// Contents of `infoCourseInstance.json`. `ciid` is the directory name, injected on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInstanceInfo {
    #[serde(default)]
    pub ciid: String,
    pub uuid: String,
    pub long_name: String,
    #[serde(default, deserialize_with = "number_as_text")]
    pub number: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub hide_in_enroll_page: bool,
    /// Legacy; only `true` is tolerated.
    #[serde(default)]
    pub allow_issue_reporting: Option<bool>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub user_roles: BTreeMap<String, UserRole>,
    #[serde(default)]
    pub allow_access: Vec<CourseInstanceAccessRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInstanceAccessRule {
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub uids: Option<Vec<String>>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Integer(i64),
    Text(String),
}

/// Course instances may declare `number` either as an integer or as a string.
fn number_as_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawNumber>::deserialize(deserializer)?;
    Ok(raw.map(|n| match n {
        RawNumber::Integer(i) => i.to_string(),
        RawNumber::Text(s) => s,
    }))
}
