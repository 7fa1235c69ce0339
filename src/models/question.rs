use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    Calculation,
    ShortAnswer,
    MultipleChoice,
    Checkbox,
    File,
    MultipleTrueFalse,
    #[serde(rename = "v3")]
    V3,
}

impl QuestionType {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::Calculation => "Calculation",
            QuestionType::ShortAnswer => "ShortAnswer",
            QuestionType::MultipleChoice => "MultipleChoice",
            QuestionType::Checkbox => "Checkbox",
            QuestionType::File => "File",
            QuestionType::MultipleTrueFalse => "MultipleTrueFalse",
            QuestionType::V3 => "v3",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradingMethod {
    #[default]
    Internal,
    External,
    Manual,
}

impl GradingMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            GradingMethod::Internal => "Internal",
            GradingMethod::External => "External",
            GradingMethod::Manual => "Manual",
        }
    }
}

/// Contents of a question's `info.json`. `qid` is the directory name, injected on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionInfo {
    #[serde(default)]
    pub qid: String,
    pub uuid: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub title: String,
    pub topic: String,
    #[serde(default)]
    pub secondary_topics: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub client_files: Vec<String>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub grading_method: GradingMethod,
    #[serde(default)]
    pub single_variant: bool,
    #[serde(default)]
    pub partial_credit: Option<bool>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub options: Option<Value>,
    #[serde(default)]
    pub external_grading_options: Option<ExternalGradingOptions>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalGradingOptions {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub entrypoint: Option<String>,
    #[serde(default)]
    pub server_files_course: Option<Vec<String>>,
    /// Deprecated spelling of `server_files_course`.
    #[serde(default)]
    pub files: Option<Vec<String>>,
    #[serde(default)]
    pub timeout: Option<i64>,
    #[serde(default)]
    pub enable_networking: bool,
}

impl QuestionInfo {
    /// Modern freeform questions default to partial credit; legacy types do not.
    pub fn partial_credit(&self) -> bool {
        self.partial_credit
            .unwrap_or(self.question_type == QuestionType::V3)
    }

    /// Declared tags rejected by `is_known`, in declaration order, each once.
    pub fn unknown_tags(&self, is_known: impl Fn(&str) -> bool) -> Vec<String> {
        let mut unknown: Vec<String> = Vec::new();
        for tag in &self.tags {
            if !is_known(tag) && !unknown.contains(tag) {
                unknown.push(tag.clone());
            }
        }
        unknown
    }
}
