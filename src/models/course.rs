use serde::{Deserialize, Serialize};

/// Contents of `infoCourse.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInfo {
    pub uuid: String,
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub timezone: Option<String>,
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub assessment_sets: Vec<AssessmentSet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSet {
    pub abbreviation: String,
    pub name: String,
    pub heading: String,
    pub color: String,
}

const DEFAULT_ASSESSMENT_SETS: &[(&str, &str, &str, &str)] = &[
    ("HW", "Homework", "Homeworks", "green1"),
    ("Q", "Quiz", "Quizzes", "red1"),
    ("PQ", "Practice Quiz", "Practice Quizzes", "pink1"),
    ("E", "Exam", "Exams", "brown1"),
    ("PE", "Practice Exam", "Practice Exams", "yellow1"),
    ("P", "Prep", "Question Preparation", "gray1"),
    ("MP", "Machine Problem", "Machine Problems", "turquoise1"),
    ("WS", "Worksheet", "Worksheets", "purple1"),
];

const DEFAULT_TAGS: &[(&str, &str, Option<&str>)] = &[
    ("numeric", "brown1", Some("The answer format is one or more numerical values.")),
    ("symbolic", "blue1", Some("The answer format is a symbolic expression.")),
    (
        "drawing",
        "yellow1",
        Some("The answer format requires drawing on a canvas to input a graphical representation of an answer."),
    ),
    (
        "MC",
        "green1",
        Some("The answer format is choosing from a small finite set of answers (multiple choice, possibly with multiple selections allowed, up to 10 possible answers)."),
    ),
    ("code", "turquoise1", Some("The answer format is a piece of code.")),
    (
        "multianswer",
        "orange2",
        Some("The question requires multiple answers, either as steps in a sequence or as separate questions."),
    ),
    (
        "graph",
        "purple1",
        Some("The question tests reading information from a graph or drawing a graph."),
    ),
    ("concept", "pink1", Some("The question tests conceptual understanding of a topic.")),
    (
        "calculate",
        "green2",
        Some("The questions tests performing a numerical calculation, with either a calculator or equivalent software."),
    ),
    (
        "compute",
        "purple1",
        Some("The question tests the writing and running of a piece of code to compute the answer. The answer itself is not the code, but could be a numeric answer output by the code, for example (use `code` when the answer is the code)."),
    ),
    (
        "software",
        "orange1",
        Some("The question tests the use of a specific piece of software (e.g., Matlab)."),
    ),
    (
        "estimation",
        "red2",
        Some("Answering the question correctly will require some amount of estimation, so an exact answer is not possible."),
    ),
    (
        "secret",
        "red3",
        Some("Only use this question on exams or quizzes that won't be released to students, so the question can be kept secret."),
    ),
    (
        "nontest",
        "green3",
        Some("This question is not appropriate for use in a restricted testing environment, so only use it on homeworks or similar."),
    ),
    ("Sp15", "gray1", None),
    ("Su15", "gray1", None),
    ("Fa15", "gray1", None),
    ("Sp16", "gray1", None),
    ("Su16", "gray1", None),
    ("Fa16", "gray1", None),
    ("Sp17", "gray1", None),
    ("Su17", "gray1", None),
    ("Fa17", "gray1", None),
    ("Sp18", "gray1", None),
    ("Su18", "gray1", None),
    ("Fa18", "gray1", None),
    ("Sp19", "gray1", None),
    ("Su19", "gray1", None),
    ("Fa19", "gray1", None),
    ("Sp20", "gray1", None),
    ("Su20", "gray1", None),
    ("Fa20", "gray1", None),
    ("Sp21", "gray1", None),
    ("Su21", "gray1", None),
    ("Fa21", "gray1", None),
];

pub fn default_assessment_sets() -> Vec<AssessmentSet> {
    DEFAULT_ASSESSMENT_SETS
        .iter()
        .map(|(abbreviation, name, heading, color)| AssessmentSet {
            abbreviation: abbreviation.to_string(),
            name: name.to_string(),
            heading: heading.to_string(),
            color: color.to_string(),
        })
        .collect()
}

pub fn default_tags() -> Vec<Tag> {
    DEFAULT_TAGS
        .iter()
        .map(|(name, color, description)| Tag {
            name: name.to_string(),
            color: color.to_string(),
            description: description.map(str::to_string),
        })
        .collect()
}

impl CourseInfo {
    /// Appends the built-in assessment sets and tags that the course does not
    /// declare itself. Returns a warning for every built-in the course redeclares.
    pub fn apply_builtin_defaults(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        for set in default_assessment_sets() {
            if self.assessment_sets.iter().any(|s| s.name == set.name) {
                warnings.push(format!(
                    "Default assessmentSet \"{}\" should not be included in infoCourse.json",
                    set.name
                ));
            } else {
                self.assessment_sets.push(set);
            }
        }

        for tag in default_tags() {
            if self.tags.iter().any(|t| t.name == tag.name) {
                warnings.push(format!(
                    "Default tag \"{}\" should not be included in infoCourse.json",
                    tag.name
                ));
            } else {
                self.tags.push(tag);
            }
        }

        warnings
    }
}
