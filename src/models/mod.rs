pub mod assessment;
pub mod course;
pub mod course_instance;
pub mod question;

pub use assessment::{
    AssessmentAccessRule, AssessmentInfo, AssessmentType, PointsModel, PointsValue,
    QuestionAlternative, Zone, ZoneQuestion,
};
pub use course::{AssessmentSet, CourseInfo, Tag, Topic, default_assessment_sets, default_tags};
pub use course_instance::{CourseInstanceAccessRule, CourseInstanceInfo, UserRole};
pub use question::{ExternalGradingOptions, GradingMethod, QuestionInfo, QuestionType};
