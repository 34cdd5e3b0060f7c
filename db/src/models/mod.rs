pub mod lifecycle;

pub mod department;
pub mod group;
pub mod group_member;
pub mod skill;
pub mod user;
pub mod user_skill;

pub mod assessment;
pub mod assessment_option;
pub mod assessment_question;
pub mod assessment_result;
pub mod assessment_submission;
pub mod assessment_submission_answer;
pub mod eligibility_creation;
pub mod skills_criteria;

pub mod course;
pub mod course_enrollment;
pub mod course_teacher;
pub mod lesson;
pub mod section;
pub mod watch_history;

pub mod question_set;
pub mod question_set_option;
pub mod question_set_question;
pub mod question_set_result;
pub mod question_set_submission;
pub mod question_set_submission_answer;
