pub mod m202606010001_create_users;
pub mod m202606010002_create_groups;
pub mod m202606010003_create_assessments;
pub mod m202606010004_create_assessment_submissions;
pub mod m202606010005_create_courses;
pub mod m202606010006_create_question_sets;
pub mod m202606010007_create_question_set_submissions;
pub mod m202606010008_create_eligibility;
