//! Seed builders shared by the service test modules.

use chrono::{DateTime, Duration, Utc};
use db::models::{
    assessment, assessment_option, assessment_question, course, course_enrollment, course_teacher,
    group, group_member, lesson, question_set, question_set_option, question_set_question,
    section, skill, user,
};
use db::models::course_enrollment::EnrollmentMemberStatus;
use db::models::lesson::LessonType;
use db::models::lifecycle::LifecycleStatus;
use db::models::user::UserRole;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

pub async fn seed_user(db: &DatabaseConnection, email: &str, role: UserRole) -> user::Model {
    user::Model::create(db, email, email.split('@').next().unwrap_or(email), "pw-123", role, None)
        .await
        .unwrap()
}

pub async fn seed_skill(db: &DatabaseConnection, name: &str) -> skill::Model {
    skill::ActiveModel {
        name: Set(name.to_owned()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_group(db: &DatabaseConnection, name: &str, created_by: i64) -> group::Model {
    group::ActiveModel {
        name: Set(name.to_owned()),
        created_by: Set(created_by),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_group_member(
    db: &DatabaseConnection,
    group_id: i64,
    user_id: i64,
    is_active: bool,
) -> group_member::Model {
    group_member::ActiveModel {
        group_id: Set(group_id),
        user_id: Set(user_id),
        is_active: Set(is_active),
        joined_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .unwrap()
}

pub struct AssessmentSeed {
    pub title: String,
    pub status: LifecycleStatus,
    pub created_by: i64,
    pub weightage: i64,
    pub negative_marking: i64,
    pub retakes: i32,
    pub duration: i32,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl AssessmentSeed {
    pub fn published(title: &str, created_by: i64) -> Self {
        Self {
            title: title.to_owned(),
            status: LifecycleStatus::Published,
            created_by,
            weightage: 1,
            negative_marking: 0,
            retakes: 1,
            duration: 3600,
            start_date: None,
            end_date: Some(Utc::now() + Duration::hours(2)),
        }
    }
}

pub async fn seed_assessment(db: &DatabaseConnection, seed: AssessmentSeed) -> assessment::Model {
    assessment::ActiveModel {
        slug: Set(slugify(&seed.title)),
        title: Set(seed.title),
        description: Set(None),
        retakes: Set(seed.retakes),
        duration: Set(seed.duration),
        start_date: Set(seed.start_date),
        end_date: Set(seed.end_date),
        weightage: Set(seed.weightage),
        negative_marking: Set(seed.negative_marking),
        status: Set(seed.status),
        message: Set(None),
        created_by: Set(seed.created_by),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_assessment_question(
    db: &DatabaseConnection,
    assessment_id: i64,
    name: &str,
    sort_order: i32,
) -> assessment_question::Model {
    assessment_question::ActiveModel {
        assessment_id: Set(assessment_id),
        name: Set(name.to_owned()),
        description: Set(None),
        sort_order: Set(sort_order),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_assessment_option(
    db: &DatabaseConnection,
    question_id: i64,
    text: &str,
    is_correct: bool,
) -> assessment_option::Model {
    assessment_option::ActiveModel {
        assessment_question_id: Set(question_id),
        option_text: Set(text.to_owned()),
        is_correct: Set(is_correct),
        sort_order: Set(0),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_course(
    db: &DatabaseConnection,
    name: &str,
    status: LifecycleStatus,
    created_by: i64,
) -> course::Model {
    course::ActiveModel {
        slug: Set(slugify(name)),
        name: Set(name.to_owned()),
        description: Set(String::new()),
        status: Set(status),
        is_update: Set(false),
        group_id: Set(None),
        message: Set(None),
        created_by: Set(created_by),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_section(
    db: &DatabaseConnection,
    course_id: i64,
    name: &str,
    status: LifecycleStatus,
) -> section::Model {
    section::ActiveModel {
        course_id: Set(course_id),
        name: Set(name.to_owned()),
        status: Set(status),
        sort_order: Set(0),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_lesson(
    db: &DatabaseConnection,
    course_id: i64,
    section_id: i64,
    name: &str,
    lesson_type: LessonType,
    is_mandatory: bool,
    question_set_id: Option<i64>,
) -> lesson::Model {
    lesson::ActiveModel {
        course_id: Set(course_id),
        section_id: Set(section_id),
        name: Set(name.to_owned()),
        lesson_type: Set(lesson_type),
        status: Set(LifecycleStatus::Draft),
        is_mandatory: Set(is_mandatory),
        sort_order: Set(0),
        question_set_id: Set(question_set_id),
        duration: Set(None),
        meeting_start_date: Set(None),
        meeting_id: Set(None),
        meeting_passcode: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_enrollment(
    db: &DatabaseConnection,
    course_id: i64,
    user_id: i64,
    member_status: EnrollmentMemberStatus,
) -> course_enrollment::Model {
    course_enrollment::ActiveModel {
        course_id: Set(course_id),
        user_id: Set(user_id),
        member_status: Set(member_status),
        percentage: Set(0),
        has_certificate_issued: Set(false),
        certificate_issued_date: Set(None),
        certificate_url: Set(None),
        deleted_at: Set(None),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_course_teacher(
    db: &DatabaseConnection,
    course_id: i64,
    user_id: i64,
) -> course_teacher::Model {
    course_teacher::ActiveModel {
        course_id: Set(course_id),
        user_id: Set(user_id),
    }
    .insert(db)
    .await
    .unwrap()
}

pub struct QuestionSetSeed {
    pub name: String,
    pub question_marking: i64,
    pub negative_marking: i64,
    pub allowed_retake: i32,
    pub duration_minutes: i32,
    pub end_time: Option<DateTime<Utc>>,
}

impl QuestionSetSeed {
    pub fn open(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            question_marking: 1,
            negative_marking: 0,
            allowed_retake: 1,
            duration_minutes: 60,
            end_time: Some(Utc::now() + Duration::hours(2)),
        }
    }
}

pub async fn seed_question_set(db: &DatabaseConnection, seed: QuestionSetSeed) -> question_set::Model {
    question_set::ActiveModel {
        slug: Set(slugify(&seed.name)),
        name: Set(seed.name),
        question_marking: Set(seed.question_marking),
        negative_marking: Set(seed.negative_marking),
        allowed_retake: Set(seed.allowed_retake),
        duration: Set(seed.duration_minutes),
        start_time: Set(None),
        end_time: Set(seed.end_time),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_set_question(
    db: &DatabaseConnection,
    question_set_id: i64,
    name: &str,
    sort_order: i32,
) -> question_set_question::Model {
    question_set_question::ActiveModel {
        question_set_id: Set(question_set_id),
        name: Set(name.to_owned()),
        description: Set(None),
        sort_order: Set(sort_order),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_set_option(
    db: &DatabaseConnection,
    question_id: i64,
    text: &str,
    is_correct: bool,
) -> question_set_option::Model {
    question_set_option::ActiveModel {
        question_set_question_id: Set(question_id),
        option_text: Set(text.to_owned()),
        is_correct: Set(is_correct),
        sort_order: Set(0),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}
