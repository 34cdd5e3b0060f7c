//! Course membership and mandatory-lesson completion tracking.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use serde::Serialize;
use tracing::info;

use db::models::course_enrollment::EnrollmentMemberStatus;
use db::models::lifecycle::LifecycleStatus;
use db::models::{course, course_enrollment, course_teacher, lesson, user, watch_history};

use crate::actor::Actor;
use crate::error::{ServiceError, ServiceResult};
use crate::notifier::{Notification, Notifier};

/// How a user relates to a course, for display and access decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Author,
    Teacher,
    Enrolled,
    NotEnrolled,
}

/// Resolves the caller's relationship to a course. Checks run top-down and
/// the first match wins: author, then teacher, then the enrollment row.
/// A teacher who also enrolled reads as Enrolled, not Teacher. A Completed
/// enrollment still reads as Enrolled; Unenrolled does not.
pub async fn enrollment_status(
    db: &DatabaseConnection,
    user_id: i64,
    course: &course::Model,
) -> ServiceResult<EnrollmentStatus> {
    if course.created_by == user_id {
        return Ok(EnrollmentStatus::Author);
    }
    let membership = course_enrollment::Model::find_active(db, course.id, user_id).await?;
    let actively_enrolled = matches!(
        membership.map(|m| m.member_status),
        Some(EnrollmentMemberStatus::Enrolled | EnrollmentMemberStatus::Completed)
    );
    if actively_enrolled {
        return Ok(EnrollmentStatus::Enrolled);
    }
    if course_teacher::Model::is_teacher(db, course.id, user_id).await? {
        return Ok(EnrollmentStatus::Teacher);
    }
    Ok(EnrollmentStatus::NotEnrolled)
}

/// Enrolls the acting user on a course and tells its teachers.
pub async fn enroll(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    actor: Actor,
    identity: &str,
) -> ServiceResult<course_enrollment::Model> {
    let found = course::Model::find_by_identity(db, identity)
        .await?
        .ok_or_else(|| ServiceError::NotFound("course not found".to_string()))?;

    if found.status == LifecycleStatus::Completed {
        return Err(ServiceError::Forbidden(
            "this course has ended and no longer accepts enrollments".to_string(),
        ));
    }
    let existing = course_enrollment::Model::find_active(db, found.id, actor.id).await?;
    if let Some(existing) = &existing {
        if existing.member_status != EnrollmentMemberStatus::Unenrolled {
            return Err(ServiceError::Validation(
                "you are already enrolled on this course".to_string(),
            ));
        }
    }

    // A user who unenrolled keeps their old row; re-enrolling revives it.
    let enrollment = match existing {
        Some(previous) => {
            let mut active: course_enrollment::ActiveModel = previous.into();
            active.member_status = Set(EnrollmentMemberStatus::Enrolled);
            active.updated_at = Set(Utc::now());
            active.update(db).await?
        }
        None => {
            course_enrollment::ActiveModel {
                course_id: Set(found.id),
                user_id: Set(actor.id),
                member_status: Set(EnrollmentMemberStatus::Enrolled),
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
            .await?
        }
    };

    info!(course_id = found.id, user_id = actor.id, "user enrolled");

    let teacher_ids: Vec<i64> = course_teacher::Entity::find()
        .filter(course_teacher::Column::CourseId.eq(found.id))
        .all(db)
        .await?
        .into_iter()
        .map(|t| t.user_id)
        .collect();
    if !teacher_ids.is_empty() {
        let teachers = user::Entity::find()
            .filter(user::Column::Id.is_in(teacher_ids))
            .all(db)
            .await?;
        let trainee_name = user::Entity::find_by_id(actor.id)
            .one(db)
            .await?
            .map(|u| u.full_name)
            .unwrap_or_default();
        notifier.notify(Notification::EnrollmentCreated {
            teacher_emails: teachers.into_iter().map(|t| t.email).collect(),
            course_name: found.name.clone(),
            trainee_name,
        });
    }

    Ok(enrollment)
}

/// Records a lesson as completed for a user and refreshes the enrollment's
/// progress percentage. Reaching 100% of mandatory lessons marks the
/// enrollment Completed and issues the certificate.
pub async fn complete_lesson(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    user_id: i64,
    lesson_id: i64,
    is_passed: bool,
) -> ServiceResult<course_enrollment::Model> {
    let found = lesson::Entity::find_by_id(lesson_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("lesson not found".to_string()))?;

    let enrollment = course_enrollment::Model::find_active(db, found.course_id, user_id)
        .await?
        .ok_or_else(|| {
            ServiceError::Forbidden("you are not enrolled on this course".to_string())
        })?;

    match watch_history::Model::find_for_lesson(db, user_id, lesson_id).await? {
        Some(existing) => {
            let mut active: watch_history::ActiveModel = existing.into();
            active.is_completed = Set(true);
            active.is_passed = Set(is_passed);
            active.updated_at = Set(Utc::now());
            active.update(db).await?;
        }
        None => {
            watch_history::ActiveModel {
                user_id: Set(user_id),
                lesson_id: Set(lesson_id),
                course_id: Set(found.course_id),
                is_completed: Set(true),
                is_passed: Set(is_passed),
                created_at: Set(Utc::now()),
                updated_at: Set(Utc::now()),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
    }

    refresh_progress(db, notifier, enrollment).await
}

/// Recomputes completed-mandatory / total-mandatory for one enrollment.
async fn refresh_progress(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    enrollment: course_enrollment::Model,
) -> ServiceResult<course_enrollment::Model> {
    let mandatory: Vec<i64> = lesson::Entity::find()
        .filter(lesson::Column::CourseId.eq(enrollment.course_id))
        .filter(lesson::Column::IsMandatory.eq(true))
        .all(db)
        .await?
        .into_iter()
        .map(|l| l.id)
        .collect();

    let percentage = if mandatory.is_empty() {
        100
    } else {
        let completed = watch_history::Entity::find()
            .filter(watch_history::Column::UserId.eq(enrollment.user_id))
            .filter(watch_history::Column::LessonId.is_in(mandatory.clone()))
            .filter(watch_history::Column::IsCompleted.eq(true))
            .count(db)
            .await?;
        (completed as i64 * 100 / mandatory.len() as i64) as i32
    };

    let issue_certificate = percentage >= 100 && !enrollment.has_certificate_issued;

    let mut active: course_enrollment::ActiveModel = enrollment.clone().into();
    active.percentage = Set(percentage);
    if percentage >= 100 {
        active.member_status = Set(EnrollmentMemberStatus::Completed);
    }
    if issue_certificate {
        active.has_certificate_issued = Set(true);
        active.certificate_issued_date = Set(Some(Utc::now()));
    }
    active.updated_at = Set(Utc::now());
    let updated = active.update(db).await?;

    if issue_certificate {
        info!(
            course_id = updated.course_id,
            user_id = updated.user_id,
            "course completed, certificate issued"
        );
        let holder = user::Entity::find_by_id(updated.user_id).one(db).await?;
        let finished = course::Entity::find_by_id(updated.course_id).one(db).await?;
        if let (Some(holder), Some(finished)) = (holder, finished) {
            notifier.notify(Notification::CertificateIssued {
                recipient: holder.email,
                course_name: finished.name,
            });
        }
    }

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::{NullNotifier, RecordingNotifier};
    use crate::testing::{
        seed_course, seed_course_teacher, seed_enrollment, seed_lesson, seed_section, seed_user,
    };
    use db::models::lesson::LessonType;
    use db::models::user::UserRole;
    use db::test_utils::setup_test_db;

    #[tokio::test]
    async fn status_precedence_is_author_then_teacher_then_enrollment() {
        let db = setup_test_db().await;
        let author = seed_user(&db, "author@test.com", UserRole::Trainer).await;
        let teacher = seed_user(&db, "teacher@test.com", UserRole::Trainer).await;
        let trainee = seed_user(&db, "trainee@test.com", UserRole::Trainee).await;
        let stranger = seed_user(&db, "stranger@test.com", UserRole::Trainee).await;
        let course = seed_course(&db, "Pipe Fitting", LifecycleStatus::Published, author.id).await;
        seed_course_teacher(&db, course.id, teacher.id).await;
        seed_enrollment(&db, course.id, trainee.id, EnrollmentMemberStatus::Enrolled).await;

        assert_eq!(
            enrollment_status(&db, author.id, &course).await.unwrap(),
            EnrollmentStatus::Author
        );
        assert_eq!(
            enrollment_status(&db, teacher.id, &course).await.unwrap(),
            EnrollmentStatus::Teacher
        );
        assert_eq!(
            enrollment_status(&db, trainee.id, &course).await.unwrap(),
            EnrollmentStatus::Enrolled
        );
        assert_eq!(
            enrollment_status(&db, stranger.id, &course).await.unwrap(),
            EnrollmentStatus::NotEnrolled
        );
    }

    #[tokio::test]
    async fn completed_membership_still_reads_enrolled_but_unenrolled_does_not() {
        let db = setup_test_db().await;
        let author = seed_user(&db, "author@test.com", UserRole::Trainer).await;
        let done = seed_user(&db, "done@test.com", UserRole::Trainee).await;
        let gone = seed_user(&db, "gone@test.com", UserRole::Trainee).await;
        let course = seed_course(&db, "Crane Ops", LifecycleStatus::Published, author.id).await;
        seed_enrollment(&db, course.id, done.id, EnrollmentMemberStatus::Completed).await;
        seed_enrollment(&db, course.id, gone.id, EnrollmentMemberStatus::Unenrolled).await;

        assert_eq!(
            enrollment_status(&db, done.id, &course).await.unwrap(),
            EnrollmentStatus::Enrolled
        );
        assert_eq!(
            enrollment_status(&db, gone.id, &course).await.unwrap(),
            EnrollmentStatus::NotEnrolled
        );
    }

    #[tokio::test]
    async fn teachers_who_also_enroll_read_as_enrolled() {
        let db = setup_test_db().await;
        let author = seed_user(&db, "author@test.com", UserRole::Trainer).await;
        let teacher = seed_user(&db, "teacher@test.com", UserRole::Trainer).await;
        let course = seed_course(&db, "Welding", LifecycleStatus::Published, author.id).await;
        seed_course_teacher(&db, course.id, teacher.id).await;
        seed_enrollment(&db, course.id, teacher.id, EnrollmentMemberStatus::Enrolled).await;

        assert_eq!(
            enrollment_status(&db, teacher.id, &course).await.unwrap(),
            EnrollmentStatus::Enrolled
        );
    }

    #[tokio::test]
    async fn enroll_rejects_completed_courses_and_duplicates() {
        let db = setup_test_db().await;
        let author = seed_user(&db, "author@test.com", UserRole::Trainer).await;
        let trainee = seed_user(&db, "trainee@test.com", UserRole::Trainee).await;
        let open = seed_course(&db, "Open Course", LifecycleStatus::Published, author.id).await;
        let ended = seed_course(&db, "Ended Course", LifecycleStatus::Completed, author.id).await;
        let actor = Actor::new(trainee.id, trainee.role);

        let err = enroll(&db, &NullNotifier, actor, &ended.slug).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        enroll(&db, &NullNotifier, actor, &open.slug).await.unwrap();
        let err = enroll(&db, &NullNotifier, actor, &open.slug).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn unenrolled_users_can_enroll_again() {
        let db = setup_test_db().await;
        let author = seed_user(&db, "author@test.com", UserRole::Trainer).await;
        let trainee = seed_user(&db, "trainee@test.com", UserRole::Trainee).await;
        let course = seed_course(&db, "Forklift", LifecycleStatus::Published, author.id).await;
        let previous =
            seed_enrollment(&db, course.id, trainee.id, EnrollmentMemberStatus::Unenrolled).await;

        let revived = enroll(
            &db,
            &NullNotifier,
            Actor::new(trainee.id, trainee.role),
            &course.slug,
        )
        .await
        .unwrap();
        assert_eq!(revived.id, previous.id);
        assert_eq!(revived.member_status, EnrollmentMemberStatus::Enrolled);

        let rows = course_enrollment::Entity::find()
            .filter(course_enrollment::Column::CourseId.eq(course.id))
            .filter(course_enrollment::Column::UserId.eq(trainee.id))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn enroll_notifies_course_teachers() {
        let db = setup_test_db().await;
        let author = seed_user(&db, "author@test.com", UserRole::Trainer).await;
        let teacher = seed_user(&db, "teacher@test.com", UserRole::Trainer).await;
        let trainee = seed_user(&db, "trainee@test.com", UserRole::Trainee).await;
        let course = seed_course(&db, "Rigging", LifecycleStatus::Published, author.id).await;
        seed_course_teacher(&db, course.id, teacher.id).await;

        let notifier = RecordingNotifier::new();
        enroll(
            &db,
            &notifier,
            Actor::new(trainee.id, trainee.role),
            &course.slug,
        )
        .await
        .unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert!(matches!(
            &sent[0],
            Notification::EnrollmentCreated { teacher_emails, .. }
                if teacher_emails == &vec!["teacher@test.com".to_string()]
        ));
    }

    #[tokio::test]
    async fn completing_all_mandatory_lessons_completes_the_enrollment() {
        let db = setup_test_db().await;
        let author = seed_user(&db, "author@test.com", UserRole::Trainer).await;
        let trainee = seed_user(&db, "trainee@test.com", UserRole::Trainee).await;
        let course = seed_course(&db, "Scaffolding", LifecycleStatus::Published, author.id).await;
        let section = seed_section(&db, course.id, "Basics", LifecycleStatus::Published).await;
        let first = seed_lesson(
            &db, course.id, section.id, "Intro", LessonType::Video, true, None,
        )
        .await;
        let second = seed_lesson(
            &db, course.id, section.id, "Knots", LessonType::Video, true, None,
        )
        .await;
        // Optional lessons never count toward the percentage.
        seed_lesson(
            &db, course.id, section.id, "Extra", LessonType::Document, false, None,
        )
        .await;
        seed_enrollment(&db, course.id, trainee.id, EnrollmentMemberStatus::Enrolled).await;

        let notifier = RecordingNotifier::new();
        let after_first = complete_lesson(&db, &notifier, trainee.id, first.id, false)
            .await
            .unwrap();
        assert_eq!(after_first.percentage, 50);
        assert_eq!(after_first.member_status, EnrollmentMemberStatus::Enrolled);
        assert!(!after_first.has_certificate_issued);

        let after_second = complete_lesson(&db, &notifier, trainee.id, second.id, false)
            .await
            .unwrap();
        assert_eq!(after_second.percentage, 100);
        assert_eq!(after_second.member_status, EnrollmentMemberStatus::Completed);
        assert!(after_second.has_certificate_issued);
        assert!(after_second.certificate_issued_date.is_some());

        // Re-completing a lesson is idempotent; the certificate only goes out once.
        let again = complete_lesson(&db, &notifier, trainee.id, first.id, false)
            .await
            .unwrap();
        assert_eq!(again.percentage, 100);

        let certificates: Vec<_> = notifier
            .sent()
            .into_iter()
            .filter(|n| matches!(n, Notification::CertificateIssued { .. }))
            .collect();
        assert_eq!(certificates.len(), 1);
        assert!(matches!(
            &certificates[0],
            Notification::CertificateIssued { recipient, .. }
                if recipient == "trainee@test.com"
        ));
    }
}
