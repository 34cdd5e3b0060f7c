//! Lifecycle transitions for assessments and courses.
//!
//! Both content kinds share the same state set and gate; courses
//! additionally cascade the resulting status to their sections and lessons
//! and provision meetings for upcoming live classes on publish.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use tracing::{info, warn};

use db::models::course_enrollment::EnrollmentMemberStatus;
use db::models::lesson::LessonType;
use db::models::lifecycle::LifecycleStatus;
use db::models::user::UserRole;
use db::models::{
    assessment, course, course_enrollment, group_member, lesson, section, user,
};

use crate::actor::Actor;
use crate::error::{ServiceError, ServiceResult};
use crate::meeting::MeetingProvisioner;
use crate::notifier::{Notification, Notifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentKind {
    Assessment,
    Course,
}

/// Applies the privilege rules to the requested status.
///
/// Publishing and rejecting require a privileged actor. A privileged actor
/// asking for anything other than Rejected or Draft lands on Published.
fn resolve_target(actor: Actor, requested: LifecycleStatus) -> ServiceResult<LifecycleStatus> {
    if matches!(
        requested,
        LifecycleStatus::Published | LifecycleStatus::Rejected
    ) && !actor.is_privileged()
    {
        return Err(ServiceError::Forbidden(
            "only administrators may publish or reject content".to_string(),
        ));
    }
    if actor.is_privileged()
        && !matches!(requested, LifecycleStatus::Rejected | LifecycleStatus::Draft)
    {
        return Ok(LifecycleStatus::Published);
    }
    Ok(requested)
}

fn ensure_transition_allowed(
    kind: ContentKind,
    current: LifecycleStatus,
    target: LifecycleStatus,
) -> ServiceResult<()> {
    if current == LifecycleStatus::Published
        && matches!(target, LifecycleStatus::Review | LifecycleStatus::Rejected)
    {
        return Err(ServiceError::Forbidden(
            "published content cannot be sent back to review or rejected".to_string(),
        ));
    }
    if kind == ContentKind::Assessment
        && current == LifecycleStatus::Rejected
        && target == LifecycleStatus::Published
    {
        return Err(ServiceError::Forbidden(
            "a rejected assessment must pass review again before publishing".to_string(),
        ));
    }
    if target == LifecycleStatus::Completed && current != LifecycleStatus::Published {
        return Err(ServiceError::Forbidden(
            "content is completed through the completion flow, not a status change".to_string(),
        ));
    }
    Ok(())
}

async fn user_email(db: &DatabaseConnection, user_id: i64) -> ServiceResult<Option<String>> {
    Ok(user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .map(|u| u.email))
}

async fn admin_emails(db: &DatabaseConnection) -> ServiceResult<Vec<String>> {
    let admins = user::Entity::find()
        .filter(user::Column::Role.is_in([UserRole::SuperAdmin, UserRole::Admin]))
        .all(db)
        .await?;
    Ok(admins.into_iter().map(|u| u.email).collect())
}

async fn emails_for_user_ids(
    db: &DatabaseConnection,
    user_ids: Vec<i64>,
) -> ServiceResult<Vec<String>> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }
    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(db)
        .await?;
    Ok(users.into_iter().map(|u| u.email).collect())
}

/// Moves a standalone assessment to a new lifecycle status.
pub async fn change_assessment_status(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    actor: Actor,
    identity: &str,
    requested: LifecycleStatus,
    message: Option<String>,
) -> ServiceResult<assessment::Model> {
    let found = assessment::Model::find_by_identity(db, identity)
        .await?
        .ok_or_else(|| ServiceError::NotFound("assessment not found".to_string()))?;

    let target = resolve_target(actor, requested)?;
    ensure_transition_allowed(ContentKind::Assessment, found.status, target)?;

    let mut active: assessment::ActiveModel = found.clone().into();
    active.status = Set(target);
    if target == LifecycleStatus::Rejected {
        active.message = Set(message);
    } else if target == LifecycleStatus::Published {
        active.message = Set(None);
    }
    active.updated_at = Set(Utc::now());
    let updated = active.update(db).await?;

    info!(
        assessment_id = updated.id,
        from = %found.status,
        to = %target,
        "assessment status changed"
    );

    match target {
        LifecycleStatus::Rejected => {
            if let Some(recipient) = user_email(db, updated.created_by).await? {
                notifier.notify(Notification::ContentRejected {
                    recipient,
                    content_name: updated.title.clone(),
                    message: updated.message.clone().unwrap_or_default(),
                });
            }
        }
        LifecycleStatus::Published => {
            if let Some(recipient) = user_email(db, updated.created_by).await? {
                notifier.notify(Notification::AssessmentAccepted {
                    recipient,
                    assessment_title: updated.title.clone(),
                });
            }
        }
        LifecycleStatus::Review if !actor.is_privileged() => {
            let requested_by = user_email(db, actor.id).await?.unwrap_or_default();
            notifier.notify(Notification::ReviewRequested {
                admin_emails: admin_emails(db).await?,
                content_name: updated.title.clone(),
                requested_by,
            });
        }
        _ => {}
    }

    Ok(updated)
}

/// Moves a course to a new lifecycle status, cascading the result to its
/// sections and lessons.
pub async fn change_course_status(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    meetings: &dyn MeetingProvisioner,
    actor: Actor,
    identity: &str,
    requested: LifecycleStatus,
    message: Option<String>,
) -> ServiceResult<course::Model> {
    let found = course::Model::find_by_identity(db, identity)
        .await?
        .ok_or_else(|| ServiceError::NotFound("course not found".to_string()))?;

    let target = resolve_target(actor, requested)?;
    ensure_transition_allowed(ContentKind::Course, found.status, target)?;

    let was_update = found.is_update;

    let mut active: course::ActiveModel = found.clone().into();
    active.status = Set(target);
    if target == LifecycleStatus::Rejected {
        active.message = Set(message);
    } else if target == LifecycleStatus::Published {
        active.message = Set(None);
        active.is_update = Set(false);
    }
    active.updated_at = Set(Utc::now());
    let updated = active.update(db).await?;

    cascade_course_status(db, updated.id, target, was_update).await?;

    info!(
        course_id = updated.id,
        from = %found.status,
        to = %target,
        "course status changed"
    );

    match target {
        LifecycleStatus::Rejected => {
            if let Some(recipient) = user_email(db, updated.created_by).await? {
                notifier.notify(Notification::ContentRejected {
                    recipient,
                    content_name: updated.name.clone(),
                    message: updated.message.clone().unwrap_or_default(),
                });
            }
        }
        LifecycleStatus::Review if !actor.is_privileged() => {
            let requested_by = user_email(db, actor.id).await?.unwrap_or_default();
            notifier.notify(Notification::ReviewRequested {
                admin_emails: admin_emails(db).await?,
                content_name: updated.name.clone(),
                requested_by,
            });
        }
        LifecycleStatus::Published => {
            notify_course_published(db, notifier, &updated).await?;
            provision_live_classes(db, meetings, &updated).await?;
        }
        _ => {}
    }

    Ok(updated)
}

/// Forces a course and all of its content to Completed.
pub async fn mark_course_complete(
    db: &DatabaseConnection,
    actor: Actor,
    identity: &str,
) -> ServiceResult<course::Model> {
    if !actor.is_privileged() {
        return Err(ServiceError::Forbidden(
            "only administrators may complete a course".to_string(),
        ));
    }
    let found = course::Model::find_by_identity(db, identity)
        .await?
        .ok_or_else(|| ServiceError::NotFound("course not found".to_string()))?;

    let mut active: course::ActiveModel = found.clone().into();
    active.status = Set(LifecycleStatus::Completed);
    active.updated_at = Set(Utc::now());
    let updated = active.update(db).await?;

    cascade_course_status(db, updated.id, LifecycleStatus::Completed, false).await?;

    info!(course_id = updated.id, "course marked complete");
    Ok(updated)
}

/// Pushes the course status down to its sections and lessons. While a
/// published course is being revised (`is_update`), children that are
/// already Published are left alone.
async fn cascade_course_status(
    db: &DatabaseConnection,
    course_id: i64,
    target: LifecycleStatus,
    only_unpublished: bool,
) -> ServiceResult<()> {
    let mut section_update = section::Entity::update_many()
        .col_expr(section::Column::Status, Expr::value(target))
        .filter(section::Column::CourseId.eq(course_id));
    let mut lesson_update = lesson::Entity::update_many()
        .col_expr(lesson::Column::Status, Expr::value(target))
        .filter(lesson::Column::CourseId.eq(course_id));
    if only_unpublished {
        section_update =
            section_update.filter(section::Column::Status.ne(LifecycleStatus::Published));
        lesson_update = lesson_update.filter(lesson::Column::Status.ne(LifecycleStatus::Published));
    }
    section_update.exec(db).await?;
    lesson_update.exec(db).await?;
    Ok(())
}

/// First publish announces the course to its group; a publish with existing
/// enrollments is treated as a content update instead.
async fn notify_course_published(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    published: &course::Model,
) -> ServiceResult<()> {
    let enrollments = course_enrollment::Entity::find()
        .filter(course_enrollment::Column::CourseId.eq(published.id))
        .filter(course_enrollment::Column::DeletedAt.is_null())
        .all(db)
        .await?;

    if enrollments.is_empty() {
        let Some(group_id) = published.group_id else {
            return Ok(());
        };
        let member_ids = group_member::Entity::find()
            .filter(group_member::Column::GroupId.eq(group_id))
            .filter(group_member::Column::IsActive.eq(true))
            .all(db)
            .await?
            .into_iter()
            .map(|m| m.user_id)
            .collect();
        let recipients = emails_for_user_ids(db, member_ids).await?;
        if !recipients.is_empty() {
            notifier.notify(Notification::ContentPublished {
                recipients,
                content_name: published.name.clone(),
            });
        }
    } else {
        let enrolled_ids = enrollments
            .into_iter()
            .filter(|e| e.member_status == EnrollmentMemberStatus::Enrolled)
            .map(|e| e.user_id)
            .collect();
        let recipients = emails_for_user_ids(db, enrolled_ids).await?;
        if !recipients.is_empty() {
            notifier.notify(Notification::ContentUpdated {
                recipients,
                content_name: published.name.clone(),
            });
        }
    }
    Ok(())
}

/// On publish, every live-class lesson whose meeting starts today or later
/// gets a meeting provisioned. Failures are logged and skipped so one bad
/// lesson cannot block the publish.
async fn provision_live_classes(
    db: &DatabaseConnection,
    meetings: &dyn MeetingProvisioner,
    published: &course::Model,
) -> ServiceResult<()> {
    let host_email = user_email(db, published.created_by).await?.unwrap_or_default();
    let today = Utc::now()
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc());

    let live_classes = lesson::Entity::find()
        .filter(lesson::Column::CourseId.eq(published.id))
        .filter(lesson::Column::LessonType.eq(LessonType::LiveClass))
        .all(db)
        .await?;

    for class in live_classes {
        let Some(start) = class.meeting_start_date else {
            continue;
        };
        if let Some(floor) = today {
            if start < floor {
                continue;
            }
        }
        let external_id = format!("lesson-{}", class.id);
        match meetings
            .create_meeting(
                &class.name,
                class.duration.unwrap_or(60),
                start,
                &host_email,
                &external_id,
            )
            .await
        {
            Ok(info) => {
                let mut active: lesson::ActiveModel = class.into();
                active.meeting_id = Set(Some(info.meeting_id));
                active.meeting_passcode = Set(Some(info.passcode));
                active.update(db).await?;
            }
            Err(err) => {
                warn!(lesson_id = class.id, error = %err, "meeting provisioning failed");
            }
        }
    }
    Ok(())
}

/// True when any submissions exist; used to block assessment deletion.
pub async fn assessment_has_submissions(
    db: &DatabaseConnection,
    assessment_id: i64,
) -> ServiceResult<bool> {
    use db::models::assessment_submission;
    let count = assessment_submission::Entity::find()
        .filter(assessment_submission::Column::AssessmentId.eq(assessment_id))
        .count(db)
        .await?;
    Ok(count > 0)
}

fn ensure_may_remove(actor: Actor, created_by: i64, what: &str) -> ServiceResult<()> {
    if !actor.is_privileged() && created_by != actor.id {
        return Err(ServiceError::Forbidden(format!(
            "only the author or an administrator may delete this {what}"
        )));
    }
    Ok(())
}

/// Deletes an assessment outright. Blocked while submissions exist so that
/// grading history is never lost; questions and options go with it.
pub async fn delete_assessment(
    db: &DatabaseConnection,
    actor: Actor,
    identity: &str,
) -> ServiceResult<()> {
    let found = assessment::Model::find_by_identity(db, identity)
        .await?
        .ok_or_else(|| ServiceError::NotFound("assessment not found".to_string()))?;
    ensure_may_remove(actor, found.created_by, "assessment")?;
    if assessment_has_submissions(db, found.id).await? {
        return Err(ServiceError::Validation(
            "an assessment with submissions cannot be deleted".to_string(),
        ));
    }
    assessment::Entity::delete_by_id(found.id).exec(db).await?;
    info!(assessment_id = found.id, "assessment deleted");
    Ok(())
}

/// Deletes a course. Only drafts with no enrollment history may go; anything
/// further along is retired through the completion flow instead.
pub async fn delete_course(
    db: &DatabaseConnection,
    actor: Actor,
    identity: &str,
) -> ServiceResult<()> {
    let found = course::Model::find_by_identity(db, identity)
        .await?
        .ok_or_else(|| ServiceError::NotFound("course not found".to_string()))?;
    ensure_may_remove(actor, found.created_by, "course")?;
    if found.status != LifecycleStatus::Draft {
        return Err(ServiceError::Validation(
            "only draft courses can be deleted".to_string(),
        ));
    }
    let enrollments = course_enrollment::Entity::find()
        .filter(course_enrollment::Column::CourseId.eq(found.id))
        .count(db)
        .await?;
    if enrollments > 0 {
        return Err(ServiceError::Validation(
            "a course with enrollments cannot be deleted".to_string(),
        ));
    }
    course::Entity::delete_by_id(found.id).exec(db).await?;
    info!(course_id = found.id, "course deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meeting::NullMeetingProvisioner;
    use crate::notifier::{NullNotifier, RecordingNotifier};
    use crate::testing::{seed_assessment, seed_course, seed_section, seed_user, AssessmentSeed};
    use db::test_utils::setup_test_db;

    fn actor(user: &user::Model) -> Actor {
        Actor::new(user.id, user.role)
    }

    #[tokio::test]
    async fn published_content_cannot_be_sent_back_to_review() {
        let db = setup_test_db().await;
        let admin = seed_user(&db, "admin@test.com", UserRole::SuperAdmin).await;
        let trainer = seed_user(&db, "trainer@test.com", UserRole::Trainer).await;
        let assessment =
            seed_assessment(&db, AssessmentSeed::published("Safety Basics", trainer.id)).await;

        let err = change_assessment_status(
            &db,
            &NullNotifier,
            actor(&trainer),
            &assessment.id.to_string(),
            LifecycleStatus::Review,
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let err = change_assessment_status(
            &db,
            &NullNotifier,
            actor(&admin),
            &assessment.id.to_string(),
            LifecycleStatus::Rejected,
            Some("late".to_string()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn non_privileged_cannot_publish_or_reject() {
        let db = setup_test_db().await;
        let trainer = seed_user(&db, "trainer@test.com", UserRole::Trainer).await;
        let mut seed = AssessmentSeed::published("Fire Drill", trainer.id);
        seed.status = LifecycleStatus::Draft;
        let assessment = seed_assessment(&db, seed).await;

        for requested in [LifecycleStatus::Published, LifecycleStatus::Rejected] {
            let err = change_assessment_status(
                &db,
                &NullNotifier,
                actor(&trainer),
                &assessment.slug,
                requested,
                None,
            )
            .await
            .unwrap_err();
            assert!(matches!(err, ServiceError::Forbidden(_)));
        }
    }

    #[tokio::test]
    async fn privileged_review_request_is_coerced_to_published() {
        let db = setup_test_db().await;
        let admin = seed_user(&db, "admin@test.com", UserRole::SuperAdmin).await;
        let course = seed_course(&db, "Rust Onboarding", LifecycleStatus::Draft, admin.id).await;
        seed_section(&db, course.id, "Intro", LifecycleStatus::Draft).await;

        let updated = change_course_status(
            &db,
            &NullNotifier,
            &NullMeetingProvisioner,
            actor(&admin),
            &course.slug,
            LifecycleStatus::Review,
            None,
        )
        .await
        .unwrap();
        assert_eq!(updated.status, LifecycleStatus::Published);

        // The cascade carries the children along.
        let sections = section::Entity::find()
            .filter(section::Column::CourseId.eq(course.id))
            .all(&db)
            .await
            .unwrap();
        assert!(sections
            .iter()
            .all(|s| s.status == LifecycleStatus::Published));
    }

    #[tokio::test]
    async fn rejected_assessment_cannot_be_published_directly() {
        let db = setup_test_db().await;
        let admin = seed_user(&db, "admin@test.com", UserRole::Admin).await;
        let mut seed = AssessmentSeed::published("Forklift Licence", admin.id);
        seed.status = LifecycleStatus::Rejected;
        let assessment = seed_assessment(&db, seed).await;

        let err = change_assessment_status(
            &db,
            &NullNotifier,
            actor(&admin),
            &assessment.slug,
            LifecycleStatus::Published,
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn rejected_course_may_be_republished() {
        let db = setup_test_db().await;
        let admin = seed_user(&db, "admin@test.com", UserRole::Admin).await;
        let course = seed_course(&db, "Welding 101", LifecycleStatus::Rejected, admin.id).await;

        let updated = change_course_status(
            &db,
            &NullNotifier,
            &NullMeetingProvisioner,
            actor(&admin),
            &course.slug,
            LifecycleStatus::Published,
            None,
        )
        .await
        .unwrap();
        assert_eq!(updated.status, LifecycleStatus::Published);
        assert!(!updated.is_update);
    }

    #[tokio::test]
    async fn rejection_notifies_the_author_with_the_message() {
        let db = setup_test_db().await;
        let admin = seed_user(&db, "admin@test.com", UserRole::Admin).await;
        let trainer = seed_user(&db, "trainer@test.com", UserRole::Trainer).await;
        let mut seed = AssessmentSeed::published("CPR Refresher", trainer.id);
        seed.status = LifecycleStatus::Review;
        let assessment = seed_assessment(&db, seed).await;

        let notifier = RecordingNotifier::new();
        change_assessment_status(
            &db,
            &notifier,
            actor(&admin),
            &assessment.slug,
            LifecycleStatus::Rejected,
            Some("missing answer key".to_string()),
        )
        .await
        .unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0],
            Notification::ContentRejected {
                recipient: "trainer@test.com".to_string(),
                content_name: "CPR Refresher".to_string(),
                message: "missing answer key".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn completion_is_only_reachable_through_the_complete_flow() {
        let db = setup_test_db().await;
        let trainer = seed_user(&db, "trainer@test.com", UserRole::Trainer).await;
        let admin = seed_user(&db, "admin@test.com", UserRole::Admin).await;
        let course = seed_course(&db, "Ladder Safety", LifecycleStatus::Draft, trainer.id).await;

        let err = change_course_status(
            &db,
            &NullNotifier,
            &NullMeetingProvisioner,
            actor(&trainer),
            &course.slug,
            LifecycleStatus::Completed,
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let completed = mark_course_complete(&db, actor(&admin), &course.slug)
            .await
            .unwrap();
        assert_eq!(completed.status, LifecycleStatus::Completed);
    }

    #[tokio::test]
    async fn assessments_with_submissions_cannot_be_deleted() {
        let db = setup_test_db().await;
        let trainer = seed_user(&db, "trainer@test.com", UserRole::Trainer).await;
        let trainee = seed_user(&db, "trainee@test.com", UserRole::Trainee).await;
        let assessment =
            seed_assessment(&db, AssessmentSeed::published("First Aid", trainer.id)).await;

        use db::models::assessment_submission;
        assessment_submission::ActiveModel {
            assessment_id: Set(assessment.id),
            user_id: Set(trainee.id),
            start_time: Set(Utc::now()),
            end_time: Set(None),
            is_submission_error: Set(false),
            error_message: Set(None),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let err = delete_assessment(&db, actor(&trainer), &assessment.slug)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn only_untouched_draft_courses_can_be_deleted() {
        let db = setup_test_db().await;
        let trainer = seed_user(&db, "trainer@test.com", UserRole::Trainer).await;
        let other = seed_user(&db, "other@test.com", UserRole::Trainer).await;
        let draft = seed_course(&db, "Scratch Course", LifecycleStatus::Draft, trainer.id).await;
        let live = seed_course(&db, "Live Course", LifecycleStatus::Published, trainer.id).await;

        let err = delete_course(&db, actor(&other), &draft.slug)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let err = delete_course(&db, actor(&trainer), &live.slug)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        delete_course(&db, actor(&trainer), &draft.slug)
            .await
            .unwrap();
        assert!(
            course::Model::find_by_identity(&db, &draft.slug)
                .await
                .unwrap()
                .is_none()
        );
    }
}
