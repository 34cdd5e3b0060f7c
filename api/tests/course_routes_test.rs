mod helpers;

use axum::http::{Method, StatusCode};
use db::models::lifecycle::LifecycleStatus;
use db::models::user::UserRole;
use helpers::{bearer, make_test_app, seed_course, seed_user, send_json};
use serde_json::json;

#[tokio::test]
async fn enrolling_twice_is_rejected() {
    let (app, db) = make_test_app().await;
    let trainer = seed_user(&db, "trainer@test.com", UserRole::Trainer).await;
    let trainee = seed_user(&db, "trainee@test.com", UserRole::Trainee).await;
    let course = seed_course(&db, "rigging-101", LifecycleStatus::Published, trainer.id).await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("/api/courses/{}/enroll", course.slug),
        Some(&bearer(&trainee)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["member_status"], "enrolled");

    let (status, _body) = send_json(
        &app,
        Method::POST,
        &format!("/api/courses/{}/enroll", course.slug),
        Some(&bearer(&trainee)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn course_eligibility_includes_the_enrollment_status() {
    let (app, db) = make_test_app().await;
    let trainer = seed_user(&db, "trainer@test.com", UserRole::Trainer).await;
    let trainee = seed_user(&db, "trainee@test.com", UserRole::Trainee).await;
    let course = seed_course(&db, "welding-201", LifecycleStatus::Published, trainer.id).await;

    let (status, body) = send_json(
        &app,
        Method::GET,
        &format!("/api/courses/{}/eligibility", course.slug),
        Some(&bearer(&trainee)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["enrollment_status"], "not_enrolled");
    assert_eq!(body["data"]["eligible"], true);

    // The author reads as such.
    let (_status, body) = send_json(
        &app,
        Method::GET,
        &format!("/api/courses/{}/eligibility", course.slug),
        Some(&bearer(&trainer)),
        None,
    )
    .await;
    assert_eq!(body["data"]["enrollment_status"], "author");
}

#[tokio::test]
async fn completing_a_course_is_admin_only() {
    let (app, db) = make_test_app().await;
    let admin = seed_user(&db, "admin@test.com", UserRole::Admin).await;
    let trainer = seed_user(&db, "trainer@test.com", UserRole::Trainer).await;
    let course = seed_course(&db, "crane-ops", LifecycleStatus::Published, trainer.id).await;

    let (status, _body) = send_json(
        &app,
        Method::POST,
        &format!("/api/courses/{}/complete", course.slug),
        Some(&bearer(&trainer)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("/api/courses/{}/complete", course.slug),
        Some(&bearer(&admin)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "completed");
}

#[tokio::test]
async fn only_draft_courses_can_be_deleted() {
    let (app, db) = make_test_app().await;
    let trainer = seed_user(&db, "trainer@test.com", UserRole::Trainer).await;
    let draft = seed_course(&db, "scratch", LifecycleStatus::Draft, trainer.id).await;
    let live = seed_course(&db, "live", LifecycleStatus::Published, trainer.id).await;

    let (status, _body) = send_json(
        &app,
        Method::DELETE,
        &format!("/api/courses/{}", live.slug),
        Some(&bearer(&trainer)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send_json(
        &app,
        Method::DELETE,
        &format!("/api/courses/{}", draft.slug),
        Some(&bearer(&trainer)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn course_status_change_respects_the_gate() {
    let (app, db) = make_test_app().await;
    let admin = seed_user(&db, "admin@test.com", UserRole::Admin).await;
    let course = seed_course(&db, "draft-course", LifecycleStatus::Published, admin.id).await;

    let (status, _body) = send_json(
        &app,
        Method::PUT,
        &format!("/api/courses/{}/status", course.slug),
        Some(&bearer(&admin)),
        Some(json!({ "status": "rejected", "message": "out of date" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
