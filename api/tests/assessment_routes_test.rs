mod helpers;

use axum::http::{Method, StatusCode};
use db::models::user::UserRole;
use helpers::{bearer, make_test_app, seed_assessment_with_questions, seed_user, send_json};
use serde_json::{Value, json};

#[tokio::test]
async fn privileged_status_requests_land_on_published() {
    let (app, db) = make_test_app().await;
    let admin = seed_user(&db, "admin@test.com", UserRole::Admin).await;
    let trainer = seed_user(&db, "trainer@test.com", UserRole::Trainer).await;
    let (assessment, _) = seed_assessment_with_questions(&db, "safety-exam", trainer.id, 1).await;

    // Privileged "review" request is coerced to published.
    let (status, body) = send_json(
        &app,
        Method::PUT,
        &format!("/api/assessments/{}/status", assessment.slug),
        Some(&bearer(&admin)),
        Some(json!({ "status": "review" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "published");

    // A non-privileged publish attempt is refused.
    let (status, _body) = send_json(
        &app,
        Method::PUT,
        &format!("/api/assessments/{}/status", assessment.slug),
        Some(&bearer(&trainer)),
        Some(json!({ "status": "published" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn full_attempt_flow_start_submit_results() {
    let (app, db) = make_test_app().await;
    let admin = seed_user(&db, "admin@test.com", UserRole::Admin).await;
    let trainee = seed_user(&db, "trainee@test.com", UserRole::Trainee).await;
    let (assessment, pairs) = seed_assessment_with_questions(&db, "graded-exam", admin.id, 2).await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("/api/assessments/{}/start", assessment.slug),
        Some(&bearer(&trainee)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let submission_id = body["data"]["submission_id"].as_i64().unwrap();
    assert_eq!(body["data"]["questions"].as_array().unwrap().len(), 2);

    // One right, one wrong: weightage 10 gives total 10.
    let answers: Vec<Value> = pairs
        .iter()
        .enumerate()
        .map(|(i, (question_id, correct_id))| {
            let selected = if i == 0 { vec![*correct_id] } else { vec![] };
            json!({ "question_id": question_id, "selected_option_ids": selected })
        })
        .collect();
    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!(
            "/api/assessments/{}/submissions/{submission_id}",
            assessment.slug
        ),
        Some(&bearer(&trainee)),
        Some(json!({ "answers": answers })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "graded");
    assert_eq!(body["data"]["total_mark"], 10);
    assert_eq!(body["data"]["obtained_mark"], 10);

    // A second submit on the same attempt is refused.
    let answers: Vec<Value> = pairs
        .iter()
        .map(|(question_id, correct_id)| {
            json!({ "question_id": question_id, "selected_option_ids": [correct_id] })
        })
        .collect();
    let (status, _body) = send_json(
        &app,
        Method::POST,
        &format!(
            "/api/assessments/{}/submissions/{submission_id}",
            assessment.slug
        ),
        Some(&bearer(&trainee)),
        Some(json!({ "answers": answers })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Trainees cannot list results; admins can.
    let (status, _body) = send_json(
        &app,
        Method::GET,
        &format!("/api/assessments/{}/results", assessment.slug),
        Some(&bearer(&trainee)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send_json(
        &app,
        Method::GET,
        &format!("/api/assessments/{}/results", assessment.slug),
        Some(&bearer(&admin)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["user_id"].as_i64().unwrap(), trainee.id);
    assert_eq!(rows[0]["obtained_mark"], 10);

    let (status, body) = send_json(
        &app,
        Method::GET,
        &format!("/api/assessments/{}/statistics", assessment.slug),
        Some(&bearer(&admin)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["maximum_mark"], 20);
    assert_eq!(body["data"]["pass_count"], 1);
}

#[tokio::test]
async fn unknown_assessments_return_not_found() {
    let (app, db) = make_test_app().await;
    let trainee = seed_user(&db, "trainee@test.com", UserRole::Trainee).await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/assessments/no-such-exam/start",
        Some(&bearer(&trainee)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn eligibility_endpoint_reports_open_access() {
    let (app, db) = make_test_app().await;
    let admin = seed_user(&db, "admin@test.com", UserRole::Admin).await;
    let trainee = seed_user(&db, "trainee@test.com", UserRole::Trainee).await;
    let (assessment, _) = seed_assessment_with_questions(&db, "open-exam", admin.id, 1).await;

    let (status, body) = send_json(
        &app,
        Method::GET,
        &format!("/api/assessments/{}/eligibility", assessment.id),
        Some(&bearer(&trainee)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["eligible"], true);
    assert!(body["data"]["rules"].as_array().unwrap().is_empty());
}
