#![allow(dead_code)]

use std::sync::Arc;

use api::routes::routes;
use api::state::AppState;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use db::models::lifecycle::LifecycleStatus;
use db::models::user::{self, UserRole};
use db::models::{assessment, assessment_option, assessment_question, course};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::Value;
use services::meeting::NullMeetingProvisioner;
use services::notifier::NullNotifier;
use tower::ServiceExt;

pub async fn make_test_app() -> (Router, DatabaseConnection) {
    let db = db::test_utils::setup_test_db().await;
    let state = AppState::new(
        db.clone(),
        Arc::new(NullNotifier),
        Arc::new(NullMeetingProvisioner),
    );
    let app = Router::new()
        .nest("/api", routes(state.clone()))
        .with_state(state);
    (app, db)
}

pub async fn seed_user(db: &DatabaseConnection, email: &str, role: UserRole) -> user::Model {
    user::Model::create(db, email, "Test User", "password-123", role, None)
        .await
        .unwrap()
}

pub fn bearer(account: &user::Model) -> String {
    let (token, _) = api::auth::generate_jwt(account.id, account.role);
    format!("Bearer {token}")
}

/// Published assessment with `questions` single-answer questions; returns
/// the assessment and the (question_id, correct_option_id) pairs.
pub async fn seed_assessment_with_questions(
    db: &DatabaseConnection,
    slug: &str,
    created_by: i64,
    questions: usize,
) -> (assessment::Model, Vec<(i64, i64)>) {
    let seeded = assessment::ActiveModel {
        slug: Set(slug.to_owned()),
        title: Set(slug.to_owned()),
        description: Set(None),
        retakes: Set(1),
        duration: Set(3600),
        start_date: Set(None),
        end_date: Set(Some(Utc::now() + Duration::hours(2))),
        weightage: Set(10),
        negative_marking: Set(0),
        status: Set(LifecycleStatus::Published),
        message: Set(None),
        created_by: Set(created_by),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    let mut pairs = Vec::new();
    for i in 0..questions {
        let question = assessment_question::ActiveModel {
            assessment_id: Set(seeded.id),
            name: Set(format!("Q{i}")),
            description: Set(None),
            sort_order: Set(i as i32),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();
        let right = assessment_option::ActiveModel {
            assessment_question_id: Set(question.id),
            option_text: Set("right".to_owned()),
            is_correct: Set(true),
            sort_order: Set(0),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();
        assessment_option::ActiveModel {
            assessment_question_id: Set(question.id),
            option_text: Set("wrong".to_owned()),
            is_correct: Set(false),
            sort_order: Set(1),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();
        pairs.push((question.id, right.id));
    }
    (seeded, pairs)
}

pub async fn seed_course(
    db: &DatabaseConnection,
    slug: &str,
    status: LifecycleStatus,
    created_by: i64,
) -> course::Model {
    course::ActiveModel {
        slug: Set(slug.to_owned()),
        name: Set(slug.to_owned()),
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

/// Drives one request through the router and parses the JSON envelope.
pub async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = auth {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}
