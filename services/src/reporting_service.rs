//! Read-only result views over graded assessment submissions.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;

use db::models::{
    assessment, assessment_question, assessment_result, assessment_submission,
    assessment_submission_answer, user,
};

use crate::actor::Actor;
use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Serialize)]
pub struct UserResultRow {
    pub user_id: i64,
    pub full_name: String,
    pub email: String,
    pub total_mark: i64,
    pub negative_mark: i64,
    pub obtained_mark: i64,
    pub attempts: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptDetail {
    pub submission_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub is_submission_error: bool,
    pub error_message: Option<String>,
    pub total_mark: Option<i64>,
    pub negative_mark: Option<i64>,
    pub obtained_mark: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentResult {
    pub user_id: i64,
    pub full_name: String,
    pub attempts: Vec<AttemptDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformerRow {
    pub user_id: i64,
    pub full_name: String,
    pub obtained_mark: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MissedQuestion {
    pub question_id: i64,
    pub name: String,
    pub miss_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssessmentStatistics {
    pub maximum_mark: i64,
    pub pass_count: u64,
    pub fail_count: u64,
    pub top_performers: Vec<PerformerRow>,
    pub bottom_performers: Vec<PerformerRow>,
    pub most_missed: Vec<MissedQuestion>,
}

const PERFORMER_LIMIT: usize = 3;
const MISSED_LIMIT: usize = 5;

/// One row per user, keeping each user's best graded attempt.
pub async fn assessment_results(
    db: &DatabaseConnection,
    actor: Actor,
    identity: &str,
) -> ServiceResult<Vec<UserResultRow>> {
    if !actor.is_trainer_or_admin() {
        return Err(ServiceError::Forbidden(
            "results are only visible to trainers and administrators".to_string(),
        ));
    }
    let found = find_assessment(db, identity).await?;
    let best = best_results_per_user(db, found.id).await?;

    let mut attempts_per_user: HashMap<i64, u64> = HashMap::new();
    let all_results = assessment_result::Entity::find()
        .filter(assessment_result::Column::AssessmentId.eq(found.id))
        .all(db)
        .await?;
    for result in &all_results {
        *attempts_per_user.entry(result.user_id).or_default() += 1;
    }

    let users = load_users(db, best.keys().copied().collect()).await?;
    let mut rows: Vec<UserResultRow> = best
        .into_iter()
        .filter_map(|(user_id, result)| {
            users.get(&user_id).map(|u| UserResultRow {
                user_id,
                full_name: u.full_name.clone(),
                email: u.email.clone(),
                total_mark: result.total_mark,
                negative_mark: result.negative_mark,
                obtained_mark: result.obtained_mark(),
                attempts: attempts_per_user.get(&user_id).copied().unwrap_or(0),
            })
        })
        .collect();
    rows.sort_by(|a, b| b.obtained_mark.cmp(&a.obtained_mark).then(a.user_id.cmp(&b.user_id)));
    Ok(rows)
}

/// Every attempt one user made, graded or not.
pub async fn student_result(
    db: &DatabaseConnection,
    actor: Actor,
    identity: &str,
    user_id: i64,
) -> ServiceResult<StudentResult> {
    if actor.id != user_id && !actor.is_trainer_or_admin() {
        return Err(ServiceError::Forbidden(
            "you may only view your own results".to_string(),
        ));
    }
    let found = find_assessment(db, identity).await?;
    let subject = user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("user not found".to_string()))?;

    let submissions = assessment_submission::Entity::find()
        .filter(assessment_submission::Column::AssessmentId.eq(found.id))
        .filter(assessment_submission::Column::UserId.eq(user_id))
        .order_by_asc(assessment_submission::Column::StartTime)
        .all(db)
        .await?;
    let submission_ids: Vec<i64> = submissions.iter().map(|s| s.id).collect();
    let mut result_by_submission: HashMap<i64, assessment_result::Model> = HashMap::new();
    if !submission_ids.is_empty() {
        let results = assessment_result::Entity::find()
            .filter(assessment_result::Column::AssessmentSubmissionId.is_in(submission_ids))
            .all(db)
            .await?;
        for result in results {
            result_by_submission.insert(result.assessment_submission_id, result);
        }
    }

    let attempts = submissions
        .into_iter()
        .map(|s| {
            let result = result_by_submission.get(&s.id);
            AttemptDetail {
                submission_id: s.id,
                start_time: s.start_time,
                end_time: s.end_time,
                is_submission_error: s.is_submission_error,
                error_message: s.error_message,
                total_mark: result.map(|r| r.total_mark),
                negative_mark: result.map(|r| r.negative_mark),
                obtained_mark: result.map(|r| r.obtained_mark()),
            }
        })
        .collect();

    Ok(StudentResult {
        user_id,
        full_name: subject.full_name,
        attempts,
    })
}

/// Aggregate statistics: pass/fail split at half marks, top and bottom
/// performers on best attempts, and the questions missed most often.
pub async fn assessment_statistics(
    db: &DatabaseConnection,
    actor: Actor,
    identity: &str,
) -> ServiceResult<AssessmentStatistics> {
    if !actor.is_trainer_or_admin() {
        return Err(ServiceError::Forbidden(
            "statistics are only visible to trainers and administrators".to_string(),
        ));
    }
    let found = find_assessment(db, identity).await?;

    let questions = assessment_question::Entity::find()
        .filter(assessment_question::Column::AssessmentId.eq(found.id))
        .all(db)
        .await?;
    let maximum_mark = found.weightage * questions.len() as i64;

    let best = best_results_per_user(db, found.id).await?;
    let users = load_users(db, best.keys().copied().collect()).await?;

    let mut performers: Vec<PerformerRow> = best
        .iter()
        .filter_map(|(user_id, result)| {
            users.get(user_id).map(|u| PerformerRow {
                user_id: *user_id,
                full_name: u.full_name.clone(),
                obtained_mark: result.obtained_mark(),
            })
        })
        .collect();
    performers.sort_by(|a, b| b.obtained_mark.cmp(&a.obtained_mark).then(a.user_id.cmp(&b.user_id)));

    let pass_count = performers
        .iter()
        .filter(|p| maximum_mark > 0 && p.obtained_mark * 2 >= maximum_mark)
        .count() as u64;
    let fail_count = performers.len() as u64 - pass_count;

    let top_performers = performers.iter().take(PERFORMER_LIMIT).cloned().collect();
    let bottom_performers = performers
        .iter()
        .rev()
        .take(PERFORMER_LIMIT)
        .cloned()
        .collect();

    Ok(AssessmentStatistics {
        maximum_mark,
        pass_count,
        fail_count,
        top_performers,
        bottom_performers,
        most_missed: most_missed_questions(db, found.id, &questions).await?,
    })
}

async fn find_assessment(
    db: &DatabaseConnection,
    identity: &str,
) -> ServiceResult<assessment::Model> {
    assessment::Model::find_by_identity(db, identity)
        .await?
        .ok_or_else(|| ServiceError::NotFound("assessment not found".to_string()))
}

/// Best graded attempt per user, judged on the obtained mark.
async fn best_results_per_user(
    db: &DatabaseConnection,
    assessment_id: i64,
) -> ServiceResult<HashMap<i64, assessment_result::Model>> {
    let results = assessment_result::Entity::find()
        .filter(assessment_result::Column::AssessmentId.eq(assessment_id))
        .all(db)
        .await?;
    let mut best: HashMap<i64, assessment_result::Model> = HashMap::new();
    for result in results {
        match best.get(&result.user_id) {
            Some(current) if current.obtained_mark() >= result.obtained_mark() => {}
            _ => {
                best.insert(result.user_id, result);
            }
        }
    }
    Ok(best)
}

async fn load_users(
    db: &DatabaseConnection,
    user_ids: Vec<i64>,
) -> ServiceResult<HashMap<i64, user::Model>> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(db)
        .await?;
    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}

async fn most_missed_questions(
    db: &DatabaseConnection,
    assessment_id: i64,
    questions: &[assessment_question::Model],
) -> ServiceResult<Vec<MissedQuestion>> {
    let submission_ids: Vec<i64> = assessment_submission::Entity::find()
        .filter(assessment_submission::Column::AssessmentId.eq(assessment_id))
        .all(db)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect();
    if submission_ids.is_empty() {
        return Ok(Vec::new());
    }
    let wrong_answers = assessment_submission_answer::Entity::find()
        .filter(assessment_submission_answer::Column::AssessmentSubmissionId.is_in(submission_ids))
        .filter(assessment_submission_answer::Column::IsCorrect.eq(false))
        .all(db)
        .await?;
    let mut miss_counts: HashMap<i64, u64> = HashMap::new();
    for answer in wrong_answers {
        *miss_counts.entry(answer.assessment_question_id).or_default() += 1;
    }
    let names: HashMap<i64, &str> = questions.iter().map(|q| (q.id, q.name.as_str())).collect();
    let mut missed: Vec<MissedQuestion> = miss_counts
        .into_iter()
        .filter_map(|(question_id, miss_count)| {
            names.get(&question_id).map(|name| MissedQuestion {
                question_id,
                name: name.to_string(),
                miss_count,
            })
        })
        .collect();
    missed.sort_by(|a, b| b.miss_count.cmp(&a.miss_count).then(a.question_id.cmp(&b.question_id)));
    missed.truncate(MISSED_LIMIT);
    Ok(missed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment_service::{start_assessment, submit_assessment};
    use crate::exam_service::AnswerInput;
    use crate::testing::{
        seed_assessment, seed_assessment_option, seed_assessment_question, seed_user,
        AssessmentSeed,
    };
    use db::models::user::UserRole;
    use db::test_utils::setup_test_db;

    struct Paper {
        assessment: assessment::Model,
        questions: Vec<assessment_question::Model>,
        correct: HashMap<i64, i64>,
        wrong: HashMap<i64, i64>,
    }

    async fn build_paper(db: &DatabaseConnection, retakes: i32) -> Paper {
        let author = seed_user(db, "author@test.com", UserRole::Trainer).await;
        let mut seed = AssessmentSeed::published("Report Exam", author.id);
        seed.weightage = 10;
        seed.retakes = retakes;
        let assessment = seed_assessment(db, seed).await;
        let mut questions = Vec::new();
        let mut correct = HashMap::new();
        let mut wrong = HashMap::new();
        for i in 0..2 {
            let q = seed_assessment_question(db, assessment.id, &format!("Q{i}"), i).await;
            let right = seed_assessment_option(db, q.id, "right", true).await;
            let bad = seed_assessment_option(db, q.id, "wrong", false).await;
            correct.insert(q.id, right.id);
            wrong.insert(q.id, bad.id);
            questions.push(q);
        }
        Paper {
            assessment,
            questions,
            correct,
            wrong,
        }
    }

    async fn take(db: &DatabaseConnection, paper: &Paper, caller: Actor, right: usize) {
        let started = start_assessment(db, caller, &paper.assessment.slug)
            .await
            .unwrap();
        let answers: Vec<AnswerInput> = paper
            .questions
            .iter()
            .enumerate()
            .map(|(i, q)| AnswerInput {
                question_id: q.id,
                selected_option_ids: if i < right {
                    vec![paper.correct[&q.id]]
                } else {
                    vec![paper.wrong[&q.id]]
                },
            })
            .collect();
        submit_assessment(db, caller, &paper.assessment.slug, started.submission_id, answers)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn results_keep_the_best_attempt_per_user() {
        let db = setup_test_db().await;
        let paper = build_paper(&db, 3).await;
        let trainee = seed_user(&db, "trainee@test.com", UserRole::Trainee).await;
        let admin = seed_user(&db, "admin@test.com", UserRole::Admin).await;
        let caller = Actor::new(trainee.id, trainee.role);

        take(&db, &paper, caller, 0).await;
        take(&db, &paper, caller, 2).await;
        take(&db, &paper, caller, 1).await;

        let rows = assessment_results(&db, Actor::new(admin.id, admin.role), &paper.assessment.slug)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, trainee.id);
        assert_eq!(rows[0].obtained_mark, 20);
        assert_eq!(rows[0].attempts, 3);
    }

    #[tokio::test]
    async fn trainees_cannot_list_results_but_may_view_their_own() {
        let db = setup_test_db().await;
        let paper = build_paper(&db, 1).await;
        let trainee = seed_user(&db, "trainee@test.com", UserRole::Trainee).await;
        let other = seed_user(&db, "other@test.com", UserRole::Trainee).await;
        let caller = Actor::new(trainee.id, trainee.role);
        take(&db, &paper, caller, 1).await;

        let err = assessment_results(&db, caller, &paper.assessment.slug)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let own = student_result(&db, caller, &paper.assessment.slug, trainee.id)
            .await
            .unwrap();
        assert_eq!(own.attempts.len(), 1);
        assert_eq!(own.attempts[0].obtained_mark, Some(10));

        let err = student_result(
            &db,
            Actor::new(other.id, other.role),
            &paper.assessment.slug,
            trainee.id,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn statistics_split_pass_and_fail_at_half_marks() {
        let db = setup_test_db().await;
        let paper = build_paper(&db, 1).await;
        let admin = seed_user(&db, "admin@test.com", UserRole::Admin).await;
        let ace = seed_user(&db, "ace@test.com", UserRole::Trainee).await;
        let mid = seed_user(&db, "mid@test.com", UserRole::Trainee).await;
        let low = seed_user(&db, "low@test.com", UserRole::Trainee).await;

        take(&db, &paper, Actor::new(ace.id, ace.role), 2).await;
        take(&db, &paper, Actor::new(mid.id, mid.role), 1).await;
        take(&db, &paper, Actor::new(low.id, low.role), 0).await;

        let stats =
            assessment_statistics(&db, Actor::new(admin.id, admin.role), &paper.assessment.slug)
                .await
                .unwrap();
        assert_eq!(stats.maximum_mark, 20);
        // 20 and 10 pass at the half-marks threshold; 0 fails.
        assert_eq!(stats.pass_count, 2);
        assert_eq!(stats.fail_count, 1);
        assert_eq!(stats.top_performers[0].user_id, ace.id);
        assert_eq!(stats.bottom_performers[0].user_id, low.id);
        // Both questions were each missed by somebody.
        assert_eq!(stats.most_missed.len(), 2);
    }
}
