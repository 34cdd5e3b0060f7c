//! Attempt lifecycle for standalone assessments.
//!
//! The machine mirrors the exam variant; assessments additionally gate the
//! start on published status, the date window and the eligibility rules,
//! and derive skill grants from the graded score.

use std::collections::{BTreeSet, HashMap};

use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::info;

use db::models::lifecycle::LifecycleStatus;
use db::models::skills_criteria::SkillRule;
use db::models::{
    assessment, assessment_option, assessment_question, assessment_result, assessment_submission,
    assessment_submission_answer, skills_criteria, user_skill,
};

use crate::actor::Actor;
use crate::eligibility_service;
use crate::error::{ServiceError, ServiceResult};
use crate::exam_service::{AnswerInput, ExamOption, ExamQuestion, SubmissionOutcome};
use crate::grading;

use crate::exam_service::LATE_SUBMISSION_GRACE_SECONDS;

#[derive(Debug, Clone, Serialize)]
pub struct StartedAssessment {
    pub submission_id: i64,
    pub duration_seconds: i64,
    pub questions: Vec<ExamQuestion>,
}

/// Opens a new attempt after the published/window/eligibility/retake gates.
pub async fn start_assessment(
    db: &DatabaseConnection,
    actor: Actor,
    identity: &str,
) -> ServiceResult<StartedAssessment> {
    let found = assessment::Model::find_by_identity(db, identity)
        .await?
        .ok_or_else(|| ServiceError::NotFound("assessment not found".to_string()))?;

    if found.status != LifecycleStatus::Published {
        return Err(ServiceError::Forbidden(
            "this assessment is not open for attempts".to_string(),
        ));
    }
    let now = Utc::now();
    if let Some(start) = found.start_date {
        if now < start {
            return Err(ServiceError::Forbidden(
                "this assessment has not started yet".to_string(),
            ));
        }
    }
    if let Some(end) = found.end_date {
        if end <= now {
            return Err(ServiceError::Forbidden(
                "this assessment has already finished".to_string(),
            ));
        }
    }

    let eligibility = eligibility_service::resolve_for_assessment(db, actor.id, found.id).await?;
    if !eligibility.eligible {
        return Err(ServiceError::Forbidden(
            "you are not eligible for this assessment".to_string(),
        ));
    }

    ensure_retakes_left(db, &found, actor.id).await?;

    let mut duration_seconds = found.duration as i64;
    if let Some(end) = found.end_date {
        duration_seconds = duration_seconds.min((end - now).num_seconds());
    }

    let submission = assessment_submission::ActiveModel {
        assessment_id: Set(found.id),
        user_id: Set(actor.id),
        start_time: Set(now),
        end_time: Set(None),
        is_submission_error: Set(false),
        error_message: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        assessment_id = found.id,
        user_id = actor.id,
        submission_id = submission.id,
        "assessment attempt started"
    );

    Ok(StartedAssessment {
        submission_id: submission.id,
        duration_seconds,
        questions: load_paper(db, found.id).await?,
    })
}

/// Grades an open attempt and then derives skill grants from the score.
pub async fn submit_assessment(
    db: &DatabaseConnection,
    actor: Actor,
    identity: &str,
    submission_id: i64,
    answers: Vec<AnswerInput>,
) -> ServiceResult<SubmissionOutcome> {
    let found = assessment::Model::find_by_identity(db, identity)
        .await?
        .ok_or_else(|| ServiceError::NotFound("assessment not found".to_string()))?;

    let submission = assessment_submission::Entity::find_by_id(submission_id)
        .filter(assessment_submission::Column::AssessmentId.eq(found.id))
        .filter(assessment_submission::Column::UserId.eq(actor.id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("submission not found".to_string()))?;

    let existing_answers = assessment_submission_answer::Entity::find()
        .filter(assessment_submission_answer::Column::AssessmentSubmissionId.eq(submission.id))
        .count(db)
        .await?;
    if existing_answers > 0 || submission.end_time.is_some() {
        return Err(ServiceError::Forbidden(
            "this assessment has already been submitted".to_string(),
        ));
    }
    ensure_retakes_left(db, &found, actor.id).await?;

    let questions = assessment_question::Entity::find()
        .filter(assessment_question::Column::AssessmentId.eq(found.id))
        .all(db)
        .await?;
    let correct_by_question = correct_options(db, &questions).await?;

    let expected: BTreeSet<i64> = questions.iter().map(|q| q.id).collect();
    let answered: BTreeSet<i64> = answers.iter().map(|a| a.question_id).collect();
    if expected != answered {
        return close_with_error(
            db,
            submission,
            &answers,
            &correct_by_question,
            "submitted answers do not cover the assessment questions",
        )
        .await;
    }

    let now = Utc::now();
    let mut deadline = submission.start_time + Duration::seconds(found.duration as i64);
    if let Some(end) = found.end_date {
        deadline = deadline.min(end);
    }
    if now - Duration::seconds(LATE_SUBMISSION_GRACE_SECONDS) > deadline {
        return close_with_error(
            db,
            submission,
            &answers,
            &correct_by_question,
            "submitted after the deadline",
        )
        .await;
    }

    let mut correct_count = 0i64;
    let mut wrong_answered = 0i64;
    let mut answer_rows = Vec::with_capacity(answers.len());
    for answer in &answers {
        let correct = correct_by_question
            .get(&answer.question_id)
            .cloned()
            .unwrap_or_default();
        let is_correct = grading::is_answer_correct(&answer.selected_option_ids, &correct);
        if is_correct {
            correct_count += 1;
        } else if !answer.selected_option_ids.is_empty() {
            wrong_answered += 1;
        }
        answer_rows.push(assessment_submission_answer::ActiveModel {
            assessment_submission_id: Set(submission.id),
            assessment_question_id: Set(answer.question_id),
            selected_answers: Set(grading::serialize_selected(&answer.selected_option_ids)),
            is_correct: Set(is_correct),
            ..Default::default()
        });
    }

    let total_mark = correct_count * found.weightage;
    let negative_mark = wrong_answered * found.negative_marking;
    let obtained = grading::obtained_mark(total_mark, negative_mark);

    let txn = db.begin().await?;
    let mut closing: assessment_submission::ActiveModel = submission.clone().into();
    closing.end_time = Set(Some(now));
    closing.updated_at = Set(now);
    closing.update(&txn).await?;
    for row in answer_rows {
        row.insert(&txn).await?;
    }
    assessment_result::ActiveModel {
        assessment_submission_id: Set(submission.id),
        assessment_id: Set(found.id),
        user_id: Set(actor.id),
        total_mark: Set(total_mark),
        negative_mark: Set(negative_mark),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(
        submission_id = submission.id,
        total_mark, negative_mark, "assessment attempt graded"
    );

    derive_skills(db, &found, actor.id, total_mark, questions.len() as i64).await?;

    Ok(SubmissionOutcome::Graded {
        total_mark,
        negative_mark,
        obtained_mark: obtained,
    })
}

async fn ensure_retakes_left(
    db: &DatabaseConnection,
    found: &assessment::Model,
    user_id: i64,
) -> ServiceResult<()> {
    let closed = assessment_submission::Entity::find()
        .filter(assessment_submission::Column::AssessmentId.eq(found.id))
        .filter(assessment_submission::Column::UserId.eq(user_id))
        .filter(assessment_submission::Column::EndTime.is_not_null())
        .count(db)
        .await?;
    if closed >= found.retakes as u64 {
        return Err(ServiceError::Forbidden(
            "you have already taken this assessment".to_string(),
        ));
    }
    Ok(())
}

async fn load_paper(db: &DatabaseConnection, assessment_id: i64) -> ServiceResult<Vec<ExamQuestion>> {
    let questions = assessment_question::Entity::find()
        .filter(assessment_question::Column::AssessmentId.eq(assessment_id))
        .order_by_asc(assessment_question::Column::SortOrder)
        .all(db)
        .await?;
    let question_ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
    let mut options_by_question: HashMap<i64, Vec<ExamOption>> = HashMap::new();
    if !question_ids.is_empty() {
        let options = assessment_option::Entity::find()
            .filter(assessment_option::Column::AssessmentQuestionId.is_in(question_ids))
            .order_by_asc(assessment_option::Column::SortOrder)
            .all(db)
            .await?;
        for option in options {
            options_by_question
                .entry(option.assessment_question_id)
                .or_default()
                .push(ExamOption {
                    id: option.id,
                    option_text: option.option_text,
                    sort_order: option.sort_order,
                });
        }
    }
    Ok(questions
        .into_iter()
        .map(|q| ExamQuestion {
            options: options_by_question.remove(&q.id).unwrap_or_default(),
            id: q.id,
            name: q.name,
            description: q.description,
            sort_order: q.sort_order,
        })
        .collect())
}

async fn correct_options(
    db: &DatabaseConnection,
    questions: &[assessment_question::Model],
) -> ServiceResult<HashMap<i64, Vec<i64>>> {
    let mut map: HashMap<i64, Vec<i64>> =
        questions.iter().map(|q| (q.id, Vec::new())).collect();
    let question_ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
    if question_ids.is_empty() {
        return Ok(map);
    }
    let options = assessment_option::Entity::find()
        .filter(assessment_option::Column::AssessmentQuestionId.is_in(question_ids))
        .filter(assessment_option::Column::IsCorrect.eq(true))
        .all(db)
        .await?;
    for option in options {
        map.entry(option.assessment_question_id)
            .or_default()
            .push(option.id);
    }
    Ok(map)
}

/// Spoiled attempts keep their answer sheet for audit, minus any answer
/// naming a question this assessment does not have.
async fn close_with_error(
    db: &DatabaseConnection,
    submission: assessment_submission::Model,
    answers: &[AnswerInput],
    correct_by_question: &HashMap<i64, Vec<i64>>,
    message: &str,
) -> ServiceResult<SubmissionOutcome> {
    let now = Utc::now();
    let txn = db.begin().await?;
    let mut active: assessment_submission::ActiveModel = submission.clone().into();
    active.end_time = Set(Some(now));
    active.is_submission_error = Set(true);
    active.error_message = Set(Some(message.to_string()));
    active.updated_at = Set(now);
    active.update(&txn).await?;
    for answer in answers {
        let Some(correct) = correct_by_question.get(&answer.question_id) else {
            continue;
        };
        assessment_submission_answer::ActiveModel {
            assessment_submission_id: Set(submission.id),
            assessment_question_id: Set(answer.question_id),
            selected_answers: Set(grading::serialize_selected(&answer.selected_option_ids)),
            is_correct: Set(grading::is_answer_correct(&answer.selected_option_ids, correct)),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }
    txn.commit().await?;
    Ok(SubmissionOutcome::Errored {
        message: message.to_string(),
    })
}

/// Grants the skills whose threshold the score satisfies. Granting is
/// idempotent: a skill the user already holds is left untouched.
async fn derive_skills(
    db: &DatabaseConnection,
    found: &assessment::Model,
    user_id: i64,
    total_mark: i64,
    question_count: i64,
) -> ServiceResult<()> {
    let maximum = found.weightage * question_count;
    let pct = grading::percentage(total_mark, maximum);

    let criteria = skills_criteria::Entity::find()
        .filter(skills_criteria::Column::AssessmentId.eq(found.id))
        .all(db)
        .await?;
    for criterion in criteria {
        let qualifies = match criterion.rule {
            SkillRule::IsGreaterThanOrEqual => pct >= criterion.percentage,
            SkillRule::IsLessThan => false,
        };
        if !qualifies {
            continue;
        }
        if user_skill::Model::user_has_skill(db, user_id, criterion.skill_id).await? {
            continue;
        }
        user_skill::ActiveModel {
            user_id: Set(user_id),
            skill_id: Set(criterion.skill_id),
            awarded_at: Set(Utc::now()),
        }
        .insert(db)
        .await?;
        info!(
            user_id,
            skill_id = criterion.skill_id,
            assessment_id = found.id,
            "skill granted"
        );
    }
    Ok(())
}
