//! Attempt lifecycle for question-set exams reached through course lessons.
//!
//! Per (exam, user) the machine is: no submission, then an open submission
//! (`end_time` unset), then either a graded submission with a result row or
//! an errored submission with no result.

use std::collections::{BTreeSet, HashMap};

use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use db::models::course_enrollment::EnrollmentMemberStatus;
use db::models::{
    course_enrollment, lesson, question_set, question_set_option, question_set_question,
    question_set_result, question_set_submission, question_set_submission_answer,
};

use crate::actor::Actor;
use crate::enrollment_service;
use crate::error::{ServiceError, ServiceResult};
use crate::grading;
use crate::notifier::Notifier;

/// Submissions arriving up to this long after the window closes still grade.
pub const LATE_SUBMISSION_GRACE_SECONDS: i64 = 30;

#[derive(Debug, Clone, Serialize)]
pub struct ExamOption {
    pub id: i64,
    pub option_text: String,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExamQuestion {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub options: Vec<ExamOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartedExam {
    pub submission_id: i64,
    pub duration_seconds: i64,
    pub questions: Vec<ExamQuestion>,
}

/// One answer per question; an empty selection means the question was
/// deliberately left unanswered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerInput {
    pub question_id: i64,
    pub selected_option_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Graded {
        total_mark: i64,
        negative_mark: i64,
        obtained_mark: i64,
    },
    Errored {
        message: String,
    },
}

/// Opens a new attempt and returns the paper with correctness stripped.
pub async fn start_exam(
    db: &DatabaseConnection,
    actor: Actor,
    identity: &str,
) -> ServiceResult<StartedExam> {
    let set = question_set::Model::find_by_identity(db, identity)
        .await?
        .ok_or_else(|| ServiceError::NotFound("exam not found".to_string()))?;

    let owning_lesson = lesson::Entity::find()
        .filter(lesson::Column::QuestionSetId.eq(set.id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("exam is not attached to any course".to_string()))?;

    let enrollment =
        course_enrollment::Model::find_active(db, owning_lesson.course_id, actor.id).await?;
    let enrolled = enrollment
        .map(|e| e.member_status != EnrollmentMemberStatus::Unenrolled)
        .unwrap_or(false);
    if !enrolled {
        return Err(ServiceError::Forbidden(
            "you must be enrolled on the course to take this exam".to_string(),
        ));
    }

    let now = Utc::now();
    ensure_retakes_left(db, &set, actor.id).await?;
    if let Some(start) = set.start_time {
        if now < start {
            return Err(ServiceError::Forbidden(
                "this exam is not open yet".to_string(),
            ));
        }
    }
    let mut duration_seconds = set.duration as i64 * 60;
    if let Some(end) = set.end_time {
        if end <= now {
            return Err(ServiceError::Forbidden(
                "this exam has already finished".to_string(),
            ));
        }
        duration_seconds = duration_seconds.min((end - now).num_seconds());
    }

    let submission = question_set_submission::ActiveModel {
        question_set_id: Set(set.id),
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
        question_set_id = set.id,
        user_id = actor.id,
        submission_id = submission.id,
        "exam attempt started"
    );

    Ok(StartedExam {
        submission_id: submission.id,
        duration_seconds,
        questions: load_paper(db, set.id).await?,
    })
}

/// Grades an open attempt. Mismatched papers and late arrivals close the
/// submission as errored without producing a result; everything else grades
/// atomically.
pub async fn submit_answers(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    actor: Actor,
    identity: &str,
    submission_id: i64,
    answers: Vec<AnswerInput>,
) -> ServiceResult<SubmissionOutcome> {
    let set = question_set::Model::find_by_identity(db, identity)
        .await?
        .ok_or_else(|| ServiceError::NotFound("exam not found".to_string()))?;

    let submission = question_set_submission::Entity::find_by_id(submission_id)
        .filter(question_set_submission::Column::QuestionSetId.eq(set.id))
        .filter(question_set_submission::Column::UserId.eq(actor.id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("submission not found".to_string()))?;

    let existing_answers = question_set_submission_answer::Entity::find()
        .filter(
            question_set_submission_answer::Column::QuestionSetSubmissionId.eq(submission.id),
        )
        .count(db)
        .await?;
    if existing_answers > 0 || submission.end_time.is_some() {
        return Err(ServiceError::Forbidden(
            "this exam has already been submitted".to_string(),
        ));
    }
    ensure_retakes_left(db, &set, actor.id).await?;

    let questions = question_set_question::Entity::find()
        .filter(question_set_question::Column::QuestionSetId.eq(set.id))
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
            "submitted answers do not cover the exam questions",
        )
        .await;
    }

    let now = Utc::now();
    if let Some(end) = set.end_time {
        if now - Duration::seconds(LATE_SUBMISSION_GRACE_SECONDS) > end {
            return close_with_error(
                db,
                submission,
                &answers,
                &correct_by_question,
                "submitted after the exam closed",
            )
            .await;
        }
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
        answer_rows.push(question_set_submission_answer::ActiveModel {
            question_set_submission_id: Set(submission.id),
            question_set_question_id: Set(answer.question_id),
            selected_answers: Set(grading::serialize_selected(&answer.selected_option_ids)),
            is_correct: Set(is_correct),
            ..Default::default()
        });
    }

    let total_mark = correct_count * set.question_marking;
    let negative_mark = wrong_answered * set.negative_marking;
    let obtained = grading::obtained_mark(total_mark, negative_mark);

    let txn = db.begin().await?;
    let mut closing: question_set_submission::ActiveModel = submission.clone().into();
    closing.end_time = Set(Some(now));
    closing.updated_at = Set(now);
    closing.update(&txn).await?;
    for row in answer_rows {
        row.insert(&txn).await?;
    }
    question_set_result::ActiveModel {
        question_set_submission_id: Set(submission.id),
        question_set_id: Set(set.id),
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
        total_mark, negative_mark, "exam attempt graded"
    );

    record_lesson_completion(db, notifier, actor, &set, obtained, questions.len() as i64).await;

    Ok(SubmissionOutcome::Graded {
        total_mark,
        negative_mark,
        obtained_mark: obtained,
    })
}

async fn ensure_retakes_left(
    db: &DatabaseConnection,
    set: &question_set::Model,
    user_id: i64,
) -> ServiceResult<()> {
    let closed = question_set_submission::Entity::find()
        .filter(question_set_submission::Column::QuestionSetId.eq(set.id))
        .filter(question_set_submission::Column::UserId.eq(user_id))
        .filter(question_set_submission::Column::EndTime.is_not_null())
        .count(db)
        .await?;
    if closed >= set.allowed_retake as u64 {
        return Err(ServiceError::Forbidden(
            "you have already taken this exam".to_string(),
        ));
    }
    Ok(())
}

async fn load_paper(db: &DatabaseConnection, set_id: i64) -> ServiceResult<Vec<ExamQuestion>> {
    let questions = question_set_question::Entity::find()
        .filter(question_set_question::Column::QuestionSetId.eq(set_id))
        .order_by_asc(question_set_question::Column::SortOrder)
        .all(db)
        .await?;
    let question_ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
    let mut options_by_question: HashMap<i64, Vec<ExamOption>> = HashMap::new();
    if !question_ids.is_empty() {
        let options = question_set_option::Entity::find()
            .filter(question_set_option::Column::QuestionSetQuestionId.is_in(question_ids))
            .order_by_asc(question_set_option::Column::SortOrder)
            .all(db)
            .await?;
        for option in options {
            options_by_question
                .entry(option.question_set_question_id)
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
    questions: &[question_set_question::Model],
) -> ServiceResult<HashMap<i64, Vec<i64>>> {
    let mut map: HashMap<i64, Vec<i64>> =
        questions.iter().map(|q| (q.id, Vec::new())).collect();
    let question_ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
    if question_ids.is_empty() {
        return Ok(map);
    }
    let options = question_set_option::Entity::find()
        .filter(question_set_option::Column::QuestionSetQuestionId.is_in(question_ids))
        .filter(question_set_option::Column::IsCorrect.eq(true))
        .all(db)
        .await?;
    for option in options {
        map.entry(option.question_set_question_id)
            .or_default()
            .push(option.id);
    }
    Ok(map)
}

/// The request still succeeds; the attempt is just recorded as spoiled.
/// The answer sheet is kept for audit, minus any answer naming a question
/// this exam does not have.
async fn close_with_error(
    db: &DatabaseConnection,
    submission: question_set_submission::Model,
    answers: &[AnswerInput],
    correct_by_question: &HashMap<i64, Vec<i64>>,
    message: &str,
) -> ServiceResult<SubmissionOutcome> {
    let now = Utc::now();
    let txn = db.begin().await?;
    let mut active: question_set_submission::ActiveModel = submission.clone().into();
    active.end_time = Set(Some(now));
    active.is_submission_error = Set(true);
    active.error_message = Set(Some(message.to_string()));
    active.updated_at = Set(now);
    active.update(&txn).await?;
    for answer in answers {
        let Some(correct) = correct_by_question.get(&answer.question_id) else {
            continue;
        };
        question_set_submission_answer::ActiveModel {
            question_set_submission_id: Set(submission.id),
            question_set_question_id: Set(answer.question_id),
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

/// Grading an exam lesson counts as completing it for course progress.
async fn record_lesson_completion(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    actor: Actor,
    set: &question_set::Model,
    obtained: i64,
    question_count: i64,
) {
    let maximum = set.question_marking * question_count;
    let passed = maximum > 0 && obtained * 2 >= maximum;
    let owning_lesson = match lesson::Entity::find()
        .filter(lesson::Column::QuestionSetId.eq(set.id))
        .one(db)
        .await
    {
        Ok(Some(found)) => found,
        Ok(None) => return,
        Err(err) => {
            warn!(error = %err, "failed to resolve exam lesson for completion");
            return;
        }
    };
    if let Err(err) =
        enrollment_service::complete_lesson(db, notifier, actor.id, owning_lesson.id, passed).await
    {
        warn!(
            lesson_id = owning_lesson.id,
            user_id = actor.id,
            error = %err,
            "failed to record exam lesson completion"
        );
    }
}
