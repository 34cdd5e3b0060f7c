//! Rule-based eligibility for assessments and courses.
//!
//! Each `eligibility_creations` row is one rule. A rule normally carries a
//! single discriminator; when several are set they must all hold. A user is
//! eligible when any rule holds, and content with no rules is open to all.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;

use db::models::{
    assessment_result, course_enrollment, eligibility_creation, group_member, user, user_skill,
};

use crate::error::{ServiceError, ServiceResult};

/// Outcome of a single rule, kept for display next to the aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct RuleOutcome {
    pub rule_id: i64,
    pub satisfied: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EligibilityReport {
    pub eligible: bool,
    pub rules: Vec<RuleOutcome>,
}

pub async fn resolve_for_assessment(
    db: &DatabaseConnection,
    user_id: i64,
    assessment_id: i64,
) -> ServiceResult<EligibilityReport> {
    let rules = eligibility_creation::Entity::find()
        .filter(eligibility_creation::Column::AssessmentId.eq(assessment_id))
        .all(db)
        .await?;
    resolve(db, user_id, rules).await
}

pub async fn resolve_for_course(
    db: &DatabaseConnection,
    user_id: i64,
    course_id: i64,
) -> ServiceResult<EligibilityReport> {
    let rules = eligibility_creation::Entity::find()
        .filter(eligibility_creation::Column::CourseId.eq(course_id))
        .all(db)
        .await?;
    resolve(db, user_id, rules).await
}

async fn resolve(
    db: &DatabaseConnection,
    user_id: i64,
    rules: Vec<eligibility_creation::Model>,
) -> ServiceResult<EligibilityReport> {
    if rules.is_empty() {
        return Ok(EligibilityReport {
            eligible: true,
            rules: Vec::new(),
        });
    }

    let subject = user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("user not found".to_string()))?;

    let mut outcomes = Vec::with_capacity(rules.len());
    let mut eligible = false;
    for rule in &rules {
        let satisfied = evaluate_rule(db, &subject, rule).await?;
        eligible |= satisfied;
        outcomes.push(RuleOutcome {
            rule_id: rule.id,
            satisfied,
        });
    }

    Ok(EligibilityReport {
        eligible,
        rules: outcomes,
    })
}

/// Every discriminator present on the rule must hold.
async fn evaluate_rule(
    db: &DatabaseConnection,
    subject: &user::Model,
    rule: &eligibility_creation::Model,
) -> ServiceResult<bool> {
    if let Some(skill_id) = rule.skill_id {
        if !user_skill::Model::user_has_skill(db, subject.id, skill_id).await? {
            return Ok(false);
        }
    }
    if let Some(department_id) = rule.department_id {
        if subject.department_id != Some(department_id) {
            return Ok(false);
        }
    }
    if let Some(group_id) = rule.group_id {
        if !group_member::Model::is_active_member(db, group_id, subject.id).await? {
            return Ok(false);
        }
    }
    if let Some(training_id) = rule.training_id {
        if course_enrollment::Model::find_active(db, training_id, subject.id)
            .await?
            .is_none()
        {
            return Ok(false);
        }
    }
    if let Some(completed_assessment_id) = rule.completed_assessment_id {
        let results = assessment_result::Entity::find()
            .filter(assessment_result::Column::AssessmentId.eq(completed_assessment_id))
            .filter(assessment_result::Column::UserId.eq(subject.id))
            .count(db)
            .await?;
        if results == 0 {
            return Ok(false);
        }
    }
    if let Some(role) = rule.role {
        if subject.role != role {
            return Ok(false);
        }
    }
    Ok(true)
}
