use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use serde::Serialize;

use super::lifecycle::LifecycleStatus;

/// A standalone timed assessment with its own question bank.
///
/// `weightage` is the number of marks awarded per correctly answered question;
/// `negative_marking` is subtracted per incorrectly *answered* question
/// (unanswered questions are never penalised). `retakes` caps the number of
/// completed attempts per user.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "assessments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// URL-friendly identifier; assessments are addressable by id or slug.
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub retakes: i32,
    /// Nominal duration of one attempt, in seconds.
    pub duration: i32,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub weightage: i64,
    pub negative_marking: i64,
    pub status: LifecycleStatus,
    /// Reviewer message, set when the assessment is rejected.
    pub message: Option<String>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id"
    )]
    Creator,
    #[sea_orm(has_many = "super::assessment_question::Entity")]
    Questions,
    #[sea_orm(has_many = "super::assessment_submission::Entity")]
    Submissions,
    #[sea_orm(has_many = "super::skills_criteria::Entity")]
    SkillsCriteria,
    #[sea_orm(has_many = "super::eligibility_creation::Entity")]
    Eligibilities,
}

impl Related<super::assessment_question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Questions.def()
    }
}

impl Related<super::assessment_submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submissions.def()
    }
}

impl Related<super::skills_criteria::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SkillsCriteria.def()
    }
}

impl Related<super::eligibility_creation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Eligibilities.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Resolve an assessment by numeric id or slug.
    pub async fn find_by_identity(
        db: &DatabaseConnection,
        identity: &str,
    ) -> Result<Option<Model>, DbErr> {
        if let Ok(id) = identity.parse::<i64>() {
            return Entity::find_by_id(id).one(db).await;
        }
        Entity::find()
            .filter(Column::Slug.eq(identity))
            .one(db)
            .await
    }
}
