use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::QueryFilter;
use serde::Serialize;

/// Reusable exam bank backing exam lessons inside courses.
///
/// Unlike standalone assessments, question sets carry no lifecycle status;
/// availability is governed by the owning lesson and the time window here.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "question_sets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub slug: String,
    pub name: String,
    /// Marks awarded per fully correct question.
    pub question_marking: i64,
    /// Marks deducted per incorrect question.
    pub negative_marking: i64,
    pub allowed_retake: i32,
    /// Attempt duration in minutes.
    pub duration: i32,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::question_set_question::Entity")]
    Questions,
    #[sea_orm(has_many = "super::question_set_submission::Entity")]
    Submissions,
}

impl Related<super::question_set_question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Questions.def()
    }
}

impl Related<super::question_set_submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submissions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Looks a question set up by numeric id or, failing that, by slug.
    pub async fn find_by_identity(
        db: &DatabaseConnection,
        identity: &str,
    ) -> Result<Option<Model>, DbErr> {
        if let Ok(id) = identity.parse::<i64>() {
            if let Some(found) = Entity::find_by_id(id).one(db).await? {
                return Ok(Some(found));
            }
        }
        Entity::find()
            .filter(Column::Slug.eq(identity))
            .one(db)
            .await
    }
}
