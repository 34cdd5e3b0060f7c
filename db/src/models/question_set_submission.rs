use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;

/// One attempt at a question set, usually reached through an exam lesson.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "question_set_submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub question_set_id: i64,
    pub user_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub is_submission_error: bool,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::question_set::Entity",
        from = "Column::QuestionSetId",
        to = "super::question_set::Column::Id"
    )]
    QuestionSet,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::question_set_submission_answer::Entity")]
    Answers,
    #[sea_orm(has_many = "super::question_set_result::Entity")]
    Results,
}

impl Related<super::question_set::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuestionSet.def()
    }
}

impl Related<super::question_set_submission_answer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Answers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
