use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "question_set_results")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub question_set_submission_id: i64,
    pub question_set_id: i64,
    pub user_id: i64,
    pub total_mark: i64,
    pub negative_mark: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::question_set_submission::Entity",
        from = "Column::QuestionSetSubmissionId",
        to = "super::question_set_submission::Column::Id"
    )]
    Submission,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::question_set_submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn obtained_mark(&self) -> i64 {
        (self.total_mark - self.negative_mark).max(0)
    }
}
