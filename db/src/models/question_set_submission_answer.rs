use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "question_set_submission_answers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub question_set_submission_id: i64,
    pub question_set_question_id: i64,
    pub selected_answers: String,
    pub is_correct: bool,
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
        belongs_to = "super::question_set_question::Entity",
        from = "Column::QuestionSetQuestionId",
        to = "super::question_set_question::Column::Id"
    )]
    Question,
}

impl Related<super::question_set_submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
