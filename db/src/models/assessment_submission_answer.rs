use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Per-question answer record. `selected_answers` is the ordered option-id
/// list the candidate picked, serialized as a comma-separated string;
/// `is_correct` is computed once at submission time and never changes.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "assessment_submission_answers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub assessment_submission_id: i64,
    pub assessment_question_id: i64,
    pub selected_answers: String,
    pub is_correct: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assessment_submission::Entity",
        from = "Column::AssessmentSubmissionId",
        to = "super::assessment_submission::Column::Id"
    )]
    Submission,
    #[sea_orm(
        belongs_to = "super::assessment_question::Entity",
        from = "Column::AssessmentQuestionId",
        to = "super::assessment_question::Column::Id"
    )]
    Question,
}

impl Related<super::assessment_submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
