use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "assessment_options")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub assessment_question_id: i64,
    pub option_text: String,
    /// Never exposed to candidates before grading.
    pub is_correct: bool,
    pub sort_order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assessment_question::Entity",
        from = "Column::AssessmentQuestionId",
        to = "super::assessment_question::Column::Id"
    )]
    Question,
}

impl Related<super::assessment_question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Question.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
