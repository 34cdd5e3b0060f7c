use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "question_set_questions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub question_set_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::question_set::Entity",
        from = "Column::QuestionSetId",
        to = "super::question_set::Column::Id"
    )]
    QuestionSet,
    #[sea_orm(has_many = "super::question_set_option::Entity")]
    Options,
}

impl Related<super::question_set::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuestionSet.def()
    }
}

impl Related<super::question_set_option::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Options.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
