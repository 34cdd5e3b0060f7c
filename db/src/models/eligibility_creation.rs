use sea_orm::entity::prelude::*;
use serde::Serialize;

use super::user::UserRole;

/// A single eligibility rule attached to an assessment or a course.
///
/// Exactly one of the discriminator columns is normally populated per row;
/// the resolver ANDs whichever checks are present within a row and ORs
/// across rows.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "eligibility_creations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub assessment_id: Option<i64>,
    pub course_id: Option<i64>,
    pub skill_id: Option<i64>,
    pub department_id: Option<i64>,
    pub group_id: Option<i64>,
    /// Prerequisite course (training) the user must be enrolled on.
    pub training_id: Option<i64>,
    /// Prerequisite assessment the user must have a result for.
    pub completed_assessment_id: Option<i64>,
    pub role: Option<UserRole>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assessment::Entity",
        from = "Column::AssessmentId",
        to = "super::assessment::Column::Id"
    )]
    Assessment,
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
}

impl Related<super::assessment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assessment.def()
    }
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
