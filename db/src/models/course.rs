use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::QueryFilter;
use serde::Serialize;

use super::lifecycle::LifecycleStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub slug: String,
    pub name: String,
    pub description: String,
    pub status: LifecycleStatus,
    /// Set while a published course is being revised; publishing clears it.
    pub is_update: bool,
    pub group_id: Option<i64>,
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
    #[sea_orm(
        belongs_to = "super::group::Entity",
        from = "Column::GroupId",
        to = "super::group::Column::Id"
    )]
    Group,
    #[sea_orm(has_many = "super::section::Entity")]
    Sections,
    #[sea_orm(has_many = "super::lesson::Entity")]
    Lessons,
    #[sea_orm(has_many = "super::course_teacher::Entity")]
    Teachers,
    #[sea_orm(has_many = "super::course_enrollment::Entity")]
    Enrollments,
    #[sea_orm(has_many = "super::eligibility_creation::Entity")]
    Eligibilities,
}

impl Related<super::section::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sections.def()
    }
}

impl Related<super::lesson::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lessons.def()
    }
}

impl Related<super::course_enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Looks a course up by numeric id or, failing that, by slug.
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
