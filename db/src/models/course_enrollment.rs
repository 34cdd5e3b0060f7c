use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::QueryFilter;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "enrollment_member_status_enum"
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EnrollmentMemberStatus {
    #[sea_orm(string_value = "enrolled")]
    Enrolled,

    #[sea_orm(string_value = "unenrolled")]
    Unenrolled,

    #[sea_orm(string_value = "completed")]
    Completed,
}

/// A trainee's membership on a course, with completion progress.
///
/// Rows are soft-deleted via `deleted_at`; only rows where it is unset
/// count as live enrollments.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "course_enrollments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub user_id: i64,
    pub member_status: EnrollmentMemberStatus,
    /// Mandatory-lesson completion percentage, truncated to a whole number.
    pub percentage: i32,
    pub has_certificate_issued: bool,
    pub certificate_issued_date: Option<DateTime<Utc>>,
    pub certificate_url: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// The live enrollment row for a user on a course, ignoring
    /// soft-deleted rows.
    pub async fn find_active(
        db: &DatabaseConnection,
        course_id: i64,
        user_id: i64,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::UserId.eq(user_id))
            .filter(Column::DeletedAt.is_null())
            .one(db)
            .await
    }
}
