use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::lifecycle::LifecycleStatus;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "lesson_type_enum")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LessonType {
    #[sea_orm(string_value = "video")]
    Video,

    #[sea_orm(string_value = "document")]
    Document,

    #[sea_orm(string_value = "exam")]
    Exam,

    #[sea_orm(string_value = "live_class")]
    LiveClass,

    #[sea_orm(string_value = "physical")]
    Physical,

    #[sea_orm(string_value = "feedback")]
    Feedback,

    #[sea_orm(string_value = "assignment")]
    Assignment,
}

/// A single unit of course content. Exam lessons reference a question set
/// by `question_set_id`; live classes carry meeting details filled in when
/// the course is published.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "lessons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub section_id: i64,
    pub name: String,
    pub lesson_type: LessonType,
    pub status: LifecycleStatus,
    pub is_mandatory: bool,
    pub sort_order: i32,
    pub question_set_id: Option<i64>,
    pub duration: Option<i32>,
    pub meeting_start_date: Option<DateTime<Utc>>,
    pub meeting_id: Option<String>,
    pub meeting_passcode: Option<String>,
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
        belongs_to = "super::section::Entity",
        from = "Column::SectionId",
        to = "super::section::Column::Id"
    )]
    Section,
    #[sea_orm(has_many = "super::watch_history::Entity")]
    WatchHistories,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::section::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Section.def()
    }
}

impl Related<super::watch_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WatchHistories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
