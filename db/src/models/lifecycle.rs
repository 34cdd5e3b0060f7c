use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lifecycle status shared by assessments, courses, sections and lessons.
///
/// Transitions between these states are validated by the status transition
/// engine in the services crate; the database stores whatever that engine
/// decided.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "lifecycle_status_enum")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LifecycleStatus {
    #[sea_orm(string_value = "draft")]
    Draft,

    #[sea_orm(string_value = "review")]
    Review,

    #[sea_orm(string_value = "published")]
    Published,

    #[sea_orm(string_value = "rejected")]
    Rejected,

    #[sea_orm(string_value = "completed")]
    Completed,
}

impl Default for LifecycleStatus {
    fn default() -> Self {
        Self::Draft
    }
}
