use sea_orm_migration::prelude::*;

use crate::migrations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(migrations::m202606010001_create_users::Migration),
            Box::new(migrations::m202606010002_create_groups::Migration),
            Box::new(migrations::m202606010003_create_assessments::Migration),
            Box::new(migrations::m202606010004_create_assessment_submissions::Migration),
            Box::new(migrations::m202606010005_create_courses::Migration),
            Box::new(migrations::m202606010006_create_question_sets::Migration),
            Box::new(migrations::m202606010007_create_question_set_submissions::Migration),
            Box::new(migrations::m202606010008_create_eligibility::Migration),
        ]
    }
}
