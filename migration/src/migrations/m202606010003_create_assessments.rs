use sea_orm_migration::prelude::*;

fn lifecycle_status(column: &str) -> ColumnDef {
    let mut def = ColumnDef::new(Alias::new(column));
    def.enumeration(
        Alias::new("lifecycle_status_enum"),
        vec![
            Alias::new("draft"),
            Alias::new("review"),
            Alias::new("published"),
            Alias::new("rejected"),
            Alias::new("completed"),
        ],
    )
    .not_null()
    .default("draft");
    def
}

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202606010003_create_assessments"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("assessments"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("id")).big_integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Alias::new("slug")).string().not_null().unique_key())
                    .col(ColumnDef::new(Alias::new("title")).string().not_null())
                    .col(ColumnDef::new(Alias::new("description")).string().null())
                    .col(ColumnDef::new(Alias::new("retakes")).integer().not_null().default(0))
                    .col(ColumnDef::new(Alias::new("duration")).integer().not_null())
                    .col(ColumnDef::new(Alias::new("start_date")).timestamp().null())
                    .col(ColumnDef::new(Alias::new("end_date")).timestamp().null())
                    .col(ColumnDef::new(Alias::new("weightage")).big_integer().not_null().default(1))
                    .col(ColumnDef::new(Alias::new("negative_marking")).big_integer().not_null().default(0))
                    .col(&mut lifecycle_status("status"))
                    .col(ColumnDef::new(Alias::new("message")).string().null())
                    .col(ColumnDef::new(Alias::new("created_by")).big_integer().not_null())
                    .col(ColumnDef::new(Alias::new("created_at")).timestamp().not_null().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .col(ColumnDef::new(Alias::new("updated_at")).timestamp().not_null().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Alias::new("assessments"), Alias::new("created_by"))
                            .to(Alias::new("users"), Alias::new("id")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Alias::new("assessment_questions"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("id")).big_integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Alias::new("assessment_id")).big_integer().not_null())
                    .col(ColumnDef::new(Alias::new("name")).string().not_null())
                    .col(ColumnDef::new(Alias::new("description")).string().null())
                    .col(ColumnDef::new(Alias::new("sort_order")).integer().not_null().default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Alias::new("assessment_questions"), Alias::new("assessment_id"))
                            .to(Alias::new("assessments"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Alias::new("assessment_options"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("id")).big_integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Alias::new("assessment_question_id")).big_integer().not_null())
                    .col(ColumnDef::new(Alias::new("option_text")).string().not_null())
                    .col(ColumnDef::new(Alias::new("is_correct")).boolean().not_null().default(false))
                    .col(ColumnDef::new(Alias::new("sort_order")).integer().not_null().default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Alias::new("assessment_options"), Alias::new("assessment_question_id"))
                            .to(Alias::new("assessment_questions"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Alias::new("skills_criteria"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("id")).big_integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Alias::new("assessment_id")).big_integer().not_null())
                    .col(ColumnDef::new(Alias::new("skill_id")).big_integer().not_null())
                    .col(
                        ColumnDef::new(Alias::new("rule"))
                            .enumeration(
                                Alias::new("skill_rule_enum"),
                                vec![
                                    Alias::new("is_greater_than_or_equal"),
                                    Alias::new("is_less_than"),
                                ],
                            )
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("percentage")).double().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Alias::new("skills_criteria"), Alias::new("assessment_id"))
                            .to(Alias::new("assessments"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Alias::new("skills_criteria"), Alias::new("skill_id"))
                            .to(Alias::new("skills"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("skills_criteria")).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alias::new("assessment_options")).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alias::new("assessment_questions")).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alias::new("assessments")).to_owned())
            .await
    }
}
