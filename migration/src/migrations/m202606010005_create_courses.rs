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
        "m202606010005_create_courses"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("courses"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("id")).big_integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Alias::new("slug")).string().not_null().unique_key())
                    .col(ColumnDef::new(Alias::new("name")).string().not_null())
                    .col(ColumnDef::new(Alias::new("description")).string().null())
                    .col(&mut lifecycle_status("status"))
                    .col(ColumnDef::new(Alias::new("is_update")).boolean().not_null().default(false))
                    .col(ColumnDef::new(Alias::new("group_id")).big_integer().null())
                    .col(ColumnDef::new(Alias::new("message")).string().null())
                    .col(ColumnDef::new(Alias::new("created_by")).big_integer().not_null())
                    .col(ColumnDef::new(Alias::new("created_at")).timestamp().not_null().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .col(ColumnDef::new(Alias::new("updated_at")).timestamp().not_null().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Alias::new("courses"), Alias::new("group_id"))
                            .to(Alias::new("groups"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Alias::new("courses"), Alias::new("created_by"))
                            .to(Alias::new("users"), Alias::new("id")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Alias::new("course_teachers"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("id")).big_integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Alias::new("course_id")).big_integer().not_null())
                    .col(ColumnDef::new(Alias::new("user_id")).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Alias::new("course_teachers"), Alias::new("course_id"))
                            .to(Alias::new("courses"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Alias::new("course_teachers"), Alias::new("user_id"))
                            .to(Alias::new("users"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Alias::new("course_enrollments"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("id")).big_integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Alias::new("course_id")).big_integer().not_null())
                    .col(ColumnDef::new(Alias::new("user_id")).big_integer().not_null())
                    .col(
                        ColumnDef::new(Alias::new("member_status"))
                            .enumeration(
                                Alias::new("enrollment_member_status_enum"),
                                vec![
                                    Alias::new("enrolled"),
                                    Alias::new("unenrolled"),
                                    Alias::new("completed"),
                                ],
                            )
                            .not_null()
                            .default("enrolled"),
                    )
                    .col(ColumnDef::new(Alias::new("percentage")).integer().not_null().default(0))
                    .col(ColumnDef::new(Alias::new("has_certificate_issued")).boolean().not_null().default(false))
                    .col(ColumnDef::new(Alias::new("certificate_issued_date")).timestamp().null())
                    .col(ColumnDef::new(Alias::new("certificate_url")).string().null())
                    .col(ColumnDef::new(Alias::new("deleted_at")).timestamp().null())
                    .col(ColumnDef::new(Alias::new("created_at")).timestamp().not_null().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .col(ColumnDef::new(Alias::new("updated_at")).timestamp().not_null().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Alias::new("course_enrollments"), Alias::new("course_id"))
                            .to(Alias::new("courses"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Alias::new("course_enrollments"), Alias::new("user_id"))
                            .to(Alias::new("users"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Alias::new("sections"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("id")).big_integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Alias::new("course_id")).big_integer().not_null())
                    .col(ColumnDef::new(Alias::new("name")).string().not_null())
                    .col(&mut lifecycle_status("status"))
                    .col(ColumnDef::new(Alias::new("sort_order")).integer().not_null().default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Alias::new("sections"), Alias::new("course_id"))
                            .to(Alias::new("courses"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Alias::new("lessons"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("id")).big_integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Alias::new("course_id")).big_integer().not_null())
                    .col(ColumnDef::new(Alias::new("section_id")).big_integer().not_null())
                    .col(ColumnDef::new(Alias::new("name")).string().not_null())
                    .col(
                        ColumnDef::new(Alias::new("lesson_type"))
                            .enumeration(
                                Alias::new("lesson_type_enum"),
                                vec![
                                    Alias::new("video"),
                                    Alias::new("document"),
                                    Alias::new("exam"),
                                    Alias::new("live_class"),
                                    Alias::new("physical"),
                                    Alias::new("feedback"),
                                    Alias::new("assignment"),
                                ],
                            )
                            .not_null(),
                    )
                    .col(&mut lifecycle_status("status"))
                    .col(ColumnDef::new(Alias::new("is_mandatory")).boolean().not_null().default(true))
                    .col(ColumnDef::new(Alias::new("sort_order")).integer().not_null().default(0))
                    .col(ColumnDef::new(Alias::new("question_set_id")).big_integer().null())
                    .col(ColumnDef::new(Alias::new("duration")).integer().null())
                    .col(ColumnDef::new(Alias::new("meeting_start_date")).timestamp().null())
                    .col(ColumnDef::new(Alias::new("meeting_id")).string().null())
                    .col(ColumnDef::new(Alias::new("meeting_passcode")).string().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Alias::new("lessons"), Alias::new("course_id"))
                            .to(Alias::new("courses"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Alias::new("lessons"), Alias::new("section_id"))
                            .to(Alias::new("sections"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("lessons")).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alias::new("sections")).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alias::new("course_enrollments")).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alias::new("course_teachers")).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alias::new("courses")).to_owned())
            .await
    }
}
