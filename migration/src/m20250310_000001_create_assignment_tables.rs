use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_tables::{Classes, PromoCodes, Teachers};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ==================== 班级教师分配表 ====================
        manager
            .create_table(
                Table::create()
                    .table(ClassTeachers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClassTeachers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ClassTeachers::ClassId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassTeachers::TeacherId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassTeachers::AssignedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ClassTeachers::Table, ClassTeachers::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ClassTeachers::Table, ClassTeachers::TeacherId)
                            .to(Teachers::Table, Teachers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 优惠码适用班级表 ====================
        manager
            .create_table(
                Table::create()
                    .table(PromoCodeClasses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PromoCodeClasses::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PromoCodeClasses::PromoCodeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PromoCodeClasses::ClassId)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PromoCodeClasses::Table, PromoCodeClasses::PromoCodeId)
                            .to(PromoCodes::Table, PromoCodes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PromoCodeClasses::Table, PromoCodeClasses::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_class_teachers_pair")
                    .table(ClassTeachers::Table)
                    .col(ClassTeachers::ClassId)
                    .col(ClassTeachers::TeacherId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_promo_code_classes_pair")
                    .table(PromoCodeClasses::Table)
                    .col(PromoCodeClasses::PromoCodeId)
                    .col(PromoCodeClasses::ClassId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ==================== 优惠码适用范围标记（增量列） ====================
        if !manager
            .has_column("promo_codes", "applies_to_all_classes")
            .await?
        {
            manager
                .alter_table(
                    Table::alter()
                        .table(PromoCodes::Table)
                        .add_column(
                            ColumnDef::new(PromoCodeScope::AppliesToAllClasses)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PromoCodeClasses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ClassTeachers::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum ClassTeachers {
    #[sea_orm(iden = "class_teachers")]
    Table,
    Id,
    ClassId,
    TeacherId,
    AssignedAt,
}

#[derive(DeriveIden)]
enum PromoCodeClasses {
    #[sea_orm(iden = "promo_code_classes")]
    Table,
    Id,
    PromoCodeId,
    ClassId,
}

#[derive(DeriveIden)]
enum PromoCodeScope {
    AppliesToAllClasses,
}
