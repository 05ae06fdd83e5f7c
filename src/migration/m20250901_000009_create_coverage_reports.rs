//! Create coverage_reports table.

use sea_orm_migration::prelude::*;

use super::m20250901_000005_create_branches::Branch;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CoverageReport::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CoverageReport::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CoverageReport::BranchId).uuid().not_null())
                    .col(
                        ColumnDef::new(CoverageReport::ResultTime).timestamp_with_time_zone(),
                    )
                    .col(ColumnDef::new(CoverageReport::BranchRate).decimal_len(12, 6))
                    .col(ColumnDef::new(CoverageReport::LineRate).decimal_len(12, 6))
                    .col(ColumnDef::new(CoverageReport::TotalLines).integer())
                    .col(ColumnDef::new(CoverageReport::ValidLines).integer())
                    .col(ColumnDef::new(CoverageReport::Complexity).decimal_len(12, 6))
                    .col(
                        ColumnDef::new(CoverageReport::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CoverageReport::Table, CoverageReport::BranchId)
                            .to(Branch::Table, Branch::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_coverage_report_branch_id")
                    .table(CoverageReport::Table)
                    .col(CoverageReport::BranchId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_coverage_report_created_at")
                    .table(CoverageReport::Table)
                    .col(CoverageReport::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CoverageReport::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum CoverageReport {
    #[sea_orm(iden = "coverage_reports")]
    Table,
    Id,
    BranchId,
    ResultTime,
    BranchRate,
    LineRate,
    TotalLines,
    ValidLines,
    Complexity,
    CreatedAt,
}
