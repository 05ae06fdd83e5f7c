//! Create test_reports table.

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
                    .table(TestReport::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestReport::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TestReport::BranchId).uuid().not_null())
                    .col(
                        ColumnDef::new(TestReport::ResultTime).timestamp_with_time_zone(),
                    )
                    .col(ColumnDef::new(TestReport::Duration).decimal_len(12, 6))
                    .col(ColumnDef::new(TestReport::TotalTests).integer())
                    .col(ColumnDef::new(TestReport::TotalFailures).integer())
                    .col(ColumnDef::new(TestReport::TotalErrors).integer())
                    .col(ColumnDef::new(TestReport::TotalSkipped).integer())
                    .col(
                        ColumnDef::new(TestReport::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestReport::Table, TestReport::BranchId)
                            .to(Branch::Table, Branch::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_report_branch_id")
                    .table(TestReport::Table)
                    .col(TestReport::BranchId)
                    .to_owned(),
            )
            .await?;

        // Trend queries filter on creation date windows.
        manager
            .create_index(
                Index::create()
                    .name("idx_test_report_created_at")
                    .table(TestReport::Table)
                    .col(TestReport::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestReport::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TestReport {
    #[sea_orm(iden = "test_reports")]
    Table,
    Id,
    BranchId,
    ResultTime,
    Duration,
    TotalTests,
    TotalFailures,
    TotalErrors,
    TotalSkipped,
    CreatedAt,
}
