//! Create test_suites table.

use sea_orm_migration::prelude::*;

use super::m20250901_000006_create_test_reports::TestReport;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TestSuite::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestSuite::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TestSuite::TestReportId).uuid().not_null())
                    .col(ColumnDef::new(TestSuite::Name).string().not_null())
                    .col(ColumnDef::new(TestSuite::Duration).decimal_len(12, 6))
                    .col(ColumnDef::new(TestSuite::TotalTests).integer())
                    .col(ColumnDef::new(TestSuite::TotalFailures).integer())
                    .col(ColumnDef::new(TestSuite::TotalErrors).integer())
                    .col(ColumnDef::new(TestSuite::TotalSkipped).integer())
                    .col(
                        ColumnDef::new(TestSuite::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestSuite::Table, TestSuite::TestReportId)
                            .to(TestReport::Table, TestReport::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_suite_report_id")
                    .table(TestSuite::Table)
                    .col(TestSuite::TestReportId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestSuite::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TestSuite {
    #[sea_orm(iden = "test_suites")]
    Table,
    Id,
    TestReportId,
    Name,
    Duration,
    TotalTests,
    TotalFailures,
    TotalErrors,
    TotalSkipped,
    CreatedAt,
}
