//! Create test_cases table.

use sea_orm_migration::prelude::*;

use super::m20250901_000007_create_test_suites::TestSuite;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TestCase::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestCase::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TestCase::TestSuiteId).uuid().not_null())
                    .col(ColumnDef::new(TestCase::Position).integer().not_null())
                    .col(ColumnDef::new(TestCase::Name).string().not_null())
                    .col(ColumnDef::new(TestCase::ClassName).string())
                    .col(ColumnDef::new(TestCase::Duration).decimal_len(12, 6))
                    .col(ColumnDef::new(TestCase::Result).string().not_null())
                    .col(ColumnDef::new(TestCase::FailureMessage).string())
                    .col(ColumnDef::new(TestCase::FailureType).string())
                    .col(ColumnDef::new(TestCase::StackTrace).text())
                    .col(
                        ColumnDef::new(TestCase::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestCase::Table, TestCase::TestSuiteId)
                            .to(TestSuite::Table, TestSuite::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_case_suite_id")
                    .table(TestCase::Table)
                    .col(TestCase::TestSuiteId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestCase::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TestCase {
    #[sea_orm(iden = "test_cases")]
    Table,
    Id,
    TestSuiteId,
    Position,
    Name,
    ClassName,
    Duration,
    Result,
    FailureMessage,
    FailureType,
    StackTrace,
    CreatedAt,
}
