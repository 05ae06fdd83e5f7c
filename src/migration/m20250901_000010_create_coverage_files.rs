//! Create coverage_files table.

use sea_orm_migration::prelude::*;

use super::m20250901_000009_create_coverage_reports::CoverageReport;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CoverageFile::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CoverageFile::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CoverageFile::CoverageReportId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CoverageFile::FileName).string().not_null())
                    .col(ColumnDef::new(CoverageFile::LineRate).decimal_len(12, 6))
                    .col(ColumnDef::new(CoverageFile::BranchRate).decimal_len(12, 6))
                    .col(
                        ColumnDef::new(CoverageFile::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CoverageFile::Table, CoverageFile::CoverageReportId)
                            .to(CoverageReport::Table, CoverageReport::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_coverage_file_report_id")
                    .table(CoverageFile::Table)
                    .col(CoverageFile::CoverageReportId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CoverageFile::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum CoverageFile {
    #[sea_orm(iden = "coverage_files")]
    Table,
    Id,
    CoverageReportId,
    FileName,
    LineRate,
    BranchRate,
    CreatedAt,
}
