//! Create branches table.

use sea_orm_migration::prelude::*;

use super::m20250901_000004_create_repos::Repo;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Branch::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Branch::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Branch::RepoId).uuid().not_null())
                    .col(ColumnDef::new(Branch::Name).string().not_null())
                    .col(
                        ColumnDef::new(Branch::IsPrimary)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Branch::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Branch::Table, Branch::RepoId)
                            .to(Repo::Table, Repo::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_branch_repo_name")
                    .table(Branch::Table)
                    .col(Branch::RepoId)
                    .col(Branch::Name)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Branch::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Branch {
    #[sea_orm(iden = "branches")]
    Table,
    Id,
    RepoId,
    Name,
    IsPrimary,
    CreatedAt,
}
