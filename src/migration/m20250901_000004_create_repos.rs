//! Create repos table.

use sea_orm_migration::prelude::*;

use super::m20250901_000001_create_organizations::Organization;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Repo::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Repo::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Repo::OrganizationId).uuid().not_null())
                    .col(ColumnDef::new(Repo::Name).string().not_null())
                    .col(
                        ColumnDef::new(Repo::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Repo::Table, Repo::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Name unique within an organization; find-or-create relies on this.
        manager
            .create_index(
                Index::create()
                    .name("idx_repo_org_name")
                    .table(Repo::Table)
                    .col(Repo::OrganizationId)
                    .col(Repo::Name)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Repo::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Repo {
    #[sea_orm(iden = "repos")]
    Table,
    Id,
    OrganizationId,
    Name,
    CreatedAt,
}
