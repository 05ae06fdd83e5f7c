//! Branch entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "branches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub repo_id: Uuid,
    /// Unique within the owning repository.
    pub name: String,
    /// At most one primary branch per repo; guaranteed by the promotion
    /// transaction, not by a storage constraint.
    pub is_primary: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::repo::Entity",
        from = "Column::RepoId",
        to = "super::repo::Column::Id",
        on_delete = "Cascade"
    )]
    Repo,
    #[sea_orm(has_many = "super::test_report::Entity")]
    TestReports,
    #[sea_orm(has_many = "super::coverage_report::Entity")]
    CoverageReports,
}

impl Related<super::repo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Repo.def()
    }
}

impl Related<super::test_report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TestReports.def()
    }
}

impl Related<super::coverage_report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CoverageReports.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
