//! CoverageReport entity for SeaORM.
//!
//! Rates are fractional (0.0-1.0) decimals; percentage formatting happens
//! only at presentation time.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "coverage_reports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub branch_id: Uuid,
    pub result_time: Option<DateTimeUtc>,
    #[sea_orm(column_type = "Decimal(Some((12, 6)))", nullable)]
    pub branch_rate: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((12, 6)))", nullable)]
    pub line_rate: Option<Decimal>,
    pub total_lines: Option<i32>,
    pub valid_lines: Option<i32>,
    #[sea_orm(column_type = "Decimal(Some((12, 6)))", nullable)]
    pub complexity: Option<Decimal>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::branch::Entity",
        from = "Column::BranchId",
        to = "super::branch::Column::Id",
        on_delete = "Cascade"
    )]
    Branch,
    #[sea_orm(has_many = "super::coverage_file::Entity")]
    CoverageFiles,
}

impl Related<super::branch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Branch.def()
    }
}

impl Related<super::coverage_file::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CoverageFiles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
