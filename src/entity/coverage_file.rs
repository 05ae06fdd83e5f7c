//! CoverageFile entity for SeaORM.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "coverage_files")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub coverage_report_id: Uuid,
    pub file_name: String,
    #[sea_orm(column_type = "Decimal(Some((12, 6)))", nullable)]
    pub line_rate: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((12, 6)))", nullable)]
    pub branch_rate: Option<Decimal>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::coverage_report::Entity",
        from = "Column::CoverageReportId",
        to = "super::coverage_report::Column::Id",
        on_delete = "Cascade"
    )]
    CoverageReport,
}

impl Related<super::coverage_report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CoverageReport.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
