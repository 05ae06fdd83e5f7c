//! TestSuite entity for SeaORM.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "test_suites")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub test_report_id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((12, 6)))", nullable)]
    pub duration: Option<Decimal>,
    pub total_tests: Option<i32>,
    pub total_failures: Option<i32>,
    pub total_errors: Option<i32>,
    pub total_skipped: Option<i32>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::test_report::Entity",
        from = "Column::TestReportId",
        to = "super::test_report::Column::Id",
        on_delete = "Cascade"
    )]
    TestReport,
    #[sea_orm(has_many = "super::test_case::Entity")]
    TestCases,
}

impl Related<super::test_report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TestReport.def()
    }
}

impl Related<super::test_case::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TestCases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
