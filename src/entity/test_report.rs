//! TestReport entity for SeaORM.
//!
//! Header row for one ingested JUnit-style run. Totals are stored exactly as
//! parsed; the pass count is always derived, never stored.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "test_reports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub branch_id: Uuid,
    /// Timestamp reported by the run itself, when present.
    pub result_time: Option<DateTimeUtc>,
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
        belongs_to = "super::branch::Entity",
        from = "Column::BranchId",
        to = "super::branch::Column::Id",
        on_delete = "Cascade"
    )]
    Branch,
    #[sea_orm(has_many = "super::test_suite::Entity")]
    TestSuites,
}

impl Related<super::branch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Branch.def()
    }
}

impl Related<super::test_suite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TestSuites.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
