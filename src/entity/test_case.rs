//! TestCase entity for SeaORM.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "test_cases")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub test_suite_id: Uuid,
    /// Document order within the suite; drilldown views preserve it.
    pub position: i32,
    pub name: String,
    pub class_name: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 6)))", nullable)]
    pub duration: Option<Decimal>,
    /// One of `success`, `failure`, `error`, `skipped`.
    pub result: String,
    pub failure_message: Option<String>,
    pub failure_type: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub stack_trace: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::test_suite::Entity",
        from = "Column::TestSuiteId",
        to = "super::test_suite::Column::Id",
        on_delete = "Cascade"
    )]
    TestSuite,
}

impl Related<super::test_suite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TestSuite.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
