//! Database queries for test reports, suites and cases.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoSimpleExpr, JoinType, Order,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

use crate::entity::branch;
use crate::entity::repo;
use crate::entity::test_case::{self, Entity as TestCase};
use crate::entity::test_report::{self, Entity as TestReport};
use crate::entity::test_suite::{self, Entity as TestSuite};
use crate::error::{AppError, AppResult};
use crate::models::ParsedTestReport;

use super::{DbPool, TrendScope};

/// Persist one parsed test run: the header row, its retained suites, and
/// their cases in document order. Runs on the caller's connection so upload
/// ingestion keeps the whole tree inside a single transaction.
pub async fn insert_test_report_tree<C: ConnectionTrait>(
    conn: &C,
    branch_id: Uuid,
    parsed: &ParsedTestReport,
) -> AppResult<test_report::Model> {
    let now = Utc::now();

    let report = test_report::ActiveModel {
        id: Set(Uuid::now_v7()),
        branch_id: Set(branch_id),
        result_time: Set(parsed.result_time),
        duration: Set(parsed.duration),
        total_tests: Set(parsed.total_tests),
        total_failures: Set(parsed.total_failures),
        total_errors: Set(parsed.total_errors),
        total_skipped: Set(parsed.total_skipped),
        created_at: Set(now),
    }
    .insert(conn)
    .await
    .map_err(|e| AppError::Database(format!("Failed to insert test report: {}", e)))?;

    for suite in &parsed.suites {
        let suite_row = test_suite::ActiveModel {
            id: Set(Uuid::now_v7()),
            test_report_id: Set(report.id),
            name: Set(suite.name.clone()),
            duration: Set(suite.duration),
            total_tests: Set(suite.total_tests),
            total_failures: Set(suite.total_failures),
            total_errors: Set(suite.total_errors),
            total_skipped: Set(suite.total_skipped),
            created_at: Set(now),
        }
        .insert(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert test suite: {}", e)))?;

        let cases: Vec<test_case::ActiveModel> = suite
            .cases
            .iter()
            .enumerate()
            .map(|(position, case)| test_case::ActiveModel {
                id: Set(Uuid::now_v7()),
                test_suite_id: Set(suite_row.id),
                position: Set(position as i32),
                name: Set(case.name.clone()),
                class_name: Set(case.class_name.clone()),
                duration: Set(case.duration),
                result: Set(case.result.as_str().to_string()),
                failure_message: Set(case.failure_message.clone()),
                failure_type: Set(case.failure_type.clone()),
                stack_trace: Set(case.stack_trace.clone()),
                created_at: Set(now),
            })
            .collect();

        TestCase::insert_many(cases)
            .on_empty_do_nothing()
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert test cases: {}", e)))?;
    }

    Ok(report)
}

impl DbPool {
    /// List a branch's test reports, newest effective date first.
    pub async fn list_test_reports(&self, branch_id: Uuid) -> AppResult<Vec<test_report::Model>> {
        TestReport::find()
            .filter(test_report::Column::BranchId.eq(branch_id))
            .order_by(
                SimpleExpr::from(Func::coalesce([
                    test_report::Column::ResultTime.into_simple_expr(),
                    test_report::Column::CreatedAt.into_simple_expr(),
                ])),
                Order::Desc,
            )
            .order_by_desc(test_report::Column::Id)
            .all(&self.conn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to list test reports: {}", e)))
    }

    /// Get the most recently ingested test report of a branch.
    pub async fn latest_test_report(
        &self,
        branch_id: Uuid,
    ) -> AppResult<Option<test_report::Model>> {
        TestReport::find()
            .filter(test_report::Column::BranchId.eq(branch_id))
            .order_by_desc(test_report::Column::CreatedAt)
            .order_by_desc(test_report::Column::Id)
            .one(&self.conn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to get latest test report: {}", e)))
    }

    /// Get a test report header by id.
    pub async fn get_test_report(&self, id: Uuid) -> AppResult<Option<test_report::Model>> {
        TestReport::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to get test report: {}", e)))
    }

    /// Fetch test reports inside a trend window for the given scope. The
    /// window filters on ingestion time, the same clock trend buckets key on.
    pub async fn test_reports_since(
        &self,
        scope: TrendScope,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<test_report::Model>> {
        let mut query = TestReport::find();

        match scope {
            TrendScope::Branch(id) => {
                query = query.filter(test_report::Column::BranchId.eq(id));
            }
            TrendScope::Repo(id) => {
                query = query
                    .join(JoinType::InnerJoin, test_report::Relation::Branch.def())
                    .filter(branch::Column::RepoId.eq(id));
            }
            TrendScope::Organization(id) => {
                query = query
                    .join(JoinType::InnerJoin, test_report::Relation::Branch.def())
                    .join(JoinType::InnerJoin, branch::Relation::Repo.def())
                    .filter(repo::Column::OrganizationId.eq(id));
            }
        }

        query
            .filter(test_report::Column::CreatedAt.gte(cutoff))
            .order_by_asc(test_report::Column::CreatedAt)
            .all(&self.conn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to query test trend: {}", e)))
    }

    /// Load a report's suites with their cases, cases in document order.
    pub async fn suites_with_cases(
        &self,
        report_id: Uuid,
    ) -> AppResult<Vec<(test_suite::Model, Vec<test_case::Model>)>> {
        TestSuite::find()
            .filter(test_suite::Column::TestReportId.eq(report_id))
            .find_with_related(TestCase)
            .order_by_asc(test_suite::Column::CreatedAt)
            .order_by_asc(test_suite::Column::Id)
            .order_by_asc(test_case::Column::Position)
            .all(&self.conn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to load suites: {}", e)))
    }
}
