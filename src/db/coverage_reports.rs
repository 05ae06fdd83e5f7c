//! Database queries for coverage reports and per-file rows.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoSimpleExpr, JoinType, Order,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

use crate::entity::branch;
use crate::entity::coverage_file::{self, Entity as CoverageFile};
use crate::entity::coverage_report::{self, Entity as CoverageReport};
use crate::entity::repo;
use crate::error::{AppError, AppResult};
use crate::models::ParsedCoverageReport;

use super::{DbPool, TrendScope};

/// Persist one parsed coverage run with its per-file rows. A document without
/// a timestamp gets the upload time as its result time.
pub async fn insert_coverage_report_tree<C: ConnectionTrait>(
    conn: &C,
    branch_id: Uuid,
    parsed: &ParsedCoverageReport,
) -> AppResult<coverage_report::Model> {
    let now = Utc::now();

    let report = coverage_report::ActiveModel {
        id: Set(Uuid::now_v7()),
        branch_id: Set(branch_id),
        result_time: Set(Some(parsed.result_time.unwrap_or(now))),
        branch_rate: Set(parsed.branch_rate),
        line_rate: Set(parsed.line_rate),
        total_lines: Set(parsed.total_lines),
        valid_lines: Set(parsed.valid_lines),
        complexity: Set(parsed.complexity),
        created_at: Set(now),
    }
    .insert(conn)
    .await
    .map_err(|e| AppError::Database(format!("Failed to insert coverage report: {}", e)))?;

    let files: Vec<coverage_file::ActiveModel> = parsed
        .files
        .iter()
        .map(|file| coverage_file::ActiveModel {
            id: Set(Uuid::now_v7()),
            coverage_report_id: Set(report.id),
            file_name: Set(file.file_name.clone()),
            line_rate: Set(file.line_rate),
            branch_rate: Set(file.branch_rate),
            created_at: Set(now),
        })
        .collect();

    CoverageFile::insert_many(files)
        .on_empty_do_nothing()
        .exec(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert coverage files: {}", e)))?;

    Ok(report)
}

impl DbPool {
    /// List a branch's coverage reports, newest effective date first.
    pub async fn list_coverage_reports(
        &self,
        branch_id: Uuid,
    ) -> AppResult<Vec<coverage_report::Model>> {
        CoverageReport::find()
            .filter(coverage_report::Column::BranchId.eq(branch_id))
            .order_by(
                SimpleExpr::from(Func::coalesce([
                    coverage_report::Column::ResultTime.into_simple_expr(),
                    coverage_report::Column::CreatedAt.into_simple_expr(),
                ])),
                Order::Desc,
            )
            .order_by_desc(coverage_report::Column::Id)
            .all(&self.conn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to list coverage reports: {}", e)))
    }

    /// Get the most recently ingested coverage report of a branch.
    pub async fn latest_coverage_report(
        &self,
        branch_id: Uuid,
    ) -> AppResult<Option<coverage_report::Model>> {
        CoverageReport::find()
            .filter(coverage_report::Column::BranchId.eq(branch_id))
            .order_by_desc(coverage_report::Column::CreatedAt)
            .order_by_desc(coverage_report::Column::Id)
            .one(&self.conn)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to get latest coverage report: {}", e))
            })
    }

    /// Get a coverage report header by id.
    pub async fn get_coverage_report(
        &self,
        id: Uuid,
    ) -> AppResult<Option<coverage_report::Model>> {
        CoverageReport::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to get coverage report: {}", e)))
    }

    /// Fetch coverage reports inside a trend window for the given scope. The
    /// window filters on ingestion time, the same clock trend buckets key on.
    pub async fn coverage_reports_since(
        &self,
        scope: TrendScope,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<coverage_report::Model>> {
        let mut query = CoverageReport::find();

        match scope {
            TrendScope::Branch(id) => {
                query = query.filter(coverage_report::Column::BranchId.eq(id));
            }
            TrendScope::Repo(id) => {
                query = query
                    .join(JoinType::InnerJoin, coverage_report::Relation::Branch.def())
                    .filter(branch::Column::RepoId.eq(id));
            }
            TrendScope::Organization(id) => {
                query = query
                    .join(JoinType::InnerJoin, coverage_report::Relation::Branch.def())
                    .join(JoinType::InnerJoin, branch::Relation::Repo.def())
                    .filter(repo::Column::OrganizationId.eq(id));
            }
        }

        query
            .filter(coverage_report::Column::CreatedAt.gte(cutoff))
            .order_by_asc(coverage_report::Column::CreatedAt)
            .all(&self.conn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to query coverage trend: {}", e)))
    }

    /// Load a report's file rows, worst line coverage first.
    pub async fn coverage_files_for_report(
        &self,
        report_id: Uuid,
    ) -> AppResult<Vec<coverage_file::Model>> {
        CoverageFile::find()
            .filter(coverage_file::Column::CoverageReportId.eq(report_id))
            .order_by_asc(coverage_file::Column::LineRate)
            .order_by_asc(coverage_file::Column::FileName)
            .all(&self.conn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to load coverage files: {}", e)))
    }
}
