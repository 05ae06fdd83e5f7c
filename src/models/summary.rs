//! View models for summaries, trends and report listings.
//!
//! Entities are never handed out directly; every response is built by a pure
//! entity-to-view mapping. Percentage fields are pre-formatted strings
//! (`"80.00%"`) everywhere except trend points, which keep raw fractional
//! rates for client-side charting.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Latest test-report state for a branch.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TestSnapshot {
    pub report_id: Uuid,
    /// Effective date: explicit result timestamp when present, else ingestion time.
    pub date: DateTime<Utc>,
    pub duration: Option<Decimal>,
    pub total_tests: Option<i32>,
    /// Always derived: tests - failures - errors - skipped.
    pub total_passed: Option<i32>,
    pub total_failures: Option<i32>,
    pub total_errors: Option<i32>,
    pub total_skipped: Option<i32>,
}

/// Latest coverage-report state for a branch.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CoverageSnapshot {
    pub report_id: Uuid,
    pub date: DateTime<Utc>,
    /// Formatted percentage, e.g. "80.00%".
    pub branch_rate: Option<String>,
    pub line_rate: Option<String>,
}

/// Branch listing entry with current-state summaries.
///
/// A missing half means "no report of that kind yet", which is distinct
/// from a report with zero counts.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BranchSummary {
    pub id: Uuid,
    pub name: String,
    pub is_primary: bool,
    pub tests: Option<TestSnapshot>,
    pub coverage: Option<CoverageSnapshot>,
}

/// One day-bucketed trend point for test reports.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TestTrendPoint {
    pub date: NaiveDate,
    pub total_tests: Decimal,
    pub total_failures: Decimal,
    pub total_errors: Decimal,
    pub total_skipped: Decimal,
    /// Derived from the bucket means, not averaged independently.
    pub total_passed: Decimal,
}

/// One day-bucketed trend point for coverage reports (raw fractional rates).
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CoverageTrendPoint {
    pub date: NaiveDate,
    pub branch_rate: Option<Decimal>,
    pub line_rate: Option<Decimal>,
}

/// Combined trend payload for an organization, repo or branch scope.
///
/// `None` halves mean "no reports in the window", never an empty series.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TrendResponse {
    pub tests: Option<Vec<TestTrendPoint>>,
    pub coverage: Option<Vec<CoverageTrendPoint>>,
}

/// Test report list entry, sorted by effective date descending.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TestReportListItem {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub duration: Option<Decimal>,
    pub total_tests: Option<i32>,
    pub total_passed: Option<i32>,
    pub total_failures: Option<i32>,
    pub total_errors: Option<i32>,
    pub total_skipped: Option<i32>,
}

/// Case row inside a test report drilldown, in document order.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TestCaseView {
    pub name: String,
    pub class_name: Option<String>,
    pub duration: Option<Decimal>,
    pub result: String,
    pub failure_message: Option<String>,
    pub failure_type: Option<String>,
    pub stack_trace: Option<String>,
}

/// Suite block inside a test report drilldown.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TestSuiteView {
    pub id: Uuid,
    pub name: String,
    pub duration: Option<Decimal>,
    pub total_tests: Option<i32>,
    pub total_failures: Option<i32>,
    pub total_errors: Option<i32>,
    pub total_skipped: Option<i32>,
    pub cases: Vec<TestCaseView>,
}

/// Test report drilldown: header totals plus suites with their cases.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TestDetailResponse {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub duration: Option<Decimal>,
    pub total_tests: Option<i32>,
    pub total_passed: Option<i32>,
    pub total_failures: Option<i32>,
    pub total_errors: Option<i32>,
    pub total_skipped: Option<i32>,
    pub suites: Vec<TestSuiteView>,
}

/// Coverage report list entry.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CoverageReportListItem {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub branch_rate: Option<String>,
    pub line_rate: Option<String>,
}

/// Per-file coverage row; detail lists sort ascending by line rate so the
/// worst-covered files surface first.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CoverageFileView {
    pub file_name: String,
    pub line_rate: Option<String>,
    pub branch_rate: Option<String>,
}

/// Coverage report detail with its file rows.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CoverageDetailResponse {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub branch_rate: Option<String>,
    pub line_rate: Option<String>,
    pub total_lines: Option<i32>,
    pub valid_lines: Option<i32>,
    pub complexity: Option<Decimal>,
    pub files: Vec<CoverageFileView>,
}
