//! Branch-vs-baseline comparison payloads.
//!
//! Either side is `None` when that branch has no report of the kind; the
//! difference is `None` whenever either side is missing.

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

/// One side of a test comparison, derived from that branch's latest report.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TestSide {
    pub total_passed: Option<i32>,
    pub total_failures: Option<i32>,
    pub total_errors: Option<i32>,
    pub total_skipped: Option<i32>,
}

/// Signed field-by-field deltas (target minus baseline). A field is `None`
/// when it is absent on either side.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TestDifference {
    pub total_passed: Option<i32>,
    pub total_failures: Option<i32>,
    pub total_errors: Option<i32>,
    pub total_skipped: Option<i32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TestComparison {
    pub branch: Option<TestSide>,
    pub primary_branch: Option<TestSide>,
    pub difference: Option<TestDifference>,
}

/// One side of a coverage comparison with formatted percentages.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CoverageSide {
    pub branch_rate: Option<String>,
    pub line_rate: Option<String>,
}

/// Percentage-point deltas computed on the rounded percent values.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CoverageDifference {
    pub branch_rate: Option<Decimal>,
    pub line_rate: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CoverageComparison {
    pub branch: Option<CoverageSide>,
    pub primary_branch: Option<CoverageSide>,
    pub difference: Option<CoverageDifference>,
}

/// Full comparison response for a branch against its repo's primary branch.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ComparisonResponse {
    pub tests: TestComparison,
    pub coverage: CoverageComparison,
}
