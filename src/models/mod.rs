//! Domain models for Testdeck.

pub mod comparison;
pub mod parsed_report;
pub mod requests;
pub mod summary;

// Re-export commonly used types
pub use comparison::{
    ComparisonResponse, CoverageComparison, CoverageDifference, CoverageSide, TestComparison,
    TestDifference, TestSide,
};
pub use parsed_report::{
    CaseResult, ParsedCoverageFile, ParsedCoverageReport, ParsedSuite, ParsedTestCase,
    ParsedTestReport,
};
pub use requests::{
    CreateRepoRequest, PromoteBranchRequest, RegisterRequest, RegisterResponse, UploadResponse,
};
pub use summary::{
    BranchSummary, CoverageDetailResponse, CoverageFileView, CoverageReportListItem,
    CoverageSnapshot, CoverageTrendPoint, TestCaseView, TestDetailResponse, TestReportListItem,
    TestSnapshot, TestSuiteView, TestTrendPoint, TrendResponse,
};
