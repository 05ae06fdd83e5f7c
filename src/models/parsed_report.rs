//! Intermediate records produced by the report parser.
//!
//! These carry attribute values exactly as the document declared them:
//! absent attributes stay `None` and are never zero-defaulted here.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Outcome of a single test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseResult {
    Success,
    Failure,
    Error,
    Skipped,
}

impl CaseResult {
    /// Get the result as the string persisted in `test_cases.result`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Error => "error",
            Self::Skipped => "skipped",
        }
    }
}

/// One parsed JUnit-style test run.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTestReport {
    pub result_time: Option<DateTime<Utc>>,
    pub duration: Option<Decimal>,
    pub total_tests: Option<i32>,
    pub total_failures: Option<i32>,
    pub total_errors: Option<i32>,
    pub total_skipped: Option<i32>,
    /// Suites whose `tests` attribute equals zero are already dropped.
    pub suites: Vec<ParsedSuite>,
}

/// One retained `testsuite` element.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSuite {
    pub name: String,
    pub duration: Option<Decimal>,
    pub total_tests: Option<i32>,
    pub total_failures: Option<i32>,
    pub total_errors: Option<i32>,
    pub total_skipped: Option<i32>,
    /// Cases in document order.
    pub cases: Vec<ParsedTestCase>,
}

/// One `testcase` element.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTestCase {
    pub name: String,
    pub class_name: Option<String>,
    pub duration: Option<Decimal>,
    pub result: CaseResult,
    pub failure_message: Option<String>,
    pub failure_type: Option<String>,
    pub stack_trace: Option<String>,
}

/// One parsed Cobertura-style coverage run.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCoverageReport {
    /// Root `timestamp` (epoch milliseconds) when present; the ingestion
    /// writer substitutes the upload time otherwise.
    pub result_time: Option<DateTime<Utc>>,
    pub branch_rate: Option<Decimal>,
    pub line_rate: Option<Decimal>,
    pub total_lines: Option<i32>,
    pub valid_lines: Option<i32>,
    pub complexity: Option<Decimal>,
    pub files: Vec<ParsedCoverageFile>,
}

/// One `class` element inside `packages.package[].classes`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCoverageFile {
    pub file_name: String,
    pub line_rate: Option<Decimal>,
    pub branch_rate: Option<Decimal>,
}
