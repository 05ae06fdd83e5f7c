//! Report parser: JUnit-style and Cobertura-style XML into intermediate records.
//!
//! Pure transform, no side effects. Validation runs in three gates:
//! declared MIME type, XML well-formedness, expected schema root. Numeric
//! attributes are carried as decimals (or counts), never truncated through
//! floats, and absent attributes stay `None` for the ingestion writer to
//! store verbatim.

use chrono::{DateTime, NaiveDateTime, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::{
    CaseResult, ParsedCoverageFile, ParsedCoverageReport, ParsedSuite, ParsedTestCase,
    ParsedTestReport,
};

/// Schema root for JUnit-style test reports.
const TEST_ROOT: &str = "testsuites";

/// Schema root for Cobertura-style coverage reports.
const COVERAGE_ROOT: &str = "coverage";

// ============================================================================
// JUnit XML Schema Structs
// ============================================================================

/// Root `<testsuites>` element.
#[derive(Debug, Deserialize)]
struct TestSuitesXml {
    #[serde(rename = "@timestamp")]
    timestamp: Option<String>,
    #[serde(rename = "@time")]
    time: Option<String>,
    #[serde(rename = "@tests")]
    tests: Option<String>,
    #[serde(rename = "@failures")]
    failures: Option<String>,
    #[serde(rename = "@errors")]
    errors: Option<String>,
    #[serde(rename = "@skipped")]
    skipped: Option<String>,
    /// A single child deserializes into a one-element Vec, so cardinality
    /// never leaks into the iteration logic below.
    #[serde(rename = "testsuite", default)]
    testsuite: Vec<TestSuiteXml>,
}

/// `<testsuite>` element.
#[derive(Debug, Deserialize)]
struct TestSuiteXml {
    #[serde(rename = "@name")]
    name: Option<String>,
    #[serde(rename = "@time")]
    time: Option<String>,
    #[serde(rename = "@tests")]
    tests: Option<String>,
    #[serde(rename = "@failures")]
    failures: Option<String>,
    #[serde(rename = "@errors")]
    errors: Option<String>,
    #[serde(rename = "@skipped")]
    skipped: Option<String>,
    #[serde(rename = "testcase", default)]
    testcase: Vec<TestCaseXml>,
}

/// `<testcase>` element.
#[derive(Debug, Deserialize)]
struct TestCaseXml {
    #[serde(rename = "@name")]
    name: Option<String>,
    #[serde(rename = "@classname")]
    classname: Option<String>,
    #[serde(rename = "@time")]
    time: Option<String>,
    failure: Option<CaseDetailXml>,
    error: Option<CaseDetailXml>,
    skipped: Option<CaseDetailXml>,
}

/// `<failure>` / `<error>` / `<skipped>` child with message, type and body.
#[derive(Debug, Deserialize)]
struct CaseDetailXml {
    #[serde(rename = "@message")]
    message: Option<String>,
    #[serde(rename = "@type")]
    kind: Option<String>,
    #[serde(rename = "$text")]
    body: Option<String>,
}

// ============================================================================
// Cobertura XML Schema Structs
// ============================================================================

/// Root `<coverage>` element.
#[derive(Debug, Deserialize)]
struct CoverageXml {
    #[serde(rename = "@timestamp")]
    timestamp: Option<String>,
    #[serde(rename = "@branch-rate")]
    branch_rate: Option<String>,
    #[serde(rename = "@line-rate")]
    line_rate: Option<String>,
    #[serde(rename = "@lines-covered")]
    lines_covered: Option<String>,
    #[serde(rename = "@lines-valid")]
    lines_valid: Option<String>,
    #[serde(rename = "@complexity")]
    complexity: Option<String>,
    packages: Option<PackagesXml>,
}

#[derive(Debug, Deserialize)]
struct PackagesXml {
    #[serde(rename = "package", default)]
    package: Vec<PackageXml>,
}

#[derive(Debug, Deserialize)]
struct PackageXml {
    classes: Option<ClassesXml>,
}

#[derive(Debug, Deserialize)]
struct ClassesXml {
    #[serde(rename = "class", default)]
    class: Vec<ClassXml>,
}

/// `<class>` element; one per covered source file.
#[derive(Debug, Deserialize)]
struct ClassXml {
    #[serde(rename = "@filename")]
    filename: Option<String>,
    #[serde(rename = "@line-rate")]
    line_rate: Option<String>,
    #[serde(rename = "@branch-rate")]
    branch_rate: Option<String>,
}

// ============================================================================
// Parsing Entry Points
// ============================================================================

/// Parse a JUnit-style test report from an uploaded buffer.
pub fn parse_test_report(
    data: &[u8],
    content_type: Option<&str>,
) -> AppResult<ParsedTestReport> {
    let text = validate_document(data, content_type, TEST_ROOT)?;

    let doc: TestSuitesXml =
        quick_xml::de::from_str(text).map_err(|_| AppError::InvalidFormat)?;

    let suites = doc
        .testsuite
        .iter()
        // A suite declaring zero tests is discarded wholly; its cases are
        // not even inspected.
        .filter(|s| parse_count(&s.tests) != Some(0))
        .map(convert_suite)
        .collect();

    Ok(ParsedTestReport {
        result_time: doc.timestamp.as_deref().and_then(parse_junit_timestamp),
        duration: parse_decimal(&doc.time),
        total_tests: parse_count(&doc.tests),
        total_failures: parse_count(&doc.failures),
        total_errors: parse_count(&doc.errors),
        total_skipped: parse_count(&doc.skipped),
        suites,
    })
}

/// Parse a Cobertura-style coverage report from an uploaded buffer.
pub fn parse_coverage_report(
    data: &[u8],
    content_type: Option<&str>,
) -> AppResult<ParsedCoverageReport> {
    let text = validate_document(data, content_type, COVERAGE_ROOT)?;

    let doc: CoverageXml = quick_xml::de::from_str(text).map_err(|_| AppError::InvalidFormat)?;

    let files = doc
        .packages
        .iter()
        .flat_map(|p| p.package.iter())
        .flat_map(|p| p.classes.iter())
        .flat_map(|c| c.class.iter())
        .filter_map(|class| {
            // A class without a filename cannot be keyed to a file row.
            let file_name = class.filename.clone()?;
            Some(ParsedCoverageFile {
                file_name,
                line_rate: parse_decimal(&class.line_rate),
                branch_rate: parse_decimal(&class.branch_rate),
            })
        })
        .collect();

    Ok(ParsedCoverageReport {
        result_time: doc.timestamp.as_deref().and_then(parse_epoch_millis),
        branch_rate: parse_decimal(&doc.branch_rate),
        line_rate: parse_decimal(&doc.line_rate),
        total_lines: parse_count(&doc.lines_covered),
        valid_lines: parse_count(&doc.lines_valid),
        complexity: parse_decimal(&doc.complexity),
        files,
    })
}

// ============================================================================
// Validation Gates
// ============================================================================

/// Run the MIME, well-formedness and schema-root gates, returning the
/// document as text on success.
fn validate_document<'a>(
    data: &'a [u8],
    content_type: Option<&str>,
    expected_root: &str,
) -> AppResult<&'a str> {
    if !is_xml_content_type(content_type) {
        return Err(AppError::InvalidFileType);
    }

    let text = std::str::from_utf8(data).map_err(|_| AppError::InvalidXml)?;

    let root = scan_well_formed(text)?;
    if root != expected_root {
        return Err(AppError::InvalidFormat);
    }

    Ok(text)
}

/// Check the declared MIME type, ignoring parameters such as charset.
fn is_xml_content_type(content_type: Option<&str>) -> bool {
    let Some(declared) = content_type else {
        return false;
    };
    let essence = declared.split(';').next().unwrap_or("").trim();
    essence.eq_ignore_ascii_case("application/xml") || essence.eq_ignore_ascii_case("text/xml")
}

/// Scan every event to prove well-formedness and capture the root element
/// name. Any reader error (mismatched tags, bad syntax) maps to InvalidXml.
fn scan_well_formed(text: &str) -> AppResult<String> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().check_end_names = true;

    let mut root: Option<String> = None;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if root.is_none() {
                    root = Some(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                }
            }
            Ok(Event::Empty(e)) => {
                if root.is_none() {
                    root = Some(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(_) => return Err(AppError::InvalidXml),
        }
    }

    root.ok_or(AppError::InvalidXml)
}

// ============================================================================
// Conversion Helpers
// ============================================================================

fn convert_suite(suite: &TestSuiteXml) -> ParsedSuite {
    ParsedSuite {
        name: suite.name.clone().unwrap_or_default(),
        duration: parse_decimal(&suite.time),
        total_tests: parse_count(&suite.tests),
        total_failures: parse_count(&suite.failures),
        total_errors: parse_count(&suite.errors),
        total_skipped: parse_count(&suite.skipped),
        cases: suite.testcase.iter().map(convert_case).collect(),
    }
}

fn convert_case(case: &TestCaseXml) -> ParsedTestCase {
    let (result, detail) = if let Some(failure) = &case.failure {
        (CaseResult::Failure, Some(failure))
    } else if let Some(error) = &case.error {
        (CaseResult::Error, Some(error))
    } else if let Some(skipped) = &case.skipped {
        (CaseResult::Skipped, Some(skipped))
    } else {
        (CaseResult::Success, None)
    };

    ParsedTestCase {
        name: case.name.clone().unwrap_or_default(),
        class_name: case.classname.clone(),
        duration: parse_decimal(&case.time),
        result,
        failure_message: detail.and_then(|d| d.message.clone()),
        failure_type: detail.and_then(|d| d.kind.clone()),
        stack_trace: detail.and_then(|d| d.body.as_deref().map(|b| b.trim().to_string())),
    }
}

fn parse_decimal(value: &Option<String>) -> Option<Decimal> {
    value.as_deref().and_then(|s| s.trim().parse().ok())
}

fn parse_count(value: &Option<String>) -> Option<i32> {
    value.as_deref().and_then(|s| s.trim().parse().ok())
}

/// JUnit timestamps come as ISO-8601, with or without an offset.
fn parse_junit_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Cobertura timestamps are epoch milliseconds.
fn parse_epoch_millis(raw: &str) -> Option<DateTime<Utc>> {
    let millis: i64 = raw.trim().parse().ok()?;
    DateTime::from_timestamp_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const XML_MIME: Option<&str> = Some("application/xml");

    fn junit_doc() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuites timestamp="2026-08-01T10:15:30" time="12.5" tests="5" failures="1" errors="0" skipped="1">
  <testsuite name="unit" time="8.25" tests="4" failures="1" errors="0" skipped="1">
    <testcase name="adds" classname="calc" time="0.5"/>
    <testcase name="subtracts" classname="calc" time="0.25">
      <failure message="expected 1, got 2" type="AssertionError">stack line 1
stack line 2</failure>
    </testcase>
    <testcase name="divides" classname="calc" time="0.1">
      <skipped message="not on CI"/>
    </testcase>
    <testcase name="multiplies" classname="calc" time="0.4"/>
  </testsuite>
  <testsuite name="empty" time="0" tests="0">
    <testcase name="ghost" classname="calc" time="0.1"/>
  </testsuite>
</testsuites>"#
    }

    #[test]
    fn test_rejects_non_xml_content_type() {
        let err = parse_test_report(b"<testsuites/>", Some("application/json")).unwrap_err();
        assert!(matches!(err, AppError::InvalidFileType));

        let err = parse_test_report(b"<testsuites/>", None).unwrap_err();
        assert!(matches!(err, AppError::InvalidFileType));
    }

    #[test]
    fn test_accepts_charset_parameter() {
        let parsed =
            parse_test_report(b"<testsuites/>", Some("application/xml; charset=utf-8")).unwrap();
        assert!(parsed.suites.is_empty());
    }

    #[test]
    fn test_rejects_malformed_xml() {
        let err = parse_test_report(b"<testsuites><testsuite></testsuites>", XML_MIME).unwrap_err();
        assert!(matches!(err, AppError::InvalidXml));

        let err = parse_test_report(b"not xml at all", XML_MIME).unwrap_err();
        assert!(matches!(err, AppError::InvalidXml));
    }

    #[test]
    fn test_rejects_wrong_schema_root() {
        // Well-formed but not a test report.
        let err = parse_test_report(b"<coverage line-rate=\"0.8\"/>", XML_MIME).unwrap_err();
        assert!(matches!(err, AppError::InvalidFormat));

        // And the coverage endpoint rejects a test document.
        let err = parse_coverage_report(b"<testsuites/>", XML_MIME).unwrap_err();
        assert!(matches!(err, AppError::InvalidFormat));
    }

    #[test]
    fn test_parses_root_totals_verbatim() {
        let parsed = parse_test_report(junit_doc().as_bytes(), XML_MIME).unwrap();
        assert_eq!(parsed.total_tests, Some(5));
        assert_eq!(parsed.total_failures, Some(1));
        assert_eq!(parsed.total_errors, Some(0));
        assert_eq!(parsed.total_skipped, Some(1));
        assert_eq!(parsed.duration, Some(Decimal::from_str("12.5").unwrap()));
        assert!(parsed.result_time.is_some());
    }

    #[test]
    fn test_absent_attributes_stay_none() {
        let parsed = parse_test_report(b"<testsuites tests=\"3\"/>", XML_MIME).unwrap();
        assert_eq!(parsed.total_tests, Some(3));
        assert_eq!(parsed.total_failures, None);
        assert_eq!(parsed.total_skipped, None);
        assert_eq!(parsed.result_time, None);
    }

    #[test]
    fn test_drops_zero_test_suites_entirely() {
        let parsed = parse_test_report(junit_doc().as_bytes(), XML_MIME).unwrap();
        assert_eq!(parsed.suites.len(), 1);
        assert_eq!(parsed.suites[0].name, "unit");
        assert_eq!(parsed.suites[0].cases.len(), 4);
    }

    #[test]
    fn test_single_suite_normalizes_to_sequence() {
        let doc = r#"<testsuites tests="1">
  <testsuite name="only" tests="1">
    <testcase name="solo" classname="calc"/>
  </testsuite>
</testsuites>"#;
        let parsed = parse_test_report(doc.as_bytes(), XML_MIME).unwrap();
        assert_eq!(parsed.suites.len(), 1);
        assert_eq!(parsed.suites[0].cases.len(), 1);
        assert_eq!(parsed.suites[0].cases[0].result, CaseResult::Success);
    }

    #[test]
    fn test_failure_details_captured() {
        let parsed = parse_test_report(junit_doc().as_bytes(), XML_MIME).unwrap();
        let failing = &parsed.suites[0].cases[1];
        assert_eq!(failing.result, CaseResult::Failure);
        assert_eq!(failing.failure_message.as_deref(), Some("expected 1, got 2"));
        assert_eq!(failing.failure_type.as_deref(), Some("AssertionError"));
        let trace = failing.stack_trace.as_deref().unwrap();
        assert!(trace.contains("stack line 1"));
        assert!(trace.contains("stack line 2"));

        let passing = &parsed.suites[0].cases[0];
        assert_eq!(passing.result, CaseResult::Success);
        assert_eq!(passing.failure_message, None);

        let skipped = &parsed.suites[0].cases[2];
        assert_eq!(skipped.result, CaseResult::Skipped);
        assert_eq!(skipped.failure_message.as_deref(), Some("not on CI"));
    }

    #[test]
    fn test_parses_coverage_document() {
        let doc = r#"<coverage timestamp="1722500000000" branch-rate="0.75" line-rate="0.8215" lines-covered="821" lines-valid="1000" complexity="3.2">
  <packages>
    <package name="core">
      <classes>
        <class filename="src/lib.rs" line-rate="0.9" branch-rate="0.8"/>
        <class filename="src/parser.rs" line-rate="0.5" branch-rate="0.4"/>
      </classes>
    </package>
  </packages>
</coverage>"#;
        let parsed = parse_coverage_report(doc.as_bytes(), XML_MIME).unwrap();
        assert_eq!(
            parsed.line_rate,
            Some(Decimal::from_str("0.8215").unwrap())
        );
        assert_eq!(parsed.total_lines, Some(821));
        assert_eq!(parsed.valid_lines, Some(1000));
        assert_eq!(parsed.files.len(), 2);
        assert_eq!(parsed.files[1].file_name, "src/parser.rs");
        assert_eq!(
            parsed.result_time.unwrap(),
            DateTime::from_timestamp_millis(1_722_500_000_000).unwrap()
        );
    }

    #[test]
    fn test_coverage_missing_timestamp_left_to_ingestion() {
        let parsed =
            parse_coverage_report(b"<coverage line-rate=\"1.0\"/>", XML_MIME).unwrap();
        assert_eq!(parsed.result_time, None);
        assert!(parsed.files.is_empty());
    }

    #[test]
    fn test_single_package_and_class_normalize() {
        let doc = r#"<coverage line-rate="0.5">
  <packages>
    <package>
      <classes>
        <class filename="src/main.rs" line-rate="0.5" branch-rate="0.25"/>
      </classes>
    </package>
  </packages>
</coverage>"#;
        let parsed = parse_coverage_report(doc.as_bytes(), XML_MIME).unwrap();
        assert_eq!(parsed.files.len(), 1);
        assert_eq!(parsed.files[0].file_name, "src/main.rs");
    }
}
