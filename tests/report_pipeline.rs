//! End-to-end pipeline tests: parse uploaded XML documents, then run the
//! aggregation math over the resulting rows the way the read endpoints do.

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use testdeck_lib::entity::{coverage_report, test_report};
use testdeck_lib::models::CaseResult;
use testdeck_lib::services::{aggregation, parser};

const XML_MIME: Option<&str> = Some("application/xml");

const JUNIT_DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuites timestamp="2026-08-10T09:30:00" time="42.75" tests="20" failures="2" errors="1" skipped="1">
  <testsuite name="api" time="30.5" tests="12" failures="2" errors="0" skipped="0">
    <testcase name="creates user" classname="api::users" time="1.2"/>
    <testcase name="rejects duplicate" classname="api::users" time="0.8">
      <failure message="status 200 != 409" type="AssertionError">at api/users.rs:88</failure>
    </testcase>
    <testcase name="lists users" classname="api::users" time="0.5"/>
    <testcase name="updates user" classname="api::users" time="0.9"/>
    <testcase name="deletes user" classname="api::users" time="0.4">
      <failure message="row still present" type="AssertionError">at api/users.rs:120</failure>
    </testcase>
    <testcase name="paginates" classname="api::users" time="0.7"/>
    <testcase name="filters by name" classname="api::users" time="0.6"/>
    <testcase name="sorts by date" classname="api::users" time="0.6"/>
    <testcase name="handles empty page" classname="api::users" time="0.2"/>
    <testcase name="validates email" classname="api::users" time="0.3"/>
    <testcase name="normalizes email" classname="api::users" time="0.3"/>
    <testcase name="rejects bad payload" classname="api::users" time="0.4"/>
  </testsuite>
  <testsuite name="storage" time="12.25" tests="8" failures="0" errors="1" skipped="1">
    <testcase name="connects" classname="storage::pool" time="2.0"/>
    <testcase name="reconnects" classname="storage::pool" time="3.5">
      <error message="connection refused" type="IoError">ECONNREFUSED 127.0.0.1:5432</error>
    </testcase>
    <testcase name="migrates" classname="storage::schema" time="4.0"/>
    <testcase name="rolls back" classname="storage::schema" time="1.0"/>
    <testcase name="vacuum job" classname="storage::maintenance" time="0.1">
      <skipped message="requires superuser"/>
    </testcase>
    <testcase name="checkpoints" classname="storage::maintenance" time="0.5"/>
    <testcase name="snapshots" classname="storage::maintenance" time="0.6"/>
    <testcase name="restores" classname="storage::maintenance" time="0.5"/>
  </testsuite>
  <testsuite name="doc-tests" time="0" tests="0">
    <testcase name="phantom" classname="docs" time="0.0"/>
  </testsuite>
</testsuites>"#;

const COBERTURA_DOC: &str = r#"<?xml version="1.0"?>
<coverage timestamp="1754560000000" branch-rate="0.72" line-rate="0.8543" lines-covered="1709" lines-valid="2000" complexity="4.1">
  <packages>
    <package name="testdeck">
      <classes>
        <class filename="src/services/parser.rs" line-rate="0.95" branch-rate="0.9"/>
        <class filename="src/db/mod.rs" line-rate="0.4" branch-rate="0.3"/>
      </classes>
    </package>
    <package name="testdeck-api">
      <classes>
        <class filename="src/api/repos.rs" line-rate="0.88" branch-rate="0.75"/>
      </classes>
    </package>
  </packages>
</coverage>"#;

fn stored_test_report(
    parsed: &testdeck_lib::models::ParsedTestReport,
    created_at: chrono::DateTime<Utc>,
) -> test_report::Model {
    test_report::Model {
        id: Uuid::now_v7(),
        branch_id: Uuid::now_v7(),
        result_time: parsed.result_time,
        duration: parsed.duration,
        total_tests: parsed.total_tests,
        total_failures: parsed.total_failures,
        total_errors: parsed.total_errors,
        total_skipped: parsed.total_skipped,
        created_at,
    }
}

fn stored_coverage_report(
    parsed: &testdeck_lib::models::ParsedCoverageReport,
    created_at: chrono::DateTime<Utc>,
) -> coverage_report::Model {
    coverage_report::Model {
        id: Uuid::now_v7(),
        branch_id: Uuid::now_v7(),
        result_time: Some(parsed.result_time.unwrap_or(created_at)),
        branch_rate: parsed.branch_rate,
        line_rate: parsed.line_rate,
        total_lines: parsed.total_lines,
        valid_lines: parsed.valid_lines,
        complexity: parsed.complexity,
        created_at,
    }
}

#[test]
fn junit_document_parses_into_retained_suites_and_cases() {
    let parsed = parser::parse_test_report(JUNIT_DOC.as_bytes(), XML_MIME).unwrap();

    // Root totals survive verbatim, including the skipped count.
    assert_eq!(parsed.total_tests, Some(20));
    assert_eq!(parsed.total_failures, Some(2));
    assert_eq!(parsed.total_errors, Some(1));
    assert_eq!(parsed.total_skipped, Some(1));
    assert_eq!(parsed.duration, Some(Decimal::from_str("42.75").unwrap()));

    // The zero-test doc-tests suite is dropped with its phantom case.
    assert_eq!(parsed.suites.len(), 2);
    assert_eq!(parsed.suites[0].name, "api");
    assert_eq!(parsed.suites[0].cases.len(), 12);
    assert_eq!(parsed.suites[1].name, "storage");
    assert_eq!(parsed.suites[1].cases.len(), 8);

    // Outcomes: failure and error carry their details, skipped its message.
    let failing = &parsed.suites[0].cases[1];
    assert_eq!(failing.result, CaseResult::Failure);
    assert_eq!(failing.failure_type.as_deref(), Some("AssertionError"));

    let erroring = &parsed.suites[1].cases[1];
    assert_eq!(erroring.result, CaseResult::Error);
    assert_eq!(erroring.failure_message.as_deref(), Some("connection refused"));
    assert!(erroring.stack_trace.as_deref().unwrap().contains("ECONNREFUSED"));

    let skipped = &parsed.suites[1].cases[4];
    assert_eq!(skipped.result, CaseResult::Skipped);

    let passed = parsed
        .suites
        .iter()
        .flat_map(|s| s.cases.iter())
        .filter(|c| c.result == CaseResult::Success)
        .count();
    assert_eq!(passed, 17);
}

#[test]
fn parsed_run_surfaces_in_snapshot_with_derived_pass_count() {
    let parsed = parser::parse_test_report(JUNIT_DOC.as_bytes(), XML_MIME).unwrap();
    let ingested_at = Utc.with_ymd_and_hms(2026, 8, 12, 14, 0, 0).unwrap();
    let row = stored_test_report(&parsed, ingested_at);

    let snapshot = aggregation::test_snapshot(&row);
    // 20 - 2 - 1 - 1, never stored, always derived.
    assert_eq!(snapshot.total_passed, Some(16));
    // The document's own timestamp wins over ingestion time.
    assert_eq!(
        snapshot.date,
        Utc.with_ymd_and_hms(2026, 8, 10, 9, 30, 0).unwrap()
    );
}

#[test]
fn cobertura_document_flattens_files_and_formats_rates() {
    let parsed = parser::parse_coverage_report(COBERTURA_DOC.as_bytes(), XML_MIME).unwrap();

    assert_eq!(parsed.files.len(), 3);
    assert_eq!(parsed.files[2].file_name, "src/api/repos.rs");
    assert_eq!(parsed.total_lines, Some(1709));
    assert_eq!(parsed.valid_lines, Some(2000));

    let ingested_at = Utc.with_ymd_and_hms(2026, 8, 12, 14, 0, 0).unwrap();
    let row = stored_coverage_report(&parsed, ingested_at);

    let snapshot = aggregation::coverage_snapshot(&row);
    assert_eq!(snapshot.branch_rate.as_deref(), Some("72.00%"));
    assert_eq!(snapshot.line_rate.as_deref(), Some("85.43%"));
}

#[test]
fn repeated_runs_bucket_into_daily_trend_points() {
    let parsed = parser::parse_test_report(JUNIT_DOC.as_bytes(), XML_MIME).unwrap();

    // Same run ingested twice on day one plus a green run ingested the next
    // day. The green document reports a day-one timestamp, but buckets key on
    // the day a report was ingested, so it still lands on day two.
    let day_one = Utc.with_ymd_and_hms(2026, 8, 10, 9, 30, 0).unwrap();
    let day_two = Utc.with_ymd_and_hms(2026, 8, 11, 8, 5, 0).unwrap();
    let mut rows = vec![
        stored_test_report(&parsed, day_one),
        stored_test_report(&parsed, day_one),
    ];

    let green = parser::parse_test_report(
        br#"<testsuites timestamp="2026-08-10T23:50:00" tests="20" failures="0" errors="0" skipped="0"/>"#,
        XML_MIME,
    )
    .unwrap();
    rows.push(stored_test_report(&green, day_two));

    let points = aggregation::bucket_test_trend(&rows).unwrap();
    assert_eq!(points.len(), 2);

    assert_eq!(points[0].date, day_one.date_naive());
    assert_eq!(points[0].total_tests, Decimal::from(20));
    assert_eq!(points[0].total_failures, Decimal::from(2));
    assert_eq!(points[0].total_passed, Decimal::from(16));

    assert_eq!(points[1].date, day_two.date_naive());
    assert_eq!(points[1].total_failures, Decimal::ZERO);
    assert_eq!(points[1].total_passed, Decimal::from(20));
}

#[test]
fn branch_and_primary_latest_reports_compare_field_by_field() {
    let target = parser::parse_test_report(JUNIT_DOC.as_bytes(), XML_MIME).unwrap();
    let baseline = parser::parse_test_report(
        br#"<testsuites timestamp="2026-08-09T10:00:00" tests="18" failures="5" errors="0" skipped="1"/>"#,
        XML_MIME,
    )
    .unwrap();

    let now = Utc::now();
    let target_row = stored_test_report(&target, now);
    let baseline_row = stored_test_report(&baseline, now);

    let cmp = aggregation::compare_tests(Some(&target_row), Some(&baseline_row));
    let diff = cmp.difference.unwrap();
    // 16 passed on the branch vs 12 on the primary.
    assert_eq!(diff.total_passed, Some(4));
    assert_eq!(diff.total_failures, Some(-3));
    assert_eq!(diff.total_errors, Some(1));
    assert_eq!(diff.total_skipped, Some(0));
}

#[test]
fn coverage_comparison_uses_rounded_display_percentages() {
    let target = parser::parse_coverage_report(COBERTURA_DOC.as_bytes(), XML_MIME).unwrap();
    let baseline = parser::parse_coverage_report(
        br#"<coverage timestamp="1754000000000" branch-rate="0.7" line-rate="0.8001"/>"#,
        XML_MIME,
    )
    .unwrap();

    let now = Utc::now();
    let cmp = aggregation::compare_coverage(
        Some(&stored_coverage_report(&target, now)),
        Some(&stored_coverage_report(&baseline, now)),
    );

    assert_eq!(cmp.branch.as_ref().unwrap().line_rate.as_deref(), Some("85.43%"));
    assert_eq!(
        cmp.primary_branch.as_ref().unwrap().line_rate.as_deref(),
        Some("80.01%")
    );
    let diff = cmp.difference.unwrap();
    assert_eq!(diff.line_rate, Some(Decimal::from_str("5.42").unwrap()));
    assert_eq!(diff.branch_rate, Some(Decimal::from_str("2.00").unwrap()));
}

#[test]
fn rejected_documents_never_reach_aggregation() {
    // Wrong MIME, malformed XML and wrong root all fail before any row is built.
    assert!(parser::parse_test_report(JUNIT_DOC.as_bytes(), Some("text/plain")).is_err());
    assert!(parser::parse_test_report(b"<testsuites><oops>", XML_MIME).is_err());
    assert!(parser::parse_test_report(COBERTURA_DOC.as_bytes(), XML_MIME).is_err());
    assert!(parser::parse_coverage_report(JUNIT_DOC.as_bytes(), XML_MIME).is_err());
}
