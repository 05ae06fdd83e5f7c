//! Summary, trend and comparison computation.
//!
//! Report rows come out of the window queries in `db`; everything here is
//! arithmetic over those rows. Counts a document never declared are treated
//! as absent, not zero, except inside test trend buckets where every missing
//! count averages as zero. Trends bucket and window on ingestion time;
//! the effective date only orders snapshots and report lists.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::db::{DbPool, TrendScope};
use crate::entity::{branch, coverage_report, repo, test_report};
use crate::error::{AppError, AppResult};
use crate::models::{
    BranchSummary, ComparisonResponse, CoverageComparison, CoverageDifference, CoverageSide,
    CoverageSnapshot, CoverageTrendPoint, TestComparison, TestDifference, TestSide, TestSnapshot,
    TestTrendPoint, TrendResponse,
};

/// Test trends look back this many days.
pub const TEST_TREND_WINDOW_DAYS: i64 = 60;

/// Coverage trends look back this many days.
pub const COVERAGE_TREND_WINDOW_DAYS: i64 = 30;

// ============================================================================
// Pure Helpers
// ============================================================================

/// Derive the pass count from stored totals. The pass count is never stored;
/// missing subtrahends count as zero, but without a total there is nothing
/// to derive from.
pub fn derived_passed(
    total_tests: Option<i32>,
    failures: Option<i32>,
    errors: Option<i32>,
    skipped: Option<i32>,
) -> Option<i32> {
    total_tests.map(|tests| {
        tests - failures.unwrap_or(0) - errors.unwrap_or(0) - skipped.unwrap_or(0)
    })
}

/// The date a report displays under: its declared result time when present,
/// ingestion time otherwise. Used for snapshots and list ordering, not for
/// trend bucketing.
pub fn effective_date(result_time: Option<DateTime<Utc>>, created_at: DateTime<Utc>) -> DateTime<Utc> {
    result_time.unwrap_or(created_at)
}

/// Render a fractional rate as a percentage with exactly two decimals,
/// e.g. `0.8` becomes `"80.00%"`.
pub fn format_rate(rate: Decimal) -> String {
    let mut percent = (rate * Decimal::ONE_HUNDRED).round_dp(2);
    percent.rescale(2);
    format!("{}%", percent)
}

/// The rounded percent value used for coverage deltas, so the difference
/// matches what both sides display.
pub fn percent_value(rate: Decimal) -> Decimal {
    (rate * Decimal::ONE_HUNDRED).round_dp(2)
}

/// Build the test half of a branch summary from its latest report.
pub fn test_snapshot(report: &test_report::Model) -> TestSnapshot {
    TestSnapshot {
        report_id: report.id,
        date: effective_date(report.result_time, report.created_at),
        duration: report.duration,
        total_tests: report.total_tests,
        total_passed: derived_passed(
            report.total_tests,
            report.total_failures,
            report.total_errors,
            report.total_skipped,
        ),
        total_failures: report.total_failures,
        total_errors: report.total_errors,
        total_skipped: report.total_skipped,
    }
}

/// Build the coverage half of a branch summary from its latest report.
pub fn coverage_snapshot(report: &coverage_report::Model) -> CoverageSnapshot {
    CoverageSnapshot {
        report_id: report.id,
        date: effective_date(report.result_time, report.created_at),
        branch_rate: report.branch_rate.map(format_rate),
        line_rate: report.line_rate.map(format_rate),
    }
}

fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum: Decimal = values.iter().sum();
    Some((sum / Decimal::from(values.len())).round_dp(6))
}

fn zero_filled_mean(values: &[Option<i32>]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = values.iter().map(|v| Decimal::from(v.unwrap_or(0))).sum();
    (sum / Decimal::from(values.len())).round_dp(6)
}

/// Bucket test reports by the calendar day they were ingested and average
/// each total. Returns `None` for an empty window so callers can tell
/// "no data" from "all zeroes". Counts a report never declared average as
/// zero inside a bucket.
pub fn bucket_test_trend(reports: &[test_report::Model]) -> Option<Vec<TestTrendPoint>> {
    if reports.is_empty() {
        return None;
    }

    let mut buckets: BTreeMap<NaiveDate, Vec<&test_report::Model>> = BTreeMap::new();
    for report in reports {
        buckets
            .entry(report.created_at.date_naive())
            .or_default()
            .push(report);
    }

    let points = buckets
        .into_iter()
        .map(|(date, rows)| {
            let tests =
                zero_filled_mean(&rows.iter().map(|r| r.total_tests).collect::<Vec<_>>());
            let failures =
                zero_filled_mean(&rows.iter().map(|r| r.total_failures).collect::<Vec<_>>());
            let errors =
                zero_filled_mean(&rows.iter().map(|r| r.total_errors).collect::<Vec<_>>());
            let skipped =
                zero_filled_mean(&rows.iter().map(|r| r.total_skipped).collect::<Vec<_>>());

            TestTrendPoint {
                date,
                total_tests: tests,
                total_failures: failures,
                total_errors: errors,
                total_skipped: skipped,
                total_passed: tests - failures - errors - skipped,
            }
        })
        .collect();

    Some(points)
}

/// Bucket coverage reports by the calendar day they were ingested and average
/// the rates over the reports that carried them. Days where no report carried
/// a given rate keep `None` for that rate.
pub fn bucket_coverage_trend(
    reports: &[coverage_report::Model],
) -> Option<Vec<CoverageTrendPoint>> {
    if reports.is_empty() {
        return None;
    }

    let mut buckets: BTreeMap<NaiveDate, Vec<&coverage_report::Model>> = BTreeMap::new();
    for report in reports {
        buckets
            .entry(report.created_at.date_naive())
            .or_default()
            .push(report);
    }

    let points = buckets
        .into_iter()
        .map(|(date, rows)| CoverageTrendPoint {
            date,
            branch_rate: mean(
                &rows
                    .iter()
                    .filter_map(|r| r.branch_rate)
                    .collect::<Vec<_>>(),
            ),
            line_rate: mean(&rows.iter().filter_map(|r| r.line_rate).collect::<Vec<_>>()),
        })
        .collect();

    Some(points)
}

fn test_side(report: &test_report::Model) -> TestSide {
    TestSide {
        total_passed: derived_passed(
            report.total_tests,
            report.total_failures,
            report.total_errors,
            report.total_skipped,
        ),
        total_failures: report.total_failures,
        total_errors: report.total_errors,
        total_skipped: report.total_skipped,
    }
}

fn diff_field(target: Option<i32>, baseline: Option<i32>) -> Option<i32> {
    match (target, baseline) {
        (Some(t), Some(b)) => Some(t - b),
        _ => None,
    }
}

/// Compare latest test reports, target against the primary baseline.
pub fn compare_tests(
    target: Option<&test_report::Model>,
    baseline: Option<&test_report::Model>,
) -> TestComparison {
    let branch = target.map(test_side);
    let primary_branch = baseline.map(test_side);

    let difference = match (&branch, &primary_branch) {
        (Some(t), Some(b)) => Some(TestDifference {
            total_passed: diff_field(t.total_passed, b.total_passed),
            total_failures: diff_field(t.total_failures, b.total_failures),
            total_errors: diff_field(t.total_errors, b.total_errors),
            total_skipped: diff_field(t.total_skipped, b.total_skipped),
        }),
        _ => None,
    };

    TestComparison {
        branch,
        primary_branch,
        difference,
    }
}

fn coverage_side(report: &coverage_report::Model) -> CoverageSide {
    CoverageSide {
        branch_rate: report.branch_rate.map(format_rate),
        line_rate: report.line_rate.map(format_rate),
    }
}

fn diff_rate(target: Option<Decimal>, baseline: Option<Decimal>) -> Option<Decimal> {
    match (target, baseline) {
        (Some(t), Some(b)) => Some(percent_value(t) - percent_value(b)),
        _ => None,
    }
}

/// Compare latest coverage reports; deltas are percentage points computed
/// from the rounded display values.
pub fn compare_coverage(
    target: Option<&coverage_report::Model>,
    baseline: Option<&coverage_report::Model>,
) -> CoverageComparison {
    let difference = match (target, baseline) {
        (Some(t), Some(b)) => Some(CoverageDifference {
            branch_rate: diff_rate(t.branch_rate, b.branch_rate),
            line_rate: diff_rate(t.line_rate, b.line_rate),
        }),
        _ => None,
    };

    CoverageComparison {
        branch: target.map(coverage_side),
        primary_branch: baseline.map(coverage_side),
        difference,
    }
}

// ============================================================================
// Orchestrators
// ============================================================================

/// Build a branch listing entry: latest test and coverage snapshots, either
/// half absent when the branch has no report of that kind.
pub async fn branch_summary(pool: &DbPool, branch: &branch::Model) -> AppResult<BranchSummary> {
    let tests = pool.latest_test_report(branch.id).await?;
    let coverage = pool.latest_coverage_report(branch.id).await?;

    Ok(BranchSummary {
        id: branch.id,
        name: branch.name.clone(),
        is_primary: branch.is_primary,
        tests: tests.as_ref().map(test_snapshot),
        coverage: coverage.as_ref().map(coverage_snapshot),
    })
}

/// Day-bucketed trends for an organization, repo or branch scope.
pub async fn trend_for_scope(pool: &DbPool, scope: TrendScope) -> AppResult<TrendResponse> {
    let now = Utc::now();
    let test_rows = pool
        .test_reports_since(scope, now - Duration::days(TEST_TREND_WINDOW_DAYS))
        .await?;
    let coverage_rows = pool
        .coverage_reports_since(scope, now - Duration::days(COVERAGE_TREND_WINDOW_DAYS))
        .await?;

    Ok(TrendResponse {
        tests: bucket_test_trend(&test_rows),
        coverage: bucket_coverage_trend(&coverage_rows),
    })
}

/// Compare a branch against its repository's primary branch.
///
/// Comparing the primary branch to itself is rejected; a repository without
/// a primary branch cannot serve as a baseline.
pub async fn compare_branches(
    pool: &DbPool,
    repository: &repo::Model,
    target: &branch::Model,
) -> AppResult<ComparisonResponse> {
    if target.is_primary {
        return Err(AppError::InvalidComparison(
            "Branch is already the primary branch".to_string(),
        ));
    }

    let baseline = pool
        .primary_branch_of_repo(repository.id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Repo '{}' has no primary branch", repository.name))
        })?;

    let target_tests = pool.latest_test_report(target.id).await?;
    let baseline_tests = pool.latest_test_report(baseline.id).await?;
    let target_coverage = pool.latest_coverage_report(target.id).await?;
    let baseline_coverage = pool.latest_coverage_report(baseline.id).await?;

    Ok(ComparisonResponse {
        tests: compare_tests(target_tests.as_ref(), baseline_tests.as_ref()),
        coverage: compare_coverage(target_coverage.as_ref(), baseline_coverage.as_ref()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, day, hour, 0, 0).unwrap()
    }

    fn test_row(
        result_time: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
        totals: (Option<i32>, Option<i32>, Option<i32>, Option<i32>),
    ) -> test_report::Model {
        test_report::Model {
            id: Uuid::now_v7(),
            branch_id: Uuid::now_v7(),
            result_time,
            duration: None,
            total_tests: totals.0,
            total_failures: totals.1,
            total_errors: totals.2,
            total_skipped: totals.3,
            created_at,
        }
    }

    fn coverage_row(
        result_time: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
        branch_rate: Option<Decimal>,
        line_rate: Option<Decimal>,
    ) -> coverage_report::Model {
        coverage_report::Model {
            id: Uuid::now_v7(),
            branch_id: Uuid::now_v7(),
            result_time,
            branch_rate,
            line_rate,
            total_lines: None,
            valid_lines: None,
            complexity: None,
            created_at,
        }
    }

    #[test]
    fn test_derived_passed() {
        assert_eq!(derived_passed(Some(10), Some(2), Some(1), Some(3)), Some(4));
        assert_eq!(derived_passed(Some(10), None, None, None), Some(10));
        assert_eq!(derived_passed(None, Some(2), None, None), None);
        // Inconsistent documents can go negative; stored verbatim, derived verbatim.
        assert_eq!(derived_passed(Some(1), Some(5), None, None), Some(-4));
    }

    #[test]
    fn test_format_rate_two_decimals() {
        assert_eq!(format_rate(dec("0.8")), "80.00%");
        assert_eq!(format_rate(dec("0.8215")), "82.15%");
        assert_eq!(format_rate(dec("1")), "100.00%");
        assert_eq!(format_rate(dec("0.12345")), "12.35%");
        assert_eq!(format_rate(dec("0")), "0.00%");
    }

    #[test]
    fn test_effective_date_prefers_result_time() {
        let reported = at(1, 9);
        let ingested = at(5, 12);
        assert_eq!(effective_date(Some(reported), ingested), reported);
        assert_eq!(effective_date(None, ingested), ingested);
    }

    #[test]
    fn test_trend_empty_window_is_none() {
        assert!(bucket_test_trend(&[]).is_none());
        assert!(bucket_coverage_trend(&[]).is_none());
    }

    #[test]
    fn test_trend_buckets_by_ingestion_day() {
        let rows = vec![
            // Both ingested on the 12th; result times on other days do not
            // split the bucket. Means: 15 tests, 3 failures.
            test_row(Some(at(10, 8)), at(12, 0), (Some(10), Some(2), Some(0), Some(0))),
            test_row(Some(at(11, 18)), at(12, 6), (Some(20), Some(4), Some(0), Some(0))),
            // A later upload opens its own bucket.
            test_row(None, at(14, 9), (Some(8), Some(1), Some(1), None)),
        ];

        let points = bucket_test_trend(&rows).unwrap();
        assert_eq!(points.len(), 2);

        let first = &points[0];
        assert_eq!(first.date, at(12, 0).date_naive());
        assert_eq!(first.total_tests, dec("15"));
        assert_eq!(first.total_failures, dec("3"));
        assert_eq!(first.total_passed, dec("12"));

        let second = &points[1];
        assert_eq!(second.date, at(14, 0).date_naive());
        assert_eq!(second.total_tests, dec("8"));
        // Missing skipped averages as zero inside buckets.
        assert_eq!(second.total_skipped, dec("0"));
        assert_eq!(second.total_passed, dec("6"));
    }

    #[test]
    fn test_trend_missing_counts_average_as_zero() {
        let rows = vec![
            test_row(None, at(5, 1), (Some(10), Some(4), None, None)),
            test_row(None, at(5, 2), (None, None, None, None)),
        ];
        let points = bucket_test_trend(&rows).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].total_tests, dec("5"));
        assert_eq!(points[0].total_failures, dec("2"));
        assert_eq!(points[0].total_errors, dec("0"));
        assert_eq!(points[0].total_skipped, dec("0"));
        assert_eq!(points[0].total_passed, dec("3"));
    }

    #[test]
    fn test_trend_points_sorted_ascending() {
        let rows = vec![
            test_row(None, at(20, 0), (Some(1), None, None, None)),
            test_row(None, at(3, 0), (Some(2), None, None, None)),
        ];
        let points = bucket_test_trend(&rows).unwrap();
        assert!(points[0].date < points[1].date);
    }

    #[test]
    fn test_coverage_trend_keeps_missing_rates_none() {
        let rows = vec![
            coverage_row(Some(at(7, 1)), at(7, 1), None, Some(dec("0.5"))),
            coverage_row(Some(at(7, 2)), at(7, 2), None, Some(dec("0.7"))),
        ];
        let points = bucket_coverage_trend(&rows).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].branch_rate, None);
        assert_eq!(points[0].line_rate, Some(dec("0.6")));
    }

    #[test]
    fn test_compare_tests_differences() {
        let target = test_row(None, at(1, 0), (Some(12), Some(1), Some(0), Some(1)));
        let baseline = test_row(None, at(1, 0), (Some(10), Some(3), Some(0), None));

        let cmp = compare_tests(Some(&target), Some(&baseline));
        let diff = cmp.difference.unwrap();
        // 10 passed vs 7 passed.
        assert_eq!(diff.total_passed, Some(3));
        assert_eq!(diff.total_failures, Some(-2));
        // Skipped missing on the baseline side: no delta.
        assert_eq!(diff.total_skipped, None);
    }

    #[test]
    fn test_compare_missing_side_has_no_difference() {
        let target = test_row(None, at(1, 0), (Some(5), None, None, None));
        let cmp = compare_tests(Some(&target), None);
        assert!(cmp.branch.is_some());
        assert!(cmp.primary_branch.is_none());
        assert!(cmp.difference.is_none());
    }

    #[test]
    fn test_compare_coverage_rounded_percentage_points() {
        let target = coverage_row(None, at(1, 0), Some(dec("0.755")), Some(dec("0.9")));
        let baseline = coverage_row(None, at(1, 0), Some(dec("0.7")), None);

        let cmp = compare_coverage(Some(&target), Some(&baseline));
        assert_eq!(cmp.branch.as_ref().unwrap().branch_rate.as_deref(), Some("75.50%"));
        let diff = cmp.difference.unwrap();
        assert_eq!(diff.branch_rate, Some(dec("5.50")));
        assert_eq!(diff.line_rate, None);
    }

    #[test]
    fn test_snapshot_derives_passed_and_formats_rates() {
        let report = test_row(Some(at(2, 0)), at(9, 0), (Some(7), Some(1), Some(1), Some(1)));
        let snap = test_snapshot(&report);
        assert_eq!(snap.total_passed, Some(4));
        assert_eq!(snap.date, at(2, 0));

        let cov = coverage_row(None, at(9, 0), Some(dec("0.25")), Some(dec("0.333333")));
        let snap = coverage_snapshot(&cov);
        assert_eq!(snap.branch_rate.as_deref(), Some("25.00%"));
        assert_eq!(snap.line_rate.as_deref(), Some("33.33%"));
        assert_eq!(snap.date, at(9, 0));
    }
}
