//! Branch-scoped report listings and report drilldowns.

use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::auth::SessionUser;
use crate::db::{DbPool, TrendScope};
use crate::entity::{branch, test_report};
use crate::error::{AppError, AppResult};
use crate::models::{
    CoverageDetailResponse, CoverageFileView, CoverageReportListItem, TestCaseView,
    TestDetailResponse, TestReportListItem, TestSuiteView,
};
use crate::services::aggregation;

/// Resolve a branch id to a branch inside the caller's organization.
async fn scoped_branch(
    pool: &DbPool,
    organization_id: Uuid,
    branch_id: Uuid,
) -> AppResult<branch::Model> {
    pool.find_branch_in_org(organization_id, branch_id)
        .await?
        .map(|(branch, _)| branch)
        .ok_or_else(|| AppError::NotFound(format!("Branch {} not found", branch_id)))
}

fn test_list_item(report: &test_report::Model) -> TestReportListItem {
    TestReportListItem {
        id: report.id,
        date: aggregation::effective_date(report.result_time, report.created_at),
        duration: report.duration,
        total_tests: report.total_tests,
        total_passed: aggregation::derived_passed(
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

/// Day-bucketed trends for one branch.
#[utoipa::path(
    get,
    path = "/api/v1/branches/{branch_id}/summary",
    tag = "Branches",
    params(("branch_id" = Uuid, Path, description = "Branch id")),
    responses(
        (status = 200, description = "Branch trends", body = crate::models::TrendResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Branch not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn branch_summary(
    session: SessionUser,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let branch = scoped_branch(&pool, session.organization.id, path.into_inner()).await?;
    let trends =
        aggregation::trend_for_scope(pool.get_ref(), TrendScope::Branch(branch.id)).await?;
    Ok(HttpResponse::Ok().json(trends))
}

/// List a branch's test reports, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/branches/{branch_id}/tests",
    tag = "Branches",
    params(("branch_id" = Uuid, Path, description = "Branch id")),
    responses(
        (status = 200, description = "Test reports", body = [TestReportListItem]),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Branch not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_branch_tests(
    session: SessionUser,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let branch = scoped_branch(&pool, session.organization.id, path.into_inner()).await?;
    let reports = pool.list_test_reports(branch.id).await?;

    let items: Vec<TestReportListItem> = reports.iter().map(test_list_item).collect();
    Ok(HttpResponse::Ok().json(items))
}

/// List a branch's coverage reports, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/branches/{branch_id}/coverage",
    tag = "Branches",
    params(("branch_id" = Uuid, Path, description = "Branch id")),
    responses(
        (status = 200, description = "Coverage reports", body = [CoverageReportListItem]),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Branch not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_branch_coverage(
    session: SessionUser,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let branch = scoped_branch(&pool, session.organization.id, path.into_inner()).await?;
    let reports = pool.list_coverage_reports(branch.id).await?;

    let items: Vec<CoverageReportListItem> = reports
        .iter()
        .map(|r| CoverageReportListItem {
            id: r.id,
            date: aggregation::effective_date(r.result_time, r.created_at),
            branch_rate: r.branch_rate.map(aggregation::format_rate),
            line_rate: r.line_rate.map(aggregation::format_rate),
        })
        .collect();

    Ok(HttpResponse::Ok().json(items))
}

/// Test report drilldown: suites with their cases in document order.
#[utoipa::path(
    get,
    path = "/api/v1/tests/{report_id}",
    tag = "Branches",
    params(("report_id" = Uuid, Path, description = "Test report id")),
    responses(
        (status = 200, description = "Test report detail", body = TestDetailResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Report not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_test_report(
    session: SessionUser,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let report_id = path.into_inner();
    let report = pool
        .get_test_report(report_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test report {} not found", report_id)))?;

    // A report outside the caller's organization is indistinguishable from
    // one that does not exist.
    scoped_branch(&pool, session.organization.id, report.branch_id)
        .await
        .map_err(|_| AppError::NotFound(format!("Test report {} not found", report_id)))?;

    let suites = pool.suites_with_cases(report.id).await?;

    let suite_views: Vec<TestSuiteView> = suites
        .into_iter()
        .map(|(suite, cases)| TestSuiteView {
            id: suite.id,
            name: suite.name,
            duration: suite.duration,
            total_tests: suite.total_tests,
            total_failures: suite.total_failures,
            total_errors: suite.total_errors,
            total_skipped: suite.total_skipped,
            cases: cases
                .into_iter()
                .map(|case| TestCaseView {
                    name: case.name,
                    class_name: case.class_name,
                    duration: case.duration,
                    result: case.result,
                    failure_message: case.failure_message,
                    failure_type: case.failure_type,
                    stack_trace: case.stack_trace,
                })
                .collect(),
        })
        .collect();

    let item = test_list_item(&report);
    Ok(HttpResponse::Ok().json(TestDetailResponse {
        id: item.id,
        date: item.date,
        duration: item.duration,
        total_tests: item.total_tests,
        total_passed: item.total_passed,
        total_failures: item.total_failures,
        total_errors: item.total_errors,
        total_skipped: item.total_skipped,
        suites: suite_views,
    }))
}

/// Coverage report drilldown: per-file rows, worst line coverage first.
#[utoipa::path(
    get,
    path = "/api/v1/coverage/{report_id}",
    tag = "Branches",
    params(("report_id" = Uuid, Path, description = "Coverage report id")),
    responses(
        (status = 200, description = "Coverage report detail", body = CoverageDetailResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Report not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_coverage_report(
    session: SessionUser,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let report_id = path.into_inner();
    let report = pool
        .get_coverage_report(report_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Coverage report {} not found", report_id)))?;

    scoped_branch(&pool, session.organization.id, report.branch_id)
        .await
        .map_err(|_| AppError::NotFound(format!("Coverage report {} not found", report_id)))?;

    let files = pool.coverage_files_for_report(report.id).await?;

    Ok(HttpResponse::Ok().json(CoverageDetailResponse {
        id: report.id,
        date: aggregation::effective_date(report.result_time, report.created_at),
        branch_rate: report.branch_rate.map(aggregation::format_rate),
        line_rate: report.line_rate.map(aggregation::format_rate),
        total_lines: report.total_lines,
        valid_lines: report.valid_lines,
        complexity: report.complexity,
        files: files
            .into_iter()
            .map(|f| CoverageFileView {
                file_name: f.file_name,
                line_rate: f.line_rate.map(aggregation::format_rate),
                branch_rate: f.branch_rate.map(aggregation::format_rate),
            })
            .collect(),
    }))
}

/// Configure branch and report-drilldown routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/branches/{branch_id}/summary").route(web::get().to(branch_summary)))
        .service(
            web::resource("/branches/{branch_id}/tests").route(web::get().to(list_branch_tests)),
        )
        .service(
            web::resource("/branches/{branch_id}/coverage")
                .route(web::get().to(list_branch_coverage)),
        )
        .service(web::resource("/tests/{report_id}").route(web::get().to(get_test_report)))
        .service(web::resource("/coverage/{report_id}").route(web::get().to(get_coverage_report)));
}
