//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Testdeck Server",
        version = "0.3.0",
        description = "API server for ingesting CI test runs (JUnit XML) and coverage reports (Cobertura XML), with per-branch summaries, trends and primary-branch comparisons"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Organization endpoints
        api::organizations::register,
        api::organizations::list_organizations,
        api::organizations::set_default_organization,
        api::organizations::organization_summary,
        // Repo endpoints
        api::repos::list_repos,
        api::repos::create_repo,
        api::repos::repo_summary,
        api::repos::list_branches,
        api::repos::promote_branch,
        // Branch and report endpoints
        api::branches::branch_summary,
        api::branches::list_branch_tests,
        api::branches::list_branch_coverage,
        api::branches::get_test_report,
        api::branches::get_coverage_report,
        api::compare::compare_branch,
        // Upload endpoints
        api::uploads::upload_test_report,
        api::uploads::upload_coverage_report,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Organizations
            api::organizations::OrganizationView,
            models::RegisterRequest,
            models::RegisterResponse,
            // Repos and branches
            api::repos::RepoView,
            models::CreateRepoRequest,
            models::PromoteBranchRequest,
            models::BranchSummary,
            models::TestSnapshot,
            models::CoverageSnapshot,
            // Trends
            models::TrendResponse,
            models::TestTrendPoint,
            models::CoverageTrendPoint,
            // Report listings and drilldowns
            models::TestReportListItem,
            models::TestDetailResponse,
            models::TestSuiteView,
            models::TestCaseView,
            models::CoverageReportListItem,
            models::CoverageDetailResponse,
            models::CoverageFileView,
            // Comparison
            models::ComparisonResponse,
            models::TestComparison,
            models::TestSide,
            models::TestDifference,
            models::CoverageComparison,
            models::CoverageSide,
            models::CoverageDifference,
            // Uploads
            models::UploadResponse,
        )
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Organizations", description = "Registration and organization scoping"),
        (name = "Repos", description = "Repositories and their branches"),
        (name = "Branches", description = "Branch reports, trends and comparisons"),
        (name = "Uploads", description = "CI report ingestion"),
    )
)]
pub struct ApiDoc;
