//! Report upload API handlers.
//!
//! Uploads authenticate with the organization's public token, never a
//! session: CI jobs hold the token and nothing else. The repo and branch in
//! the path are created on first sight.

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};

use crate::auth::UploadOrg;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::UploadResponse;
use crate::services::ingest;

/// Upload a JUnit-style test report for a repo and branch.
#[utoipa::path(
    post,
    path = "/api/v1/{repo_name}/{branch_name}/tests",
    tag = "Uploads",
    params(
        ("repo_name" = String, Path, description = "Repository name"),
        ("branch_name" = String, Path, description = "Branch name"),
    ),
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Report ingested", body = UploadResponse),
        (status = 400, description = "Missing file, wrong type, malformed XML or wrong schema", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown organization token", body = crate::error::ErrorResponse),
    )
)]
pub async fn upload_test_report(
    org: UploadOrg,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    path: web::Path<(String, String)>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let (repo_name, branch_name) = path.into_inner();

    let file = ingest::read_single_file(&mut payload, config.max_upload_size).await?;
    let report = ingest::ingest_test_report(
        pool.get_ref(),
        org.organization.id,
        &repo_name,
        &branch_name,
        &file,
    )
    .await?;

    Ok(HttpResponse::Created().json(UploadResponse {
        report_id: report.id,
    }))
}

/// Upload a Cobertura-style coverage report for a repo and branch.
#[utoipa::path(
    post,
    path = "/api/v1/{repo_name}/{branch_name}/coverage",
    tag = "Uploads",
    params(
        ("repo_name" = String, Path, description = "Repository name"),
        ("branch_name" = String, Path, description = "Branch name"),
    ),
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Report ingested", body = UploadResponse),
        (status = 400, description = "Missing file, wrong type, malformed XML or wrong schema", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown organization token", body = crate::error::ErrorResponse),
    )
)]
pub async fn upload_coverage_report(
    org: UploadOrg,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    path: web::Path<(String, String)>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let (repo_name, branch_name) = path.into_inner();

    let file = ingest::read_single_file(&mut payload, config.max_upload_size).await?;
    let report = ingest::ingest_coverage_report(
        pool.get_ref(),
        org.organization.id,
        &repo_name,
        &branch_name,
        &file,
    )
    .await?;

    Ok(HttpResponse::Created().json(UploadResponse {
        report_id: report.id,
    }))
}

/// Configure upload routes. These use catch-all path segments, so they are
/// registered after every literal route.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/{repo_name}/{branch_name}/tests")
            .route(web::post().to(upload_test_report)),
    )
    .service(
        web::resource("/{repo_name}/{branch_name}/coverage")
            .route(web::post().to(upload_coverage_report)),
    );
}
