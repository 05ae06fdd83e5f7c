//! Repository and branch API handlers.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::SessionUser;
use crate::db::{DbPool, TrendScope};
use crate::error::{AppError, AppResult};
use crate::models::{BranchSummary, CreateRepoRequest, PromoteBranchRequest};
use crate::services::aggregation;

/// Repository listing entry.
#[derive(Debug, Serialize, ToSchema)]
pub struct RepoView {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// List the repositories of the caller's default organization.
#[utoipa::path(
    get,
    path = "/api/v1/repos",
    tag = "Repos",
    responses(
        (status = 200, description = "Repositories", body = [RepoView]),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_repos(session: SessionUser, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let repos = pool.list_repos(session.organization.id).await?;

    let views: Vec<RepoView> = repos
        .into_iter()
        .map(|r| RepoView {
            id: r.id,
            name: r.name,
            created_at: r.created_at,
        })
        .collect();

    Ok(HttpResponse::Ok().json(views))
}

/// Create a repository explicitly, ahead of any upload.
#[utoipa::path(
    post,
    path = "/api/v1/repos",
    tag = "Repos",
    request_body = CreateRepoRequest,
    responses(
        (status = 201, description = "Repository created", body = RepoView),
        (status = 400, description = "Name taken or invalid", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_repo(
    session: SessionUser,
    pool: web::Data<DbPool>,
    body: web::Json<CreateRepoRequest>,
) -> AppResult<HttpResponse> {
    let name = body.into_inner().name;
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("name must not be empty".to_string()));
    }

    let repo = pool.insert_repo(session.organization.id, name).await?;

    info!(repo_id = %repo.id, organization_id = %session.organization.id, "Created repo");

    Ok(HttpResponse::Created().json(RepoView {
        id: repo.id,
        name: repo.name,
        created_at: repo.created_at,
    }))
}

/// Day-bucketed trends across one repository.
#[utoipa::path(
    get,
    path = "/api/v1/repos/{repo_id}/summary",
    tag = "Repos",
    params(("repo_id" = Uuid, Path, description = "Repository id")),
    responses(
        (status = 200, description = "Repository trends", body = crate::models::TrendResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Repo not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn repo_summary(
    session: SessionUser,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let repo_id = path.into_inner();
    let repo = pool
        .find_repo_in_org(session.organization.id, repo_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Repo {} not found", repo_id)))?;

    let trends = aggregation::trend_for_scope(pool.get_ref(), TrendScope::Repo(repo.id)).await?;
    Ok(HttpResponse::Ok().json(trends))
}

/// List a repository's branches with their latest test and coverage state.
#[utoipa::path(
    get,
    path = "/api/v1/repos/{repo_id}/branches",
    tag = "Repos",
    params(("repo_id" = Uuid, Path, description = "Repository id")),
    responses(
        (status = 200, description = "Branches with summaries", body = [BranchSummary]),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Repo not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_branches(
    session: SessionUser,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let repo_id = path.into_inner();
    let repo = pool
        .find_repo_in_org(session.organization.id, repo_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Repo {} not found", repo_id)))?;

    let branches = pool.list_branches(repo.id).await?;

    let mut summaries: Vec<BranchSummary> = Vec::with_capacity(branches.len());
    for branch in &branches {
        summaries.push(aggregation::branch_summary(pool.get_ref(), branch).await?);
    }

    Ok(HttpResponse::Ok().json(summaries))
}

/// Promote a branch to be the repository's primary branch.
#[utoipa::path(
    put,
    path = "/api/v1/repos/{repo_id}/branches",
    tag = "Repos",
    params(("repo_id" = Uuid, Path, description = "Repository id")),
    request_body = PromoteBranchRequest,
    responses(
        (status = 200, description = "Branch promoted", body = BranchSummary),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Repo or branch not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn promote_branch(
    session: SessionUser,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<PromoteBranchRequest>,
) -> AppResult<HttpResponse> {
    let repo_id = path.into_inner();
    let branch_id = body.into_inner().branch_id;

    let promoted = pool
        .set_primary_branch(session.organization.id, repo_id, branch_id)
        .await?;

    info!(branch_id = %promoted.id, repo_id = %repo_id, "Promoted primary branch");

    let summary = aggregation::branch_summary(pool.get_ref(), &promoted).await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// Configure repository routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/repos")
            .route(web::get().to(list_repos))
            .route(web::post().to(create_repo)),
    )
    .service(web::resource("/repos/{repo_id}/summary").route(web::get().to(repo_summary)))
    .service(
        web::resource("/repos/{repo_id}/branches")
            .route(web::get().to(list_branches))
            .route(web::put().to(promote_branch)),
    );
}
