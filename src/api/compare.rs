//! Branch comparison API handler.

use actix_web::{web, HttpResponse};

use crate::auth::SessionUser;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::ComparisonResponse;
use crate::services::aggregation;

/// Compare a branch against its repository's primary branch.
///
/// Both sides use their latest reports. The route addresses the branch by
/// name so CI tooling can link to it without resolving ids first.
#[utoipa::path(
    get,
    path = "/api/v1/repos/by-name/{repo_name}/branches/{branch_name}/compare",
    tag = "Branches",
    params(
        ("repo_name" = String, Path, description = "Repository name"),
        ("branch_name" = String, Path, description = "Branch name"),
    ),
    responses(
        (status = 200, description = "Comparison against the primary branch", body = ComparisonResponse),
        (status = 400, description = "Branch is the primary branch", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Repo or branch not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn compare_branch(
    session: SessionUser,
    pool: web::Data<DbPool>,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    let (repo_name, branch_name) = path.into_inner();

    let (branch, repo) = pool
        .find_branch_by_names(session.organization.id, &repo_name, &branch_name)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Branch '{}' not found in repo '{}'",
                branch_name, repo_name
            ))
        })?;

    let comparison = aggregation::compare_branches(pool.get_ref(), &repo, &branch).await?;
    Ok(HttpResponse::Ok().json(comparison))
}

/// Configure comparison routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/repos/by-name/{repo_name}/branches/{branch_name}/compare")
            .route(web::get().to(compare_branch)),
    );
}
