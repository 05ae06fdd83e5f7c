//! Organization and registration API handlers.

use actix_web::{web, HttpResponse};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::SessionUser;
use crate::db::{DbPool, TrendScope};
use crate::error::{AppError, AppResult};
use crate::models::{RegisterRequest, RegisterResponse};
use crate::services::aggregation;

/// Organization listing entry; the caller sees the upload token for every
/// organization they belong to.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrganizationView {
    pub id: Uuid,
    pub name: String,
    pub public_uuid: Uuid,
    pub is_default: bool,
}

/// Register a new organization.
///
/// Creates the organization, its first user (reused when the email is
/// already known) and a membership in one transaction.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    tag = "Organizations",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Organization registered", body = RegisterResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 400, description = "Name already taken", body = crate::error::ErrorResponse),
    )
)]
pub async fn register(
    pool: web::Data<DbPool>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let email = req.email.trim();
    let name = req.organization_name.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::InvalidInput(
            "email must be a valid address".to_string(),
        ));
    }
    if name.is_empty() {
        return Err(AppError::InvalidInput(
            "organization_name must not be empty".to_string(),
        ));
    }

    let (org, user) = pool.insert_organization_with_owner(email, name).await?;

    info!(organization_id = %org.id, "Registered organization");

    Ok(HttpResponse::Created().json(RegisterResponse {
        organization_id: org.id,
        public_uuid: org.public_uuid,
        user_id: user.id,
    }))
}

/// List the caller's organizations with the default flag.
#[utoipa::path(
    get,
    path = "/api/v1/organizations",
    tag = "Organizations",
    responses(
        (status = 200, description = "Organizations the caller belongs to", body = [OrganizationView]),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_organizations(
    session: SessionUser,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let orgs = pool.organizations_for_user(session.user_id).await?;

    let views: Vec<OrganizationView> = orgs
        .into_iter()
        .map(|(org, is_default)| OrganizationView {
            id: org.id,
            name: org.name,
            public_uuid: org.public_uuid,
            is_default,
        })
        .collect();

    Ok(HttpResponse::Ok().json(views))
}

/// Switch the caller's default organization.
#[utoipa::path(
    put,
    path = "/api/v1/organizations/{org_id}/default",
    tag = "Organizations",
    params(("org_id" = Uuid, Path, description = "Organization id")),
    responses(
        (status = 204, description = "Default switched"),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Not a member", body = crate::error::ErrorResponse),
    )
)]
pub async fn set_default_organization(
    session: SessionUser,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let org_id = path.into_inner();
    pool.set_default_organization(session.user_id, org_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Day-bucketed test and coverage trends across the caller's default
/// organization.
#[utoipa::path(
    get,
    path = "/api/v1/organizations/summary",
    tag = "Organizations",
    responses(
        (status = 200, description = "Organization-wide trends", body = crate::models::TrendResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    )
)]
pub async fn organization_summary(
    session: SessionUser,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let trends = aggregation::trend_for_scope(
        pool.get_ref(),
        TrendScope::Organization(session.organization.id),
    )
    .await?;
    Ok(HttpResponse::Ok().json(trends))
}

/// Configure organization routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/register").route(web::post().to(register)))
        .service(web::resource("/organizations").route(web::get().to(list_organizations)))
        .service(
            web::resource("/organizations/summary")
                .route(web::get().to(organization_summary)),
        )
        .service(
            web::resource("/organizations/{org_id}/default")
                .route(web::put().to(set_default_organization)),
        );
}
