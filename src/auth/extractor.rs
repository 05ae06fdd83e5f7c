//! Actix-web extractors for session and upload-token authentication.

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use uuid::Uuid;

use crate::config::{ORG_UUID_HEADER, SESSION_USER_HEADER};
use crate::db::DbPool;
use crate::entity::organization;
use crate::error::{AppError, AppResult};

fn header_value(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

fn pool_from(req: &HttpRequest) -> AppResult<DbPool> {
    req.app_data::<web::Data<DbPool>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| AppError::Database("Database pool not configured".to_string()))
}

/// Authenticated interactive caller, scoped to their default organization.
///
/// The session collaborator in front of this service verifies credentials
/// and forwards the user's email in a trusted header; this extractor turns
/// it into a user row and the organization behind the default membership.
pub struct SessionUser {
    pub user_id: Uuid,
    pub organization: organization::Model,
}

impl FromRequest for SessionUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let pool = pool_from(&req)?;

            let email = header_value(&req, SESSION_USER_HEADER).ok_or_else(|| {
                AppError::Unauthorized(format!("Missing {} header", SESSION_USER_HEADER))
            })?;

            let user = pool
                .find_user_by_email(&email)
                .await?
                .ok_or_else(|| AppError::Unauthorized("Unknown session user".to_string()))?;

            let organization = pool.default_org_for_user(user.id).await?.ok_or_else(|| {
                AppError::Unauthorized("User has no default organization".to_string())
            })?;

            Ok(SessionUser {
                user_id: user.id,
                organization,
            })
        })
    }
}

/// Upload caller resolved from the organization's public token header.
pub struct UploadOrg {
    pub organization: organization::Model,
}

impl FromRequest for UploadOrg {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let pool = pool_from(&req)?;

            let raw = header_value(&req, ORG_UUID_HEADER).ok_or_else(|| {
                AppError::InvalidInput(format!("Missing {} header", ORG_UUID_HEADER))
            })?;

            let token = Uuid::parse_str(raw.trim()).map_err(|_| {
                AppError::InvalidInput(format!("{} is not a valid UUID", ORG_UUID_HEADER))
            })?;

            let organization = pool
                .find_org_by_public_uuid(token)
                .await?
                .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

            Ok(UploadOrg { organization })
        })
    }
}
