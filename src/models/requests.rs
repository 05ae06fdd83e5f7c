//! Request and response bodies for the registration and admin endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Body for `POST /register`: creates an organization, its first user and
/// the default membership in one transaction.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub organization_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub organization_id: Uuid,
    /// Token CI uploaders send in the X-Organization-Uuid header.
    pub public_uuid: Uuid,
    pub user_id: Uuid,
}

/// Body for `POST /repos`: explicit repository creation.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRepoRequest {
    pub name: String,
}

/// Body for `PUT /repos/{repo_id}/branches`: primary-branch promotion.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PromoteBranchRequest {
    pub branch_id: Uuid,
}

/// Response for report uploads.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub report_id: Uuid,
}
