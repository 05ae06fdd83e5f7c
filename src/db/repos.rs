//! Database queries for repositories.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    SqlErr,
};
use uuid::Uuid;

use crate::entity::repo::{self, Entity as Repo};
use crate::error::{AppError, AppResult};

use super::DbPool;

/// Find a repository by name inside an organization, creating it when absent.
///
/// Generic over the connection so upload ingestion can run it inside its
/// transaction. A concurrent insert losing the unique-index race falls back
/// to re-reading the winner's row.
pub async fn find_or_create_repo<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
    name: &str,
) -> AppResult<repo::Model> {
    let existing = Repo::find()
        .filter(repo::Column::OrganizationId.eq(organization_id))
        .filter(repo::Column::Name.eq(name))
        .one(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get repo: {}", e)))?;

    if let Some(repo) = existing {
        return Ok(repo);
    }

    let inserted = repo::ActiveModel {
        id: Set(Uuid::now_v7()),
        organization_id: Set(organization_id),
        name: Set(name.to_string()),
        created_at: Set(Utc::now()),
    }
    .insert(conn)
    .await;

    match inserted {
        Ok(repo) => Ok(repo),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Repo::find()
                .filter(repo::Column::OrganizationId.eq(organization_id))
                .filter(repo::Column::Name.eq(name))
                .one(conn)
                .await
                .map_err(|e| AppError::Database(format!("Failed to re-read repo: {}", e)))?
                .ok_or_else(|| AppError::Database("Repo vanished after conflict".to_string()))
        }
        Err(e) => Err(AppError::Database(format!("Failed to insert repo: {}", e))),
    }
}

impl DbPool {
    /// List an organization's repositories by name.
    pub async fn list_repos(&self, organization_id: Uuid) -> AppResult<Vec<repo::Model>> {
        Repo::find()
            .filter(repo::Column::OrganizationId.eq(organization_id))
            .order_by_asc(repo::Column::Name)
            .all(&self.conn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to list repos: {}", e)))
    }

    /// Get a repository only if it belongs to the organization.
    pub async fn find_repo_in_org(
        &self,
        organization_id: Uuid,
        repo_id: Uuid,
    ) -> AppResult<Option<repo::Model>> {
        Repo::find_by_id(repo_id)
            .filter(repo::Column::OrganizationId.eq(organization_id))
            .one(&self.conn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to get repo: {}", e)))
    }

    /// Create a repository explicitly; a taken name is a conflict.
    pub async fn insert_repo(
        &self,
        organization_id: Uuid,
        name: &str,
    ) -> AppResult<repo::Model> {
        repo::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(organization_id),
            name: Set(name.to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.conn)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict(format!("Repo '{}' already exists", name))
            }
            _ => AppError::Database(format!("Failed to insert repo: {}", e)),
        })
    }
}
