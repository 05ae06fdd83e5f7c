//! Database queries for branches.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use crate::entity::branch::{self, Entity as Branch};
use crate::entity::repo::{self, Entity as Repo};
use crate::error::{AppError, AppResult};

use super::DbPool;

/// Find a branch by name inside a repository, creating it when absent.
///
/// The first branch a repository ever sees becomes its primary branch; later
/// ones arrive non-primary until promoted. Losing the unique-index race falls
/// back to re-reading the winner's row.
pub async fn find_or_create_branch<C: ConnectionTrait>(
    conn: &C,
    repo_id: Uuid,
    name: &str,
) -> AppResult<branch::Model> {
    let existing = Branch::find()
        .filter(branch::Column::RepoId.eq(repo_id))
        .filter(branch::Column::Name.eq(name))
        .one(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get branch: {}", e)))?;

    if let Some(branch) = existing {
        return Ok(branch);
    }

    let primaries = Branch::find()
        .filter(branch::Column::RepoId.eq(repo_id))
        .filter(branch::Column::IsPrimary.eq(true))
        .count(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to count primaries: {}", e)))?;

    let inserted = branch::ActiveModel {
        id: Set(Uuid::now_v7()),
        repo_id: Set(repo_id),
        name: Set(name.to_string()),
        is_primary: Set(primaries == 0),
        created_at: Set(Utc::now()),
    }
    .insert(conn)
    .await;

    match inserted {
        Ok(branch) => Ok(branch),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Branch::find()
                .filter(branch::Column::RepoId.eq(repo_id))
                .filter(branch::Column::Name.eq(name))
                .one(conn)
                .await
                .map_err(|e| AppError::Database(format!("Failed to re-read branch: {}", e)))?
                .ok_or_else(|| AppError::Database("Branch vanished after conflict".to_string()))
        }
        Err(e) => Err(AppError::Database(format!("Failed to insert branch: {}", e))),
    }
}

impl DbPool {
    /// List a repository's branches, primary first, then by name.
    pub async fn list_branches(&self, repo_id: Uuid) -> AppResult<Vec<branch::Model>> {
        Branch::find()
            .filter(branch::Column::RepoId.eq(repo_id))
            .order_by_desc(branch::Column::IsPrimary)
            .order_by_asc(branch::Column::Name)
            .all(&self.conn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to list branches: {}", e)))
    }

    /// Get a branch only if its repository belongs to the organization.
    /// Returns the owning repository as well.
    pub async fn find_branch_in_org(
        &self,
        organization_id: Uuid,
        branch_id: Uuid,
    ) -> AppResult<Option<(branch::Model, repo::Model)>> {
        let row = Branch::find_by_id(branch_id)
            .find_also_related(Repo)
            .filter(repo::Column::OrganizationId.eq(organization_id))
            .one(&self.conn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to get branch: {}", e)))?;

        Ok(row.and_then(|(branch, repo)| repo.map(|r| (branch, r))))
    }

    /// Resolve a branch by repository and branch name inside an organization.
    pub async fn find_branch_by_names(
        &self,
        organization_id: Uuid,
        repo_name: &str,
        branch_name: &str,
    ) -> AppResult<Option<(branch::Model, repo::Model)>> {
        let row = Branch::find()
            .filter(branch::Column::Name.eq(branch_name))
            .find_also_related(Repo)
            .filter(repo::Column::OrganizationId.eq(organization_id))
            .filter(repo::Column::Name.eq(repo_name))
            .one(&self.conn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to resolve branch: {}", e)))?;

        Ok(row.and_then(|(branch, repo)| repo.map(|r| (branch, r))))
    }

    /// Get the primary branch of a repository, if one exists.
    pub async fn primary_branch_of_repo(
        &self,
        repo_id: Uuid,
    ) -> AppResult<Option<branch::Model>> {
        Branch::find()
            .filter(branch::Column::RepoId.eq(repo_id))
            .filter(branch::Column::IsPrimary.eq(true))
            .one(&self.conn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to get primary branch: {}", e)))
    }

    /// Promote a branch to primary, demoting any current primary in the same
    /// transaction. Both the repo and the branch must sit inside the caller's
    /// organization.
    pub async fn set_primary_branch(
        &self,
        organization_id: Uuid,
        repo_id: Uuid,
        branch_id: Uuid,
    ) -> AppResult<branch::Model> {
        let repo = self
            .find_repo_in_org(organization_id, repo_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Repo {} not found", repo_id)))?;

        let txn = self
            .conn
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let branch = Branch::find_by_id(branch_id)
            .filter(branch::Column::RepoId.eq(repo.id))
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to get branch: {}", e)))?
            .ok_or_else(|| AppError::NotFound(format!("Branch {} not found", branch_id)))?;

        Branch::update_many()
            .col_expr(branch::Column::IsPrimary, Expr::value(false))
            .filter(branch::Column::RepoId.eq(repo.id))
            .filter(branch::Column::IsPrimary.eq(true))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to demote primary: {}", e)))?;

        let mut active: branch::ActiveModel = branch.into();
        active.is_primary = Set(true);
        let promoted = active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to promote branch: {}", e)))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit promotion: {}", e)))?;

        Ok(promoted)
    }
}
