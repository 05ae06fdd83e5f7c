//! Database queries for organizations, users and memberships.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
    TransactionTrait,
};
use uuid::Uuid;

use crate::entity::membership::{self, Entity as Membership};
use crate::entity::organization::{self, Entity as Organization};
use crate::entity::user::{self, Entity as User};
use crate::error::{AppError, AppResult};

use super::DbPool;

impl DbPool {
    /// Create an organization together with its first user and a membership,
    /// all in one transaction.
    ///
    /// The user is reused when the email is already registered; in that case
    /// the new membership becomes the default only if the user has none yet.
    /// A taken organization name maps to a conflict error.
    pub async fn insert_organization_with_owner(
        &self,
        email: &str,
        organization_name: &str,
    ) -> AppResult<(organization::Model, user::Model)> {
        let txn = self
            .conn
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let now = Utc::now();

        let user = match User::find()
            .filter(user::Column::Email.eq(email))
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to look up user: {}", e)))?
        {
            Some(existing) => existing,
            None => user::ActiveModel {
                id: Set(Uuid::now_v7()),
                email: Set(email.to_string()),
                created_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert user: {}", e)))?,
        };

        let org = organization::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(organization_name.to_string()),
            public_uuid: Set(Uuid::new_v4()),
            created_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(format!(
                "Organization '{}' already exists",
                organization_name
            )),
            _ => AppError::Database(format!("Failed to insert organization: {}", e)),
        })?;

        let has_default = Membership::find()
            .filter(membership::Column::UserId.eq(user.id))
            .filter(membership::Column::IsDefault.eq(true))
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to check memberships: {}", e)))?
            .is_some();

        membership::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user.id),
            organization_id: Set(org.id),
            is_default: Set(!has_default),
            created_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert membership: {}", e)))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit registration: {}", e)))?;

        Ok((org, user))
    }

    /// Look up an organization by its public upload token.
    pub async fn find_org_by_public_uuid(
        &self,
        public_uuid: Uuid,
    ) -> AppResult<Option<organization::Model>> {
        Organization::find()
            .filter(organization::Column::PublicUuid.eq(public_uuid))
            .one(&self.conn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to get organization: {}", e)))
    }

    /// Look up a user by email, as carried in the session header.
    pub async fn find_user_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to get user: {}", e)))
    }

    /// List the organizations a user belongs to, with the default flag.
    pub async fn organizations_for_user(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<(organization::Model, bool)>> {
        let rows = Membership::find()
            .filter(membership::Column::UserId.eq(user_id))
            .find_also_related(Organization)
            .order_by_asc(organization::Column::Name)
            .all(&self.conn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to list organizations: {}", e)))?;

        Ok(rows
            .into_iter()
            .filter_map(|(m, org)| org.map(|o| (o, m.is_default)))
            .collect())
    }

    /// Get the organization behind a user's default membership.
    pub async fn default_org_for_user(
        &self,
        user_id: Uuid,
    ) -> AppResult<Option<organization::Model>> {
        let row = Membership::find()
            .filter(membership::Column::UserId.eq(user_id))
            .filter(membership::Column::IsDefault.eq(true))
            .find_also_related(Organization)
            .one(&self.conn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to get default membership: {}", e)))?;

        Ok(row.and_then(|(_, org)| org))
    }

    /// Switch a user's default membership to the given organization.
    ///
    /// Clears every other default in the same transaction so at most one
    /// membership per user carries the flag.
    pub async fn set_default_organization(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> AppResult<()> {
        let txn = self
            .conn
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let target = Membership::find()
            .filter(membership::Column::UserId.eq(user_id))
            .filter(membership::Column::OrganizationId.eq(organization_id))
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to get membership: {}", e)))?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No membership in organization {}",
                    organization_id
                ))
            })?;

        Membership::update_many()
            .col_expr(membership::Column::IsDefault, Expr::value(false))
            .filter(membership::Column::UserId.eq(user_id))
            .filter(membership::Column::IsDefault.eq(true))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to clear defaults: {}", e)))?;

        let mut active: membership::ActiveModel = target.into();
        active.is_default = Set(true);
        active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to set default: {}", e)))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit default switch: {}", e)))?;

        Ok(())
    }
}
