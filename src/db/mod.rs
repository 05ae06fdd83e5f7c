//! Database access layer built on SeaORM.
//!
//! `DbPool` wraps the connection and exposes one query module per aggregate.
//! Ingestion writers that must run inside a caller-owned transaction are free
//! functions generic over `ConnectionTrait` instead of pool methods.

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};

pub mod branches;
pub mod coverage_reports;
pub mod organizations;
pub mod repos;
pub mod test_reports;

pub use branches::find_or_create_branch;
pub use coverage_reports::insert_coverage_report_tree;
pub use repos::find_or_create_repo;
pub use test_reports::insert_test_report_tree;

/// Scope selector for trend queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendScope {
    Organization(Uuid),
    Repo(Uuid),
    Branch(Uuid),
}

/// Shared database handle.
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Connect to PostgreSQL using the configured URL.
    pub async fn new(config: &Config) -> AppResult<Self> {
        let mut options = ConnectOptions::new(config.database_url.clone());
        options
            .max_connections(20)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let conn = Database::connect(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to database: {}", e)))?;

        Ok(Self { conn })
    }

    /// Get the underlying connection for queries and transactions.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Round-trip check used by the readiness endpoint.
    pub async fn ping(&self) -> AppResult<()> {
        self.conn
            .ping()
            .await
            .map_err(|e| AppError::Database(format!("Database ping failed: {}", e)))
    }
}
