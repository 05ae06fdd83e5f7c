//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20250901_000001_create_organizations;
mod m20250901_000002_create_users;
mod m20250901_000003_create_memberships;
mod m20250901_000004_create_repos;
mod m20250901_000005_create_branches;
mod m20250901_000006_create_test_reports;
mod m20250901_000007_create_test_suites;
mod m20250901_000008_create_test_cases;
mod m20250901_000009_create_coverage_reports;
mod m20250901_000010_create_coverage_files;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_organizations::Migration),
            Box::new(m20250901_000002_create_users::Migration),
            Box::new(m20250901_000003_create_memberships::Migration),
            Box::new(m20250901_000004_create_repos::Migration),
            Box::new(m20250901_000005_create_branches::Migration),
            Box::new(m20250901_000006_create_test_reports::Migration),
            Box::new(m20250901_000007_create_test_suites::Migration),
            Box::new(m20250901_000008_create_test_cases::Migration),
            Box::new(m20250901_000009_create_coverage_reports::Migration),
            Box::new(m20250901_000010_create_coverage_files::Migration),
        ]
    }
}
