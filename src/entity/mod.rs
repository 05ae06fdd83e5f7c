//! SeaORM entity definitions for PostgreSQL database.

pub mod branch;
pub mod coverage_file;
pub mod coverage_report;
pub mod membership;
pub mod organization;
pub mod repo;
pub mod test_case;
pub mod test_report;
pub mod test_suite;
pub mod user;
