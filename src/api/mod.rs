//! API endpoint modules.

pub mod branches;
pub mod compare;
pub mod health;
pub mod openapi;
pub mod organizations;
pub mod repos;
pub mod uploads;

pub use branches::configure_routes as configure_branch_routes;
pub use compare::configure_routes as configure_compare_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use organizations::configure_routes as configure_organization_routes;
pub use repos::configure_routes as configure_repo_routes;
pub use uploads::configure_routes as configure_upload_routes;
