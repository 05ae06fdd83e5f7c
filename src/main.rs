//! Testdeck server - main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use actix_cors::Cors;
use actix_web::{http::header, web, App, HttpServer};
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use testdeck_lib::config::{Config, ORG_UUID_HEADER, SESSION_USER_HEADER};
use testdeck_lib::db::DbPool;
use testdeck_lib::migration::Migrator;
use testdeck_lib::{api, middleware};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL must be set to a non-default value");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Testdeck Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
        info!("Using development default for DATABASE_URL");
    }

    // Connect to PostgreSQL
    let pool = match DbPool::new(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };
    info!("Database connection established");

    // Run migrations
    if let Err(e) = Migrator::up(pool.connection(), None).await {
        error!("Failed to run migrations: {}", e);
        std::process::exit(1);
    }
    info!("Database migrations complete");

    let bind_address = config.bind_address();
    let max_upload_size = config.max_upload_size;
    let is_development = config.is_development();

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!(
            "Starting server at http://{} ({} workers)",
            bind_address, cpus
        );
        cpus
    };

    // Start HTTP server
    HttpServer::new(move || {
        // Configure CORS
        let cors = if is_development {
            // Permissive CORS for development
            Cors::default()
                .allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
                .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
                .allowed_headers(vec![
                    header::ACCEPT,
                    header::CONTENT_TYPE,
                    ORG_UUID_HEADER.parse().unwrap(),
                    SESSION_USER_HEADER.parse().unwrap(),
                ])
                .max_age(3600)
        } else {
            // Restrictive CORS for production (same-origin only)
            Cors::default()
                .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
                .allowed_headers(vec![
                    header::ACCEPT,
                    header::CONTENT_TYPE,
                    ORG_UUID_HEADER.parse().unwrap(),
                    SESSION_USER_HEADER.parse().unwrap(),
                ])
                .max_age(3600)
        };

        App::new()
            // Add CORS middleware (must be before other middleware)
            .wrap(cors)
            // Add request logging middleware
            .wrap(middleware::RequestLogger)
            // Add shared state
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config.clone()))
            // Multipart bodies carry one XML document; leave headroom for
            // the multipart framing itself.
            .app_data(web::PayloadConfig::new(max_upload_size * 2))
            // Configure API routes; upload routes use catch-all segments and
            // must come after every literal route.
            .service(
                web::scope("/api/v1")
                    .configure(api::configure_health_routes)
                    .configure(api::configure_organization_routes)
                    .configure(api::configure_repo_routes)
                    .configure(api::configure_branch_routes)
                    .configure(api::configure_compare_routes)
                    .configure(api::configure_upload_routes),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
            )
    })
    .workers(worker_count)
    .bind(&bind_address)?
    .run()
    .await
}
