//! Salon Server - appointment scheduling REST API

use axum::{
    routing::{delete, get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use salon_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("salon_server={},tower_http=debug", config.logging.level).into());
    let json = config.logging.format.eq_ignore_ascii_case("json");

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Starting Salon Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    let hours = config.scheduling.working_hours()?;
    tracing::info!(
        open = %hours.open(),
        close = %hours.close(),
        slot_minutes = hours.slot_minutes(),
        "Working hours loaded"
    );

    let repository = Repository::new(pool);
    let services = Services::new(repository, &config).expect("Failed to create services");

    services
        .users
        .ensure_bootstrap_owner()
        .await
        .expect("Failed to create bootstrap owner");

    let addr = SocketAddr::new(
        config.server.host.parse().expect("Invalid host address"),
        config.server.port,
    );

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/me", get(api::auth::me))
        // Users
        .route("/users", get(api::users::list_users).post(api::users::create_user))
        .route("/users/:id", get(api::users::get_user))
        // Appointments
        .route(
            "/appointments",
            get(api::appointments::list_appointments).post(api::appointments::create_appointment),
        )
        .route("/appointments/availability", get(api::appointments::availability))
        .route(
            "/appointments/:id",
            get(api::appointments::get_appointment)
                .put(api::appointments::update_appointment)
                .delete(api::appointments::delete_appointment),
        )
        .route("/appointments/:id/confirm", post(api::appointments::confirm_appointment))
        .route("/appointments/:id/complete", post(api::appointments::complete_appointment))
        .route("/appointments/:id/cancel", post(api::appointments::cancel_appointment))
        // Clients
        .route("/clients", get(api::clients::list_clients).post(api::clients::create_client))
        .route(
            "/clients/:id",
            get(api::clients::get_client)
                .put(api::clients::update_client)
                .delete(api::clients::delete_client),
        )
        .route("/clients/:id/appointments", get(api::clients::client_appointments))
        // Employees
        .route(
            "/employees",
            get(api::employees::list_employees).post(api::employees::create_employee),
        )
        .route(
            "/employees/:id",
            get(api::employees::get_employee)
                .put(api::employees::update_employee)
                .delete(api::employees::delete_employee),
        )
        .route(
            "/employees/:id/specialties",
            get(api::employees::list_specialties).put(api::employees::set_specialty),
        )
        .route(
            "/employees/:id/specialties/:service_id",
            delete(api::employees::remove_specialty),
        )
        // Services
        .route("/services", get(api::services::list_services).post(api::services::create_service))
        .route(
            "/services/:id",
            get(api::services::get_service)
                .put(api::services::update_service)
                .delete(api::services::delete_service),
        )
        .with_state(state);

    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
