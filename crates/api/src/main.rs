// Ecclesia API Server
// Membership management REST API for the church administration frontend.

mod config;
mod handlers;
mod middleware;
mod routes;

use config::Config;
use dotenvy::dotenv;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub struct AppState {
    pub db: ecclesia_database::Database,
    pub jwt_service: ecclesia_auth::JwtService,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,ecclesia_api=debug,tower_http=debug".to_string()),
        )
        .init();

    tracing::info!("🚀 Starting Ecclesia API Server");
    tracing::info!("📦 Version: {}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::from_env();
    tracing::info!("🔌 Server: {}:{}", config.server_host, config.server_port);

    // Initialize database
    tracing::info!("🗄️  Connecting to database...");
    let database = ecclesia_database::Database::new(config.database.clone())
        .await
        .expect("Failed to connect to database");
    database.ping().await.expect("Database ping failed");
    tracing::info!("✅ Database connected");

    sqlx::migrate!()
        .run(database.pool())
        .await
        .expect("Failed to run migrations");
    tracing::info!("✅ Migrations applied");

    // Initialize JWT service
    let jwt_service = ecclesia_auth::JwtService::new(&config.jwt_secret);
    tracing::info!("🔐 JWT service initialized");

    // Create app state
    let state = Arc::new(AppState {
        db: database,
        jwt_service,
    });

    // Create router
    let app = routes::create_router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    tracing::info!("📡 Routes configured:");
    tracing::info!("   GET  /health");
    tracing::info!("   POST /api/auth/login");
    tracing::info!("   POST /api/auth/register");
    tracing::info!("   GET/POST /api/members, PUT/DELETE /api/members/:id");
    tracing::info!("   GET/POST /api/departments, PUT/DELETE /api/departments/:id");
    tracing::info!("   GET/PUT  /api/departments/:id/members");
    tracing::info!("   GET/POST /api/cells, PUT/DELETE /api/cells/:id");
    tracing::info!("   GET  /api/users/me, PUT /api/users/change-password");
    tracing::info!("   GET/POST /api/users, PUT/DELETE /api/users/:id (admin)");
    tracing::info!("   GET  /api/summary");

    // Start server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("✅ Server ready at http://{}", addr);

    axum::serve(listener, app).await.expect("Server error");

    Ok(())
}
