use std::net::SocketAddr;

use kinship_server::{app, config::Settings, db::Database, state::AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kinship_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load settings
    let settings = Settings::new().expect("Failed to load settings");
    if settings.auth.uses_development_secret() {
        tracing::warn!("SECRET_KEY is not set; signing tokens with the development secret");
    }

    // Initialize database
    let db = Database::new(&settings.database.path).expect("Failed to create database");
    db.initialize()
        .expect("Failed to initialize database schema");
    tracing::info!("Database initialized at {}", settings.database.path);

    let state = AppState::new(db, &settings.auth);

    // Start server
    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .expect("Failed to parse server address");
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app(state))
        .await
        .expect("Server error");
}
