use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use replate_api::auth::{self, AppState, AppStateInner};
use replate_api::middleware::require_auth;
use replate_api::{admin, listings, messages};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "replate=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("REPLATE_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("REPLATE_DB_PATH").unwrap_or_else(|_| "replate.db".into());
    let host = std::env::var("REPLATE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("REPLATE_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let admin_emails: Vec<String> = std::env::var("REPLATE_ADMIN_EMAILS")
        .unwrap_or_default()
        .split(',')
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect();

    // Init database
    let db = replate_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let app_state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret,
        admin_emails,
    });

    // Routes
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(app_state.clone());

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/admin/ngos", get(admin::list_ngos))
        .route("/admin/ngos/{ngo_id}/verify", post(admin::verify_ngo))
        .route("/admin/ngos/{ngo_id}/reject", post(admin::reject_ngo))
        .route(
            "/listings",
            get(listings::list_listings).post(listings::create_listing),
        )
        .route(
            "/listings/{listing_id}",
            get(listings::get_listing)
                .put(listings::update_listing)
                .delete(listings::delete_listing),
        )
        .route("/listings/{listing_id}/claim", post(listings::claim_listing))
        .route(
            "/listings/{listing_id}/unclaim",
            post(listings::unclaim_listing),
        )
        .route(
            "/listings/{listing_id}/status",
            patch(listings::update_status),
        )
        .route(
            "/listings/{listing_id}/messages",
            get(messages::get_listing_messages),
        )
        .route("/messages", post(messages::send_message))
        .route("/conversations", get(messages::list_conversations))
        .layer(middleware::from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Replate server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
