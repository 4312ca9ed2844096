#![allow(clippy::needless_for_each, clippy::cognitive_complexity)]

pub mod routes;

pub use routes::*;

use app_state::{get_db_pool, settings};
use color_eyre::Result;
use http::{HeaderValue, header};
use tower_http::compression::CompressionLayer;
use tower_http::cors;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Tracing & Error Handling Setup ---
    let level = &settings().logging.level;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!(
                    "api={level},common_services={level},tower_http=info"
                ))
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    color_eyre::install()?;

    // --- Server Startup ---
    info!("🚀 Initializing server...");
    let pool = get_db_pool().await?;
    sqlx::migrate!("../../../migrations").run(&pool).await?;
    let api_settings = &settings().api;

    // --- CORS Configuration ---
    let allowed_origins: Vec<HeaderValue> = api_settings
        .allowed_origins
        .iter()
        .filter_map(|s| match s.parse() {
            Ok(hv) => Some(hv),
            Err(e) => {
                error!("Invalid CORS origin configured: {} - Error: {}", s, e);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_methods(cors::Any)
        .allow_origin(allowed_origins)
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ORIGIN,
            header::USER_AGENT,
            header::CACHE_CONTROL,
            header::PRAGMA,
        ]);

    // --- Create Router & Start Server ---
    let app = create_router(pool)
        .layer(cors)
        .layer(CompressionLayer::new());
    let listen_address = api_settings.listen_address();
    let listener = tokio::net::TcpListener::bind(&listen_address).await?;

    info!("📚 Docs available at http://{listen_address}/docs");
    info!("✅ Server listening on http://{listen_address}");

    axum::serve(listener, app).await?;
    Ok(())
}
