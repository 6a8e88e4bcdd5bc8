///! Reel Studio Server
///! REST API server for AI-assisted reel package authoring

mod api;
mod models;

use axum::{
    routing::{get, post, put},
    Router,
};
use genai::{GeminiConfig, GeminiGateway};
use std::sync::Arc;
use studio::StudioController;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "studio_server=debug,studio=debug,genai=debug".to_string()),
        )
        .init();

    info!("Starting Reel Studio Server...");

    let api_key = std::env::var("GEMINI_API_KEY")
        .map_err(|_| anyhow::anyhow!("GEMINI_API_KEY is not set"))?;
    let mut config = GeminiConfig::new(api_key);
    if let Ok(base) = std::env::var("GEMINI_API_BASE") {
        config = config.with_base_url(base);
    }
    let gateway = Arc::new(GeminiGateway::new(config)?);
    let controller = Arc::new(StudioController::new(gateway));

    // Build API router
    let app = Router::new()
        .route("/api/session", get(api::get_session))
        .route("/api/settings", put(api::update_settings))
        .route(
            "/api/package",
            post(api::create_package).delete(api::clear_package),
        )
        .route(
            "/api/package/thumbnail/regenerate",
            post(api::regenerate_thumbnail),
        )
        .route("/api/package/thumbnail/edit", post(api::edit_thumbnail))
        .route("/api/scenes/:index/image", post(api::generate_scene_image))
        .route(
            "/api/scenes/:index/regenerate",
            post(api::regenerate_scene_image),
        )
        .route("/api/scenes/:index/edit", post(api::edit_scene_image))
        .route(
            "/api/characters/:index/image",
            post(api::generate_character_image),
        )
        .route(
            "/api/characters/:index/edit",
            post(api::edit_character_image),
        )
        .route("/api/export", get(api::export_package))
        // CORS for local development
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(controller);

    // Start server
    let addr = std::env::var("STUDIO_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    info!("Studio server listening on http://{}", addr);
    info!("API endpoints:");
    info!("  GET    /api/session                      - Session snapshot");
    info!("  PUT    /api/settings                     - Update settings");
    info!("  POST   /api/package                      - Generate package");
    info!("  DELETE /api/package                      - Discard package");
    info!("  POST   /api/package/thumbnail/regenerate - Regenerate thumbnail");
    info!("  POST   /api/package/thumbnail/edit       - Edit thumbnail");
    info!("  POST   /api/scenes/:index/image          - Generate scene image");
    info!("  POST   /api/scenes/:index/regenerate     - Regenerate scene image");
    info!("  POST   /api/scenes/:index/edit           - Edit scene image");
    info!("  POST   /api/characters/:index/image      - Generate portrait");
    info!("  POST   /api/characters/:index/edit       - Edit portrait");
    info!("  GET    /api/export                       - Download zip archive");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
