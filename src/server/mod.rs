//! HTTP surface over the [`Pipeline`].

mod auth;
mod handlers;
mod response;

pub use auth::{AdminUser, AuthUser, USER_ID_HEADER};

use crate::pipeline::Pipeline;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Uploads arrive as base64 inside JSON.
const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

pub type AppState = Arc<Pipeline>;

pub fn router(pipeline: Arc<Pipeline>) -> Router {
    let images = Router::new()
        .route("/generate", post(handlers::generate))
        .route("/edit", post(handlers::edit))
        .route("/upload", post(handlers::upload))
        .route("/history", get(handlers::generation_history))
        .route("/edit-history", get(handlers::edit_history));

    let inspirations = Router::new()
        .route(
            "/",
            get(handlers::list_inspirations).post(handlers::create_inspiration),
        )
        .route("/categories", get(handlers::list_categories))
        .route(
            "/{id}",
            get(handlers::get_inspiration)
                .patch(handlers::update_inspiration)
                .delete(handlers::delete_inspiration),
        );

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/images", images)
        .nest("/api/inspirations", inspirations)
        .route("/api/keys/validate", post(handlers::validate_key))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(pipeline)
}

/// Serve until ctrl-c.
pub async fn serve(listener: TcpListener, pipeline: Arc<Pipeline>) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{}", addr);
    }

    axum::serve(listener, router(pipeline))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
}
