// src/main.rs

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use dotenvy::dotenv;
use moka::future::Cache;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api_client;
mod cloudinary;
mod errors;
mod form;
mod htmx_handlers;
mod models;
mod response;
mod screen;
mod state;

use crate::htmx_handlers::*;
use crate::state::{ApiConfig, AppState, CloudinaryConfig};

// Abandoned edit sessions linger this long after their last request before
// the cache drops them.
const SESSION_IDLE_MINUTES: u64 = 30;

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "autoparts_admin=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting the admin product editor...");

    let api = ApiConfig {
        base_url: env::var("CATALOG_API_BASE_URL").expect("CATALOG_API_BASE_URL must be set"),
    };
    let cloudinary = CloudinaryConfig {
        cloud_name: env::var("CLOUDINARY_CLOUD_NAME").expect("CLOUDINARY_CLOUD_NAME must be set"),
        api_key: env::var("CLOUDINARY_API_KEY").expect("CLOUDINARY_API_KEY must be set"),
    };

    let sessions = Cache::builder()
        .max_capacity(10_000)
        .time_to_idle(Duration::from_secs(SESSION_IDLE_MINUTES * 60))
        .build();

    let app_state = AppState {
        http: reqwest::Client::new(),
        api,
        cloudinary,
        sessions,
    };

    let app = Router::new()
        .route("/admin/products/{id}/edit", get(product_edit_screen))
        .route(
            "/admin/edit/{session_id}/vehicles/{row_id}/add",
            post(add_vehicle_row),
        )
        .route(
            "/admin/edit/{session_id}/vehicles/{row_id}/remove",
            post(remove_vehicle_row),
        )
        .route("/admin/edit/{session_id}/upload", post(upload_product_image))
        .route("/admin/edit/{session_id}/submit", post(submit_product_update))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024))
        .with_state(app_state);

    let addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()
        .expect("BIND_ADDR must be a valid socket address");
    tracing::info!("Listening on {}", addr);

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("Could not bind {}: {}", addr, err);
            return;
        }
    };

    if let Err(err) = axum::serve(listener, app.into_make_service()).await {
        tracing::error!("Server error: {}", err);
    }
}
