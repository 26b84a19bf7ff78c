// src/state.rs

use moka::future::Cache;
use uuid::Uuid;

use crate::screen::SharedSession;

#[derive(Clone)]
pub struct AppState {
    pub http: reqwest::Client,
    pub api: ApiConfig,
    pub cloudinary: CloudinaryConfig,
    pub sessions: Cache<Uuid, SharedSession>,
}

/// Base URL of the catalog backend that owns persistence and upload signing.
#[derive(Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

/// Public half of the media-host credentials. The API secret stays on the
/// catalog backend; this service only forwards signed tickets.
#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
}
