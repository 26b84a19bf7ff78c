// src/api_client.rs
//
// Thin client for the catalog backend. Every failure is reduced to a single
// human-readable message (AppError::Upstream) before it reaches a handler,
// so the screen can show it as-is.

use reqwest::Client;

use crate::errors::{AppError, transport_error, upstream_error};
use crate::models::{Product, ProductUpdate, UploadTicket};
use crate::state::ApiConfig;

pub async fn fetch_product(
    http: &Client,
    api: &ApiConfig,
    product_id: &str,
) -> Result<Product, AppError> {
    let url = format!("{}/products/{}", api.base_url, product_id);
    let response = http.get(&url).send().await.map_err(transport_error)?;
    if !response.status().is_success() {
        return Err(upstream_error(response).await);
    }
    response.json::<Product>().await.map_err(|err| {
        tracing::error!("Could not decode product {}: {:?}", product_id, err);
        AppError::Upstream("Could not read the product from the catalog".to_string())
    })
}

pub async fn update_product(
    http: &Client,
    api: &ApiConfig,
    product_id: &str,
    update: &ProductUpdate,
) -> Result<(), AppError> {
    let url = format!("{}/products/{}", api.base_url, product_id);
    let response = http
        .put(&url)
        .json(update)
        .send()
        .await
        .map_err(transport_error)?;
    if !response.status().is_success() {
        return Err(upstream_error(response).await);
    }
    tracing::info!("Updated product {}", product_id);
    Ok(())
}

pub async fn fetch_upload_ticket(http: &Client, api: &ApiConfig) -> Result<UploadTicket, AppError> {
    let url = format!("{}/cloudinary-sign", api.base_url);
    let response = http.get(&url).send().await.map_err(transport_error)?;
    if !response.status().is_success() {
        return Err(upstream_error(response).await);
    }
    response.json::<UploadTicket>().await.map_err(|err| {
        tracing::error!("Could not decode upload ticket: {:?}", err);
        AppError::Upstream("Could not read the upload ticket".to_string())
    })
}
