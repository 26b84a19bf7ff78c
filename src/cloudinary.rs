// src/cloudinary.rs

use reqwest::{Client, multipart};
use serde::Deserialize;

use crate::errors::{AppError, transport_error};
use crate::models::UploadTicket;
use crate::state::CloudinaryConfig;

#[derive(Debug, Deserialize)]
struct CloudinaryUploadResponse {
    secure_url: String,
}

/// Sends one file to the media host, authorized by a ticket issued by the
/// catalog backend. The API secret never passes through this service; the
/// signature in the ticket is the only credential beyond the public key.
pub async fn upload_image(
    image_bytes: Vec<u8>,
    filename: String,
    ticket: &UploadTicket,
    config: &CloudinaryConfig,
    http: &Client,
) -> Result<String, AppError> {
    let part = multipart::Part::bytes(image_bytes)
        .file_name(filename)
        .mime_str("image/*")
        .map_err(|err| {
            tracing::error!("Could not set MIME type for upload: {}", err);
            AppError::InternalServerError("Could not prepare the file for upload".to_string())
        })?;

    let form = multipart::Form::new()
        .part("file", part)
        .text("api_key", config.api_key.clone())
        .text("timestamp", ticket.timestamp.clone())
        .text("signature", ticket.signature.clone());

    let url = format!(
        "https://api.cloudinary.com/v1_1/{}/image/upload",
        config.cloud_name
    );

    let response = http
        .post(&url)
        .multipart(form)
        .send()
        .await
        .map_err(transport_error)?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "no error body".to_string());
        tracing::error!(
            "Media host rejected the upload: status={}, body={}",
            status,
            error_text
        );
        return Err(AppError::Upstream(format!(
            "Image upload failed with status code {}",
            status.as_u16()
        )));
    }

    let upload = response
        .json::<CloudinaryUploadResponse>()
        .await
        .map_err(|err| {
            tracing::error!("Could not decode media host response: {}", err);
            AppError::Upstream("Could not read the media host response".to_string())
        })?;

    Ok(upload.secure_url)
}
