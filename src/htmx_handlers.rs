// src/htmx_handlers.rs

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde_json::json;
use strum::IntoEnumIterator;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    api_client, cloudinary,
    errors::AppError,
    form::{FormInput, ProductForm},
    models::Category,
    response::build_response,
    screen::{ActionKind, EditSession, Outcome, SharedSession},
    state::AppState,
};

/// Where the screen navigates after a successful update. The product list is
/// part of the surrounding admin chrome, not of this service.
const PRODUCT_LIST_PATH: &str = "/admin/products";

type FieldErrors = BTreeMap<String, String>;

// --- SCREEN MOUNT ---

/// Opens the edit screen: creates a fresh session, runs the load action once
/// and renders either the populated form or a full-screen error panel.
pub async fn product_edit_screen(
    State(app_state): State<AppState>,
    Path(product_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    tracing::info!("Opening edit screen for product {}", product_id);
    let mut session = EditSession::mount(product_id.clone());

    match api_client::fetch_product(&app_state.http, &app_state.api, &product_id).await {
        Ok(product) => {
            session.form = ProductForm::from_product(product);
            session.view.dispatch(ActionKind::Load, Outcome::Succeeded);
        }
        Err(err) => {
            let message = err.to_string();
            tracing::warn!("Loading product {} failed: {}", product_id, message);
            session
                .view
                .dispatch(ActionKind::Load, Outcome::Failed(message));
        }
    }

    let markup = render_edit_screen(&session, &FieldErrors::new());
    let session_id = session.id;
    app_state
        .sessions
        .insert(session_id, Arc::new(Mutex::new(session)))
        .await;

    build_response(headers, markup).await
}

// --- VEHICLE LIST EDITING ---

/// Appends a blank row right after the given one. The posted body carries the
/// whole form so edits made since the last render are not lost.
pub async fn add_vehicle_row(
    State(app_state): State<AppState>,
    Path((session_id, row_id)): Path<(Uuid, Uuid)>,
    body: String,
) -> Result<Markup, AppError> {
    let session = load_session(&app_state, session_id).await?;
    let mut session = session.lock().await;
    session.form.apply_input(parse_form_input(&body)?);
    session.form.append_row_after(row_id);
    Ok(render_vehicle_rows(&session))
}

pub async fn remove_vehicle_row(
    State(app_state): State<AppState>,
    Path((session_id, row_id)): Path<(Uuid, Uuid)>,
    body: String,
) -> Result<Markup, AppError> {
    let session = load_session(&app_state, session_id).await?;
    let mut session = session.lock().await;
    session.form.apply_input(parse_form_input(&body)?);
    session.form.remove_row(row_id);
    Ok(render_vehicle_rows(&session))
}

// --- IMAGE UPLOAD ACTION ---

/// Runs the upload action: fetch a signed ticket from the catalog, then send
/// the file to the media host. On success only the named image field changes;
/// on failure (either step) the form is left as it was and the error is
/// recorded in the upload slot.
pub async fn upload_product_image(
    State(app_state): State<AppState>,
    Path(session_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let session = load_session(&app_state, session_id).await?;
    let mut session = session.lock().await;

    let mut text_fields: HashMap<String, String> = HashMap::new();
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(field_name) = field.name().map(|name| name.to_string()) else {
            continue;
        };
        if field_name == "file" {
            let filename = field
                .file_name()
                .map(|name| name.to_string())
                .unwrap_or_else(|| "upload.jpg".to_string());
            let bytes = field.bytes().await?;
            if !bytes.is_empty() {
                file = Some((filename, bytes.to_vec()));
            }
        } else {
            text_fields.insert(field_name, field.text().await?);
        }
    }

    let target_field = text_fields
        .get("field")
        .cloned()
        .unwrap_or_else(|| "image".to_string());

    // The browser posts the whole form along with the file; keep the typed
    // value of the target field so a failed upload does not revert it.
    if let Some(typed) = text_fields.get(&target_field) {
        if let Some(slot) = session.form.image_field_mut(&target_field) {
            *slot = typed.clone();
        }
    }

    let Some((filename, bytes)) = file else {
        return Err(AppError::UnprocessableEntity(
            "No file was selected for upload".to_string(),
        ));
    };

    session.view.dispatch(ActionKind::Upload, Outcome::Started);
    tracing::info!(
        "Uploading '{}' into field '{}' for product {}",
        filename,
        target_field,
        session.product_id
    );

    let result = async {
        let ticket = api_client::fetch_upload_ticket(&app_state.http, &app_state.api).await?;
        cloudinary::upload_image(
            bytes,
            filename,
            &ticket,
            &app_state.cloudinary,
            &app_state.http,
        )
        .await
    }
    .await;

    let headers = match result {
        Ok(secure_url) => match session.form.image_field_mut(&target_field) {
            Some(slot) => {
                *slot = secure_url;
                session.view.dispatch(ActionKind::Upload, Outcome::Succeeded);
                toast_headers("success", "File uploaded successfully")
            }
            None => {
                let message = format!("Unknown image field '{}'", target_field);
                session
                    .view
                    .dispatch(ActionKind::Upload, Outcome::Failed(message.clone()));
                toast_headers("error", &message)
            }
        },
        Err(err) => {
            let message = err.to_string();
            session
                .view
                .dispatch(ActionKind::Upload, Outcome::Failed(message.clone()));
            toast_headers("error", &message)
        }
    };

    Ok((headers, render_image_field(&session, &FieldErrors::new())).into_response())
}

// --- SUBMIT ACTION ---

/// Validates the form and, when it passes, runs the update action. Validation
/// failure never reaches the catalog; a failed update keeps every typed value
/// on screen for correction.
pub async fn submit_product_update(
    State(app_state): State<AppState>,
    Path(session_id): Path<Uuid>,
    body: String,
) -> Result<Response, AppError> {
    let session = load_session(&app_state, session_id).await?;
    let mut session = session.lock().await;
    session.form.apply_input(parse_form_input(&body)?);

    if let Err(field_errors) = session.form.validate_submit() {
        tracing::debug!(
            "Submission for product {} blocked by {} field error(s)",
            session.product_id,
            field_errors.len()
        );
        return Ok(render_edit_screen(&session, &field_errors).into_response());
    }

    session.view.dispatch(ActionKind::Update, Outcome::Started);
    let update = session.form.to_update();

    match api_client::update_product(
        &app_state.http,
        &app_state.api,
        &session.product_id,
        &update,
    )
    .await
    {
        Ok(()) => {
            session.view.dispatch(ActionKind::Update, Outcome::Succeeded);
            app_state.sessions.invalidate(&session_id).await;

            let mut headers = toast_headers("success", "Product updated successfully");
            headers.insert("HX-Redirect", HeaderValue::from_static(PRODUCT_LIST_PATH));
            Ok((StatusCode::OK, headers, String::new()).into_response())
        }
        Err(err) => {
            let message = err.to_string();
            session
                .view
                .dispatch(ActionKind::Update, Outcome::Failed(message.clone()));
            let headers = toast_headers("error", &message);
            Ok((headers, render_edit_screen(&session, &FieldErrors::new())).into_response())
        }
    }
}

// --- HELPERS ---

async fn load_session(app_state: &AppState, session_id: Uuid) -> Result<SharedSession, AppError> {
    app_state
        .sessions
        .get(&session_id)
        .await
        .ok_or(AppError::SessionExpired)
}

fn parse_form_input(body: &str) -> Result<FormInput, AppError> {
    serde_qs::from_str(body).map_err(|err| {
        tracing::warn!("Could not decode form body: {}", err);
        AppError::UnprocessableEntity("Could not decode the submitted form".to_string())
    })
}

/// Transient toast riding on the HX-Trigger header; the shell listens for
/// the showMessage event.
fn toast_headers(kind: &str, message: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let payload = json!({
        "showMessage": {
            "message": message,
            "type": kind
        }
    });
    if let Ok(value) = HeaderValue::from_str(&payload.to_string()) {
        headers.insert("HX-Trigger", value);
    }
    headers
}

// --- RENDERING ---

fn render_edit_screen(session: &EditSession, errors: &FieldErrors) -> Markup {
    html! {
        div #product-edit-screen class="mx-auto max-w-screen-md" {
            @if let Some(message) = &session.view.slot(ActionKind::Load).error {
                div class="alert-error rounded-md border border-red-300 bg-red-50 p-4" {
                    p class="mb-2 font-medium text-red-700" { (message) }
                    a href=(format!("/admin/products/{}/edit", session.product_id))
                        class="text-blue-600 hover:underline" { "Try again" }
                }
            } @else {
                (render_edit_form(session, errors))
            }
        }
    }
}

fn render_edit_form(session: &EditSession, errors: &FieldErrors) -> Markup {
    let form = &session.form;
    let update_slot = session.view.slot(ActionKind::Update);
    html! {
        form #product-edit-form
            hx-post=(format!("/admin/edit/{}/submit", session.id))
            hx-target="#product-edit-screen"
            hx-swap="outerHTML"
        {
            h1 class="mb-4 text-xl" { "Edit Product " (session.product_id) }

            (text_field("name", "Name", &form.name, true, errors))
            (text_field("slug", "Slug", &form.slug, false, errors))
            (text_field("price", "Price", &form.price, false, errors))
            (render_image_field(session, errors))
            (render_category_select(&form.category, errors))
            (text_field("brand", "Brand", &form.brand, false, errors))
            (text_field("count_in_stock", "CountInStock", &form.count_in_stock, false, errors))
            (text_field("description", "Description", &form.description, false, errors))

            div class="mb-4" {
                label { "Compatible Vehicles" }
                (render_vehicle_rows(session))
            }

            @if let Some(message) = &update_slot.error {
                div class="alert-error mb-4 rounded-md bg-red-50 p-2 text-red-700" { (message) }
            }

            div class="mb-4" {
                button type="submit" disabled[update_slot.in_progress] class="primary-button" {
                    @if update_slot.in_progress { "Loading" } @else { "Update" }
                }
            }
            div class="mb-4" {
                a href=(PRODUCT_LIST_PATH) class="text-blue-600 hover:underline" { "Back" }
            }
        }
    }
}

fn text_field(name: &str, label: &str, value: &str, autofocus: bool, errors: &FieldErrors) -> Markup {
    html! {
        div class="mb-4" {
            label for=(name) { (label) }
            input type="text" class="w-full" id=(name) name=(name) value=(value) autofocus[autofocus];
            @if let Some(message) = errors.get(name) {
                div class="text-red-500" { (message) }
            }
        }
    }
}

/// The image URL input and the file input live in one fragment so an upload
/// can swap both without touching the rest of the form.
fn render_image_field(session: &EditSession, errors: &FieldErrors) -> Markup {
    let upload_slot = session.view.slot(ActionKind::Upload);
    html! {
        div #image-field {
            div class="mb-4" {
                label for="image" { "Image" }
                input type="text" class="w-full" id="image" name="image" value=(session.form.image);
                @if let Some(message) = errors.get("image") {
                    div class="text-red-500" { (message) }
                }
            }
            div class="mb-4" {
                label for="image-file" { "Upload Image" }
                input type="file" class="w-full" id="image-file" name="file"
                    hx-post=(format!("/admin/edit/{}/upload", session.id))
                    hx-encoding="multipart/form-data"
                    hx-vals=r#"{"field": "image"}"#
                    hx-target="#image-field"
                    hx-swap="outerHTML";
                @if upload_slot.in_progress {
                    div { "Uploading..." }
                }
                @if let Some(message) = &upload_slot.error {
                    div class="text-red-500" { (message) }
                }
            }
        }
    }
}

fn render_category_select(selected: &str, errors: &FieldErrors) -> Markup {
    html! {
        div class="mb-4" {
            label for="category" { "Category" }
            select class="w-full" id="category" name="category" {
                option value="" { "Select Category" }
                @for category in Category::iter() {
                    @let name = category.to_string();
                    option value=(name) selected[selected == name] { (name) }
                }
            }
            @if let Some(message) = errors.get("category") {
                div class="text-red-500" { (message) }
            }
        }
    }
}

fn render_vehicle_rows(session: &EditSession) -> Markup {
    let rows = &session.form.vehicles;
    html! {
        div #vehicle-rows {
            @for (index, row) in rows.iter().enumerate() {
                div class="mb-2 flex space-x-2" {
                    input type="hidden"
                        name=(format!("vehicles[{}][row_id]", index))
                        value=(row.row_id);
                    input type="text" class="w-full rounded-md border px-2 py-1"
                        placeholder="Make e.g. Toyota"
                        name=(format!("vehicles[{}][make]", index))
                        value=(row.make);
                    input type="text" class="w-full rounded-md border px-2 py-1"
                        placeholder="Model e.g. Prado"
                        name=(format!("vehicles[{}][model]", index))
                        value=(row.model);
                    input type="text" class="w-full rounded-md border px-2 py-1"
                        placeholder="Year e.g. 2005, 2006"
                        name=(format!("vehicles[{}][year]", index))
                        value=(row.year);
                    button type="button"
                        class="rounded-md bg-red-500 px-2 py-1 text-white hover:bg-red-600"
                        hx-post=(format!("/admin/edit/{}/vehicles/{}/remove", session.id, row.row_id))
                        hx-target="#vehicle-rows"
                        hx-swap="outerHTML" { "Remove" }
                    button type="button"
                        class="rounded-md bg-blue-500 px-2 py-1 text-white hover:bg-blue-600"
                        hx-post=(format!("/admin/edit/{}/vehicles/{}/add", session.id, row.row_id))
                        hx-target="#vehicle-rows"
                        hx-swap="outerHTML" { "Add" }
                }
            }
            @if rows.is_empty() {
                button type="button"
                    class="rounded-md bg-blue-500 px-2 py-1 text-white hover:bg-blue-600"
                    hx-post=(format!("/admin/edit/{}/vehicles/{}/add", session.id, Uuid::nil()))
                    hx-target="#vehicle-rows"
                    hx-swap="outerHTML" { "Add vehicle" }
            }
        }
    }
}
