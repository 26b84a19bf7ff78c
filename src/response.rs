use axum::body::Body;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use lol_html::{HtmlRewriter, Settings, element};
use maud::Markup;
use tokio::fs;

use crate::errors::AppError;

/// Loads the static HTML shell and splices the rendered screen into the
/// `#content` placeholder. The hx-* attributes that would re-fetch the
/// content on page load are stripped so HTMX does not overwrite the
/// server-rendered markup.
async fn serve_full_page(content_markup: Markup) -> Result<Response, AppError> {
    let shell_content = match fs::read("static/index.html").await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!("Could not load template static/index.html: {}", err);
            return Err(AppError::InternalServerError(
                "Could not load the page template".to_string(),
            ));
        }
    };

    let content_string = content_markup.into_string();
    let mut response_body = Vec::new();

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![element!("#content", |el| {
                el.set_inner_content(&content_string, lol_html::html_content::ContentType::Html);
                el.remove_attribute("hx-trigger");
                el.remove_attribute("hx-get");
                Ok(())
            })],
            ..Settings::default()
        },
        |chunk: &[u8]| response_body.extend_from_slice(chunk),
    );

    rewriter.write(&shell_content).map_err(|err| {
        tracing::error!("Template rewrite failed: {}", err);
        AppError::InternalServerError("Could not render the page".to_string())
    })?;
    rewriter.end().map_err(|err| {
        tracing::error!("Template rewrite failed: {}", err);
        AppError::InternalServerError("Could not render the page".to_string())
    })?;

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(Body::from(response_body))
        .map_err(|err| {
            tracing::error!("Could not build the page response: {}", err);
            AppError::InternalServerError("Could not render the page".to_string())
        })
}

/// HTMX requests get the bare fragment; a full page load (F5, deep link)
/// gets the fragment wrapped in the shell.
pub async fn build_response(headers: HeaderMap, page_content: Markup) -> Result<Response, AppError> {
    if headers.contains_key("HX-Request") {
        Ok(page_content.into_response())
    } else {
        serve_full_page(page_content).await
    }
}
