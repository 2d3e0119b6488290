use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::errors::AppError;
use crate::layout::PageLayout;
use crate::models::ResumeDocument;
use crate::render::pdf::{export_file_name, render_pdf};
use crate::render::preview::render_preview;
use crate::state::AppState;

/// GET /api/v1/layout
pub async fn handle_get_layout(State(state): State<AppState>) -> Json<PageLayout> {
    let workspace = state.workspace.lock().await;
    Json(state.layout(workspace.draft()))
}

/// GET / and GET /preview
pub async fn handle_preview(State(state): State<AppState>) -> Html<String> {
    let workspace = state.workspace.lock().await;
    let draft = workspace.draft();
    let layout = state.layout(draft);
    Html(render_preview(draft, &layout, &state.page_config, "/export.pdf"))
}

/// GET /documents/:id/preview
pub async fn handle_document_preview(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let workspace = state.workspace.lock().await;
    let doc = workspace
        .store()
        .get(&id)
        .ok_or_else(|| AppError::document_not_found(&id))?;
    let layout = state.layout(&doc.content);
    let export_href = format!("/documents/{id}/export.pdf");
    Ok(Html(render_preview(
        &doc.content,
        &layout,
        &state.page_config,
        &export_href,
    )))
}

/// GET /export.pdf
pub async fn handle_export_pdf(State(state): State<AppState>) -> Result<Response, AppError> {
    let snapshot = state.workspace.lock().await.draft().clone();
    pdf_response(snapshot).await
}

/// GET /documents/:id/export.pdf
pub async fn handle_document_export_pdf(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let snapshot = state
        .workspace
        .lock()
        .await
        .store()
        .get(&id)
        .map(|doc| doc.content.clone())
        .ok_or_else(|| AppError::document_not_found(&id))?;
    pdf_response(snapshot).await
}

/// Renders on the blocking pool; the document is an owned snapshot so the
/// workspace lock is already released.
async fn pdf_response(doc: ResumeDocument) -> Result<Response, AppError> {
    let file_name = export_file_name(&doc);
    let bytes = tokio::task::spawn_blocking(move || render_pdf(&doc))
        .await
        .context("PDF render task failed")?;
    info!(file_name = %file_name, size = bytes.len(), "PDF exported");

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&file_name)),
        ],
        bytes,
    )
        .into_response())
}

/// `attachment` disposition with an ASCII fallback name and the exact
/// UTF-8 name in `filename*`.
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if fallback == file_name {
        return format!("attachment; filename=\"{file_name}\"");
    }

    let mut encoded = String::with_capacity(file_name.len() * 3);
    for byte in file_name.bytes() {
        if byte.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_name_disposition() {
        assert_eq!(
            content_disposition("CV_Ada_Lovelace.pdf"),
            "attachment; filename=\"CV_Ada_Lovelace.pdf\""
        );
    }

    #[test]
    fn test_non_ascii_name_gets_encoded_variant() {
        assert_eq!(
            content_disposition("CV_José.pdf"),
            "attachment; filename=\"CV_Jos_.pdf\"; filename*=UTF-8''CV_Jos%C3%A9.pdf"
        );
    }
}
