use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::layout::PageLayout;
use crate::models::{DocumentSummary, ResumeDocument, SavedDocument};
use crate::store::session::{AutosavePolicy, CommitOutcome, SessionPhase};
use crate::store::{DocumentPatch, Workspace};
use crate::state::AppState;

#[derive(Serialize)]
pub struct DocumentListResponse {
    pub active_id: String,
    pub documents: Vec<DocumentSummary>,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub generation: u64,
    pub phase: SessionPhase,
    pub document_id: Option<String>,
    pub policy: AutosavePolicy,
    pub draft: ResumeDocument,
}

impl SessionResponse {
    fn from_workspace(workspace: &Workspace) -> Self {
        let session = workspace.session();
        Self {
            generation: session.generation(),
            phase: session.phase(),
            document_id: session.document_id().map(str::to_string),
            policy: session.policy(),
            draft: session.draft().clone(),
        }
    }
}

#[derive(Deserialize)]
pub struct DraftRequest {
    pub generation: u64,
    pub content: ResumeDocument,
}

#[derive(Serialize)]
pub struct DraftResponse {
    /// False when the edit targeted a superseded session and was dropped.
    pub accepted: bool,
    pub generation: u64,
    pub layout: PageLayout,
}

#[derive(Deserialize)]
pub struct CommitRequest {
    pub generation: u64,
}

#[derive(Serialize)]
pub struct CommitResponse {
    pub outcome: CommitOutcome,
}

// ────────────────────────────────────────────────────────────────────────────
// Documents
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/documents
pub async fn handle_list_documents(State(state): State<AppState>) -> Json<DocumentListResponse> {
    let workspace = state.workspace.lock().await;
    let store = workspace.store();
    Json(DocumentListResponse {
        active_id: store.active_id().to_string(),
        documents: store.documents().iter().map(DocumentSummary::from).collect(),
    })
}

/// POST /api/v1/documents
pub async fn handle_create_document(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SavedDocument>), AppError> {
    let doc = state.workspace.lock().await.create()?;
    info!(id = %doc.id, "Document created via API");
    Ok((StatusCode::CREATED, Json(doc)))
}

/// DELETE /api/v1/documents
pub async fn handle_clear_documents(
    State(state): State<AppState>,
) -> Result<Json<SavedDocument>, AppError> {
    let fresh = state.workspace.lock().await.clear_all()?;
    Ok(Json(fresh))
}

/// GET /api/v1/documents/:id
pub async fn handle_get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SavedDocument>, AppError> {
    let workspace = state.workspace.lock().await;
    let doc = workspace
        .store()
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError::document_not_found(&id))?;
    Ok(Json(doc))
}

/// PATCH /api/v1/documents/:id
pub async fn handle_update_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<DocumentPatch>,
) -> Result<Json<SavedDocument>, AppError> {
    if patch.is_empty() {
        return Err(AppError::Validation("patch must contain at least one field".to_string()));
    }
    let updated = state.workspace.lock().await.update(&id, &patch)?;
    updated
        .map(Json)
        .ok_or_else(|| AppError::document_not_found(&id))
}

/// DELETE /api/v1/documents/:id
pub async fn handle_delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.workspace.lock().await.delete(&id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::document_not_found(&id))
    }
}

/// POST /api/v1/documents/:id/duplicate
pub async fn handle_duplicate_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<SavedDocument>), AppError> {
    let copy = state
        .workspace
        .lock()
        .await
        .duplicate(&id)?
        .ok_or_else(|| AppError::document_not_found(&id))?;
    Ok((StatusCode::CREATED, Json(copy)))
}

/// POST /api/v1/documents/:id/activate
pub async fn handle_activate_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let mut workspace = state.workspace.lock().await;
    if !workspace.select(&id) {
        return Err(AppError::document_not_found(&id));
    }
    Ok(Json(SessionResponse::from_workspace(&workspace)))
}

// ────────────────────────────────────────────────────────────────────────────
// Editor session
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/session
pub async fn handle_get_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let workspace = state.workspace.lock().await;
    Json(SessionResponse::from_workspace(&workspace))
}

/// PUT /api/v1/session/draft
///
/// Applies a form edit in memory and returns the layout of the resulting
/// draft, computed before the lock is released.
pub async fn handle_edit_draft(
    State(state): State<AppState>,
    Json(req): Json<DraftRequest>,
) -> Json<DraftResponse> {
    let mut workspace = state.workspace.lock().await;
    let accepted = workspace.edit_draft(req.generation, req.content);
    let layout = state.layout(workspace.draft());
    Json(DraftResponse {
        accepted,
        generation: workspace.session().generation(),
        layout,
    })
}

/// POST /api/v1/session/commit
pub async fn handle_commit(
    State(state): State<AppState>,
    Json(req): Json<CommitRequest>,
) -> Result<Json<CommitResponse>, AppError> {
    let outcome = state.workspace.lock().await.commit(req.generation)?;
    Ok(Json(CommitResponse { outcome }))
}
