pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::render::handlers as render;
use crate::state::AppState;
use crate::store::handlers as store;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Document store
        .route(
            "/api/v1/documents",
            get(store::handle_list_documents)
                .post(store::handle_create_document)
                .delete(store::handle_clear_documents),
        )
        .route(
            "/api/v1/documents/:id",
            get(store::handle_get_document)
                .patch(store::handle_update_document)
                .delete(store::handle_delete_document),
        )
        .route(
            "/api/v1/documents/:id/duplicate",
            post(store::handle_duplicate_document),
        )
        .route(
            "/api/v1/documents/:id/activate",
            post(store::handle_activate_document),
        )
        // Editor session
        .route("/api/v1/session", get(store::handle_get_session))
        .route("/api/v1/session/draft", put(store::handle_edit_draft))
        .route("/api/v1/session/commit", post(store::handle_commit))
        // Layout, preview and export
        .route("/api/v1/layout", get(render::handle_get_layout))
        .route("/", get(render::handle_preview))
        .route("/preview", get(render::handle_preview))
        .route("/documents/:id/preview", get(render::handle_document_preview))
        .route("/export.pdf", get(render::handle_export_pdf))
        .route(
            "/documents/:id/export.pdf",
            get(render::handle_document_export_pdf),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    use super::*;
    use crate::layout::{default_page_config, TextMetricsMeasurer};
    use crate::store::repository::MemoryRepository;
    use crate::store::{AutosavePolicy, DocumentStore, Workspace};

    fn test_state() -> AppState {
        let store = DocumentStore::open(Box::new(MemoryRepository::new()));
        AppState {
            workspace: Arc::new(Mutex::new(Workspace::new(
                store,
                AutosavePolicy::ContentChanged,
            ))),
            page_config: default_page_config(),
            measurer: Arc::new(TextMetricsMeasurer),
        }
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, bytes) = send(app, method, uri, body).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state());
        let (status, body) = send_json(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "vitae");
    }

    #[tokio::test]
    async fn test_document_lifecycle() {
        let app = build_router(test_state());

        let (status, created) = send_json(&app, Method::POST, "/api/v1/documents", None).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();

        let (_, list) = send_json(&app, Method::GET, "/api/v1/documents", None).await;
        assert_eq!(list["documents"].as_array().unwrap().len(), 2);
        assert_eq!(list["active_id"], id.as_str());

        let (status, patched) = send_json(
            &app,
            Method::PATCH,
            &format!("/api/v1/documents/{id}"),
            Some(json!({ "title": "Backend CV", "jobTitle": "Engineer" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(patched["title"], "Backend CV");
        assert_eq!(patched["jobTitle"], "Engineer");

        let (status, copy) = send_json(
            &app,
            Method::POST,
            &format!("/api/v1/documents/{id}/duplicate"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(copy["title"], "Backend CV (copy)");

        let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/documents/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, Method::GET, &format!("/api/v1/documents/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_document_is_not_found() {
        let app = build_router(test_state());
        for (method, uri) in [
            (Method::GET, "/api/v1/documents/missing"),
            (Method::POST, "/api/v1/documents/missing/duplicate"),
            (Method::POST, "/api/v1/documents/missing/activate"),
            (Method::GET, "/documents/missing/preview"),
        ] {
            let (status, body) = send_json(&app, method, uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body["error"]["code"], "NOT_FOUND");
        }
    }

    #[tokio::test]
    async fn test_invalid_patch_is_bad_request() {
        let app = build_router(test_state());
        let (_, list) = send_json(&app, Method::GET, "/api/v1/documents", None).await;
        let id = list["active_id"].as_str().unwrap().to_string();

        let (status, body) = send_json(
            &app,
            Method::PATCH,
            &format!("/api/v1/documents/{id}"),
            Some(json!({ "experience": "not a list" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_draft_edit_then_commit() {
        let app = build_router(test_state());
        let (_, session) = send_json(&app, Method::GET, "/api/v1/session", None).await;
        let generation = session["generation"].as_u64().unwrap();
        let mut content = session["draft"].clone();
        content["fullName"] = json!("Grace Hopper");

        let (status, draft) = send_json(
            &app,
            Method::PUT,
            "/api/v1/session/draft",
            Some(json!({ "generation": generation, "content": content })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(draft["accepted"], true);
        assert_eq!(draft["layout"]["pages"].as_array().unwrap().len(), 1);

        let (_, commit) = send_json(
            &app,
            Method::POST,
            "/api/v1/session/commit",
            Some(json!({ "generation": generation })),
        )
        .await;
        assert_eq!(commit["outcome"], "saved");

        let (_, again) = send_json(
            &app,
            Method::POST,
            "/api/v1/session/commit",
            Some(json!({ "generation": generation })),
        )
        .await;
        assert_eq!(again["outcome"], "unchanged");
    }

    #[tokio::test]
    async fn test_commit_after_switch_is_discarded() {
        let app = build_router(test_state());
        let (_, session) = send_json(&app, Method::GET, "/api/v1/session", None).await;
        let stale = session["generation"].as_u64().unwrap();

        send(&app, Method::POST, "/api/v1/documents", None).await;
        let (_, commit) = send_json(
            &app,
            Method::POST,
            "/api/v1/session/commit",
            Some(json!({ "generation": stale })),
        )
        .await;
        assert_eq!(commit["outcome"], "discarded");
    }

    #[tokio::test]
    async fn test_layout_and_preview() {
        let app = build_router(test_state());
        let (status, layout) = send_json(&app, Method::GET, "/api/v1/layout", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(layout["pages"][0]["sections"][0], "header");

        let (status, html) = send(&app, Method::GET, "/preview", None).await;
        assert_eq!(status, StatusCode::OK);
        let html = String::from_utf8(html).unwrap();
        assert!(html.contains("class=\"page\""));
        assert!(html.contains("Your Name"));
    }

    #[tokio::test]
    async fn test_export_pdf_headers() {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::get("/export.pdf").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"CV_Your_Name.pdf\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }
}
