use std::sync::Arc;

use tokio::sync::Mutex;

use crate::layout::{layout_document, Measure, PageConfig, PageLayout};
use crate::models::ResumeDocument;
use crate::store::Workspace;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Document store and editor session. Handlers hold the lock across the
    /// store mutation and the layout pass that depends on it.
    pub workspace: Arc<Mutex<Workspace>>,
    /// Page geometry shared by the measurer and the preview.
    pub page_config: PageConfig,
    /// Pluggable height measurement. Default: TextMetricsMeasurer.
    pub measurer: Arc<dyn Measure>,
}

impl AppState {
    pub fn layout(&self, doc: &ResumeDocument) -> PageLayout {
        layout_document(doc, self.measurer.as_ref(), &self.page_config)
    }
}
