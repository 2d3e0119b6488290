use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::resume::ResumeDocument;

/// A résumé as held by the document store: content plus identity and title.
///
/// Serializes flat, matching the persisted layout
/// `{ "id", "title", "updatedAt", "fullName", ... }` with `updatedAt` in
/// milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedDocument {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(with = "chrono::serde::ts_milliseconds", default)]
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub content: ResumeDocument,
}

/// Listing entry returned by the documents API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: String,
    pub title: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl From<&SavedDocument> for DocumentSummary {
    fn from(doc: &SavedDocument) -> Self {
        Self {
            id: doc.id.clone(),
            title: doc.title.clone(),
            updated_at: doc.updated_at,
        }
    }
}
