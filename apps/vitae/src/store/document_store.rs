//! Keyed collection of saved résumés with an active selection.
//!
//! # Invariants
//! - The collection is never empty; every path that could empty it
//!   synthesizes a fresh default document instead.
//! - `active_id` always names a document in the collection.
//! - Every mutation of the collection is persisted before the call returns.
//! - Timestamps are strictly increasing across the store's lifetime.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::models::{ResumeDocument, SavedDocument};
use crate::store::repository::{DocumentRepository, StoreError};

pub const DEFAULT_TITLE: &str = "New Résumé";
const COPY_SUFFIX: &str = " (copy)";

/// Keys the store owns; a patch can never overwrite them.
const PROTECTED_KEYS: &[&str] = &["id", "updatedAt"];

// ────────────────────────────────────────────────────────────────────────────
// Patch
// ────────────────────────────────────────────────────────────────────────────

/// Partial update merged shallowly over a stored document.
///
/// Keys use the persisted camelCase names. A key present in the patch replaces
/// the whole field, lists included.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct DocumentPatch(Map<String, Value>);

#[cfg(test)]
impl DocumentPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self::new().with("title", Value::String(title.into()))
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }
}

impl DocumentPatch {
    /// A patch replacing every content field with `content`.
    pub fn from_content(content: &ResumeDocument) -> Result<Self, StoreError> {
        match serde_json::to_value(content)? {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(StoreError::InvalidPatch(
                "document content did not serialize to an object".to_string(),
            )),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn apply_to(&self, doc: &SavedDocument) -> Result<SavedDocument, StoreError> {
        let mut value = serde_json::to_value(doc)?;
        if let Value::Object(fields) = &mut value {
            for (key, patch_value) in &self.0 {
                if PROTECTED_KEYS.contains(&key.as_str()) {
                    continue;
                }
                fields.insert(key.clone(), patch_value.clone());
            }
        }
        serde_json::from_value(value).map_err(|e| StoreError::InvalidPatch(e.to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Store
// ────────────────────────────────────────────────────────────────────────────

pub struct DocumentStore {
    repo: Box<dyn DocumentRepository>,
    documents: Vec<SavedDocument>,
    active_id: String,
    last_stamp_ms: i64,
}

impl DocumentStore {
    /// Loads the collection, falling back to one fresh default document when
    /// stored data is missing, empty or unreadable. The fallback is persisted.
    pub fn open(repo: Box<dyn DocumentRepository>) -> Self {
        let loaded = match repo.load() {
            Ok(docs) => docs,
            Err(e) => {
                warn!("Stored documents unreadable, starting fresh: {e}");
                Vec::new()
            }
        };

        let last_stamp_ms = loaded
            .iter()
            .map(|d| d.updated_at.timestamp_millis())
            .max()
            .unwrap_or(0);

        let mut store = Self {
            repo,
            documents: loaded,
            active_id: String::new(),
            last_stamp_ms,
        };

        if store.documents.is_empty() {
            let fresh = store.new_document(DEFAULT_TITLE.to_string());
            store.documents.push(fresh);
            if let Err(e) = store.persist() {
                error!("Failed to persist default document: {e}");
            }
        }

        store.active_id = store.documents[0].id.clone();
        info!(
            documents = store.documents.len(),
            active = %store.active_id,
            "Document store opened"
        );
        store
    }

    pub fn documents(&self) -> &[SavedDocument] {
        &self.documents
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    pub fn active(&self) -> &SavedDocument {
        let idx = self.position(&self.active_id).unwrap_or(0);
        &self.documents[idx]
    }

    pub fn get(&self, id: &str) -> Option<&SavedDocument> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// Appends a new default document and makes it active.
    pub fn create(&mut self) -> Result<SavedDocument, StoreError> {
        let title = self.next_default_title();
        let doc = self.new_document(title);
        self.documents.push(doc.clone());
        self.active_id = doc.id.clone();
        self.persist()?;
        info!(id = %doc.id, title = %doc.title, "Created document");
        Ok(doc)
    }

    /// Merges `patch` into document `id` and refreshes its timestamp.
    ///
    /// Returns `Ok(None)` when no document has that id.
    pub fn update(
        &mut self,
        id: &str,
        patch: &DocumentPatch,
    ) -> Result<Option<SavedDocument>, StoreError> {
        let Some(idx) = self.position(id) else {
            debug!(id, "Update skipped: unknown document");
            return Ok(None);
        };

        let mut merged = patch.apply_to(&self.documents[idx])?;
        merged.updated_at = self.next_stamp();
        self.documents[idx] = merged.clone();
        self.persist()?;
        debug!(id, "Updated document");
        Ok(Some(merged))
    }

    /// Removes document `id`. Returns whether anything was removed.
    pub fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let Some(idx) = self.position(id) else {
            return Ok(false);
        };
        self.documents.remove(idx);

        if self.documents.is_empty() {
            let fresh = self.new_document(DEFAULT_TITLE.to_string());
            self.active_id = fresh.id.clone();
            self.documents.push(fresh);
        } else if self.active_id == id {
            self.active_id = self.documents[0].id.clone();
        }

        self.persist()?;
        info!(id, remaining = self.documents.len(), "Deleted document");
        Ok(true)
    }

    /// Clones document `id` right after itself under a new id and makes the
    /// clone active.
    pub fn duplicate(&mut self, id: &str) -> Result<Option<SavedDocument>, StoreError> {
        let Some(idx) = self.position(id) else {
            return Ok(None);
        };
        let source = &self.documents[idx];
        let title = format!("{}{COPY_SUFFIX}", source.title);
        let content = source.content.clone();

        let copy = SavedDocument {
            id: Uuid::new_v4().to_string(),
            title,
            updated_at: self.next_stamp(),
            content,
        };
        self.documents.insert(idx + 1, copy.clone());
        self.active_id = copy.id.clone();
        self.persist()?;
        info!(source = id, id = %copy.id, "Duplicated document");
        Ok(Some(copy))
    }

    /// Drops every document and all persisted state, leaving one default.
    pub fn clear_all(&mut self) -> Result<SavedDocument, StoreError> {
        self.repo.clear()?;
        let fresh = self.new_document(DEFAULT_TITLE.to_string());
        self.documents = vec![fresh.clone()];
        self.active_id = fresh.id.clone();
        self.persist()?;
        info!("Cleared all documents");
        Ok(fresh)
    }

    /// Changes the active document. Unknown ids are ignored.
    pub fn set_active(&mut self, id: &str) -> bool {
        if self.position(id).is_none() {
            return false;
        }
        self.active_id = id.to_string();
        true
    }

    // ── internals ──────────────────────────────────────────────────────────

    fn position(&self, id: &str) -> Option<usize> {
        self.documents.iter().position(|d| d.id == id)
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.repo.save(&self.documents)
    }

    fn new_document(&mut self, title: String) -> SavedDocument {
        SavedDocument {
            id: Uuid::new_v4().to_string(),
            title,
            updated_at: self.next_stamp(),
            content: ResumeDocument::placeholder(),
        }
    }

    /// "New Résumé" for an empty collection, otherwise "New Résumé N" with
    /// N starting at len + 1 and bumped past any title already taken.
    fn next_default_title(&self) -> String {
        if self.documents.is_empty() {
            return DEFAULT_TITLE.to_string();
        }
        let mut n = self.documents.len() + 1;
        loop {
            let candidate = format!("{DEFAULT_TITLE} {n}");
            if self.documents.iter().all(|d| d.title != candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Millisecond-precision stamp, at least 1 ms after the previous one.
    fn next_stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now().timestamp_millis();
        let ms = now.max(self.last_stamp_ms + 1);
        self.last_stamp_ms = ms;
        DateTime::from_timestamp_millis(ms).unwrap_or_else(Utc::now)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::repository::MemoryRepository;
    use serde_json::json;

    fn open_store() -> (DocumentStore, MemoryRepository) {
        let repo = MemoryRepository::new();
        let store = DocumentStore::open(Box::new(repo.clone()));
        (store, repo)
    }

    fn persisted(repo: &MemoryRepository) -> Vec<SavedDocument> {
        repo.load().unwrap()
    }

    // ── open ───────────────────────────────────────────────────────────────

    #[test]
    fn test_open_empty_repository_synthesizes_default() {
        let (store, repo) = open_store();
        assert_eq!(store.documents().len(), 1);
        assert_eq!(store.active().title, DEFAULT_TITLE);
        assert_eq!(store.active().content, ResumeDocument::placeholder());
        assert_eq!(persisted(&repo), store.documents());
    }

    #[test]
    fn test_open_corrupt_repository_recovers() {
        let repo = MemoryRepository::with_raw("{{{{");
        let store = DocumentStore::open(Box::new(repo.clone()));
        assert_eq!(store.documents().len(), 1);
        assert_eq!(persisted(&repo).len(), 1);
    }

    #[test]
    fn test_open_empty_array_recovers() {
        let repo = MemoryRepository::with_raw("[]");
        let store = DocumentStore::open(Box::new(repo));
        assert_eq!(store.documents().len(), 1);
    }

    #[test]
    fn test_open_existing_collection_activates_first() {
        let repo = MemoryRepository::with_raw(
            json!([
                { "id": "a", "title": "A", "updatedAt": 10, "fullName": "Ann" },
                { "id": "b", "title": "B", "updatedAt": 20 }
            ])
            .to_string(),
        );
        let store = DocumentStore::open(Box::new(repo));
        assert_eq!(store.active_id(), "a");
        assert_eq!(store.active().content.full_name, "Ann");
    }

    // ── create ─────────────────────────────────────────────────────────────

    #[test]
    fn test_create_numbers_titles_and_activates() {
        let (mut store, repo) = open_store();
        let second = store.create().unwrap();
        assert_eq!(second.title, "New Résumé 2");
        assert_eq!(store.active_id(), second.id);

        let third = store.create().unwrap();
        assert_eq!(third.title, "New Résumé 3");
        assert_eq!(persisted(&repo).len(), 3);
    }

    #[test]
    fn test_create_skips_taken_titles() {
        let (mut store, _repo) = open_store();
        let first = store.active_id().to_string();
        store
            .update(&first, &DocumentPatch::title("New Résumé 2"))
            .unwrap();
        let created = store.create().unwrap();
        assert_eq!(created.title, "New Résumé 3");
    }

    #[test]
    fn test_created_ids_are_unique() {
        let (mut store, _repo) = open_store();
        let a = store.create().unwrap();
        let b = store.create().unwrap();
        assert_ne!(a.id, b.id);
    }

    // ── update ─────────────────────────────────────────────────────────────

    #[test]
    fn test_update_merges_and_refreshes_timestamp() {
        let (mut store, repo) = open_store();
        let id = store.active_id().to_string();
        let before = store.active().updated_at;

        let patch = DocumentPatch::new()
            .with("fullName", json!("Barbara Liskov"))
            .with("experience", json!([{ "id": "1", "role": "Professor" }]));
        let updated = store.update(&id, &patch).unwrap().unwrap();

        assert_eq!(updated.content.full_name, "Barbara Liskov");
        assert_eq!(updated.content.experience[0].role, "Professor");
        assert_eq!(updated.content.email, "your.email@example.com");
        assert!(updated.updated_at > before);
        assert_eq!(persisted(&repo)[0], updated);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let (mut store, _repo) = open_store();
        let snapshot = store.documents().to_vec();
        let result = store.update("nope", &DocumentPatch::title("x")).unwrap();
        assert!(result.is_none());
        assert_eq!(store.documents(), snapshot.as_slice());
    }

    #[test]
    fn test_update_cannot_rewrite_id() {
        let (mut store, _repo) = open_store();
        let id = store.active_id().to_string();
        let patch = DocumentPatch::new().with("id", json!("hijacked"));
        let updated = store.update(&id, &patch).unwrap().unwrap();
        assert_eq!(updated.id, id);
    }

    #[test]
    fn test_update_with_bad_shape_is_rejected() {
        let (mut store, _repo) = open_store();
        let id = store.active_id().to_string();
        let before = store.active().clone();
        let patch = DocumentPatch::new().with("experience", json!("not a list"));
        assert!(matches!(
            store.update(&id, &patch),
            Err(StoreError::InvalidPatch(_))
        ));
        assert_eq!(store.active(), &before);
    }

    // ── delete ─────────────────────────────────────────────────────────────

    #[test]
    fn test_delete_last_document_synthesizes_default() {
        let (mut store, repo) = open_store();
        let only = store.active_id().to_string();

        assert!(store.delete(&only).unwrap());

        assert_eq!(store.documents().len(), 1);
        assert_ne!(store.active_id(), only);
        assert_eq!(store.active().title, DEFAULT_TITLE);
        assert_eq!(store.active().content, ResumeDocument::placeholder());
        assert_eq!(persisted(&repo), store.documents());
    }

    #[test]
    fn test_delete_active_activates_first_remaining() {
        let (mut store, _repo) = open_store();
        let first = store.active_id().to_string();
        let second = store.create().unwrap();
        let third = store.create().unwrap();
        store.set_active(&second.id);

        store.delete(&second.id).unwrap();
        assert_eq!(store.active_id(), first);
        assert_eq!(store.documents().len(), 2);
        assert!(store.get(&third.id).is_some());
    }

    #[test]
    fn test_delete_inactive_keeps_active() {
        let (mut store, _repo) = open_store();
        let first = store.active_id().to_string();
        let second = store.create().unwrap();
        store.delete(&first).unwrap();
        assert_eq!(store.active_id(), second.id);
    }

    #[test]
    fn test_delete_unknown_is_noop() {
        let (mut store, _repo) = open_store();
        assert!(!store.delete("missing").unwrap());
        assert_eq!(store.documents().len(), 1);
    }

    // ── duplicate ──────────────────────────────────────────────────────────

    #[test]
    fn test_duplicate_copies_content_with_new_identity() {
        let (mut store, repo) = open_store();
        let source_id = store.active_id().to_string();
        store
            .update(&source_id, &DocumentPatch::title("Résumé A"))
            .unwrap();
        store.create().unwrap();

        let copy = store.duplicate(&source_id).unwrap().unwrap();
        let source = store.get(&source_id).unwrap().clone();

        assert_eq!(store.documents().len(), 3);
        assert_eq!(copy.content, source.content);
        assert_ne!(copy.id, source.id);
        assert_ne!(copy.updated_at, source.updated_at);
        assert_eq!(copy.title, "Résumé A (copy)");
        assert_eq!(store.active_id(), copy.id);
        assert_eq!(store.documents()[1].id, copy.id, "copy sits next to source");
        assert_eq!(persisted(&repo).len(), 3);
    }

    #[test]
    fn test_duplicate_unknown_is_none() {
        let (mut store, _repo) = open_store();
        assert!(store.duplicate("ghost").unwrap().is_none());
    }

    // ── clear_all / set_active ─────────────────────────────────────────────

    #[test]
    fn test_clear_all_leaves_single_default() {
        let (mut store, repo) = open_store();
        store.create().unwrap();
        store.create().unwrap();

        let fresh = store.clear_all().unwrap();
        assert_eq!(store.documents().len(), 1);
        assert_eq!(store.active_id(), fresh.id);
        assert_eq!(fresh.title, DEFAULT_TITLE);
        assert_eq!(persisted(&repo), vec![fresh]);
    }

    #[test]
    fn test_set_active_does_not_touch_content() {
        let (mut store, repo) = open_store();
        let first = store.active_id().to_string();
        store.create().unwrap();
        let before = persisted(&repo);

        assert!(store.set_active(&first));
        assert_eq!(store.active_id(), first);
        assert_eq!(persisted(&repo), before);
        assert!(!store.set_active("missing"));
        assert_eq!(store.active_id(), first);
    }

    #[test]
    fn test_timestamps_strictly_increase() {
        let (mut store, _repo) = open_store();
        let mut last = store.active().updated_at;
        for _ in 0..20 {
            let doc = store.create().unwrap();
            assert!(doc.updated_at > last);
            last = doc.updated_at;
        }
    }
}
