use tracing::debug;

use crate::models::{ResumeDocument, SavedDocument};
use crate::store::document_store::{DocumentPatch, DocumentStore};
use crate::store::repository::StoreError;
use crate::store::session::{AutosavePolicy, CommitOutcome, EditorSession};

/// The document store plus the editor session bound to its active document.
///
/// Every operation that changes which document is active also switches the
/// session, so stale commits from the previous document are discarded.
pub struct Workspace {
    store: DocumentStore,
    session: EditorSession,
}

impl Workspace {
    pub fn new(store: DocumentStore, policy: AutosavePolicy) -> Self {
        let mut session = EditorSession::new(policy);
        session.switch_to(store.active());
        Self { store, session }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    /// Content the preview and export render: the live draft.
    pub fn draft(&self) -> &ResumeDocument {
        self.session.draft()
    }

    pub fn select(&mut self, id: &str) -> bool {
        if !self.store.set_active(id) {
            return false;
        }
        self.reload();
        true
    }

    pub fn create(&mut self) -> Result<SavedDocument, StoreError> {
        let result = self.store.create();
        self.sync_active();
        result
    }

    /// Direct update outside the form (e.g. renaming). Reloads the session
    /// when the active document changed underneath it.
    pub fn update(
        &mut self,
        id: &str,
        patch: &DocumentPatch,
    ) -> Result<Option<SavedDocument>, StoreError> {
        let updated = self.store.update(id, patch)?;
        if updated.is_some() && self.store.active_id() == id {
            self.reload();
        }
        Ok(updated)
    }

    pub fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let result = self.store.delete(id);
        self.sync_active();
        result
    }

    pub fn duplicate(&mut self, id: &str) -> Result<Option<SavedDocument>, StoreError> {
        let result = self.store.duplicate(id);
        self.sync_active();
        result
    }

    pub fn clear_all(&mut self) -> Result<SavedDocument, StoreError> {
        let result = self.store.clear_all();
        self.sync_active();
        result
    }

    pub fn edit_draft(&mut self, generation: u64, content: ResumeDocument) -> bool {
        self.session.edit(generation, content)
    }

    pub fn commit(&mut self, generation: u64) -> Result<CommitOutcome, StoreError> {
        let outcome = self.session.commit(generation, &mut self.store)?;
        debug!(generation, ?outcome, "Commit processed");
        Ok(outcome)
    }

    fn reload(&mut self) {
        self.session.switch_to(self.store.active());
    }

    /// Rebinds the session when the store's active document moved. Runs
    /// after failed writes too: the in-memory mutation stands even when
    /// persisting it did not.
    fn sync_active(&mut self) {
        if self.session.document_id() != Some(self.store.active_id()) {
            self.reload();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::repository::MemoryRepository;
    use crate::store::session::SessionPhase;

    fn make_workspace() -> Workspace {
        let store = DocumentStore::open(Box::new(MemoryRepository::new()));
        Workspace::new(store, AutosavePolicy::ContentChanged)
    }

    #[test]
    fn test_new_workspace_session_is_ready_on_active() {
        let ws = make_workspace();
        assert_eq!(ws.session().phase(), SessionPhase::Ready);
        assert_eq!(ws.session().document_id(), Some(ws.store().active_id()));
    }

    #[test]
    fn test_create_switches_session() {
        let mut ws = make_workspace();
        let before = ws.session().generation();
        let doc = ws.create().unwrap();
        assert_eq!(ws.session().document_id(), Some(doc.id.as_str()));
        assert!(ws.session().generation() > before);
    }

    #[test]
    fn test_select_then_stale_commit_does_not_leak() {
        let mut ws = make_workspace();
        let first = ws.store().active_id().to_string();
        let second = ws.create().unwrap();
        ws.select(&first);

        let generation = ws.session().generation();
        let edited = ResumeDocument {
            objective: "Typed on first".to_string(),
            ..ws.draft().clone()
        };
        assert!(ws.edit_draft(generation, edited));

        ws.select(&second.id);
        assert_eq!(ws.commit(generation).unwrap(), CommitOutcome::Discarded);
        assert_ne!(
            ws.store().get(&second.id).unwrap().content.objective,
            "Typed on first"
        );
    }

    #[test]
    fn test_commit_then_reload_keeps_saved_content() {
        let mut ws = make_workspace();
        let generation = ws.session().generation();
        let edited = ResumeDocument {
            skills: "Rust\nSQL".to_string(),
            ..ws.draft().clone()
        };
        ws.edit_draft(generation, edited);
        assert_eq!(ws.commit(generation).unwrap(), CommitOutcome::Saved);

        let id = ws.store().active_id().to_string();
        ws.select(&id);
        assert_eq!(ws.draft().skills, "Rust\nSQL");
    }

    #[test]
    fn test_delete_inactive_keeps_session() {
        let mut ws = make_workspace();
        let first = ws.store().active_id().to_string();
        ws.create().unwrap();
        let generation = ws.session().generation();
        ws.delete(&first).unwrap();
        assert_eq!(ws.session().generation(), generation);
    }

    #[test]
    fn test_update_of_active_reloads_draft() {
        let mut ws = make_workspace();
        let id = ws.store().active_id().to_string();
        let patch = DocumentPatch::new().with("jobTitle", serde_json::json!("Architect"));
        ws.update(&id, &patch).unwrap();
        assert_eq!(ws.draft().job_title, "Architect");
    }

    #[test]
    fn test_failed_create_still_switches_session() {
        let repo = MemoryRepository::new();
        let store = DocumentStore::open(Box::new(repo.clone()));
        let mut ws = Workspace::new(store, AutosavePolicy::ContentChanged);

        repo.set_fail_writes(true);
        assert!(ws.create().is_err());
        assert_eq!(ws.store().documents().len(), 2);
        assert_eq!(ws.session().document_id(), Some(ws.store().active_id()));
    }

    #[test]
    fn test_failed_delete_of_only_document_keeps_edits_committable() {
        let repo = MemoryRepository::new();
        let store = DocumentStore::open(Box::new(repo.clone()));
        let mut ws = Workspace::new(store, AutosavePolicy::ContentChanged);
        let only = ws.store().active_id().to_string();

        repo.set_fail_writes(true);
        assert!(ws.delete(&only).is_err());
        assert_ne!(ws.store().active_id(), only);
        assert_eq!(ws.session().document_id(), Some(ws.store().active_id()));

        repo.set_fail_writes(false);
        let generation = ws.session().generation();
        let edited = ResumeDocument {
            objective: "Written after the failed delete".to_string(),
            ..ws.draft().clone()
        };
        assert!(ws.edit_draft(generation, edited));
        assert_eq!(ws.commit(generation).unwrap(), CommitOutcome::Saved);
        assert_eq!(
            ws.store().active().content.objective,
            "Written after the failed delete"
        );
    }

    #[test]
    fn test_clear_all_resets_draft() {
        let mut ws = make_workspace();
        let generation = ws.session().generation();
        ws.edit_draft(generation, ResumeDocument::default());
        ws.clear_all().unwrap();
        assert_eq!(ws.draft(), &ResumeDocument::placeholder());
    }
}
