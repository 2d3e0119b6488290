//! Editor session for the active document.
//!
//! The form edits an in-memory draft continuously; the store is written only
//! on commit (a field losing focus). Switching documents must never let a
//! commit queued for the previous document land on the new one, so every
//! switch bumps a generation counter and commits carry the generation they
//! were issued under.
//!
//! ```text
//!            begin_switch (generation += 1)
//!   Ready ───────────────────────────────► Loading
//!     ▲                                       │
//!     └──────── finish_load(current gen) ─────┘
//! ```
//!
//! Commits are accepted only in `Ready` and only for the current generation.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{ResumeDocument, SavedDocument};
use crate::store::document_store::{DocumentPatch, DocumentStore};
use crate::store::repository::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// A document switch is in flight; commits are discarded.
    Loading,
    /// The draft mirrors the active document; commits are written.
    Ready,
}

/// When a commit actually writes to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AutosavePolicy {
    /// Write only when the serialized draft differs from the stored content.
    #[default]
    ContentChanged,
    /// Write on every commit, refreshing the timestamp even without changes.
    Always,
}

impl FromStr for AutosavePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "content-changed" | "content_changed" => Ok(Self::ContentChanged),
            "always" => Ok(Self::Always),
            other => Err(format!(
                "unknown autosave policy '{other}' (expected 'content-changed' or 'always')"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitOutcome {
    Saved,
    /// Draft matched the stored content; nothing written.
    Unchanged,
    /// Stale generation, session still loading, or document gone.
    Discarded,
}

#[derive(Debug, Clone)]
pub struct EditorSession {
    generation: u64,
    phase: SessionPhase,
    document_id: Option<String>,
    draft: ResumeDocument,
    policy: AutosavePolicy,
}

impl EditorSession {
    pub fn new(policy: AutosavePolicy) -> Self {
        Self {
            generation: 0,
            phase: SessionPhase::Loading,
            document_id: None,
            draft: ResumeDocument::default(),
            policy,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    pub fn draft(&self) -> &ResumeDocument {
        &self.draft
    }

    pub fn policy(&self) -> AutosavePolicy {
        self.policy
    }

    /// Starts switching to document `id`. Anything issued under an earlier
    /// generation is dead from this point on.
    pub fn begin_switch(&mut self, id: &str) -> u64 {
        self.generation += 1;
        self.phase = SessionPhase::Loading;
        self.document_id = Some(id.to_string());
        debug!(generation = self.generation, id, "Session switch started");
        self.generation
    }

    /// Loads the new document's fields and opens the session for commits.
    /// Ignored if another switch started since `generation` was issued.
    pub fn finish_load(&mut self, generation: u64, content: &ResumeDocument) -> bool {
        if generation != self.generation {
            return false;
        }
        self.draft = content.clone();
        self.phase = SessionPhase::Ready;
        true
    }

    pub fn switch_to(&mut self, doc: &SavedDocument) -> u64 {
        let generation = self.begin_switch(&doc.id);
        self.finish_load(generation, &doc.content);
        generation
    }

    /// Applies a form edit to the draft. Nothing is persisted.
    pub fn edit(&mut self, generation: u64, content: ResumeDocument) -> bool {
        if !self.accepts(generation) {
            debug!(
                generation,
                current = self.generation,
                "Dropped edit for stale session"
            );
            return false;
        }
        self.draft = content;
        true
    }

    /// Writes the draft to the store according to the autosave policy.
    pub fn commit(
        &mut self,
        generation: u64,
        store: &mut DocumentStore,
    ) -> Result<CommitOutcome, StoreError> {
        if !self.accepts(generation) {
            debug!(
                generation,
                current = self.generation,
                phase = ?self.phase,
                "Discarded commit for stale session"
            );
            return Ok(CommitOutcome::Discarded);
        }
        let Some(id) = self.document_id.clone() else {
            return Ok(CommitOutcome::Discarded);
        };
        let Some(stored) = store.get(&id) else {
            return Ok(CommitOutcome::Discarded);
        };

        if self.policy == AutosavePolicy::ContentChanged
            && serde_json::to_string(&stored.content)? == serde_json::to_string(&self.draft)?
        {
            return Ok(CommitOutcome::Unchanged);
        }

        let patch = DocumentPatch::from_content(&self.draft)?;
        match store.update(&id, &patch)? {
            Some(_) => Ok(CommitOutcome::Saved),
            None => Ok(CommitOutcome::Discarded),
        }
    }

    fn accepts(&self, generation: u64) -> bool {
        self.phase == SessionPhase::Ready && generation == self.generation
    }
}
