// Document Store: keyed résumé collection, its persistence seam, and the
// editor session that gates writes to the active document.

pub mod document_store;
pub mod handlers;
pub mod repository;
pub mod session;
pub mod workspace;

pub use document_store::{DocumentPatch, DocumentStore};
pub use repository::{JsonFileRepository, StoreError};
pub use session::AutosavePolicy;
pub use workspace::Workspace;
