pub mod document;
pub mod resume;

pub use document::{DocumentSummary, SavedDocument};
pub use resume::ResumeDocument;
