// Output renderers: the paginated HTML preview, the static PDF export, and the
// text conventions both share.

pub mod handlers;
pub mod pdf;
pub mod preview;
pub mod text;
