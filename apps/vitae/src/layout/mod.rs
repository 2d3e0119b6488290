// Layout engine: section sequencing, block rendering, measurement, pagination.
// Everything here is synchronous and pure apart from logging; handlers run it
// while holding the workspace lock so a layout always matches one draft.

pub mod blocks;
pub mod font_metrics;
pub mod measure;
pub mod paginator;
pub mod sequencer;

pub use font_metrics::{default_page_config, PageConfig};
pub use measure::{Measure, TextMetricsMeasurer};
pub use paginator::{layout_document, PageLayout};
