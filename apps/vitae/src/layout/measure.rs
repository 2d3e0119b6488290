//! Height measurement of visual blocks at the content-column width.
//!
//! Heights include the block's own top and bottom margins, since those
//! decide where a page break can fall.

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::layout::blocks::VisualBlock;
use crate::layout::font_metrics::get_metrics;
use crate::layout::sequencer::SectionKey;

#[derive(Debug, Error, PartialEq)]
pub enum MeasureError {
    #[error("content width must be positive, got {0}")]
    InvalidWidth(f32),

    #[error("measured height of '{key}' is not a finite non-negative number")]
    InvalidHeight { key: SectionKey },
}

/// Produces the rendered height of a block in CSS pixels.
pub trait Measure: Send + Sync {
    fn measure(&self, block: &VisualBlock, content_width: f32) -> Result<f32, MeasureError>;
}

/// Measures by greedy word-wrap against static font metrics.
///
/// Height = margin_top + Σ(space_before + wrapped_lines × line_height) +
/// margin_bottom.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextMetricsMeasurer;

impl Measure for TextMetricsMeasurer {
    fn measure(&self, block: &VisualBlock, content_width: f32) -> Result<f32, MeasureError> {
        if !(content_width.is_finite() && content_width > 0.0) {
            return Err(MeasureError::InvalidWidth(content_width));
        }

        let mut height = block.margin_top + block.margin_bottom;
        for line in &block.lines {
            let typo = line.role.typography();
            let width = (content_width - line.indent_px).max(1.0);
            let count = get_metrics(typo.face).line_count(&line.text, typo.font_size, width);
            height += line.space_before_px + count as f32 * typo.line_height;
        }

        if !(height.is_finite() && height >= 0.0) {
            return Err(MeasureError::InvalidHeight { key: block.key });
        }
        Ok(height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeasuredSection {
    pub key: SectionKey,
    pub height: f32,
}

/// Measures every block in order. A block that fails to measure is logged
/// and counted as 0 px so pagination still completes.
pub fn measure_sections(
    blocks: &[VisualBlock],
    measurer: &dyn Measure,
    content_width: f32,
) -> Vec<MeasuredSection> {
    blocks
        .iter()
        .map(|block| {
            let height = measurer
                .measure(block, content_width)
                .unwrap_or_else(|e| {
                    warn!(key = %block.key, error = %e, "Section measurement failed, using 0px");
                    0.0
                });
            MeasuredSection {
                key: block.key,
                height,
            }
        })
        .collect()
}
