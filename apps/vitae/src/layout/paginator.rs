//! Greedy first-fit pagination of measured sections.
//!
//! Sections are placed in sequence order and never split or reordered. A new
//! page starts only when the next section would overflow the current page and
//! the current page already holds something; a section taller than a page
//! therefore sits alone and overflows instead of producing empty pages.

use serde::Serialize;
use tracing::{debug, warn};

use crate::layout::blocks::render_section;
use crate::layout::font_metrics::PageConfig;
use crate::layout::measure::{measure_sections, Measure, MeasuredSection};
use crate::layout::sequencer::{sequence, SectionKey};
use crate::models::ResumeDocument;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub sections: Vec<SectionKey>,
}

impl Page {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// How much of one page's inner height its sections use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageFill {
    pub used_px: f32,
    pub available_px: f32,
    pub fill_ratio: f32,
    pub overflowing: bool,
}

/// Result of one measurement + pagination pass over a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageLayout {
    pub pages: Vec<Page>,
    pub measurements: Vec<MeasuredSection>,
    pub page_inner_height_px: f32,
    pub content_width_px: f32,
    pub fills: Vec<PageFill>,
}

impl PageLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Assigns measured sections to pages, greedy first-fit.
///
/// Empty input yields exactly one empty page.
pub fn paginate(sections: &[MeasuredSection], page_inner_height: f32) -> Vec<Page> {
    let mut pages = Vec::new();
    let mut current = Page::default();
    let mut accumulated = 0.0_f32;

    for section in sections {
        if accumulated + section.height > page_inner_height && !current.is_empty() {
            pages.push(std::mem::take(&mut current));
            accumulated = 0.0;
        }
        current.sections.push(section.key);
        accumulated += section.height;
    }

    if !current.is_empty() || pages.is_empty() {
        pages.push(current);
    }
    pages
}

fn page_fills(pages: &[Page], measurements: &[MeasuredSection], available: f32) -> Vec<PageFill> {
    let mut heights = measurements.iter().map(|m| m.height);
    pages
        .iter()
        .map(|page| {
            // Pages partition the measurements in order, so consume them in turn.
            let used_px: f32 = heights.by_ref().take(page.sections.len()).sum();
            PageFill {
                used_px,
                available_px: available,
                fill_ratio: if available > 0.0 { used_px / available } else { 0.0 },
                overflowing: used_px > available,
            }
        })
        .collect()
}

/// Sequence, render, measure and paginate `doc`.
pub fn layout_document(
    doc: &ResumeDocument,
    measurer: &dyn Measure,
    config: &PageConfig,
) -> PageLayout {
    let inner = config.page_inner_height_px();
    let width = config.content_width_px();

    let blocks: Vec<_> = sequence(doc)
        .iter()
        .map(|key| render_section(key, doc))
        .collect();
    let measurements = measure_sections(&blocks, measurer, width);
    let pages = paginate(&measurements, inner);
    let fills = page_fills(&pages, &measurements, inner);

    for (i, fill) in fills.iter().enumerate() {
        if fill.overflowing {
            warn!(
                page = i + 1,
                used_px = fill.used_px,
                available_px = fill.available_px,
                "Page content overflows the sheet"
            );
        }
    }
    debug!(
        sections = measurements.len(),
        pages = pages.len(),
        "Layout computed"
    );

    PageLayout {
        pages,
        measurements,
        page_inner_height_px: inner,
        content_width_px: width,
        fills,
    }
}
