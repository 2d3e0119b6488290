//! Section Renderer: maps one section key of a résumé to a visual block.
//!
//! A block is a flat list of typed text lines plus its own vertical margins.
//! The measurer wraps and stacks these lines to get a height; the preview
//! emits them as HTML with the same typography. Neither side makes layout
//! decisions of its own, so measured and displayed heights agree.

use crate::layout::font_metrics::FontFace;
use crate::layout::sequencer::{SectionKey, SectionName};
use crate::models::ResumeDocument;
use crate::render::text::{self, DescriptionLine};

/// Spacing between a section's blocks (Tailwind `mb-6`).
pub const SECTION_GAP_PX: f32 = 24.0;
/// Spacing after each experience entry (`mb-5`).
pub const ENTRY_GAP_PX: f32 = 20.0;
/// Left indent of a bullet item.
pub const BULLET_INDENT_PX: f32 = 16.0;
/// Left indent of an item nested under a description sub-heading.
pub const SUB_ITEM_INDENT_PX: f32 = 32.0;

const JOB_TITLE_FALLBACK: &str = "Professional";
const OPEN_DATE_LABEL: &str = "Present";

// ────────────────────────────────────────────────────────────────────────────
// Typography
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextRole {
    Name,
    JobTitle,
    Contact,
    SectionTitle,
    Paragraph,
    ItemTitle,
    ItemSubtitle,
    ItemDate,
    Bullet,
    SubHeading,
    SubItem,
    Body,
    Link,
}

/// Fixed text style of a role, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Typography {
    pub font_size: f32,
    pub line_height: f32,
    pub face: FontFace,
    pub italic: bool,
    /// Class the preview stylesheet defines for this role.
    pub css_class: &'static str,
}

impl TextRole {
    pub const ALL: [TextRole; 13] = [
        Self::Name,
        Self::JobTitle,
        Self::Contact,
        Self::SectionTitle,
        Self::Paragraph,
        Self::ItemTitle,
        Self::ItemSubtitle,
        Self::ItemDate,
        Self::Bullet,
        Self::SubHeading,
        Self::SubItem,
        Self::Body,
        Self::Link,
    ];

    pub fn typography(&self) -> Typography {
        let (font_size, line_height, face, italic, css_class) = match self {
            Self::Name => (24.0, 32.0, FontFace::Bold, false, "t-name"),
            Self::JobTitle => (12.0, 16.0, FontFace::Bold, false, "t-job"),
            Self::Contact => (12.0, 16.0, FontFace::Regular, false, "t-contact"),
            Self::SectionTitle => (14.0, 20.0, FontFace::Bold, false, "t-section"),
            Self::Paragraph => (12.0, 19.5, FontFace::Regular, false, "t-para"),
            Self::ItemTitle => (14.0, 20.0, FontFace::Bold, false, "t-item"),
            Self::ItemSubtitle => (12.0, 16.0, FontFace::Regular, true, "t-sub"),
            Self::ItemDate => (12.0, 16.0, FontFace::Regular, false, "t-date"),
            Self::Bullet => (12.0, 16.0, FontFace::Regular, false, "t-bullet"),
            Self::SubHeading => (12.0, 16.0, FontFace::Bold, false, "t-subhead"),
            Self::SubItem => (12.0, 16.0, FontFace::Regular, false, "t-subitem"),
            Self::Body => (12.0, 16.0, FontFace::Regular, false, "t-body"),
            Self::Link => (12.0, 16.0, FontFace::Regular, false, "t-link"),
        };
        Typography {
            font_size,
            line_height,
            face,
            italic,
            css_class,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Visual block
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub role: TextRole,
    pub text: String,
    pub indent_px: f32,
    pub space_before_px: f32,
    pub href: Option<String>,
}

impl TextLine {
    pub fn new(role: TextRole, text: impl Into<String>) -> Self {
        let indent_px = match role {
            TextRole::Bullet | TextRole::SubHeading => BULLET_INDENT_PX,
            TextRole::SubItem => SUB_ITEM_INDENT_PX,
            _ => 0.0,
        };
        Self {
            role,
            text: text.into(),
            indent_px,
            space_before_px: 0.0,
            href: None,
        }
    }

    pub fn space_before(mut self, px: f32) -> Self {
        self.space_before_px = px;
        self
    }

    pub fn link(mut self, href: String) -> Self {
        self.href = Some(href);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisualBlock {
    pub key: SectionKey,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub lines: Vec<TextLine>,
}

impl VisualBlock {
    /// Renders nothing and occupies no space.
    pub fn empty(key: SectionKey) -> Self {
        Self {
            key,
            margin_top: 0.0,
            margin_bottom: 0.0,
            lines: Vec::new(),
        }
    }

    fn section(key: SectionKey, margin_bottom: f32) -> Self {
        Self {
            margin_bottom,
            ..Self::empty(key)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn push(&mut self, line: TextLine) {
        self.lines.push(line);
    }

    /// Pushes `items` with `first_gap` above the first one and `gap` between
    /// the rest.
    fn push_spaced(&mut self, items: Vec<TextLine>, first_gap: f32, gap: f32) {
        for (i, line) in items.into_iter().enumerate() {
            let space = if i == 0 { first_gap } else { gap };
            self.push(line.space_before(space));
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Rendering
// ────────────────────────────────────────────────────────────────────────────

/// Renders `key` against `doc`. Pure: depends only on its arguments.
///
/// A key whose entry no longer exists, or whose list content is blank,
/// yields an empty block.
pub fn render_section(key: &SectionKey, doc: &ResumeDocument) -> VisualBlock {
    match key.name {
        SectionName::Header => header(*key, doc),
        SectionName::Objective => objective(*key, doc),
        SectionName::Experience => experience(*key, doc),
        SectionName::Education => education(*key, doc),
        SectionName::Projects => projects(*key, doc),
        SectionName::Skills => plain_list(*key, "SKILLS", &doc.skills, false),
        SectionName::Languages => plain_list(*key, "LANGUAGES", &doc.languages, false),
        SectionName::SoftSkills => plain_list(*key, "SOFT SKILLS", &doc.soft_skills, true),
        SectionName::References => references(*key, doc),
    }
}

fn header(key: SectionKey, doc: &ResumeDocument) -> VisualBlock {
    let mut block = VisualBlock::section(key, SECTION_GAP_PX);
    block.push(TextLine::new(TextRole::Name, doc.full_name.trim()));

    let job_title = match doc.job_title.trim() {
        "" => JOB_TITLE_FALLBACK,
        title => title,
    };
    block.push(TextLine::new(TextRole::JobTitle, job_title).space_before(2.0));

    let contacts: Vec<TextLine> = [&doc.email, &doc.phone, &doc.address]
        .into_iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(|value| TextLine::new(TextRole::Contact, value))
        .collect();
    block.push_spaced(contacts, 8.0, 2.0);
    block
}

fn objective(key: SectionKey, doc: &ResumeDocument) -> VisualBlock {
    let text = doc.objective.trim();
    if text.is_empty() {
        return VisualBlock::empty(key);
    }
    let mut block = VisualBlock::section(key, SECTION_GAP_PX);
    block.push(TextLine::new(TextRole::SectionTitle, "PROFILE"));
    block.push(TextLine::new(TextRole::Paragraph, text).space_before(8.0));
    block
}

fn experience(key: SectionKey, doc: &ResumeDocument) -> VisualBlock {
    let Some(entry) = key.index.and_then(|i| doc.experience.get(i)) else {
        return VisualBlock::empty(key);
    };
    let mut block = VisualBlock::section(key, ENTRY_GAP_PX);

    // The section heading travels with the first job so it never ends a page.
    let mut title_gap = 0.0;
    if key.index == Some(0) {
        block.push(TextLine::new(TextRole::SectionTitle, "EXPERIENCE"));
        title_gap = 12.0;
    }
    block.push(TextLine::new(TextRole::ItemTitle, entry.role.trim()).space_before(title_gap));
    if !entry.company.trim().is_empty() {
        block.push(TextLine::new(TextRole::ItemSubtitle, entry.company.trim()));
    }
    let dates = text::date_range(&entry.start_date, &entry.end_date, Some(OPEN_DATE_LABEL));
    block.push(TextLine::new(TextRole::ItemDate, dates).space_before(4.0));

    let description: Vec<TextLine> = text::parse_description(&entry.description)
        .into_iter()
        .map(|line| match line {
            DescriptionLine::SubHeading(t) => TextLine::new(TextRole::SubHeading, t),
            DescriptionLine::SubItem(t) => TextLine::new(TextRole::SubItem, t),
            DescriptionLine::Item(t) => TextLine::new(TextRole::Bullet, t),
        })
        .collect();
    block.push_spaced(description, 8.0, 2.0);
    block
}

fn education(key: SectionKey, doc: &ResumeDocument) -> VisualBlock {
    if doc.education.is_empty() {
        return VisualBlock::empty(key);
    }
    let mut block = VisualBlock::section(key, SECTION_GAP_PX);
    block.push(TextLine::new(TextRole::SectionTitle, "EDUCATION"));

    for entry in &doc.education {
        block.push(TextLine::new(TextRole::ItemTitle, entry.institution.trim()).space_before(12.0));
        if !entry.course.trim().is_empty() {
            block.push(TextLine::new(TextRole::ItemSubtitle, entry.course.trim()));
        }
        let dates = text::date_range(&entry.start_date, &entry.end_date, None);
        if !dates.is_empty() {
            block.push(TextLine::new(TextRole::ItemDate, dates));
        }
        let topics = text::list_items(&entry.topics);
        if !topics.is_empty() {
            block.push(TextLine::new(TextRole::Body, topics.join(", ")).space_before(2.0));
        }
    }
    block
}

fn projects(key: SectionKey, doc: &ResumeDocument) -> VisualBlock {
    if doc.projects.is_empty() {
        return VisualBlock::empty(key);
    }
    let mut block = VisualBlock::section(key, SECTION_GAP_PX);
    block.push(TextLine::new(TextRole::SectionTitle, "PROJECTS"));

    for project in &doc.projects {
        block.push(TextLine::new(TextRole::ItemTitle, project.name.trim()).space_before(12.0));
        let dates = text::date_range(&project.start_date, &project.end_date, None);
        if !dates.is_empty() {
            block.push(TextLine::new(TextRole::ItemDate, dates));
        }
        if !project.technologies.trim().is_empty() {
            block.push(TextLine::new(TextRole::ItemSubtitle, project.technologies.trim()));
        }
        let description: Vec<TextLine> = text::list_items(&project.description)
            .into_iter()
            .map(|line| TextLine::new(TextRole::Body, line))
            .collect();
        block.push_spaced(description, 4.0, 2.0);
        let href = text::normalize_url(&project.link);
        if !href.is_empty() {
            let display = text::link_display(&project.link, "");
            block.push(TextLine::new(TextRole::Link, display).space_before(2.0).link(href));
        }
    }
    block
}

/// A titled newline-delimited list. Blank content renders nothing.
fn plain_list(key: SectionKey, title: &str, source: &str, bulleted: bool) -> VisualBlock {
    let items = text::list_items(source);
    if items.is_empty() {
        return VisualBlock::empty(key);
    }
    let mut block = VisualBlock::section(key, SECTION_GAP_PX);
    block.push(TextLine::new(TextRole::SectionTitle, title));

    let (role, gap) = if bulleted {
        (TextRole::Bullet, 4.0)
    } else {
        (TextRole::Body, 8.0)
    };
    let lines = items.into_iter().map(|item| TextLine::new(role, item)).collect();
    block.push_spaced(lines, 12.0, gap);
    block
}

fn references(key: SectionKey, doc: &ResumeDocument) -> VisualBlock {
    if doc.references.is_empty() {
        return VisualBlock::empty(key);
    }
    let mut block = VisualBlock::section(key, SECTION_GAP_PX);
    block.push(TextLine::new(TextRole::SectionTitle, "REFERENCES"));

    for reference in &doc.references {
        block.push(TextLine::new(TextRole::ItemTitle, reference.name.trim()).space_before(12.0));
        if !reference.email.trim().is_empty() {
            block.push(TextLine::new(
                TextRole::Body,
                format!("Email: {}", reference.email.trim()),
            ));
        }
        if !reference.phone.trim().is_empty() {
            block.push(TextLine::new(
                TextRole::Body,
                format!("Phone: {}", reference.phone.trim()),
            ));
        }
    }
    block
}
