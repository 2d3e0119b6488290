//! # PDF export
//!
//! A static single-column A4 rendition of the whole résumé. It does not use
//! the pagination engine: text flows top to bottom and breaks onto a new page
//! whenever the next line would cross the bottom padding.
//!
//! Objects are written through `pdf-writer`:
//!
//! ```text
//! 1        Catalog
//! 2        Pages
//! 3..5     Helvetica, Helvetica-Bold, Helvetica-Oblique (WinAnsi)
//! ...      per page: page, content stream (zlib), link annotations
//! last     Info
//! ```

use miniz_oxide::deflate::compress_to_vec_zlib;
use pdf_writer::types::{ActionType, AnnotationType};
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::layout::font_metrics::{get_metrics, FontFace};
use crate::models::ResumeDocument;
use crate::render::text::{self, DescriptionLine};

/// A4 in points.
const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const PADDING: f32 = 40.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * PADDING;
const SUB_ITEM_INDENT: f32 = 10.0;
/// Helvetica ascender, in em.
const ASCENT: f32 = 0.718;
const OPEN_DATE_LABEL: &str = "Present";

/// `CV_<full name with whitespace replaced by '_'>.pdf`
pub fn export_file_name(doc: &ResumeDocument) -> String {
    let name: String = doc
        .full_name
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("CV_{name}.pdf")
}

/// Renders `doc` to PDF bytes.
pub fn render_pdf(doc: &ResumeDocument) -> Vec<u8> {
    let mut flow = Flow::new();
    write_document(&mut flow, doc);
    serialize(flow.pages, doc.full_name.trim())
}

// ────────────────────────────────────────────────────────────────────────────
// Styles
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PdfFont {
    Regular,
    Bold,
    Oblique,
}

impl PdfFont {
    const ALL: [PdfFont; 3] = [Self::Regular, Self::Bold, Self::Oblique];

    fn resource(&self) -> Name<'static> {
        match self {
            Self::Regular => Name(b"F1"),
            Self::Bold => Name(b"F2"),
            Self::Oblique => Name(b"F3"),
        }
    }

    fn base_font(&self) -> Name<'static> {
        match self {
            Self::Regular => Name(b"Helvetica"),
            Self::Bold => Name(b"Helvetica-Bold"),
            Self::Oblique => Name(b"Helvetica-Oblique"),
        }
    }

    fn face(&self) -> FontFace {
        match self {
            Self::Bold => FontFace::Bold,
            Self::Regular | Self::Oblique => FontFace::Regular,
        }
    }
}

type Rgb = (f32, f32, f32);

const BLACK: Rgb = (0.0, 0.0, 0.0);
const DARK: Rgb = (0.2, 0.2, 0.2);
const MUTED: Rgb = (0.267, 0.267, 0.267);
const FAINT: Rgb = (0.333, 0.333, 0.333);
const LINK_BLUE: Rgb = (0.114, 0.306, 0.847);

#[derive(Debug, Clone, Copy)]
struct TextStyle {
    size: f32,
    font: PdfFont,
    color: Rgb,
    /// Line height as a multiple of `size`.
    leading: f32,
    space_after: f32,
    centered: bool,
}

const NAME: TextStyle = TextStyle {
    size: 18.0,
    font: PdfFont::Bold,
    color: BLACK,
    leading: 1.2,
    space_after: 6.0,
    centered: true,
};
const JOB_TITLE: TextStyle = TextStyle {
    size: 11.0,
    font: PdfFont::Bold,
    color: DARK,
    leading: 1.2,
    space_after: 8.0,
    centered: true,
};
const HEADER_INFO: TextStyle = TextStyle {
    size: 9.0,
    font: PdfFont::Regular,
    color: MUTED,
    leading: 1.8,
    space_after: 0.0,
    centered: true,
};
const LINK: TextStyle = TextStyle {
    size: 9.0,
    font: PdfFont::Regular,
    color: LINK_BLUE,
    leading: 1.8,
    space_after: 0.0,
    centered: true,
};
const SECTION_TITLE: TextStyle = TextStyle {
    size: 11.0,
    font: PdfFont::Bold,
    color: BLACK,
    leading: 1.2,
    space_after: 0.0,
    centered: false,
};
const ITEM_TITLE: TextStyle = TextStyle {
    size: 10.0,
    font: PdfFont::Bold,
    color: BLACK,
    leading: 1.2,
    space_after: 2.0,
    centered: false,
};
const ITEM_SUBTITLE: TextStyle = TextStyle {
    size: 9.0,
    font: PdfFont::Oblique,
    color: DARK,
    leading: 1.2,
    space_after: 2.0,
    centered: false,
};
const ITEM_DATE: TextStyle = TextStyle {
    size: 9.0,
    font: PdfFont::Regular,
    color: FAINT,
    leading: 1.2,
    space_after: 6.0,
    centered: false,
};
const BODY: TextStyle = TextStyle {
    size: 9.0,
    font: PdfFont::Regular,
    color: DARK,
    leading: 1.2,
    space_after: 2.0,
    centered: false,
};
const PARAGRAPH: TextStyle = TextStyle {
    size: 9.0,
    font: PdfFont::Regular,
    color: DARK,
    leading: 1.5,
    space_after: 2.0,
    centered: false,
};
const BULLET: TextStyle = TextStyle {
    size: 9.0,
    font: PdfFont::Regular,
    color: DARK,
    leading: 1.4,
    space_after: 3.0,
    centered: false,
};
const SUB_HEADING: TextStyle = TextStyle {
    size: 9.0,
    font: PdfFont::Bold,
    color: BLACK,
    leading: 1.2,
    space_after: 2.0,
    centered: false,
};

// ────────────────────────────────────────────────────────────────────────────
// Text flow
// ────────────────────────────────────────────────────────────────────────────

struct LinkAnnotation {
    /// x1, y1, x2, y2 in PDF user space.
    rect: [f32; 4],
    uri: String,
}

struct PageContent {
    ops: Content,
    links: Vec<LinkAnnotation>,
}

impl PageContent {
    fn new() -> Self {
        Self {
            ops: Content::new(),
            links: Vec::new(),
        }
    }
}

/// Top-down cursor over a growing list of pages.
struct Flow {
    pages: Vec<PageContent>,
    /// Distance from the top edge of the current page.
    cursor: f32,
}

impl Flow {
    fn new() -> Self {
        Self {
            pages: vec![PageContent::new()],
            cursor: PADDING,
        }
    }

    fn page(&mut self) -> &mut PageContent {
        // `pages` is never empty: `new` seeds one and nothing removes any.
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn new_page(&mut self) {
        self.pages.push(PageContent::new());
        self.cursor = PADDING;
    }

    /// Breaks the page when `height` more points would not fit. A fresh page
    /// never breaks, so oversized content still makes progress.
    fn ensure(&mut self, height: f32) {
        if self.cursor + height > PAGE_HEIGHT - PADDING && self.cursor > PADDING {
            self.new_page();
        }
    }

    fn gap(&mut self, points: f32) {
        self.cursor += points;
    }

    /// Wrapped text, one PDF line per wrapped line.
    fn text(&mut self, content: &str, style: &TextStyle, indent: f32) {
        let metrics = get_metrics(style.font.face());
        let lines = metrics.wrap(content, style.size, CONTENT_WIDTH - indent);
        if lines.is_empty() {
            return;
        }
        for line in &lines {
            self.line(line, style, indent, None);
        }
        self.cursor += style.space_after;
    }

    fn line(&mut self, content: &str, style: &TextStyle, indent: f32, uri: Option<&str>) {
        let height = style.size * style.leading;
        self.ensure(height);

        let width = get_metrics(style.font.face()).width_at(content, style.size);
        let x = if style.centered {
            PADDING + (CONTENT_WIDTH - width).max(0.0) / 2.0
        } else {
            PADDING + indent
        };
        let baseline = self.cursor + (height - style.size) / 2.0 + ASCENT * style.size;
        let y = PAGE_HEIGHT - baseline;
        let top = PAGE_HEIGHT - self.cursor;

        let page = self.page();
        let (r, g, b) = style.color;
        page.ops
            .begin_text()
            .set_font(style.font.resource(), style.size)
            .set_fill_rgb(r, g, b)
            .next_line(x, y)
            .show(Str(&encode_win_ansi(content)))
            .end_text();

        if let Some(uri) = uri {
            page.links.push(LinkAnnotation {
                rect: [x, top - height, x + width, top],
                uri: uri.to_string(),
            });
        }
        self.cursor += height;
    }

    /// Horizontal rule across the content width at the cursor.
    fn rule(&mut self) {
        let y = PAGE_HEIGHT - self.cursor;
        self.page()
            .ops
            .set_stroke_rgb(0.0, 0.0, 0.0)
            .set_line_width(1.0)
            .move_to(PADDING, y)
            .line_to(PAGE_WIDTH - PADDING, y)
            .stroke();
    }

    /// Titled section: 14pt above, title, 4pt, rule, 10pt below. Keeps the
    /// title with at least one following line.
    fn section_title(&mut self, title: &str) {
        self.gap(14.0);
        let title_height = SECTION_TITLE.size * SECTION_TITLE.leading;
        self.ensure(title_height + 14.0 + BODY.size * BODY.leading);
        self.line(title, &SECTION_TITLE, 0.0, None);
        self.gap(4.0);
        self.rule();
        self.gap(10.0);
    }

    fn description(&mut self, source: &str) {
        for line in text::parse_description(source) {
            match line {
                DescriptionLine::SubHeading(t) => self.text(&t, &SUB_HEADING, 0.0),
                DescriptionLine::SubItem(t) => {
                    self.text(&format!("• {t}"), &BULLET, SUB_ITEM_INDENT)
                }
                DescriptionLine::Item(t) => self.text(&format!("• {t}"), &BULLET, 0.0),
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Document
// ────────────────────────────────────────────────────────────────────────────

fn write_document(flow: &mut Flow, doc: &ResumeDocument) {
    write_header(flow, doc);

    if !doc.objective.trim().is_empty() {
        flow.section_title("PROFILE");
        flow.text(doc.objective.trim(), &PARAGRAPH, 0.0);
    }

    if !doc.experience.is_empty() {
        flow.section_title("PROFESSIONAL EXPERIENCE");
        for entry in &doc.experience {
            flow.text(entry.role.trim(), &ITEM_TITLE, 0.0);
            flow.text(entry.company.trim(), &ITEM_SUBTITLE, 0.0);
            let dates = text::date_range(&entry.start_date, &entry.end_date, Some(OPEN_DATE_LABEL));
            flow.text(&dates, &ITEM_DATE, 0.0);
            flow.description(&entry.description);
            flow.gap(8.0);
        }
    }

    if !doc.education.is_empty() {
        flow.section_title("EDUCATION");
        for entry in &doc.education {
            flow.text(entry.institution.trim(), &ITEM_TITLE, 0.0);
            flow.text(entry.course.trim(), &ITEM_SUBTITLE, 0.0);
            flow.text(
                &text::date_range(&entry.start_date, &entry.end_date, None),
                &ITEM_DATE,
                0.0,
            );
            flow.text(&text::list_items(&entry.topics).join(", "), &BODY, 0.0);
            flow.gap(8.0);
        }
    }

    let skills = text::list_items(&doc.skills);
    if !skills.is_empty() {
        flow.section_title("TECHNICAL SKILLS");
        for skill in &skills {
            flow.text(skill, &BODY, 0.0);
        }
    }

    if !doc.projects.is_empty() {
        flow.section_title("PROJECTS");
        for project in &doc.projects {
            flow.text(project.name.trim(), &ITEM_TITLE, 0.0);
            flow.text(project.technologies.trim(), &ITEM_SUBTITLE, 0.0);
            flow.text(
                &text::date_range(&project.start_date, &project.end_date, None),
                &ITEM_DATE,
                0.0,
            );
            flow.text(project.description.trim(), &PARAGRAPH, 0.0);
            let href = text::normalize_url(&project.link);
            if !href.is_empty() {
                let display = format!("Link: {}", text::link_display(&project.link, ""));
                let style = TextStyle {
                    centered: false,
                    ..LINK
                };
                flow.line(&display, &style, 0.0, Some(&href));
            }
            flow.gap(8.0);
        }
    }

    for (title, source) in [("LANGUAGES", &doc.languages), ("SOFT SKILLS", &doc.soft_skills)] {
        let items = text::list_items(source);
        if items.is_empty() {
            continue;
        }
        flow.section_title(title);
        for item in &items {
            flow.text(item, &BODY, 0.0);
        }
    }

    if !doc.interpersonal_skills.trim().is_empty() {
        flow.section_title("INTERPERSONAL SKILLS");
        flow.description(&doc.interpersonal_skills);
    }

    let custom: Vec<_> = doc
        .custom_fields
        .iter()
        .filter(|f| !(f.label.trim().is_empty() && f.value.trim().is_empty()))
        .collect();
    if !custom.is_empty() {
        flow.section_title("ADDITIONAL INFORMATION");
        for field in custom {
            let line = match (field.label.trim(), field.value.trim()) {
                ("", value) => value.to_string(),
                (label, "") => label.to_string(),
                (label, value) => format!("{label}: {value}"),
            };
            flow.text(&line, &BODY, 0.0);
        }
    }

    if !doc.references.is_empty() {
        flow.section_title("REFERENCES");
        for reference in &doc.references {
            flow.text(reference.name.trim(), &ITEM_TITLE, 0.0);
            if !reference.email.trim().is_empty() {
                flow.text(&format!("Email: {}", reference.email.trim()), &BODY, 0.0);
            }
            if !reference.phone.trim().is_empty() {
                flow.text(&format!("Phone: {}", reference.phone.trim()), &BODY, 0.0);
            }
            flow.gap(8.0);
        }
    }
}

fn write_header(flow: &mut Flow, doc: &ResumeDocument) {
    flow.text(doc.full_name.trim(), &NAME, 0.0);
    flow.text(doc.job_title.trim(), &JOB_TITLE, 0.0);
    flow.gap(6.0);
    for value in [&doc.email, &doc.phone, &doc.address] {
        flow.text(value.trim(), &HEADER_INFO, 0.0);
    }

    let links: Vec<(String, String)> = [
        (&doc.linkedin, &doc.linkedin_name),
        (&doc.github, &doc.github_name),
        (&doc.portfolio, &doc.portfolio_name),
    ]
    .into_iter()
    .filter_map(|(url, name)| {
        let href = text::normalize_url(url);
        (!href.is_empty()).then(|| (text::link_display(url, name), href))
    })
    .collect();
    write_link_row(flow, &links);
    flow.gap(12.0);
}

/// Centered row of links, 12pt apart; one link per line when the row does
/// not fit the content width.
fn write_link_row(flow: &mut Flow, links: &[(String, String)]) {
    if links.is_empty() {
        return;
    }
    const SPACING: f32 = 12.0;
    let metrics = get_metrics(LINK.font.face());
    let widths: Vec<f32> = links
        .iter()
        .map(|(display, _)| metrics.width_at(display, LINK.size))
        .collect();
    let total = widths.iter().sum::<f32>() + SPACING * (links.len() - 1) as f32;

    flow.gap(6.0);
    if total > CONTENT_WIDTH {
        for (display, href) in links {
            flow.line(display, &LINK, 0.0, Some(href));
        }
        return;
    }

    // Lay the row out as left-aligned lines at computed offsets, restoring the
    // cursor between them so they share a baseline. The break, if any, happens
    // once for the whole row.
    flow.ensure(LINK.size * LINK.leading);
    let row_top = flow.cursor;
    let mut offset = (CONTENT_WIDTH - total) / 2.0;
    let left_aligned = TextStyle {
        centered: false,
        ..LINK
    };
    for ((display, href), width) in links.iter().zip(&widths) {
        flow.cursor = row_top;
        flow.line(display, &left_aligned, offset, Some(href));
        offset += width + SPACING;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Encoding
// ────────────────────────────────────────────────────────────────────────────

/// Maps text to WinAnsi (CP1252) bytes for the standard Type 1 fonts.
/// Characters outside the code page become `?`.
fn encode_win_ansi(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7E}' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            '\t' => b' ',
            _ => b'?',
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Serialization
// ────────────────────────────────────────────────────────────────────────────

fn serialize(pages: Vec<PageContent>, title: &str) -> Vec<u8> {
    let mut next_id = 1;
    let mut alloc = || {
        let id = Ref::new(next_id);
        next_id += 1;
        id
    };

    let mut pdf = Pdf::new();
    let catalog_id = alloc();
    let page_tree_id = alloc();

    let fonts: Vec<(PdfFont, Ref)> = PdfFont::ALL.iter().map(|&font| (font, alloc())).collect();
    for &(font, id) in &fonts {
        pdf.type1_font(id)
            .base_font(font.base_font())
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    let mut page_ids = Vec::with_capacity(pages.len());
    for page in pages {
        let page_id = alloc();
        let content_id = alloc();
        let annot_ids: Vec<Ref> = page.links.iter().map(|_| alloc()).collect();

        for (link, &id) in page.links.iter().zip(&annot_ids) {
            let [x1, y1, x2, y2] = link.rect;
            let mut annotation = pdf.annotation(id);
            annotation
                .subtype(AnnotationType::Link)
                .rect(Rect::new(x1, y1, x2, y2))
                .border(0.0, 0.0, 0.0, None);
            annotation
                .action()
                .action_type(ActionType::Uri)
                .uri(Str(link.uri.as_bytes()));
        }

        let compressed = compress_to_vec_zlib(&page.ops.finish(), 6);
        pdf.stream(content_id, &compressed).filter(Filter::FlateDecode);

        let mut writer = pdf.page(page_id);
        writer
            .media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT))
            .parent(page_tree_id)
            .contents(content_id);
        if !annot_ids.is_empty() {
            writer.annotations(annot_ids.iter().copied());
        }
        {
            let mut resources = writer.resources();
            let mut font_dict = resources.fonts();
            for &(font, id) in &fonts {
                font_dict.pair(font.resource(), id);
            }
        }
        writer.finish();
        page_ids.push(page_id);
    }

    pdf.catalog(catalog_id).pages(page_tree_id);
    let page_count = page_ids.len() as i32;
    pdf.pages(page_tree_id).kids(page_ids).count(page_count);

    let producer = format!("vitae {}", env!("CARGO_PKG_VERSION"));
    pdf.document_info(alloc())
        .title(TextStr(title))
        .producer(TextStr(&producer));

    pdf.finish()
}
