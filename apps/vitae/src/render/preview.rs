//! Paginated HTML preview.
//!
//! Draws one fixed A4 sheet per page of a `PageLayout`. Each sheet repeats the
//! sidebar and renders its sections through the same blocks and typography
//! the measurer used, so the visible breaks match the computed ones.

use std::fmt::Write as _;

use crate::layout::blocks::{render_section, TextLine, TextRole, VisualBlock};
use crate::layout::font_metrics::{FontFace, PageConfig};
use crate::layout::paginator::PageLayout;
use crate::models::ResumeDocument;
use crate::render::text::{escape_html, link_display, list_items, normalize_url};

const SIDEBAR_BACKGROUND: &str = "#1e3a8a";

/// Renders the full preview document.
///
/// `export_href` is the PDF download target shown in the toolbar.
pub fn render_preview(
    doc: &ResumeDocument,
    layout: &PageLayout,
    config: &PageConfig,
    export_href: &str,
) -> String {
    let title = match doc.full_name.trim() {
        "" => "Résumé".to_string(),
        name => escape_html(name),
    };
    let sidebar = sidebar(doc, config);

    let mut html = String::with_capacity(16 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{title} - Preview</title>");
    let _ = writeln!(html, "<style>\n{}</style>", stylesheet(config));
    html.push_str("</head>\n<body>\n");

    let _ = writeln!(
        html,
        "<div class=\"toolbar no-print\"><span>{} page(s)</span> \
         <a href=\"{}\" download>Download PDF</a></div>",
        layout.page_count(),
        escape_html(export_href)
    );

    for (i, page) in layout.pages.iter().enumerate() {
        let _ = writeln!(html, "<div class=\"page\" data-page=\"{}\">", i + 1);
        html.push_str(&sidebar);
        html.push_str("<main class=\"content\">\n");
        for key in &page.sections {
            let block = render_section(key, doc);
            if !block.is_empty() {
                write_block(&mut html, &block);
            }
        }
        html.push_str("</main>\n</div>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn stylesheet(config: &PageConfig) -> String {
    let vertical_padding = config.reserved_vertical_px / 2.0;
    let mut css = format!(
        "@page {{ size: A4; margin: 0; }}\n\
         * {{ box-sizing: border-box; }}\n\
         body {{ margin: 0; background: #e5e7eb; font-family: Arial, Helvetica, sans-serif; color: #111827; }}\n\
         p {{ margin: 0; }}\n\
         a {{ color: inherit; }}\n\
         .toolbar {{ text-align: center; padding: 12px; font-size: 14px; }}\n\
         .page {{ display: flex; width: {w}mm; height: {h}mm; margin: 0 auto 16px; background: #fff; overflow: hidden; }}\n\
         .sidebar {{ flex: 0 0 {sw}px; width: {sw}px; padding: 24px 12px; background: {bg}; color: #fff; font-size: 12px; line-height: 24px; overflow-wrap: anywhere; }}\n\
         .sidebar .name {{ font-weight: bold; padding-bottom: 16px; margin-bottom: 24px; border-bottom: 1px solid #1d4ed8; line-height: 16px; }}\n\
         .sidebar h3 {{ font-size: 12px; font-weight: 600; margin: 0 0 4px; line-height: 16px; }}\n\
         .sidebar .group {{ margin-bottom: 16px; }}\n\
         .sidebar ul {{ list-style: none; margin: 0; padding: 0; }}\n\
         .content {{ flex: 1 1 auto; width: {cw}px; padding: {vp}px {hp}px; }}\n\
         .block {{ display: flow-root; }}\n\
         .t-bullet, .t-subitem {{ position: relative; }}\n\
         .t-bullet::before, .t-subitem::before {{ content: \"\\2022\"; position: absolute; left: -12px; }}\n\
         @media print {{ body {{ background: none; }} .no-print {{ display: none !important; }} .page {{ margin: 0; page-break-after: always; }} }}\n",
        w = config.page_width_mm,
        h = config.page_height_mm,
        sw = config.sidebar_width_px,
        bg = SIDEBAR_BACKGROUND,
        cw = config.content_width_px() + 2.0 * config.content_padding_x_px,
        vp = vertical_padding,
        hp = config.content_padding_x_px,
    );

    for role in TextRole::ALL {
        let t = role.typography();
        let weight = if t.face == FontFace::Bold {
            "bold"
        } else {
            "normal"
        };
        let style = if t.italic { "italic" } else { "normal" };
        let _ = writeln!(
            css,
            ".{} {{ font-size: {}px; line-height: {}px; font-weight: {weight}; font-style: {style}; }}",
            t.css_class, t.font_size, t.line_height
        );
    }
    css
}

fn sidebar(doc: &ResumeDocument, config: &PageConfig) -> String {
    let mut html = String::from("<aside class=\"sidebar\">\n");
    let _ = writeln!(
        html,
        "<div class=\"name\">{}</div>",
        escape_html(doc.full_name.trim())
    );

    html.push_str("<div class=\"group\"><h3>Contact</h3>\n");
    for value in [&doc.email, &doc.phone] {
        let value = value.trim();
        if !value.is_empty() {
            let _ = writeln!(html, "<p>{}</p>", escape_html(value));
        }
    }
    for (url, display) in [
        (&doc.linkedin, &doc.linkedin_name),
        (&doc.portfolio, &doc.portfolio_name),
    ] {
        let href = normalize_url(url);
        if !href.is_empty() {
            let _ = writeln!(
                html,
                "<p><a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a></p>",
                escape_html(&href),
                escape_html(&link_display(url, display))
            );
        }
    }
    html.push_str("</div>\n");

    let top_skills: Vec<String> = list_items(&doc.skills)
        .into_iter()
        .take(config.sidebar_top_skills)
        .collect();
    if !top_skills.is_empty() {
        html.push_str("<div class=\"group\"><h3>Top Skills</h3>\n<ul>\n");
        for skill in &top_skills {
            let _ = writeln!(html, "<li>{}</li>", escape_html(skill));
        }
        html.push_str("</ul></div>\n");
    }

    html.push_str("</aside>\n");
    html
}

fn write_block(html: &mut String, block: &VisualBlock) {
    let _ = writeln!(
        html,
        "<section class=\"block\" data-key=\"{}\" style=\"margin: {}px 0 {}px 0\">",
        block.key, block.margin_top, block.margin_bottom
    );
    for line in &block.lines {
        write_line(html, line);
    }
    html.push_str("</section>\n");
}

fn write_line(html: &mut String, line: &TextLine) {
    let class = line.role.typography().css_class;
    let text = escape_html(&line.text);
    let body = match &line.href {
        Some(href) => format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{text}</a>",
            escape_html(href)
        ),
        None => text,
    };
    let _ = writeln!(
        html,
        "<p class=\"{class}\" style=\"margin: {}px 0 0 {}px\">{body}</p>",
        line.space_before_px, line.indent_px
    );
}
