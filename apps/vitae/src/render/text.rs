//! Text conventions shared by the paginated preview and the PDF export, so
//! both renderers present the same data the same way.

/// Dates are opaque: trimmed and otherwise shown verbatim.
pub fn format_date(date: &str) -> String {
    date.trim().to_string()
}

/// `"start - end"`; when `end` is blank, `open_label` (e.g. "Present") stands
/// in for it, or the range collapses to just `start`.
pub fn date_range(start: &str, end: &str, open_label: Option<&str>) -> String {
    let start = format_date(start);
    let end = format_date(end);
    match (end.is_empty(), open_label) {
        (false, _) => format!("{start} - {end}"),
        (true, Some(label)) => format!("{start} - {label}"),
        (true, None) => start,
    }
}

/// One rendered line of a free-text description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptionLine {
    /// A line ending in `:`.
    SubHeading(String),
    /// A line under a sub-heading, before the next blank line.
    SubItem(String),
    /// A line with no sub-heading in effect.
    Item(String),
}

/// Parses the newline-delimited description convention. Blank lines produce
/// nothing but end the current sub-heading.
pub fn parse_description(text: &str) -> Vec<DescriptionLine> {
    let mut lines = Vec::new();
    let mut inside_subheading = false;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            inside_subheading = false;
            continue;
        }
        if line.ends_with(':') {
            lines.push(DescriptionLine::SubHeading(line.to_string()));
            inside_subheading = true;
        } else if inside_subheading {
            lines.push(DescriptionLine::SubItem(line.to_string()));
        } else {
            lines.push(DescriptionLine::Item(line.to_string()));
        }
    }
    lines
}

/// Splits a newline-delimited list, trimming items, dropping blanks and any
/// leading bullet glyph the user typed.
pub fn list_items(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.trim_start_matches('•').trim_start().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Prefixes `https://` to a URL that has no http(s) scheme.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return String::new();
    }
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Link text: the override when it is not blank, otherwise the URL without
/// scheme, leading `www.` and a trailing slash.
pub fn link_display(url: &str, display_override: &str) -> String {
    let custom = display_override.trim();
    if !custom.is_empty() {
        return custom.to_string();
    }
    let url = url.trim();
    let lower = url.to_ascii_lowercase();
    let mut rest = if lower.starts_with("https://") {
        &url[8..]
    } else if lower.starts_with("http://") {
        &url[7..]
    } else {
        url
    };
    if rest.to_ascii_lowercase().starts_with("www.") {
        rest = &rest[4..];
    }
    rest.strip_suffix('/').unwrap_or(rest).to_string()
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
