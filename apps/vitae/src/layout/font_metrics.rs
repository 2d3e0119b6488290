//! Static font-metric tables and A4 page geometry.
//!
//! The preview renders in Arial and the PDF export in Helvetica; the two are
//! metric-compatible, so one pair of tables (regular and bold) serves both.
//! Oblique faces share the upright widths.
//!
//! Character widths are in em units (relative to font size), taken from the
//! Helvetica AFM files. All tables cover ASCII 0x20..=0x7E (95 printable
//! characters). Index = (char as usize) - 32.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Page configuration
// ────────────────────────────────────────────────────────────────────────────

/// CSS reference pixels per millimetre (96 px per 25.4 mm).
pub const PX_PER_MM: f32 = 96.0 / 25.4;

/// Geometry of one preview page.
///
/// The main content column is what gets paginated; the sidebar is drawn on
/// every page and is never measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    /// Top + bottom padding of the content column, unavailable for sections.
    pub reserved_vertical_px: f32,
    pub sidebar_width_px: f32,
    /// Left and right padding of the content column (each side).
    pub content_padding_x_px: f32,
    /// How many skills the sidebar lists.
    pub sidebar_top_skills: usize,
}

/// A4 portrait, 192 px sidebar, 32 px column padding, 100 px reserved height.
pub fn default_page_config() -> PageConfig {
    PageConfig {
        page_width_mm: 210.0,
        page_height_mm: 297.0,
        reserved_vertical_px: 100.0,
        sidebar_width_px: 192.0,
        content_padding_x_px: 32.0,
        sidebar_top_skills: 6,
    }
}

impl PageConfig {
    pub fn page_width_px(&self) -> f32 {
        self.page_width_mm * PX_PER_MM
    }

    pub fn page_height_px(&self) -> f32 {
        self.page_height_mm * PX_PER_MM
    }

    /// Usable vertical space per page for paginated sections.
    pub fn page_inner_height_px(&self) -> f32 {
        self.page_height_px() - self.reserved_vertical_px
    }

    /// Width of the content column. Measurement and display must both use it.
    pub fn content_width_px(&self) -> f32 {
        self.page_width_px() - self.sidebar_width_px - 2.0 * self.content_padding_x_px
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFace {
    Regular,
    Bold,
}

/// Static character-width table for one face.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Fallback width for non-ASCII characters (accented Latin letters mostly).
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    /// Measures the rendered width of a string in em units.
    ///
    /// Non-ASCII characters fall back to `average_char_width`.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32]
                } else {
                    self.average_char_width
                }
            })
            .sum()
    }

    /// Width of `s` in pixels (or points) at `font_size`.
    pub fn width_at(&self, s: &str, font_size: f32) -> f32 {
        self.measure_str(s) * font_size
    }

    /// Greedy word-wrap of `text` into lines no wider than `max_width`.
    ///
    /// Whitespace runs collapse to single spaces, as in HTML flow. A word
    /// wider than the line sits alone on its own line and overflows. Empty or
    /// all-whitespace text yields no lines.
    pub fn wrap(&self, text: &str, font_size: f32, max_width: f32) -> Vec<String> {
        let space_w = self.space_width * font_size;
        let mut lines: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in text.split_whitespace() {
            let word_w = self.width_at(word, font_size);
            if current.is_empty() {
                current.push_str(word);
                current_width = word_w;
            } else if current_width + space_w + word_w > max_width {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_width = word_w;
            } else {
                current.push(' ');
                current.push_str(word);
                current_width += space_w + word_w;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    /// Number of printed lines `text` occupies at `max_width`.
    pub fn line_count(&self, text: &str, font_size: f32, max_width: f32) -> usize {
        self.wrap(text, font_size, max_width).len()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

/// Helvetica / Arial regular.
static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.556,
    space_width: 0.278,
};

/// Helvetica / Arial bold.
static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {      |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    average_char_width: 0.611,
    space_width: 0.278,
};

/// Returns the static metric table for a face.
pub fn get_metrics(face: FontFace) -> &'static FontMetricTable {
    match face {
        FontFace::Regular => &HELVETICA_TABLE,
        FontFace::Bold => &HELVETICA_BOLD_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_str_empty_returns_zero() {
        assert_eq!(get_metrics(FontFace::Regular).measure_str(""), 0.0);
    }

    #[test]
    fn test_measure_str_ascii_characters() {
        let metrics = get_metrics(FontFace::Regular);
        // "Rust" = R(0.722) + u(0.556) + s(0.500) + t(0.278) = 2.056
        let width = metrics.measure_str("Rust");
        assert!((width - 2.056).abs() < 1e-3, "got {width}");
    }

    #[test]
    fn test_measure_str_non_ascii_falls_back() {
        let metrics = get_metrics(FontFace::Regular);
        let width = metrics.measure_str("é");
        assert!((width - metrics.average_char_width).abs() < 1e-4);
    }

    #[test]
    fn test_bold_is_wider_than_regular() {
        let text = "Senior Software Engineer";
        assert!(
            get_metrics(FontFace::Bold).measure_str(text)
                > get_metrics(FontFace::Regular).measure_str(text)
        );
    }

    #[test]
    fn test_wrap_short_text_is_one_line() {
        let lines = get_metrics(FontFace::Regular).wrap("Hello world", 12.0, 500.0);
        assert_eq!(lines, vec!["Hello world"]);
    }

    #[test]
    fn test_wrap_breaks_at_width() {
        let metrics = get_metrics(FontFace::Regular);
        // Each "word" is 4 × 0.5..0.556 em ≈ 26 px at 12 px; 100 px fits three.
        let lines = metrics.wrap("word word word word word word", 12.0, 100.0);
        assert!(lines.len() >= 2);
        for line in &lines {
            assert!(metrics.width_at(line, 12.0) <= 100.0);
        }
        assert_eq!(lines.join(" "), "word word word word word word");
    }

    #[test]
    fn test_wrap_overlong_word_sits_alone() {
        let metrics = get_metrics(FontFace::Regular);
        let long = "x".repeat(200);
        let lines = metrics.wrap(&format!("a {long} b"), 12.0, 100.0);
        assert_eq!(lines, vec!["a".to_string(), long, "b".to_string()]);
    }

    #[test]
    fn test_wrap_collapses_whitespace_and_empty_text() {
        let metrics = get_metrics(FontFace::Regular);
        assert!(metrics.wrap("   \t ", 12.0, 100.0).is_empty());
        assert_eq!(metrics.wrap("a    b", 12.0, 100.0), vec!["a b"]);
    }

    #[test]
    fn test_default_page_config_geometry() {
        let config = default_page_config();
        // 297 mm ≈ 1122.5 px; minus 100 reserved.
        assert!((config.page_height_px() - 1122.52).abs() < 0.1);
        assert!((config.page_inner_height_px() - 1022.52).abs() < 0.1);
        // 210 mm ≈ 793.7 px − 192 sidebar − 64 padding.
        assert!((config.content_width_px() - 537.7).abs() < 0.1);
    }
}
