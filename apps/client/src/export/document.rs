//! Paginated document export.
//!
//! # Architecture
//! - `DocumentLayout::build` turns a result into pages of positioned lines. It
//!   owns every formatting and pagination decision.
//! - A `DocumentRenderer` backend only draws an already paginated layout, so
//!   backends can be swapped without touching grouping or formatting.
//!
//! # Pagination
//! The cursor is measured in millimetres from the top edge. Before a line is
//! placed, a cursor past `page_break_y` starts a new page at `top_margin`.
//! Every placed line therefore sits at `y <= page_break_y` and no line is
//! skipped.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::export::{ExportError, ExportGuard};
use crate::models::AnalysisResult;
use crate::render::{group_tags, presentation};

pub const DOCUMENT_TITLE: &str = "Resume Analysis Report";

// ────────────────────────────────────────────────────────────────────────────
// Geometry and line styles
// ────────────────────────────────────────────────────────────────────────────

/// Page dimensions in millimetres.
#[derive(Debug, Clone, PartialEq)]
pub struct PageGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
    pub left_margin_mm: f32,
    pub top_margin_mm: f32,
    /// A cursor beyond this forces a page break before the next line.
    pub page_break_y_mm: f32,
    /// Maximum characters per wrapped line at body size.
    pub wrap_chars: usize,
}

impl Default for PageGeometry {
    /// A4 portrait.
    fn default() -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            left_margin_mm: 20.0,
            top_margin_mm: 20.0,
            page_break_y_mm: 280.0,
            wrap_chars: 80,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Title,
    Meta,
    Heading,
    Body,
    /// First line of a tag entry; backends draw the bullet marker.
    Bullet,
    /// Wrapped remainder of a tag entry.
    BulletContinuation,
}

impl LineStyle {
    pub fn font_size_pt(self) -> f32 {
        match self {
            LineStyle::Title => 20.0,
            LineStyle::Meta => 9.0,
            LineStyle::Heading => 15.0,
            LineStyle::Body | LineStyle::Bullet | LineStyle::BulletContinuation => 11.0,
        }
    }

    /// Vertical distance to the next line.
    pub fn advance_mm(self) -> f32 {
        match self {
            LineStyle::Title => 12.0,
            LineStyle::Meta => 8.0,
            LineStyle::Heading => 9.0,
            LineStyle::Body | LineStyle::Bullet | LineStyle::BulletContinuation => 7.0,
        }
    }

    pub fn indent_mm(self) -> f32 {
        match self {
            LineStyle::Bullet | LineStyle::BulletContinuation => 5.0,
            _ => 0.0,
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(self, LineStyle::Title | LineStyle::Heading)
    }
}

/// Gap before each section heading.
const SECTION_GAP_MM: f32 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub style: LineStyle,
    pub x_mm: f32,
    /// Baseline distance from the top edge.
    pub y_mm: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<PlacedLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub title: String,
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
}

// ────────────────────────────────────────────────────────────────────────────
// Layout
// ────────────────────────────────────────────────────────────────────────────

struct Cursor<'g> {
    geometry: &'g PageGeometry,
    pages: Vec<Page>,
    y: f32,
}

impl<'g> Cursor<'g> {
    fn new(geometry: &'g PageGeometry) -> Self {
        Self {
            geometry,
            pages: vec![Page::default()],
            y: geometry.top_margin_mm,
        }
    }

    fn place(&mut self, text: impl Into<String>, style: LineStyle) {
        if self.y > self.geometry.page_break_y_mm {
            self.pages.push(Page::default());
            self.y = self.geometry.top_margin_mm;
        }
        let line = PlacedLine {
            text: text.into(),
            style,
            x_mm: self.geometry.left_margin_mm + style.indent_mm(),
            y_mm: self.y,
        };
        if let Some(page) = self.pages.last_mut() {
            page.lines.push(line);
        }
        self.y += style.advance_mm();
    }

    fn gap(&mut self, mm: f32) {
        self.y += mm;
    }
}

impl DocumentLayout {
    pub fn build(result: &AnalysisResult, geometry: &PageGeometry, generated_on: NaiveDate) -> Self {
        let mut cursor = Cursor::new(geometry);
        let info = result.personal_info();

        cursor.place(DOCUMENT_TITLE, LineStyle::Title);
        cursor.place(format!("Generated {}", generated_on.format("%Y-%m-%d")), LineStyle::Meta);

        cursor.gap(SECTION_GAP_MM);
        cursor.place("Personal Information", LineStyle::Heading);
        let fields = [
            ("Name", Some(info.display_name())),
            ("Email", info.email.as_deref()),
            ("Phone", info.phone.as_deref()),
            ("Location", info.location.as_deref()),
        ];
        for (label, value) in fields {
            if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
                for line in wrap_text(&format!("{label}: {value}"), geometry.wrap_chars) {
                    cursor.place(line, LineStyle::Body);
                }
            }
        }

        for bucket in group_tags(result.tags()) {
            cursor.gap(SECTION_GAP_MM);
            cursor.place(capitalize(presentation(&bucket.category).label), LineStyle::Heading);
            for tag in bucket.tags {
                let entry = match tag.display_score() {
                    Some(score) => format!("{} ({score}/10)", tag.name),
                    None => tag.name.clone(),
                };
                let width = geometry.wrap_chars.saturating_sub(4).max(1);
                for (i, line) in wrap_text(&entry, width).into_iter().enumerate() {
                    let style = if i == 0 {
                        LineStyle::Bullet
                    } else {
                        LineStyle::BulletContinuation
                    };
                    cursor.place(line, style);
                }
            }
        }

        debug!("Document layout produced {} page(s)", cursor.pages.len());
        DocumentLayout {
            title: DOCUMENT_TITLE.to_string(),
            geometry: geometry.clone(),
            pages: cursor.pages,
        }
    }

    #[cfg(test)]
    pub fn lines(&self) -> impl Iterator<Item = &PlacedLine> {
        self.pages.iter().flat_map(|p| p.lines.iter())
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Greedy word wrap by character count. A word longer than `max_chars`
/// occupies its own line unbroken.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > max_chars {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

// ────────────────────────────────────────────────────────────────────────────
// Renderer seam
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub extension: &'static str,
}

/// A document backend. Implementations must not panic on valid input; if one
/// does, `export_document` still reports it as an `ExportError`.
pub trait DocumentRenderer: Send + Sync {
    fn extension(&self) -> &'static str;

    fn render(&self, result: &AnalysisResult) -> Result<RenderedDocument, ExportError>;
}

/// Plain-text pages separated by form feeds.
#[derive(Debug, Clone, Default)]
pub struct TextRenderer {
    pub geometry: PageGeometry,
}

impl TextRenderer {
    pub fn draw(layout: &DocumentLayout) -> RenderedDocument {
        let pages: Vec<String> = layout
            .pages
            .iter()
            .map(|page| {
                page.lines
                    .iter()
                    .map(|line| match line.style {
                        LineStyle::Bullet => format!("  • {}", line.text),
                        LineStyle::BulletContinuation => format!("    {}", line.text),
                        LineStyle::Heading => format!("\n{}", line.text),
                        _ => line.text.clone(),
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .collect();
        RenderedDocument {
            bytes: pages.join("\n\u{0c}\n").into_bytes(),
            page_count: layout.pages.len(),
            extension: "txt",
        }
    }
}

impl DocumentRenderer for TextRenderer {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn render(&self, result: &AnalysisResult) -> Result<RenderedDocument, ExportError> {
        let layout = DocumentLayout::build(result, &self.geometry, chrono::Utc::now().date_naive());
        Ok(Self::draw(&layout))
    }
}

/// Runs a renderer off the async executor. Errors and panics in the backend
/// are both returned as `ExportError::Render`.
pub async fn export_document(
    renderer: std::sync::Arc<dyn DocumentRenderer>,
    result: AnalysisResult,
    guard: ExportGuard,
) -> Result<RenderedDocument, ExportError> {
    let outcome = tokio::task::spawn_blocking(move || renderer.render(&result))
        .await
        .map_err(|e| {
            warn!("Document renderer task failed: {e}");
            ExportError::Render(format!("the document renderer crashed ({e})"))
        });
    drop(guard);
    outcome?
}
