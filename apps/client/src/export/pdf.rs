//! PDF backend via `printpdf`. Draws a `DocumentLayout` page by page; layout
//! and pagination are already decided by the time this runs.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference};

use crate::export::document::{
    DocumentLayout, DocumentRenderer, LineStyle, PageGeometry, RenderedDocument,
};
use crate::export::ExportError;
use crate::models::AnalysisResult;

pub const PDF_EXTENSION: &str = "pdf";
const LAYER_NAME: &str = "Layer 1";

/// Built-in Helvetica only covers WinAnsi; set `font_path` for other scripts.
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    pub geometry: PageGeometry,
    pub font_path: Option<PathBuf>,
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// Whether "•" can be drawn; built-in fonts fall back to "-".
    unicode: bool,
}

impl PdfRenderer {
    pub fn new(font_path: Option<PathBuf>) -> Self {
        Self {
            geometry: PageGeometry::default(),
            font_path,
        }
    }

    fn load_fonts(&self, doc: &PdfDocumentReference) -> Result<Fonts, ExportError> {
        match &self.font_path {
            Some(path) => {
                let file = File::open(path).map_err(|e| {
                    ExportError::Render(format!("cannot open font '{}': {e}", path.display()))
                })?;
                let font = doc
                    .add_external_font(file)
                    .map_err(|e| ExportError::Render(format!("PDF font error: {e}")))?;
                Ok(Fonts {
                    regular: font.clone(),
                    bold: font,
                    unicode: true,
                })
            }
            None => {
                let regular = doc
                    .add_builtin_font(BuiltinFont::Helvetica)
                    .map_err(|e| ExportError::Render(format!("PDF font error: {e}")))?;
                let bold = doc
                    .add_builtin_font(BuiltinFont::HelveticaBold)
                    .map_err(|e| ExportError::Render(format!("PDF font error: {e}")))?;
                Ok(Fonts {
                    regular,
                    bold,
                    unicode: false,
                })
            }
        }
    }

    pub fn draw(&self, layout: &DocumentLayout) -> Result<RenderedDocument, ExportError> {
        let geometry = &layout.geometry;
        let (width, height) = (Mm(geometry.width_mm), Mm(geometry.height_mm));
        let (doc, first_page, first_layer) =
            PdfDocument::new(&layout.title, width, height, LAYER_NAME);
        let fonts = self.load_fonts(&doc)?;
        let bullet = if fonts.unicode { "•" } else { "-" };

        for (index, page) in layout.pages.iter().enumerate() {
            let layer = if index == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (page_index, layer_index) = doc.add_page(width, height, LAYER_NAME);
                doc.get_page(page_index).get_layer(layer_index)
            };

            for line in &page.lines {
                let font = if line.style.is_bold() {
                    &fonts.bold
                } else {
                    &fonts.regular
                };
                let text = match line.style {
                    LineStyle::Bullet => format!("{bullet} {}", line.text),
                    LineStyle::BulletContinuation => format!("  {}", line.text),
                    _ => line.text.clone(),
                };
                // printpdf measures y from the bottom edge.
                layer.use_text(
                    text,
                    line.style.font_size_pt(),
                    Mm(line.x_mm),
                    Mm(geometry.height_mm - line.y_mm),
                    font,
                );
            }
        }

        let mut buf = BufWriter::new(Vec::new());
        doc.save(&mut buf)
            .map_err(|e| ExportError::Render(format!("PDF save error: {e}")))?;
        let bytes = buf
            .into_inner()
            .map_err(|e| ExportError::Render(format!("PDF buffer error: {e}")))?;

        Ok(RenderedDocument {
            bytes,
            page_count: layout.pages.len(),
            extension: PDF_EXTENSION,
        })
    }
}

impl DocumentRenderer for PdfRenderer {
    fn extension(&self) -> &'static str {
        PDF_EXTENSION
    }

    fn render(&self, result: &AnalysisResult) -> Result<RenderedDocument, ExportError> {
        let layout = DocumentLayout::build(result, &self.geometry, chrono::Utc::now().date_naive());
        self.draw(&layout)
    }
}
