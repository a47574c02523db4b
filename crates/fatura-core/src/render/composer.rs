//! Plain-text to PDF composition with lopdf.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use tracing::debug;

use crate::error::RenderError;
use crate::models::config::RenderConfig;

/// A4 in points.
const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;

const HEADING_PREFIX: &str = "# ";
const HEADING_SIZE: f32 = 14.0;

/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// Trait for turning rendered report text into a PDF document.
pub trait PdfComposer {
    fn compose(&self, text: &str) -> Result<Vec<u8>, RenderError>;
}

/// Composer laying out text lines on A4 pages with the standard Helvetica
/// fonts. Lines starting with `# ` are set as bold headings; long lines are
/// wrapped at word boundaries and pages break automatically.
#[derive(Debug, Clone)]
pub struct LopdfComposer {
    font_size: f32,
    leading: f32,
    margin: f32,
}

#[derive(Debug, Clone, PartialEq)]
struct Line {
    text: String,
    bold: bool,
}

impl LopdfComposer {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            font_size: config.font_size.max(1.0),
            leading: config.leading.max(config.font_size),
            margin: config.margin.clamp(0.0, PAGE_WIDTH / 4.0),
        }
    }

    fn layout(&self, text: &str) -> Vec<Line> {
        let body_chars = self.chars_per_line(self.font_size);
        let heading_chars = self.chars_per_line(HEADING_SIZE);

        let mut lines = Vec::new();
        for raw in text.lines() {
            let (content, bold, width) = match raw.strip_prefix(HEADING_PREFIX) {
                Some(heading) => (heading, true, heading_chars),
                None => (raw, false, body_chars),
            };
            for piece in wrap(content, width) {
                lines.push(Line { text: piece, bold });
            }
        }
        lines
    }

    fn chars_per_line(&self, size: f32) -> usize {
        let usable = PAGE_WIDTH - 2.0 * self.margin;
        ((usable / (size * AVG_GLYPH_WIDTH)) as usize).max(10)
    }

    /// Split laid-out lines into pages of content operations.
    fn paginate(&self, lines: &[Line]) -> Vec<Vec<Operation>> {
        let top = PAGE_HEIGHT - self.margin;
        let mut pages = Vec::new();
        let mut ops = Vec::new();
        let mut y = top;

        for line in lines {
            let (size, advance) = if line.bold {
                (HEADING_SIZE, self.leading * 1.5)
            } else {
                (self.font_size, self.leading)
            };

            if y - advance < self.margin && !ops.is_empty() {
                pages.push(std::mem::take(&mut ops));
                y = top;
            }
            y -= advance;

            if line.text.is_empty() {
                continue;
            }
            let font = if line.bold { "F2" } else { "F1" };
            ops.push(Operation::new("BT", vec![]));
            ops.push(Operation::new("Tf", vec![font.into(), size.into()]));
            ops.push(Operation::new("Td", vec![self.margin.into(), y.into()]));
            ops.push(Operation::new(
                "Tj",
                vec![Object::String(win_ansi(&line.text), StringFormat::Literal)],
            ));
            ops.push(Operation::new("ET", vec![]));
        }

        if !ops.is_empty() || pages.is_empty() {
            pages.push(ops);
        }
        pages
    }
}

impl Default for LopdfComposer {
    fn default() -> Self {
        Self::new(&RenderConfig::default())
    }
}

impl PdfComposer for LopdfComposer {
    fn compose(&self, text: &str) -> Result<Vec<u8>, RenderError> {
        let lines = self.layout(text);
        let pages = self.paginate(&lines);

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding"
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding"
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular_id,
                "F2" => bold_id
            }
        });
        let media_box: Vec<Object> = vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()];

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for operations in pages {
            let content = Content { operations }
                .encode()
                .map_err(|e| RenderError::Compose(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => media_box.clone()
            });
            kids.push(page_id.into());
        }

        let page_count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
                "Resources" => resources_id,
                "MediaBox" => media_box
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| RenderError::Compose(e.to_string()))?;

        debug!("Composed PDF: {} lines, {} pages, {} bytes", lines.len(), page_count, bytes.len());
        Ok(bytes)
    }
}

/// Greedy word wrap to at most `width` characters per line.
fn wrap(text: &str, width: usize) -> Vec<String> {
    if text.chars().count() <= width {
        return vec![text.trim_end().to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = current.chars().count() + usize::from(!current.is_empty()) + word.chars().count();
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Encode text for the WinAnsi standard fonts; characters outside Latin-1
/// become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}
