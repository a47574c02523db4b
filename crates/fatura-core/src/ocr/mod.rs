//! OCR seam used for pages without a text layer.

#[cfg(feature = "ocr")]
mod pure_engine;

#[cfg(feature = "ocr")]
pub use pure_engine::PureOcrEngine;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// Largest vertical offset, in pixels, between boxes of one line.
pub const LINE_TOLERANCE_PX: f32 = 20.0;

/// Trait for OCR implementations.
pub trait OcrEngine {
    /// Recognize the text boxes of an image.
    fn recognize(&self, image: &DynamicImage) -> Result<OcrResult, OcrError>;

    /// Recognize an image and return its text only.
    fn extract_text(&self, image: &DynamicImage) -> Result<String, OcrError> {
        Ok(self.recognize(image)?.text)
    }
}

/// A recognized text box with its coordinates and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Quadrilateral corners (x1, y1, x2, y2, x3, y3, x4, y4).
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Get the axis-aligned bounding rectangle (min_x, min_y, max_x, max_y).
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min = |v: [f32; 4]| v.into_iter().fold(f32::INFINITY, f32::min);
        let max = |v: [f32; 4]| v.into_iter().fold(f32::NEG_INFINITY, f32::max);

        (min(xs), min(ys), max(xs), max(ys))
    }
}

/// Result of OCR processing on an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    /// Recognized text boxes in reading order.
    pub boxes: Vec<TextBox>,

    /// Boxes of one line joined by spaces, lines joined by newlines.
    pub text: String,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,

    /// Image dimensions (width, height).
    pub image_size: (u32, u32),
}

impl OcrResult {
    /// Build a result from unordered boxes.
    ///
    /// Boxes are taken top to bottom. A box joins the current line when its
    /// top lies within half the height of the line's first box (capped at
    /// [`LINE_TOLERANCE_PX`]); each line is then ordered left to right and
    /// joined with spaces, so a label and its figures share one line of
    /// text as they would in a PDF text layer.
    pub fn from_boxes(mut boxes: Vec<TextBox>, image_size: (u32, u32), processing_time_ms: u64) -> Self {
        boxes.sort_by(|a, b| a.rect().1.total_cmp(&b.rect().1));

        let mut lines: Vec<Vec<TextBox>> = Vec::new();
        let mut anchor: Option<(f32, f32)> = None;
        for b in boxes {
            let (_, top, _, bottom) = b.rect();
            let joins = matches!(anchor, Some((anchor_top, reach)) if top - anchor_top <= reach);
            if joins {
                if let Some(line) = lines.last_mut() {
                    line.push(b);
                    continue;
                }
            }
            anchor = Some((top, ((bottom - top) / 2.0).min(LINE_TOLERANCE_PX)));
            lines.push(vec![b]);
        }

        for line in &mut lines {
            line.sort_by(|a, b| a.rect().0.total_cmp(&b.rect().0));
        }

        let text = lines
            .iter()
            .map(|line| line.iter().map(|b| b.text.trim()).collect::<Vec<_>>().join(" "))
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            boxes: lines.into_iter().flatten().collect(),
            text,
            processing_time_ms,
            image_size,
        }
    }
}
