//! PDF text and image extraction using lopdf and pdf-extract.

use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace, warn};

use super::{PdfProcessor, PdfType, Result};
use crate::error::PdfError;

/// PDF content extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

/// Extracted content from a PDF.
#[derive(Debug, Clone)]
pub struct PdfContent {
    /// Type of PDF content.
    pub pdf_type: PdfType,
    /// Pages in document order.
    pub pages: Vec<PdfPage>,
}

impl PdfContent {
    /// Pages whose text layer is too short to be used.
    pub fn pages_needing_ocr(&self) -> impl Iterator<Item = &PdfPage> {
        self.pages.iter().filter(|p| !p.has_text)
    }
}

/// Content from a single PDF page.
#[derive(Debug, Clone)]
pub struct PdfPage {
    /// Page number (1-indexed).
    pub number: u32,
    /// Text layer of this page.
    pub text: String,
    /// Whether the text layer reached the minimum length.
    pub has_text: bool,
    /// Images of this page. Only collected for pages without text.
    pub images: Vec<DynamicImage>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("no document loaded".to_string()))
    }

    /// Split the loaded PDF into pages, collecting images for pages whose
    /// trimmed text is shorter than `min_text_length`.
    pub fn content(&self, min_text_length: usize) -> Result<PdfContent> {
        let page_count = self.page_count();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        // Scanned invoices often have no usable fonts; OCR still gets a go.
        let mut texts = self.page_texts().unwrap_or_else(|e| {
            warn!("Text layer unreadable, treating every page as image: {}", e);
            Vec::new()
        });
        texts.resize(page_count as usize, String::new());

        let mut pages = Vec::with_capacity(texts.len());
        for (number, text) in (1..=page_count).zip(texts) {
            let has_text = text.trim().chars().count() >= min_text_length.max(1);
            let images = if has_text {
                Vec::new()
            } else {
                self.extract_images(number).unwrap_or_default()
            };
            pages.push(PdfPage {
                number,
                text,
                has_text,
                images,
            });
        }

        let with_text = pages.iter().filter(|p| p.has_text).count();
        let with_images = pages.iter().filter(|p| !p.images.is_empty()).count();
        let pdf_type = match (with_text, with_images) {
            (t, _) if t == pages.len() => PdfType::Text,
            (0, 0) => PdfType::Empty,
            (0, _) => PdfType::Image,
            _ => PdfType::Hybrid,
        };

        debug!(
            "PDF analysis: {} pages, {} with text, {} with images -> {:?}",
            page_count, with_text, with_images, pdf_type
        );

        Ok(PdfContent { pdf_type, pages })
    }

    fn image_from_object(&self, doc: &Document, obj: &Object) -> Option<DynamicImage> {
        let Object::Stream(stream) = obj else {
            return None;
        };
        let dict = &stream.dict;

        if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
            return None;
        }

        let width = u32::try_from(dict.get(b"Width").ok()?.as_i64().ok()?).ok()?;
        let height = u32::try_from(dict.get(b"Height").ok()?.as_i64().ok()?).ok()?;
        trace!("Found image object: {}x{}", width, height);

        let filter = dict.get(b"Filter").ok().and_then(|f| match f {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) => arr.last().and_then(|o| o.as_name().ok()),
            _ => None,
        });

        match filter {
            Some(b"DCTDecode") => {
                return image::load_from_memory_with_format(
                    &stream.content,
                    image::ImageFormat::Jpeg,
                )
                .ok();
            }
            Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                trace!("Unsupported image filter {:?}", filter.map(String::from_utf8_lossy));
                return None;
            }
            _ => {}
        }

        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());

        let color_space = dict
            .get(b"ColorSpace")
            .ok()
            .and_then(|o| match o {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
                Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
                _ => None,
            })
            .unwrap_or(b"DeviceRGB");

        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8);
        if bits != 8 {
            trace!("Unsupported bits per component: {}", bits);
            return None;
        }

        raw_image(data, width, height, color_space)
    }

    /// Resources of a page, walking up the page tree for inherited ones.
    fn page_resources(&self, doc: &Document, node_id: ObjectId) -> Option<Dictionary> {
        let Object::Dictionary(dict) = doc.get_object(node_id).ok()? else {
            return None;
        };

        if let Ok(resources) = dict.get(b"Resources") {
            if let Ok((_, Object::Dictionary(res))) = doc.dereference(resources) {
                return Some(res.clone());
            }
        }

        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => self.page_resources(doc, *parent_id),
            _ => None,
        }
    }
}

fn raw_image(mut data: Vec<u8>, width: u32, height: u32, color_space: &[u8]) -> Option<DynamicImage> {
    let pixels = (width as usize).checked_mul(height as usize)?;
    match color_space {
        b"DeviceRGB" | b"RGB" => {
            data.truncate(pixels.checked_mul(3)?);
            RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8)
        }
        b"DeviceGray" | b"G" => {
            data.truncate(pixels);
            GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8)
        }
        other => {
            trace!("Unsupported color space {:?}", String::from_utf8_lossy(other));
            None
        }
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Utility bills are often "encrypted" with an empty user password
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn page_texts(&self) -> Result<Vec<String>> {
        self.document()?;
        pdf_extract::extract_text_from_mem_by_pages(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    fn extract_images(&self, page: u32) -> Result<Vec<DynamicImage>> {
        let doc = self.document()?;
        let pages = doc.get_pages();
        let page_id = pages.get(&page).ok_or(PdfError::InvalidPage(page))?;

        let mut images = Vec::new();
        if let Some(resources) = self.page_resources(doc, *page_id) {
            if let Ok(xobjects) = resources.get(b"XObject") {
                if let Ok((_, Object::Dictionary(xobj_dict))) = doc.dereference(xobjects) {
                    for (_name, obj_ref) in xobj_dict.iter() {
                        if let Ok((_, obj)) = doc.dereference(obj_ref) {
                            images.extend(self.image_from_object(doc, obj));
                        }
                    }
                }
            }
        }

        debug!("Extracted {} images from page {}", images.len(), page);
        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::scanned_pdf;

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
        assert!(extractor.page_texts().is_err());
    }

    #[test]
    fn test_load_garbage_fails() {
        let mut extractor = PdfExtractor::new();
        let err = extractor.load(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, PdfError::Parse(_)));
    }

    #[test]
    fn test_inherited_image_resources() {
        let mut extractor = PdfExtractor::new();
        extractor.load(&scanned_pdf()).unwrap();
        assert_eq!(extractor.page_count(), 1);

        let images = extractor.extract_images(1).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!((images[0].width(), images[0].height()), (2, 2));

        assert!(matches!(extractor.extract_images(2), Err(PdfError::InvalidPage(2))));
    }

    #[test]
    fn test_scanned_page_needs_ocr() {
        let mut extractor = PdfExtractor::new();
        extractor.load(&scanned_pdf()).unwrap();

        let content = extractor.content(1).unwrap();
        assert_eq!(content.pdf_type, PdfType::Image);
        let pending: Vec<u32> = content.pages_needing_ocr().map(|p| p.number).collect();
        assert_eq!(pending, vec![1]);
        assert_eq!(content.pages[0].images.len(), 1);
    }

    #[test]
    fn test_raw_image_rejects_short_data() {
        assert!(raw_image(vec![0; 3], 2, 2, b"DeviceGray").is_none());
        assert!(raw_image(vec![0; 12], 2, 2, b"DeviceRGB").is_some());
        assert!(raw_image(vec![0; 16], 2, 2, b"DeviceCMYK").is_none());
    }
}
