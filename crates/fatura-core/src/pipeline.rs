//! End-to-end invoice processing: PDF -> text -> fields -> figures.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{FaturaError, Result};
use crate::invoice::{InvoiceParser, RuleBasedParser};
use crate::models::config::PdfConfig;
use crate::models::fields::Field;
use crate::models::report::InvoiceReport;
use crate::ocr::OcrEngine;
use crate::pdf::{PdfExtractor, PdfProcessor};
use crate::pricing::{calculate, PricingParams};

/// Processes invoice PDFs one at a time.
pub struct InvoiceProcessor {
    parser: Box<dyn InvoiceParser>,
    ocr: Option<Box<dyn OcrEngine>>,
    pdf: PdfConfig,
}

impl InvoiceProcessor {
    /// Create a processor without OCR.
    pub fn new(pdf: PdfConfig) -> Self {
        Self {
            parser: Box::new(RuleBasedParser::new()),
            ocr: None,
            pdf,
        }
    }

    /// Use an OCR engine for pages without a text layer.
    pub fn with_ocr(mut self, engine: Box<dyn OcrEngine>) -> Self {
        self.ocr = Some(engine);
        self
    }

    /// Whether an OCR engine is configured and enabled.
    pub fn has_ocr(&self) -> bool {
        self.ocr.is_some() && self.pdf.ocr_fallback
    }

    /// Read the text of a PDF, page by page, running OCR on the images of
    /// pages that carry no text layer.
    pub fn read_text(&self, data: &[u8]) -> Result<String> {
        let mut extractor = PdfExtractor::new();
        extractor.load(data)?;
        let content = extractor.content(self.pdf.min_text_length)?;
        debug!("PDF type: {:?}", content.pdf_type);

        let pending = content.pages_needing_ocr().count();
        if pending > 0 {
            info!("{} of {} pages have no text layer", pending, content.pages.len());
        }

        let mut page_texts = Vec::with_capacity(content.pages.len());
        for page in &content.pages {
            if page.has_text {
                page_texts.push(page.text.clone());
                continue;
            }

            match self.ocr.as_ref().filter(|_| self.pdf.ocr_fallback) {
                Some(engine) if !page.images.is_empty() => {
                    info!("Running OCR on page {} ({} images)", page.number, page.images.len());
                    let mut texts = Vec::with_capacity(page.images.len());
                    for image in &page.images {
                        texts.push(engine.extract_text(image)?);
                    }
                    page_texts.push(texts.join("\n"));
                }
                Some(_) => {
                    warn!("Page {} has neither text nor images", page.number);
                    page_texts.push(page.text.clone());
                }
                None => {
                    warn!("Page {} has no text layer and OCR is unavailable", page.number);
                    page_texts.push(page.text.clone());
                }
            }
        }

        let text = page_texts.join("\n");
        if text.trim().is_empty() {
            return Err(FaturaError::NoText);
        }
        Ok(text)
    }

    /// Extract and price an invoice from its text.
    pub fn process_text(&self, text: &str, pdf_path: &str, params: &PricingParams) -> InvoiceReport {
        let extraction = self.parser.parse(text);
        if !extraction.errors.is_empty() {
            debug!("Unmatched fields: {:?}", extraction.error_keys());
        }
        let calculation = calculate(&extraction.fields, params);
        InvoiceReport::new(pdf_path, extraction, calculation, params)
    }

    /// Read, extract and price one invoice PDF.
    pub fn process_file(&self, path: &Path, params: &PricingParams) -> Result<InvoiceReport> {
        info!("Processing {}", path.display());
        let data = std::fs::read(path)?;
        let text = self.read_text(&data)?;
        debug!("Read {} characters of text", text.len());
        Ok(self.process_text(&text, &path.display().to_string(), params))
    }
}

impl Default for InvoiceProcessor {
    fn default() -> Self {
        Self::new(PdfConfig::default())
    }
}

/// Highest non-compensated kWh price seen in a batch.
///
/// Used as the suggested captive-market price for the next run.
pub fn suggest_price_kwh<'a>(reports: impl IntoIterator<Item = &'a InvoiceReport>) -> Option<f64> {
    reports
        .into_iter()
        .map(|r| r.fields.amount(Field::NonCompensatedPrice))
        .filter(|price| *price > 0.0)
        .max_by(f64::total_cmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OcrError;
    use crate::fixtures::{scanned_pdf, SAMPLE_INVOICE};
    use crate::ocr::{OcrResult, TextBox};
    use crate::render::{LopdfComposer, PdfComposer};
    use image::DynamicImage;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_process_sample_invoice() {
        let report = InvoiceProcessor::default().process_text(
            SAMPLE_INVOICE,
            "fatura.pdf",
            &PricingParams::new(0.85, 25.0),
        );

        assert!(report.extraction_errors.is_empty());
        assert_eq!(report.calculation.valor_sem_desconto, Decimal::from_str("327.50").ok());
        assert_eq!(report.calculation.valor_com_desconto, Decimal::from_str("253.13").ok());
        assert_eq!(report.calculation.economia, Decimal::from_str("74.37").ok());
        assert_eq!(report.calculation.lucro, Decimal::from_str("-74.71").ok());
    }

    #[test]
    fn test_same_text_same_json() {
        let processor = InvoiceProcessor::default();
        let params = PricingParams::default();
        let render = || {
            let report = processor.process_text(SAMPLE_INVOICE, "a.pdf", &params);
            serde_json::to_string(&report).unwrap()
        };
        assert_eq!(render(), render());
    }

    #[test]
    fn test_read_text_from_composed_pdf() {
        let pdf = LopdfComposer::default().compose(SAMPLE_INVOICE).unwrap();
        let text = InvoiceProcessor::default().read_text(&pdf).unwrap();

        assert!(text.contains("CNPJ/CPF: 123.456.789-09"));
        assert!(text.contains("CONSUMO SCEE KWH 300,00 0,812345 243,70"));

        let report = InvoiceProcessor::default().process_text(&text, "x.pdf", &PricingParams::default());
        assert_eq!(report.fields.get(Field::TaxId), Some("123.456.789-09"));
        assert_eq!(report.fields.get(Field::CompensatedConsumption), Some("300,00"));
    }

    #[test]
    fn test_read_text_rejects_garbage() {
        let err = InvoiceProcessor::default().read_text(b"%PDF-broken").unwrap_err();
        assert!(matches!(err, FaturaError::Pdf(_)));
    }

    #[test]
    fn test_blank_pdf_without_ocr_has_no_text() {
        let pdf = LopdfComposer::default().compose("").unwrap();
        let err = InvoiceProcessor::default().read_text(&pdf).unwrap_err();
        assert!(matches!(err, FaturaError::NoText));
    }

    struct FailingOcr;

    impl OcrEngine for FailingOcr {
        fn recognize(&self, _image: &DynamicImage) -> std::result::Result<OcrResult, OcrError> {
            Err(OcrError::Recognition("model unavailable".to_string()))
        }
    }

    #[test]
    fn test_ocr_not_needed_for_text_pdf() {
        let pdf = LopdfComposer::default().compose(SAMPLE_INVOICE).unwrap();
        let processor = InvoiceProcessor::default().with_ocr(Box::new(FailingOcr));
        assert!(processor.has_ocr());
        assert!(processor.read_text(&pdf).is_ok());
    }

    struct FixedOcr(&'static str);

    impl OcrEngine for FixedOcr {
        fn recognize(&self, image: &DynamicImage) -> std::result::Result<OcrResult, OcrError> {
            let text_box = TextBox {
                bbox: [0.0, 0.0, 100.0, 0.0, 100.0, 10.0, 0.0, 10.0],
                text: self.0.to_string(),
                confidence: 0.95,
            };
            Ok(OcrResult::from_boxes(vec![text_box], (image.width(), image.height()), 1))
        }
    }

    #[test]
    fn test_scanned_page_goes_through_ocr() {
        let processor = InvoiceProcessor::default()
            .with_ocr(Box::new(FixedOcr("CONSUMO SCEE KWH 300,00 0,812345 243,70")));
        let text = processor.read_text(&scanned_pdf()).unwrap();
        assert_eq!(text, "CONSUMO SCEE KWH 300,00 0,812345 243,70");

        let report = processor.process_text(&text, "scan.pdf", &PricingParams::default());
        assert_eq!(report.fields.get(Field::CompensatedConsumption), Some("300,00"));
        assert_eq!(report.fields.get(Field::CompensatedEnergyPrice), Some("0,812345"));
    }

    #[test]
    fn test_ocr_failure_is_fatal() {
        let processor = InvoiceProcessor::default().with_ocr(Box::new(FailingOcr));
        let err = processor.read_text(&scanned_pdf()).unwrap_err();
        assert!(matches!(err, FaturaError::Ocr(_)));
    }

    #[test]
    fn test_scanned_page_without_ocr_has_no_text() {
        let err = InvoiceProcessor::default().read_text(&scanned_pdf()).unwrap_err();
        assert!(matches!(err, FaturaError::NoText));
    }

    #[test]
    fn test_suggest_price_kwh() {
        let processor = InvoiceProcessor::default();
        let params = PricingParams::default();
        let reports = vec![
            processor.process_text(SAMPLE_INVOICE, "a.pdf", &params),
            processor.process_text(
                "CONSUMO NÃO COMPENSADO KWH 10,00 1,050000 10,50\n",
                "b.pdf",
                &params,
            ),
            processor.process_text("", "c.pdf", &params),
        ];

        assert_eq!(suggest_price_kwh(&reports), Some(1.05));
        assert_eq!(suggest_price_kwh(&reports[2..]), None);
    }
}
