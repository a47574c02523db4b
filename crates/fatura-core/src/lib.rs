//! Core library for Brazilian electricity invoice processing.
//!
//! This crate provides:
//! - PDF text acquisition (text layer, with OCR for scanned pages)
//! - Rule-based extraction of invoice fields (CPF/CNPJ, readings, SCEE lines)
//! - Brazilian/US amount normalization and formatting
//! - Discount pricing with exact decimal arithmetic
//! - Templated PDF reports (invoice, client summary, plant report)

pub mod error;
pub mod invoice;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod pricing;
pub mod render;

#[cfg(test)]
mod fixtures;

pub use error::{FaturaError, OcrError, PdfError, RenderError, Result};
pub use invoice::rules::{format_br, normalize_month_reference, parse_br_amount, AmountSource};
pub use invoice::{ExtractionResult, InvoiceParser, RuleBasedParser};
pub use models::{ErrorRecord, ExtractedFields, FaturaConfig, Field, InvoiceReport};
pub use ocr::{OcrEngine, OcrResult, TextBox};
#[cfg(feature = "ocr")]
pub use ocr::PureOcrEngine;
pub use pdf::{PdfExtractor, PdfProcessor, PdfType};
pub use pipeline::{suggest_price_kwh, InvoiceProcessor};
pub use pricing::{calculate, CalculationResult, PricingParams};
pub use render::{ReportKind, ReportRenderer};
