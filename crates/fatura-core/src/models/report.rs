//! Output records written for every processed invoice.

use serde::Serialize;

use crate::invoice::ExtractionResult;
use crate::models::fields::ExtractedFields;
use crate::pricing::{CalculationResult, PricingParams};

/// Extraction and calculation results for one invoice.
///
/// Serializes to a single flat JSON object: the path and error list, every
/// schema field, the calculated figures, then the parameters used.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceReport {
    pub pdf_path: String,
    pub extraction_errors: Vec<String>,
    #[serde(flatten)]
    pub fields: ExtractedFields,
    #[serde(flatten)]
    pub calculation: CalculationResult,
    pub success: bool,
    pub preco_kwh_usado: f64,
    pub desconto_usado: f64,
}

impl InvoiceReport {
    pub fn new(
        pdf_path: impl Into<String>,
        extraction: ExtractionResult,
        calculation: CalculationResult,
        params: &PricingParams,
    ) -> Self {
        Self {
            pdf_path: pdf_path.into(),
            extraction_errors: extraction.error_keys(),
            fields: extraction.fields,
            calculation,
            success: true,
            preco_kwh_usado: params.price_kwh,
            desconto_usado: params.discount_percent,
        }
    }
}

/// Record emitted when an invoice could not be processed at all.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_path: Option<String>,
    pub success: bool,
    pub error: String,
}

impl ErrorRecord {
    pub fn new(error: impl ToString) -> Self {
        Self {
            pdf_path: None,
            success: false,
            error: error.to_string(),
        }
    }

    pub fn for_path(pdf_path: impl Into<String>, error: impl ToString) -> Self {
        Self {
            pdf_path: Some(pdf_path.into()),
            ..Self::new(error)
        }
    }
}
