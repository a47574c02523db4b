//! Error types for the fatura-core library.

use thiserror::Error;

/// Main error type for the fatura library.
#[derive(Error, Debug)]
pub enum FaturaError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Report rendering error.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Neither the text layer nor OCR produced any text.
    #[error("could not extract any text from the PDF")]
    NoText,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),
}

/// Errors related to report rendering.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The report payload is not a JSON object.
    #[error("report data must be a JSON object")]
    InvalidPayload,

    /// Unknown report template.
    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    /// Reading a template override failed.
    #[error("failed to read template {path}: {source}")]
    TemplateRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Composing the PDF document failed.
    #[error("failed to compose PDF: {0}")]
    Compose(String),

    /// Writing the output file failed.
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for the fatura library.
pub type Result<T> = std::result::Result<T, FaturaError>;
