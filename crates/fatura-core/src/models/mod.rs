//! Data models for invoice extraction, pricing and configuration.

pub mod config;
pub mod fields;
pub mod report;

pub use config::FaturaConfig;
pub use fields::{ExtractedFields, Field};
pub use report::{ErrorRecord, InvoiceReport};
