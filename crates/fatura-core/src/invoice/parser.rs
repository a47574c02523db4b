//! Rule-chain invoice parser.

use std::time::Instant;

use tracing::{debug, trace};

use crate::models::fields::{ExtractedFields, Field};

use super::rules::{default_rules, BoxedExtractor};

/// Result of invoice extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Every schema field, matched or not.
    pub fields: ExtractedFields,
    /// Fields whose rule did not match, in schema order.
    pub errors: Vec<Field>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ExtractionResult {
    /// Keys of the fields that failed, as reported in `extractionErrors`.
    pub fn error_keys(&self) -> Vec<String> {
        self.errors.iter().map(|f| f.key().to_string()).collect()
    }
}

/// Trait for invoice parsing.
pub trait InvoiceParser {
    /// Parse invoice fields from text. Never fails: unmatched fields are
    /// reported in [`ExtractionResult::errors`].
    fn parse(&self, text: &str) -> ExtractionResult;
}

/// Parser applying an ordered chain of independent field extractors.
pub struct RuleBasedParser {
    rules: Vec<BoxedExtractor>,
}

impl RuleBasedParser {
    /// Create a parser with the standard rule chain.
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

impl Default for RuleBasedParser {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceParser for RuleBasedParser {
    fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();
        let mut fields = ExtractedFields::empty();
        let mut errors = Vec::new();

        for rule in &self.rules {
            let targets = rule.fields();
            match rule.extract(text) {
                Some(found) => {
                    trace!("Matched {:?} at {:?}: {:?}", targets, found.position, found.source);
                    for (field, value) in targets.iter().zip(found.value) {
                        if value.is_none() {
                            errors.push(*field);
                        }
                        fields.set(*field, value);
                    }
                }
                None => {
                    for field in targets {
                        fields.set(*field, field.fallback().map(str::to_string));
                        errors.push(*field);
                    }
                }
            }
        }

        errors.sort();
        errors.dedup();

        debug!(
            "Extracted {} of {} fields",
            Field::ALL.len() - errors.len(),
            Field::ALL.len()
        );

        ExtractionResult {
            fields,
            errors,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}
