//! Rule-based field extractors for Brazilian electricity invoices.

pub mod amounts;
pub mod extractors;
pub mod months;
pub mod patterns;

pub use amounts::{format_br, format_br_value, parse_br_amount, AmountSource};
pub use extractors::{CaptureRule, NonCompensatedRule, TaxIdRule};
pub use months::normalize_month_reference;

use crate::models::fields::Field;

/// Trait for field extractors.
///
/// One extractor fills one or more schema fields from a single match, so
/// fields captured by the same label stay consistent with each other.
pub trait FieldExtractor {
    /// Fields this extractor fills, in capture order.
    fn fields(&self) -> &'static [Field];

    /// Extract the fields from text.
    ///
    /// Returns `None` when the anchor label is not found. A returned match
    /// holds one value per entry of [`FieldExtractor::fields`]; an inner
    /// `None` means the anchor matched but that value did not.
    fn extract(&self, text: &str) -> Option<ExtractionMatch<Vec<Option<String>>>>;
}

/// A matched value with its location in the source text.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

/// A boxed extractor usable from any thread.
pub type BoxedExtractor = Box<dyn FieldExtractor + Send + Sync>;

/// The full rule chain, in schema order.
pub fn default_rules() -> Vec<BoxedExtractor> {
    use patterns::*;
    use Field::*;

    vec![
        Box::new(TaxIdRule::new()),
        Box::new(CaptureRule::new(&[ConsumptionKwh], &CONSUMPTION_KWH)),
        Box::new(CaptureRule::new(&[TotalAmount], &TOTAL_DUE)),
        Box::new(CaptureRule::new(&[BalanceKwh], &BALANCE_KWH).with_cleaner(trim_trailing_commas)),
        Box::new(CaptureRule::new(&[CustomerName], &CUSTOMER_NAME)),
        Box::new(CaptureRule::new(&[Address], &ADDRESS).with_cleaner(join_lines)),
        Box::new(CaptureRule::new(&[ConsumerUnit], &CONSUMER_UNIT)),
        Box::new(CaptureRule::new(
            &[PreviousReading, CurrentReading, ReadingDays],
            &READINGS,
        )),
        Box::new(CaptureRule::new(&[ReferenceMonth, DueDate], &REFERENCE_AND_DUE)),
        Box::new(CaptureRule::new(&[PublicLightingContribution], &PUBLIC_LIGHTING)),
        Box::new(CaptureRule::new(&[InjectedEnergy, InjectedEnergyPrice], &SCEE_INJECTION)),
        Box::new(CaptureRule::new(
            &[CompensatedConsumption, CompensatedEnergyPrice],
            &SCEE_CONSUMPTION,
        )),
        Box::new(CaptureRule::new(&[WireBPrice], &WIRE_B)),
        Box::new(NonCompensatedRule::new()),
        Box::new(CaptureRule::new(&[FlagTariffPrice], &FLAG_TARIFF)),
        Box::new(
            CaptureRule::new(
                &[GenerationCycle, GeneratingUnit, LastCycleGeneration],
                &GENERATION_CYCLE,
            )
            .with_cleaner(trim_trailing_commas),
        ),
    ]
}

fn trim_trailing_commas(s: &str) -> String {
    s.trim().trim_end_matches(',').to_string()
}

fn join_lines(s: &str) -> String {
    s.replace('\n', " ")
}
