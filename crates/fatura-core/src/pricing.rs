//! Discount calculation over extracted invoice figures.
//!
//! All arithmetic is done in [`Decimal`] and rounded to cents with
//! midpoint-away-from-zero (`223.125` becomes `223.13`).

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::fields::{ExtractedFields, Field};

/// Parameters of one pricing run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingParams {
    /// Captive-market price per kWh.
    pub price_kwh: f64,
    /// Discount percentage (0 - 100).
    pub discount_percent: f64,
}

impl PricingParams {
    pub fn new(price_kwh: f64, discount_percent: f64) -> Self {
        Self {
            price_kwh,
            discount_percent,
        }
    }

    /// Check the parameters are usable.
    pub fn validate(&self) -> Result<(), CalculationError> {
        if !self.price_kwh.is_finite() || self.price_kwh <= 0.0 {
            return Err(CalculationError::InvalidPrice(self.price_kwh));
        }
        if !self.discount_percent.is_finite() || !(0.0..=100.0).contains(&self.discount_percent) {
            return Err(CalculationError::InvalidDiscount(self.discount_percent));
        }
        Ok(())
    }
}

impl Default for PricingParams {
    fn default() -> Self {
        Self::new(0.85, 25.0)
    }
}

/// Reasons a calculation could not complete.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalculationError {
    #[error("price per kWh must be a positive number, got {0}")]
    InvalidPrice(f64),

    #[error("discount must be between 0 and 100, got {0}")]
    InvalidDiscount(f64),

    #[error("{0} is not representable as a decimal")]
    Unrepresentable(f64),

    #[error("arithmetic overflow while computing {0}")]
    Overflow(&'static str),
}

/// Derived monetary figures.
///
/// Figures stay `None` when the calculation stopped before reaching them;
/// the reason is then in `calculation_error`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    #[serde(with = "rust_decimal::serde::float_option")]
    pub valor_sem_desconto: Option<Decimal>,

    #[serde(with = "rust_decimal::serde::float_option")]
    pub valor_com_desconto: Option<Decimal>,

    #[serde(with = "rust_decimal::serde::float_option")]
    pub economia: Option<Decimal>,

    #[serde(with = "rust_decimal::serde::float_option")]
    pub lucro: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculation_error: Option<String>,
}

impl CalculationResult {
    fn failed(mut self, err: CalculationError) -> Self {
        warn!("Calculation stopped: {}", err);
        self.calculation_error = Some(err.to_string());
        self
    }
}

fn decimal(value: f64) -> Result<Decimal, CalculationError> {
    Decimal::from_str(&value.to_string()).map_err(|_| CalculationError::Unrepresentable(value))
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn add(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal, CalculationError> {
    a.checked_add(b).ok_or(CalculationError::Overflow(what))
}

fn sub(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal, CalculationError> {
    a.checked_sub(b).ok_or(CalculationError::Overflow(what))
}

fn mul(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal, CalculationError> {
    a.checked_mul(b).ok_or(CalculationError::Overflow(what))
}

/// Compute discounted and undiscounted totals for one invoice.
///
/// Never fails: problems are reported in
/// [`CalculationResult::calculation_error`] next to whatever figures were
/// computed before the problem occurred.
pub fn calculate(fields: &ExtractedFields, params: &PricingParams) -> CalculationResult {
    let mut result = CalculationResult::default();
    if let Err(e) = params.validate() {
        return result.failed(e);
    }

    let inputs = (|| {
        Ok::<_, CalculationError>((
            decimal(fields.amount(Field::CompensatedConsumption))?,
            decimal(fields.amount(Field::NonCompensatedConsumption))?,
            decimal(fields.amount(Field::PublicLightingContribution))?,
            decimal(fields.amount(Field::TotalAmount))?,
            decimal(params.price_kwh)?,
            decimal(params.discount_percent)?,
        ))
    })();
    let (scee, non_compensated, contribution, billed_total, price, discount) = match inputs {
        Ok(values) => values,
        Err(e) => return result.failed(e),
    };

    let energy = match add(scee, non_compensated, "energy")
        .and_then(|kwh| mul(kwh, price, "energy"))
    {
        Ok(v) => v,
        Err(e) => return result.failed(e),
    };

    let without_discount = match add(energy, contribution, "valorSemDesconto") {
        Ok(v) => round2(v),
        Err(e) => return result.failed(e),
    };
    result.valor_sem_desconto = Some(without_discount);

    let factor = Decimal::ONE - discount / Decimal::ONE_HUNDRED;
    let with_discount = match mul(energy, factor, "valorComDesconto")
        .and_then(|v| add(v, contribution, "valorComDesconto"))
    {
        Ok(v) => round2(v),
        Err(e) => return result.failed(e),
    };
    result.valor_com_desconto = Some(with_discount);

    match sub(without_discount, with_discount, "economia") {
        Ok(v) => result.economia = Some(round2(v)),
        Err(e) => return result.failed(e),
    }

    match sub(with_discount, billed_total, "lucro") {
        Ok(v) => result.lucro = Some(round2(v)),
        Err(e) => return result.failed(e),
    }

    debug!(
        "Calculated sem desconto={} com desconto={} economia={:?}",
        without_discount, with_discount, result.economia
    );

    result
}
