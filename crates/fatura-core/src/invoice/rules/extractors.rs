//! Concrete field extractors.

use regex::{Captures, Regex};

use super::patterns::{CNPJ, CPF, NON_COMPENSATED, NON_COMPENSATED_PRICE};
use super::{ExtractionMatch, FieldExtractor};
use crate::models::fields::Field;

type Cleaner = fn(&str) -> String;

fn matched(
    caps: &Captures<'_>,
    values: Vec<Option<String>>,
) -> Option<ExtractionMatch<Vec<Option<String>>>> {
    let full_match = caps.get(0)?;
    Some(
        ExtractionMatch::new(values, full_match.as_str())
            .with_position(full_match.start(), full_match.end()),
    )
}

/// Extractor mapping the capture groups of one pattern to fields.
///
/// Group `n` fills the `n`-th field.
pub struct CaptureRule {
    fields: &'static [Field],
    pattern: &'static Regex,
    cleaner: Cleaner,
}

impl CaptureRule {
    pub fn new(fields: &'static [Field], pattern: &'static Regex) -> Self {
        Self {
            fields,
            pattern,
            cleaner: str::to_string,
        }
    }

    /// Post-process every captured value.
    pub fn with_cleaner(mut self, cleaner: Cleaner) -> Self {
        self.cleaner = cleaner;
        self
    }
}

impl FieldExtractor for CaptureRule {
    fn fields(&self) -> &'static [Field] {
        self.fields
    }

    fn extract(&self, text: &str) -> Option<ExtractionMatch<Vec<Option<String>>>> {
        let caps = self.pattern.captures(text)?;
        let values = (1..=self.fields.len())
            .map(|i| caps.get(i).map(|m| (self.cleaner)(m.as_str())))
            .collect();
        matched(&caps, values)
    }
}

/// CPF/CNPJ extractor: person identifiers are tried before company ones.
pub struct TaxIdRule {
    patterns: [&'static Regex; 2],
}

impl TaxIdRule {
    pub fn new() -> Self {
        Self {
            patterns: [&CPF, &CNPJ],
        }
    }
}

impl Default for TaxIdRule {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for TaxIdRule {
    fn fields(&self) -> &'static [Field] {
        &[Field::TaxId]
    }

    fn extract(&self, text: &str) -> Option<ExtractionMatch<Vec<Option<String>>>> {
        self.patterns.iter().find_map(|pattern| {
            let caps = pattern.captures(text)?;
            matched(&caps, vec![Some(caps[1].to_string())])
        })
    }
}

/// Non-compensated consumption and its unit price.
///
/// The price is looked up only once the consumption label has matched, so
/// a missing label yields the fallbacks for both fields while a missing
/// price alone stays null.
pub struct NonCompensatedRule;

impl NonCompensatedRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NonCompensatedRule {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for NonCompensatedRule {
    fn fields(&self) -> &'static [Field] {
        &[Field::NonCompensatedConsumption, Field::NonCompensatedPrice]
    }

    fn extract(&self, text: &str) -> Option<ExtractionMatch<Vec<Option<String>>>> {
        let caps = NON_COMPENSATED.captures(text)?;
        let price = NON_COMPENSATED_PRICE
            .captures(text)
            .map(|price_caps| price_caps[1].to_string());
        matched(&caps, vec![Some(caps[1].to_string()), price])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::rules::patterns::{READINGS, SCEE_CONSUMPTION, WIRE_B};
    use pretty_assertions::assert_eq;

    fn values(m: Option<ExtractionMatch<Vec<Option<String>>>>) -> Vec<Option<String>> {
        m.expect("rule should match").value
    }

    #[test]
    fn test_tax_id_person() {
        let rule = TaxIdRule::new();
        let text = "CNPJ/CPF: 123.456.789-09\n";
        assert_eq!(values(rule.extract(text)), vec![Some("123.456.789-09".to_string())]);
    }

    #[test]
    fn test_tax_id_company() {
        let rule = TaxIdRule::new();
        let text = "CNPJ/CPF: 12.345.678/0001-90\n";
        assert_eq!(values(rule.extract(text)), vec![Some("12.345.678/0001-90".to_string())]);
    }

    #[test]
    fn test_tax_id_person_wins_over_company() {
        let rule = TaxIdRule::new();
        let text = "CNPJ/CPF: 12.345.678/0001-90\nCNPJ/CPF: 123.456.789-09\n";
        assert_eq!(values(rule.extract(text)), vec![Some("123.456.789-09".to_string())]);
    }

    #[test]
    fn test_tax_id_missing() {
        assert!(TaxIdRule::new().extract("CPF 123").is_none());
    }

    #[test]
    fn test_capture_rule_groups() {
        let rule = CaptureRule::new(
            &[Field::CompensatedConsumption, Field::CompensatedEnergyPrice],
            &SCEE_CONSUMPTION,
        );
        let m = rule.extract("CONSUMO SCEE KWH 300,00 0,812345 243,70").unwrap();
        assert_eq!(
            m.value,
            vec![Some("300,00".to_string()), Some("0,812345".to_string())]
        );
        assert_eq!(m.position, Some((0, 32)));
    }

    #[test]
    fn test_wire_b_takes_third_number() {
        let rule = CaptureRule::new(&[Field::WireBPrice], &WIRE_B);
        let text = "PARC INJET S/DESC KWH 280,00 0,512345 0,123456";
        assert_eq!(values(rule.extract(text)), vec![Some("0,123456".to_string())]);
    }

    #[test]
    fn test_readings() {
        let rule = CaptureRule::new(
            &[Field::PreviousReading, Field::CurrentReading, Field::ReadingDays],
            &READINGS,
        );
        assert_eq!(
            values(rule.extract("LEITURAS 10/01/2025 09/02/2025 30\n")),
            vec![
                Some("10/01/2025".to_string()),
                Some("09/02/2025".to_string()),
                Some("30".to_string())
            ]
        );
    }

    #[test]
    fn test_non_compensated_with_price() {
        let rule = NonCompensatedRule::new();
        let text = "CONSUMO NÃO COMPENSADO KWH 50,00 0,912345 45,62";
        assert_eq!(
            values(rule.extract(text)),
            vec![Some("50,00".to_string()), Some("0,912345".to_string())]
        );
    }

    #[test]
    fn test_non_compensated_without_price() {
        let rule = NonCompensatedRule::new();
        let text = "CONSUMO NÃO COMPENSADO KWH 50,00";
        assert_eq!(values(rule.extract(text)), vec![Some("50,00".to_string()), None]);
    }

    #[test]
    fn test_non_compensated_missing_label() {
        assert!(NonCompensatedRule::new().extract("CONSUMO SCEE 1,00 2,00").is_none());
    }
}
