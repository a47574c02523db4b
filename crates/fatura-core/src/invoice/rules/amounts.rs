//! Amount normalization and formatting for Brazilian invoices.
//!
//! Invoice text mixes Brazilian formatting (`1.234,56`) with US-style OCR
//! output (`1,234.56`). Parsing resolves the ambiguity from separator
//! positions alone and never fails: anything it cannot read becomes `0.0`.

use serde_json::Value;

/// Something that can be read as a monetary or energy amount.
pub trait AmountSource {
    /// Convert to a finite `f64`, falling back to `0.0`.
    fn to_amount(&self) -> f64;
}

impl AmountSource for str {
    fn to_amount(&self) -> f64 {
        parse_br_amount(self)
    }
}

impl AmountSource for String {
    fn to_amount(&self) -> f64 {
        parse_br_amount(self)
    }
}

impl AmountSource for f64 {
    fn to_amount(&self) -> f64 {
        if self.is_finite() { *self } else { 0.0 }
    }
}

impl<T: AmountSource> AmountSource for Option<T> {
    fn to_amount(&self) -> f64 {
        self.as_ref().map_or(0.0, AmountSource::to_amount)
    }
}

impl<T: AmountSource + ?Sized> AmountSource for &T {
    fn to_amount(&self) -> f64 {
        (**self).to_amount()
    }
}

impl AmountSource for Value {
    fn to_amount(&self) -> f64 {
        match self {
            Value::Number(n) => n.as_f64().to_amount(),
            Value::String(s) => parse_br_amount(s),
            _ => 0.0,
        }
    }
}

/// Parse an amount whose thousands/decimal separators may be either
/// Brazilian or US style.
///
/// With both separators present the later one is the decimal mark. A single
/// comma is decimal, while several commas (`1,234,567`) are all thousands
/// separators, like several dots. Unparseable input gives `0.0`.
pub fn parse_br_amount(s: &str) -> f64 {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();

    if cleaned.is_empty() {
        return 0.0;
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        // The separator that comes last is the decimal one.
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => {
            if cleaned.matches(',').count() > 1 {
                cleaned.replace(',', "")
            } else {
                cleaned.replace(',', ".")
            }
        }
        (None, Some(d)) => {
            let dots = cleaned.matches('.').count();
            if dots > 1 || cleaned.len() - d - 1 == 3 {
                cleaned.replace('.', "")
            } else {
                cleaned
            }
        }
        (None, None) => cleaned,
    };

    match normalized.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Format an amount Brazilian style: `1.234,56`.
pub fn format_br(amount: f64) -> String {
    if !amount.is_finite() {
        return "0,00".to_string();
    }

    let s = format!("{:.2}", amount);
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    let Some((integer_part, decimal_part)) = digits.split_once('.') else {
        return s;
    };

    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::with_capacity(chars.len() + chars.len() / 3);
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(*c);
    }

    format!("{}{},{}", sign, formatted, decimal_part)
}

/// Format any JSON value as a Brazilian amount (`"0,00"` when not numeric).
pub fn format_br_value(value: &Value) -> String {
    format_br(value.to_amount())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_separator_disambiguation() {
        assert_eq!(parse_br_amount("1.234,56"), 1234.56);
        assert_eq!(parse_br_amount("1,234.56"), 1234.56);
        assert_eq!(parse_br_amount("1.234"), 1234.0);
        assert_eq!(parse_br_amount("1.2345"), 1.2345);
        assert_eq!(parse_br_amount("10,5"), 10.5);
        assert_eq!(parse_br_amount("0.85"), 0.85);
        assert_eq!(parse_br_amount("1.234.567"), 1234567.0);
        assert_eq!(parse_br_amount("1,234,567"), 1234567.0);
        assert_eq!(parse_br_amount("12.345.678,90"), 12345678.90);
    }

    #[test]
    fn test_noise_is_stripped() {
        assert_eq!(parse_br_amount("R$ 327,84"), 327.84);
        assert_eq!(parse_br_amount(" 1.520,35 kWh"), 1520.35);
        assert_eq!(parse_br_amount("-143,45"), -143.45);
    }

    #[test]
    fn test_malformed_input_is_zero() {
        assert_eq!(parse_br_amount(""), 0.0);
        assert_eq!(parse_br_amount("abc"), 0.0);
        assert_eq!(parse_br_amount("-"), 0.0);
        assert_eq!(parse_br_amount("1-2"), 0.0);
        assert_eq!(parse_br_amount(",."), 0.0);
        assert_eq!(parse_br_amount(&"9".repeat(400)), 0.0);
    }

    #[test]
    fn test_amount_sources() {
        let none: Option<&str> = None;
        assert_eq!(none.to_amount(), 0.0);
        assert_eq!(Some("10,5").to_amount(), 10.5);
        assert_eq!(2.5f64.to_amount(), 2.5);
        assert_eq!(f64::NAN.to_amount(), 0.0);
        assert_eq!(serde_json::json!(12.75).to_amount(), 12.75);
        assert_eq!(serde_json::json!("1.234,56").to_amount(), 1234.56);
        assert_eq!(serde_json::json!(null).to_amount(), 0.0);
        assert_eq!(serde_json::json!(true).to_amount(), 0.0);
    }

    #[test]
    fn test_format_br() {
        assert_eq!(format_br(1234.56), "1.234,56");
        assert_eq!(format_br(12345678.9), "12.345.678,90");
        assert_eq!(format_br(0.5), "0,50");
        assert_eq!(format_br(100.0), "100,00");
        assert_eq!(format_br(-1234.5), "-1.234,50");
        assert_eq!(format_br(f64::INFINITY), "0,00");
        assert_eq!(format_br_value(&serde_json::json!("abc")), "0,00");
    }

    #[test]
    fn test_format_then_parse_is_identity() {
        let samples = [0.0, 0.01, 0.5, 9.99, 100.0, 999.0, 1000.0, 1234.56, 65432.1, 999_999_999.99];
        for v in samples {
            assert_eq!(parse_br_amount(&format_br(v)), v, "value {}", v);
        }
    }
}
