//! The fixed field schema extracted from every invoice.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::invoice::rules::amounts::AmountSource;

/// A named field of the extraction schema.
///
/// Variant order is the order of the keys in the serialized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    TaxId,
    ConsumptionKwh,
    TotalAmount,
    BalanceKwh,
    CustomerName,
    Address,
    ConsumerUnit,
    PreviousReading,
    CurrentReading,
    ReadingDays,
    ReferenceMonth,
    DueDate,
    PublicLightingContribution,
    InjectedEnergy,
    InjectedEnergyPrice,
    CompensatedConsumption,
    CompensatedEnergyPrice,
    WireBPrice,
    NonCompensatedConsumption,
    NonCompensatedPrice,
    FlagTariffPrice,
    GenerationCycle,
    GeneratingUnit,
    LastCycleGeneration,
}

impl Field {
    /// Every field, in schema order.
    pub const ALL: [Field; 24] = [
        Field::TaxId,
        Field::ConsumptionKwh,
        Field::TotalAmount,
        Field::BalanceKwh,
        Field::CustomerName,
        Field::Address,
        Field::ConsumerUnit,
        Field::PreviousReading,
        Field::CurrentReading,
        Field::ReadingDays,
        Field::ReferenceMonth,
        Field::DueDate,
        Field::PublicLightingContribution,
        Field::InjectedEnergy,
        Field::InjectedEnergyPrice,
        Field::CompensatedConsumption,
        Field::CompensatedEnergyPrice,
        Field::WireBPrice,
        Field::NonCompensatedConsumption,
        Field::NonCompensatedPrice,
        Field::FlagTariffPrice,
        Field::GenerationCycle,
        Field::GeneratingUnit,
        Field::LastCycleGeneration,
    ];

    /// JSON key used on the wire.
    pub fn key(self) -> &'static str {
        match self {
            Field::TaxId => "cpfCnpj",
            Field::ConsumptionKwh => "consumoKwh",
            Field::TotalAmount => "valorTotal",
            Field::BalanceKwh => "saldoKwh",
            Field::CustomerName => "nomeCliente",
            Field::Address => "endereco",
            Field::ConsumerUnit => "unidadeConsumidora",
            Field::PreviousReading => "leituraAnterior",
            Field::CurrentReading => "leituraAtual",
            Field::ReadingDays => "quantidadeDias",
            Field::ReferenceMonth => "mesReferencia",
            Field::DueDate => "dataVencimento",
            Field::PublicLightingContribution => "contribuicaoIluminacao",
            Field::InjectedEnergy => "energiaInjetada",
            Field::InjectedEnergyPrice => "precoEnergiaInjetada",
            Field::CompensatedConsumption => "consumoScee",
            Field::CompensatedEnergyPrice => "precoEnergiaCompensada",
            Field::WireBPrice => "precoFioB",
            Field::NonCompensatedConsumption => "consumoNaoCompensado",
            Field::NonCompensatedPrice => "precoKwhNaoCompensado",
            Field::FlagTariffPrice => "precoAdcBandeira",
            Field::GenerationCycle => "cicloGeracao",
            Field::GeneratingUnit => "ucGeradora",
            Field::LastCycleGeneration => "geracaoUltimoCiclo",
        }
    }

    /// Look a field up by its JSON key.
    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.key() == key)
    }

    /// Value stored when the field's rule does not match.
    ///
    /// Fields feeding the pricing arithmetic fall back to `"0"` so that
    /// normalization yields zero instead of a null.
    pub fn fallback(self) -> Option<&'static str> {
        match self {
            Field::PublicLightingContribution
            | Field::NonCompensatedConsumption
            | Field::NonCompensatedPrice
            | Field::FlagTariffPrice => Some("0"),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Raw field values extracted from one invoice.
///
/// Every schema field is always present; unmatched fields hold `None` or
/// their fallback numeral.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    values: BTreeMap<Field, Option<String>>,
}

impl ExtractedFields {
    /// All fields set to `None`.
    pub fn empty() -> Self {
        Self {
            values: Field::ALL.into_iter().map(|f| (f, None)).collect(),
        }
    }

    /// Raw value of a field.
    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).and_then(|v| v.as_deref())
    }

    pub fn set(&mut self, field: Field, value: Option<String>) {
        self.values.insert(field, value);
    }

    /// Normalized numeric value of a field (`0.0` when absent or malformed).
    pub fn amount(&self, field: Field) -> f64 {
        self.get(field).to_amount()
    }

    /// Iterate over `(field, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, Option<&str>)> {
        self.values.iter().map(|(f, v)| (*f, v.as_deref()))
    }
}

impl Default for ExtractedFields {
    fn default() -> Self {
        Self::empty()
    }
}

impl Serialize for ExtractedFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (field, value) in &self.values {
            map.serialize_entry(field.key(), value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_keys_roundtrip() {
        for field in Field::ALL {
            assert_eq!(Field::from_key(field.key()), Some(field));
        }
        assert_eq!(Field::from_key("nope"), None);
    }

    #[test]
    fn test_serializes_every_key_in_order() {
        let mut fields = ExtractedFields::empty();
        fields.set(Field::ConsumptionKwh, Some("350,00".to_string()));

        let json = serde_json::to_string(&fields).unwrap();
        assert!(json.starts_with(r#"{"cpfCnpj":null,"consumoKwh":"350,00","valorTotal":null"#));
        assert!(json.ends_with(r#""geracaoUltimoCiclo":null}"#));
    }

    #[test]
    fn test_amount_of_missing_field_is_zero() {
        let fields = ExtractedFields::empty();
        assert_eq!(fields.amount(Field::CompensatedConsumption), 0.0);
    }
}
