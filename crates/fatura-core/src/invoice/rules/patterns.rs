//! Regex patterns anchored on the labels printed on Brazilian electricity invoices.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Customer identification (CPF for people, CNPJ for companies)
    pub static ref CPF: Regex = Regex::new(
        r"CNPJ/CPF: (\d{3}\.\d{3}\.\d{3}-\d{2})"
    ).unwrap();

    pub static ref CNPJ: Regex = Regex::new(
        r"CNPJ/CPF: (\d{2}\.\d{3}\.\d{3}/\d{4}-\d{2})"
    ).unwrap();

    pub static ref CUSTOMER_NAME: Regex = Regex::new(
        r"Tensão Nominal Disp: .*?\n(.*?)\n"
    ).unwrap();

    pub static ref ADDRESS: Regex = Regex::new(
        r"(?s)(RUA .*?\n.*?CEP: .*?BRASIL)"
    ).unwrap();

    pub static ref CONSUMER_UNIT: Regex = Regex::new(
        r"Consulte pela Chave de Acesso em:\s*(\d+)"
    ).unwrap();

    // Meter readings: previous date, current date, day count
    pub static ref READINGS: Regex = Regex::new(
        r"(\d{2}/\d{2}/\d{4})\s+(\d{2}/\d{2}/\d{4})\s+(\d+)"
    ).unwrap();

    // Reference month and due date sit on the line after the CFOP code
    pub static ref REFERENCE_AND_DUE: Regex = Regex::new(
        r"CFOP \d{4}:.*?\n(\w{3}/\d{4})\s+(\d{2}/\d{2}/\d{4})"
    ).unwrap();

    // Totals
    pub static ref CONSUMPTION_KWH: Regex = Regex::new(
        r"CONSUMO.*?(\d+,\d+)"
    ).unwrap();

    pub static ref TOTAL_DUE: Regex = Regex::new(
        r"R\$[*]+([\d.,]+)"
    ).unwrap();

    pub static ref BALANCE_KWH: Regex = Regex::new(
        r"SALDO KWH:\s*([\d.,]+)"
    ).unwrap();

    pub static ref PUBLIC_LIGHTING: Regex = Regex::new(
        r"CONTRIB\.\s+ILUM\.\s+PÚBLICA\s+-\s+MUNICIPAL\s+(\d{1,3}(?:\.\d{3})*,\d{2})"
    ).unwrap();

    // Billing lines: quantity followed by unit price
    pub static ref SCEE_INJECTION: Regex = Regex::new(
        r"INJEÇÃO SCEE.*?\s(\d+,\d+).*?\s(\d+,\d+)"
    ).unwrap();

    pub static ref SCEE_CONSUMPTION: Regex = Regex::new(
        r"CONSUMO SCEE.*?\s(\d+,\d+).*?\s(\d+,\d+)"
    ).unwrap();

    pub static ref WIRE_B: Regex = Regex::new(
        r"PARC INJET S/DESC.*?\d+,\d+.*?\d+,\d+.*?\s(\d+,\d+)"
    ).unwrap();

    pub static ref NON_COMPENSATED: Regex = Regex::new(
        r"CONSUMO NÃO COMPENSADO.*?(\d+,\d+)"
    ).unwrap();

    pub static ref NON_COMPENSATED_PRICE: Regex = Regex::new(
        r"CONSUMO NÃO COMPENSADO.*?\d+,\d+.*?\s(\d+,\d+)"
    ).unwrap();

    pub static ref FLAG_TARIFF: Regex = Regex::new(
        r"ADC BANDEIRA.*?\d+,\d+.*?\s(\d+,\d+)"
    ).unwrap();

    // Distributed generation
    pub static ref GENERATION_CYCLE: Regex = Regex::new(
        r"GERAÇÃO CICLO \((\d{2}/\d{4})\) KWH: UC (\d+) : ([\d.,]+)"
    ).unwrap();

    // Reference month as printed or typed by hand: "jan/25", "JAN/2025"
    pub static ref MONTH_REFERENCE: Regex = Regex::new(
        r"^\s*([A-Za-zÀ-ÿ]{3})\s*/\s*(\d{2}|\d{4})\s*$"
    ).unwrap();
}
