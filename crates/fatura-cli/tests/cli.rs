use std::fs;

use assert_cmd::Command;
use fatura_core::render::{LopdfComposer, PdfComposer};
use predicates::prelude::*;
use tempfile::TempDir;

const INVOICE_TEXT: &str = "EQUATORIAL ENERGIA
CNPJ/CPF: 123.456.789-09
Tensão Nominal Disp: 220 V
MARIA DA SILVA SOUZA
RUA DAS FLORES 123
CENTRO CEP: 65000-000 SAO LUIS MA BRASIL
Consulte pela Chave de Acesso em: 3012345678
LEITURA ANTERIOR ATUAL DIAS
10/01/2025 09/02/2025 30
CFOP 5258: VENDA DE ENERGIA ELETRICA
JAN/2025 20/02/2025
TOTAL A PAGAR R$***327,84
ITENS DA FATURA
CONSUMO KWH 350,00 0,951234 332,93
CONSUMO SCEE KWH 300,00 0,812345 243,70
INJEÇÃO SCEE - UC 3012345678 KWH 280,00 0,512345 -143,45
PARC INJET S/DESC KWH 280,00 0,512345 0,123456
CONSUMO NÃO COMPENSADO KWH 50,00 0,912345 45,62
ADC BANDEIRA AMARELA KWH 350,00 0,018850 6,60
CONTRIB. ILUM. PÚBLICA - MUNICIPAL 30,00
SALDO KWH: 1.250,00,
GERAÇÃO CICLO (12/2024) KWH: UC 3009876543 : 1.520,35,
";

const REPORT_KEYS: [&str; 33] = [
    "pdfPath",
    "extractionErrors",
    "cpfCnpj",
    "consumoKwh",
    "valorTotal",
    "saldoKwh",
    "nomeCliente",
    "endereco",
    "unidadeConsumidora",
    "leituraAnterior",
    "leituraAtual",
    "quantidadeDias",
    "mesReferencia",
    "dataVencimento",
    "contribuicaoIluminacao",
    "energiaInjetada",
    "precoEnergiaInjetada",
    "consumoScee",
    "precoEnergiaCompensada",
    "precoFioB",
    "consumoNaoCompensado",
    "precoKwhNaoCompensado",
    "precoAdcBandeira",
    "cicloGeracao",
    "ucGeradora",
    "geracaoUltimoCiclo",
    "valorSemDesconto",
    "valorComDesconto",
    "economia",
    "lucro",
    "success",
    "precoKwhUsado",
    "descontoUsado",
];

/// Temp dir holding an empty config file, so runs ignore the user's config.
fn workspace() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, "{}").unwrap();
    (dir, config)
}

fn fatura() -> Command {
    Command::cargo_bin("fatura").unwrap()
}

#[test]
fn test_extract_missing_file() {
    fatura()
        .args(["extract", "/nonexistent/fatura.pdf"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(r#""success":false"#))
        .stdout(predicate::str::contains("File not found"));
}

#[test]
fn test_extract_invoice() {
    let (dir, config) = workspace();
    let pdf = dir.path().join("fatura.pdf");
    fs::write(&pdf, LopdfComposer::default().compose(INVOICE_TEXT).unwrap()).unwrap();

    let output = fatura()
        .arg("--config")
        .arg(&config)
        .arg("extract")
        .arg(&pdf)
        .args(["--price-kwh", "0.85", "--discount", "25"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8(output).unwrap();
    assert_eq!(stdout.lines().count(), 1);

    let report: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    let object = report.as_object().unwrap();
    for key in REPORT_KEYS {
        assert!(object.contains_key(key), "missing {}", key);
    }
    assert_eq!(object.len(), REPORT_KEYS.len());

    assert_eq!(report["success"], true);
    assert_eq!(report["cpfCnpj"], "123.456.789-09");
    assert_eq!(report["valorSemDesconto"], 327.5);
    assert_eq!(report["valorComDesconto"], 253.13);
}

#[test]
fn test_batch_warns_about_missing_fields() {
    let (dir, config) = workspace();
    let partial = INVOICE_TEXT.replace("SALDO KWH: 1.250,00,\n", "");
    fs::write(
        dir.path().join("parcial.pdf"),
        LopdfComposer::default().compose(&partial).unwrap(),
    )
    .unwrap();

    fatura()
        .arg("--config")
        .arg(&config)
        .arg("batch")
        .arg(dir.path().join("*.pdf").to_str().unwrap())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""saldoKwh":null"#))
        .stderr(predicate::str::contains("Incomplete files:"))
        .stderr(predicate::str::contains("saldoKwh"));
}

#[test]
fn test_extract_invalid_pdf() {
    let dir = TempDir::new().unwrap();
    let pdf = dir.path().join("broken.pdf");
    fs::write(&pdf, b"not a pdf at all").unwrap();

    fatura()
        .arg("extract")
        .arg(&pdf)
        .assert()
        .failure()
        .stdout(predicate::str::starts_with(r#"{"success":false,"error":"#));
}

#[test]
fn test_render_invoice() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("fatura.pdf");
    let payload = r#"{"nomeCliente":"MARIA DA SILVA","mesReferencia":"fev/25","valorComDesconto":253.13}"#;

    fatura()
        .args(["render", "invoice", payload])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""success":true"#));

    let bytes = fs::read(&output).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_render_payload_from_file() {
    let dir = TempDir::new().unwrap();
    let payload = dir.path().join("cliente.json");
    let output = dir.path().join("resumo.pdf");
    fs::write(
        &payload,
        r#"{"nomeCliente":"JOSE","faturas":[{"mesReferencia":"jan/25","economia":10.5}]}"#,
    )
    .unwrap();

    fatura()
        .args(["render", "client-summary"])
        .arg(&payload)
        .arg(&output)
        .assert()
        .success();

    assert!(output.exists());
}

#[test]
fn test_render_unknown_kind() {
    let dir = TempDir::new().unwrap();

    fatura()
        .args(["render", "boleto", "{}"])
        .arg(dir.path().join("out.pdf"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains(r#""error""#));
}

#[test]
fn test_render_invalid_json() {
    let dir = TempDir::new().unwrap();

    fatura()
        .args(["render", "invoice", "{not json"])
        .arg(dir.path().join("out.pdf"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("Invalid JSON payload"));
}

#[test]
fn test_batch_without_matches() {
    let dir = TempDir::new().unwrap();
    let pattern = dir.path().join("*.pdf");

    fatura()
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching PDF files"));
}

#[test]
fn test_batch_records_failures() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.pdf"), b"garbage").unwrap();
    let output = dir.path().join("out.jsonl");
    let summary = dir.path().join("summary.csv");
    let settings = dir.path().join("settings.json");

    fatura()
        .arg("batch")
        .arg(dir.path().join("*.pdf").to_str().unwrap())
        .args(["--price-kwh", "0.9", "--discount", "20"])
        .arg("-o")
        .arg(&output)
        .arg("--summary")
        .arg(&summary)
        .arg("--settings")
        .arg(&settings)
        .assert()
        .success();

    let lines = fs::read_to_string(&output).unwrap();
    assert_eq!(lines.lines().count(), 1);
    assert!(lines.contains(r#""success":false"#));
    assert!(lines.contains("a.pdf"));

    let csv = fs::read_to_string(&summary).unwrap();
    assert!(csv.starts_with("filename,status,"));
    assert!(csv.contains("a.pdf,error,"));

    let dumped: serde_json::Value = serde_json::from_str(&fs::read_to_string(&settings).unwrap()).unwrap();
    assert_eq!(dumped["price_kwh"], 0.9);
    assert_eq!(dumped["discount"], 20.0);
}

#[test]
fn test_config_show_with_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"pricing":{"price_kwh":0.95}}"#).unwrap();

    fatura()
        .arg("--config")
        .arg(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.95"))
        .stdout(predicate::str::contains("discount_percent"));
}

#[test]
fn test_config_init() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("nested").join("config.json");

    fatura()
        .args(["config", "init", "--output"])
        .arg(&config)
        .assert()
        .success();
    assert!(config.exists());

    fatura()
        .args(["config", "init", "--output"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_path() {
    fatura()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file:"));
}
