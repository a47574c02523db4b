//! Batch command - process every invoice matching a glob pattern.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::Serialize;
use tracing::{info, warn};

use fatura_core::{suggest_price_kwh, ErrorRecord, Field, InvoiceReport, PricingParams};

use super::{build_processor, load_config, PricingArgs};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for invoice PDFs (e.g. "faturas/*.pdf")
    #[arg(required = true)]
    input: String,

    #[command(flatten)]
    pricing: PricingArgs,

    /// Write JSON lines to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write a CSV summary
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Dump the pricing parameters used to a JSON file
    #[arg(long)]
    settings: Option<PathBuf>,
}

/// Outcome of one file.
struct BatchResult {
    path: PathBuf,
    outcome: Result<InvoiceReport, String>,
}

/// Pricing parameters as written by `--settings`.
#[derive(Serialize)]
struct SettingsDump {
    price_kwh: f64,
    discount: f64,
}

impl From<&PricingParams> for SettingsDump {
    fn from(params: &PricingParams) -> Self {
        Self {
            price_kwh: params.price_kwh,
            discount: params.discount_percent,
        }
    }
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let params = args.pricing.resolve(&config);

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching PDF files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let pb = ProgressBar::with_draw_target(Some(files.len() as u64), ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let processor = build_processor(&config);
    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let outcome = processor
            .process_file(&path, &params)
            .map_err(|e| e.to_string());
        match &outcome {
            Ok(report) => {
                for problem in report_problems(report) {
                    warn!("{}: {}", path.display(), problem);
                }
            }
            Err(e) => warn!("Failed to process {}: {}", path.display(), e),
        }
        results.push(BatchResult { path, outcome });
        pb.inc(1);
    }

    pb.finish_and_clear();

    write_json_lines(args.output.as_deref(), &results)?;

    if let Some(summary_path) = &args.summary {
        write_summary(summary_path, &results)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    if let Some(settings_path) = &args.settings {
        let file = File::create(settings_path)?;
        serde_json::to_writer_pretty(file, &SettingsDump::from(&params))?;
        eprintln!(
            "{} Settings written to {}",
            style("✓").green(),
            settings_path.display()
        );
    }

    let reports: Vec<&InvoiceReport> = results.iter().filter_map(|r| r.outcome.as_ref().ok()).collect();
    if let Some(price) = suggest_price_kwh(reports.iter().copied()) {
        info!("Suggested price per kWh for the next run: {:.6}", price);
    }

    let failed: Vec<_> = results.iter().filter(|r| r.outcome.is_err()).collect();

    eprintln!();
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} successful, {} failed",
        style(reports.len()).green(),
        style(failed.len()).red()
    );

    let incomplete: Vec<_> = results
        .iter()
        .filter_map(|r| match &r.outcome {
            Ok(report) => {
                let problems = report_problems(report);
                (!problems.is_empty()).then(|| (&r.path, problems))
            }
            Err(_) => None,
        })
        .collect();

    if !incomplete.is_empty() {
        eprintln!();
        eprintln!("{}", style("Incomplete files:").yellow());
        for (path, problems) in &incomplete {
            eprintln!("  - {}: {}", path.display(), problems.join("; "));
        }
    }

    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for result in &failed {
            if let Err(e) = &result.outcome {
                eprintln!("  - {}: {}", result.path.display(), e);
            }
        }
    }

    Ok(())
}

/// Partial failures of an otherwise processed invoice.
fn report_problems(report: &InvoiceReport) -> Vec<String> {
    let mut problems = Vec::new();
    if !report.extraction_errors.is_empty() {
        problems.push(format!("fields not found: {}", report.extraction_errors.join(", ")));
    }
    if let Some(error) = &report.calculation.calculation_error {
        problems.push(format!("calculation error: {}", error));
    }
    problems
}

fn write_json_lines(output: Option<&Path>, results: &[BatchResult]) -> anyhow::Result<()> {
    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };

    for result in results {
        match &result.outcome {
            Ok(report) => serde_json::to_writer(&mut writer, report)?,
            Err(e) => serde_json::to_writer(
                &mut writer,
                &ErrorRecord::for_path(result.path.display().to_string(), e),
            )?,
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

fn write_summary(path: &Path, results: &[BatchResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "cpf_cnpj",
        "nome_cliente",
        "mes_referencia",
        "valor_total",
        "valor_sem_desconto",
        "valor_com_desconto",
        "economia",
        "extraction_errors",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        match &result.outcome {
            Ok(report) => {
                let field = |f: Field| report.fields.get(f).unwrap_or("").to_string();
                wtr.write_record([
                    filename.to_string(),
                    "success".to_string(),
                    field(Field::TaxId),
                    field(Field::CustomerName),
                    field(Field::ReferenceMonth),
                    field(Field::TotalAmount),
                    figure(report.calculation.valor_sem_desconto),
                    figure(report.calculation.valor_com_desconto),
                    figure(report.calculation.economia),
                    report.extraction_errors.join(";"),
                    report.calculation.calculation_error.clone().unwrap_or_default(),
                ])?;
            }
            Err(e) => {
                wtr.write_record([
                    filename, "error", "", "", "", "", "", "", "", "", e.as_str(),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}

fn figure<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
