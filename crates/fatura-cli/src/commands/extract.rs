//! Extract command - process one invoice PDF.

use std::path::PathBuf;

use clap::Args;
use tracing::error;

use fatura_core::ErrorRecord;

use super::{build_processor, load_config, PricingArgs};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Invoice PDF file
    #[arg(required = true)]
    input: PathBuf,

    #[command(flatten)]
    pricing: PricingArgs,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

pub fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    match extract(&args, config_path) {
        Ok(json) => {
            println!("{}", json);
            Ok(())
        }
        Err(e) => {
            error!("Failed to process {}: {:#}", args.input.display(), e);
            println!("{}", serde_json::to_string(&ErrorRecord::new(format!("{:#}", e)))?);
            Err(e)
        }
    }
}

fn extract(args: &ExtractArgs, config_path: Option<&str>) -> anyhow::Result<String> {
    let config = load_config(config_path)?;
    let params = args.pricing.resolve(&config);

    if !args.input.exists() {
        anyhow::bail!("File not found: {}", args.input.display());
    }

    let processor = build_processor(&config);
    let report = processor.process_file(&args.input, &params)?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    Ok(json)
}
