//! Render command - turn a JSON payload into a report PDF.

use std::path::{Path, PathBuf};

use clap::Args;
use serde_json::{json, Value};
use tracing::{debug, error};

use fatura_core::{ReportKind, ReportRenderer};

use super::load_config;

/// Arguments for the render command.
#[derive(Args)]
pub struct RenderArgs {
    /// Report kind: invoice, client-summary or plant-report
    kind: String,

    /// JSON payload, inline or as a path to a .json file
    data: String,

    /// Output PDF path
    output: PathBuf,
}

pub fn run(args: RenderArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    match render(&args, config_path) {
        Ok(()) => {
            println!(
                "{}",
                json!({ "success": true, "path": args.output.display().to_string() })
            );
            Ok(())
        }
        Err(e) => {
            error!("Render failed: {:#}", e);
            println!("{}", json!({ "error": format!("{:#}", e) }));
            Err(e)
        }
    }
}

fn render(args: &RenderArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let kind: ReportKind = args.kind.parse()?;
    let data = read_payload(&args.data)?;

    ReportRenderer::new(&config.render).render_to_file(kind, &data, &args.output)?;
    Ok(())
}

/// An existing file path is read; anything else is parsed as JSON text.
fn read_payload(data: &str) -> anyhow::Result<Value> {
    let path = Path::new(data);
    let text = if path.is_file() {
        debug!("Reading payload from {}", path.display());
        std::fs::read_to_string(path)?
    } else {
        data.to_string()
    };

    serde_json::from_str(&text).map_err(|e| anyhow::anyhow!("Invalid JSON payload: {}", e))
}
