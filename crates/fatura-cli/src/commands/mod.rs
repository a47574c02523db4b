//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod extract;
pub mod render;

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::{debug, warn};

use fatura_core::{FaturaConfig, InvoiceProcessor, PricingParams, PureOcrEngine};

/// Pricing flags shared by `extract` and `batch`.
#[derive(Args, Debug, Clone)]
pub struct PricingArgs {
    /// Captive-market price per kWh (BRL)
    #[arg(long)]
    pub price_kwh: Option<f64>,

    /// Discount percentage on the energy value
    #[arg(long)]
    pub discount: Option<f64>,
}

impl PricingArgs {
    /// Flags override the configured pricing.
    pub fn resolve(&self, config: &FaturaConfig) -> PricingParams {
        let defaults = config.pricing_params();
        PricingParams::new(
            self.price_kwh.unwrap_or(defaults.price_kwh),
            self.discount.unwrap_or(defaults.discount_percent),
        )
    }
}

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fatura")
        .join("config.json")
}

/// Load the configuration from `--config`, the default path, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<FaturaConfig> {
    if let Some(path) = config_path {
        return Ok(FaturaConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Loading config from {}", default_path.display());
        Ok(FaturaConfig::from_file(&default_path)?)
    } else {
        Ok(FaturaConfig::default())
    }
}

/// Build the invoice processor, attaching OCR when its models load.
pub fn build_processor(config: &FaturaConfig) -> InvoiceProcessor {
    let processor = InvoiceProcessor::new(config.pdf.clone());
    if !config.pdf.ocr_fallback {
        return processor;
    }

    match PureOcrEngine::from_config(config) {
        Ok(engine) => processor.with_ocr(Box::new(engine)),
        Err(e) => {
            warn!("OCR unavailable, scanned pages will be skipped: {}", e);
            processor
        }
    }
}
