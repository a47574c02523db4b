//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{FaturaError, Result};
use crate::pricing::PricingParams;

/// Main configuration for fatura.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FaturaConfig {
    /// Pricing defaults.
    pub pricing: PricingConfig,

    /// PDF text acquisition.
    pub pdf: PdfConfig,

    /// OCR model files.
    pub ocr: OcrConfig,

    /// Report rendering.
    pub render: RenderConfig,
}

/// Default pricing parameters, overridable per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Captive-market price per kWh.
    pub price_kwh: f64,

    /// Discount percentage (0 - 100).
    pub discount_percent: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            price_kwh: 0.85,
            discount_percent: 25.0,
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Run OCR on the images of pages that carry no text.
    pub ocr_fallback: bool,

    /// Minimum trimmed text length for a page to count as text-based.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            ocr_fallback: true,
            min_text_length: 1,
        }
    }
}

/// OCR model file paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Keep `[UNK]` tokens in recognized text instead of blanking them.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            keep_unk: false,
        }
    }
}

/// Report rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Directory with template overrides (`invoice.txt`, ...). Bundled
    /// templates are used for files that are not found there.
    pub template_dir: Option<PathBuf>,

    /// Body font size in points.
    pub font_size: f32,

    /// Line spacing in points.
    pub leading: f32,

    /// Page margin in points.
    pub margin: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            template_dir: None,
            font_size: 10.0,
            leading: 14.0,
            margin: 50.0,
        }
    }
}

impl FaturaConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| FaturaError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| FaturaError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get full path to an OCR model file.
    pub fn model_path(&self, file_name: &str) -> PathBuf {
        self.ocr.model_dir.join(file_name)
    }

    /// Pricing parameters from the configured defaults.
    pub fn pricing_params(&self) -> PricingParams {
        PricingParams::new(self.pricing.price_kwh, self.pricing.discount_percent)
    }
}
