//! Report rendering: payload -> template context -> text -> PDF.

mod composer;
mod context;
mod template;

pub use composer::{LopdfComposer, PdfComposer};
pub use context::{client_summary_context, invoice_context, plant_report_context, TemplateContext};
pub use template::{PlaceholderRenderer, TemplateRenderer};

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::RenderError;
use crate::models::config::RenderConfig;

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Kind of report to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Monthly invoice for one customer.
    Invoice,
    /// Savings summary of one customer over several months.
    ClientSummary,
    /// Per-plant report over all credited customers.
    PlantReport,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [
        ReportKind::Invoice,
        ReportKind::ClientSummary,
        ReportKind::PlantReport,
    ];

    /// Name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            ReportKind::Invoice => "invoice",
            ReportKind::ClientSummary => "client-summary",
            ReportKind::PlantReport => "plant-report",
        }
    }

    /// File name of the template, bundled or in a template directory.
    pub fn template_file(self) -> &'static str {
        match self {
            ReportKind::Invoice => "invoice.txt",
            ReportKind::ClientSummary => "client_summary.txt",
            ReportKind::PlantReport => "plant_report.txt",
        }
    }

    fn bundled_template(self) -> &'static str {
        match self {
            ReportKind::Invoice => include_str!("../../templates/invoice.txt"),
            ReportKind::ClientSummary => include_str!("../../templates/client_summary.txt"),
            ReportKind::PlantReport => include_str!("../../templates/plant_report.txt"),
        }
    }

    /// Build the template context for this kind of report.
    pub fn context(self, data: &serde_json::Map<String, Value>) -> TemplateContext {
        match self {
            ReportKind::Invoice => invoice_context(data),
            ReportKind::ClientSummary => client_summary_context(data),
            ReportKind::PlantReport => plant_report_context(data),
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReportKind {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        ReportKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| RenderError::UnknownTemplate(s.to_string()))
    }
}

/// Renders report payloads into PDF documents.
pub struct ReportRenderer {
    template_dir: Option<PathBuf>,
    renderer: Box<dyn TemplateRenderer + Send + Sync>,
    composer: Box<dyn PdfComposer + Send + Sync>,
}

impl ReportRenderer {
    /// Create a renderer with the placeholder engine and lopdf composer.
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            template_dir: config.template_dir.clone(),
            renderer: Box::new(PlaceholderRenderer),
            composer: Box::new(LopdfComposer::new(config)),
        }
    }

    /// Template text for a report kind, preferring an override file.
    pub fn template(&self, kind: ReportKind) -> Result<String> {
        if let Some(dir) = &self.template_dir {
            let path = dir.join(kind.template_file());
            if path.is_file() {
                debug!("Using template override {}", path.display());
                return std::fs::read_to_string(&path).map_err(|source| RenderError::TemplateRead {
                    path: path.display().to_string(),
                    source,
                });
            }
        }
        Ok(kind.bundled_template().to_string())
    }

    /// Render a payload to report text.
    pub fn render_text(&self, kind: ReportKind, data: &Value) -> Result<String> {
        let object = data.as_object().ok_or(RenderError::InvalidPayload)?;
        let context = kind.context(object);
        Ok(self.renderer.render(&self.template(kind)?, &context))
    }

    /// Render a payload to PDF bytes.
    pub fn render(&self, kind: ReportKind, data: &Value) -> Result<Vec<u8>> {
        let text = self.render_text(kind, data)?;
        self.composer.compose(&text)
    }

    /// Render a payload and write the PDF to `output`.
    pub fn render_to_file(&self, kind: ReportKind, data: &Value, output: &Path) -> Result<()> {
        let bytes = self.render(kind, data)?;
        std::fs::write(output, &bytes).map_err(|source| RenderError::Write {
            path: output.display().to_string(),
            source,
        })?;
        info!("Wrote {} report to {}", kind, output.display());
        Ok(())
    }
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self::new(&RenderConfig::default())
    }
}
