//! `{{ key }}` placeholder substitution.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::warn;

use super::context::TemplateContext;

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap();
}

/// Trait for template rendering implementations.
pub trait TemplateRenderer {
    /// Fill a template from a flat context.
    fn render(&self, template: &str, context: &TemplateContext) -> String;
}

/// Renderer replacing `{{ key }}` placeholders with context values.
///
/// Unknown keys render as empty strings.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderRenderer;

impl TemplateRenderer for PlaceholderRenderer {
    fn render(&self, template: &str, context: &TemplateContext) -> String {
        let mut out = String::with_capacity(template.len());
        for line in template.lines() {
            let rendered = PLACEHOLDER.replace_all(line, |caps: &Captures<'_>| {
                let key = &caps[1];
                match context.get(key) {
                    Some(value) => value.clone(),
                    None => {
                        warn!("Template placeholder '{}' has no value", key);
                        String::new()
                    }
                }
            });

            // A line made only of empty placeholders disappears
            if rendered.trim().is_empty() && !line.trim().is_empty() {
                continue;
            }
            out.push_str(&rendered);
            out.push('\n');
        }
        out
    }
}
