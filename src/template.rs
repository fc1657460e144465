//! Opaque dashboard template handling
//!
//! The template is a JSON document with two textual placeholders substituted
//! before each use. It is never parsed beyond the substitution points and a
//! top-level shape check; its internal schema belongs to the backend.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{ConfigError, Result};

/// Placeholder replaced with the organization display name.
const ORG_NAME_PLACEHOLDER: &str = "$ORG_NAME$";
/// Placeholder replaced with the data-source identifier.
const DATASOURCE_PLACEHOLDER: &str = "$DATASOURCE_UID$";

/// The usage dashboard shipped with the binary.
const DEFAULT_TEMPLATE: &str = include_str!("../templates/dashboard-usage.json");

/// A validated dashboard template.
#[derive(Debug, Clone)]
pub struct DashboardTemplate {
    raw: String,
}

impl DashboardTemplate {
    /// Load from a file, or fall back to the embedded default.
    ///
    /// Validation renders once with sample values: a template that does not
    /// produce a JSON object fails at startup, not mid-cycle.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let raw = match path {
            Some(path) => fs::read_to_string(path).map_err(|e| {
                ConfigError::Template(format!("failed to read {}: {e}", path.display()))
            })?,
            None => DEFAULT_TEMPLATE.to_string(),
        };

        let template = Self { raw };
        template.render("sample", "sample")?;
        Ok(template)
    }

    /// Substitute both placeholders and parse the result.
    ///
    /// Substituted values are JSON-string escaped, so names containing quotes
    /// or backslashes cannot corrupt the document.
    pub fn render(&self, org_name: &str, datasource_uid: &str) -> Result<Value> {
        let rendered = self
            .raw
            .replace(ORG_NAME_PLACEHOLDER, &escape_json_string(org_name))
            .replace(DATASOURCE_PLACEHOLDER, &escape_json_string(datasource_uid));

        let value: Value = serde_json::from_str(&rendered)
            .map_err(|e| ConfigError::Template(format!("rendered template is not JSON: {e}")))?;
        if !value.is_object() {
            return Err(ConfigError::Template("rendered template is not a JSON object".to_string()).into());
        }
        Ok(value)
    }
}

/// Escape a value for splicing into a JSON string literal (no surrounding
/// quotes).
fn escape_json_string(value: &str) -> String {
    let quoted = Value::String(value.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}
