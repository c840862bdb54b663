//! Warnings surfaced to the calling CI step.
//!
//! Serialized as a JSON array of `[title, detail]` pairs.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{CollectError, CollectResult};

/// A `(title, detail)` pair. Serializes as a two element JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning(pub String, pub String);

impl Warning {
    pub fn title(&self) -> &str {
        &self.0
    }

    pub fn detail(&self) -> &str {
        &self.1
    }
}

/// Append-only collection of warnings for one run.
#[derive(Debug, Default)]
pub struct WarningSink {
    warnings: Vec<Warning>,
}

impl WarningSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, title: impl Into<String>, detail: impl Into<String>) {
        let warning = Warning(title.into(), detail.into());
        tracing::warn!(title = %warning.title(), "collector warning");
        self.warnings.push(warning);
    }

    /// Warning without a detail text.
    pub fn emit_title(&mut self, title: impl Into<String>) {
        self.emit(title, String::new());
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn write_json(&self, out: &Path) -> CollectResult<()> {
        let bytes = serde_json::to_vec(&self.warnings).map_err(|e| {
            CollectError::io("failed to encode warnings", out, std::io::Error::other(e))
        })?;
        std::fs::write(out, bytes).map_err(|e| CollectError::io("failed to write warnings", out, e))
    }
}
