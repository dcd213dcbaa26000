use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ReportError;
use crate::results::RuntimeLabel;

/// File name of the rendered report, relative to the root directory.
pub const REPORT_FILE: &str = "benchmark-report.html";

/// Result directory, relative to the root directory.
pub const RESULTS_DIR: &str = "results";

/// Runtimes compared by default, in display order.
pub const DEFAULT_RUNTIMES: &[&str] = &["fpm", "swoole", "franken"];

/// Colors for runtimes that have no configured color.
const FALLBACK_PALETTE: &[&str] = &[
    "#F59E0B", "#8B5CF6", "#EC4899", "#14B8A6", "#6366F1", "#84CC16",
];

/// Settings for one report run.
///
/// Every field has a default, so a settings file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ReportSettings {
    /// Directory the result directory and the report are resolved against.
    pub root: PathBuf,
    /// Overrides `<root>/results`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results_dir: Option<PathBuf>,
    /// Overrides `<root>/benchmark-report.html`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    pub runtimes: Vec<RuntimeLabel>,
    pub colors: BTreeMap<RuntimeLabel, String>,
    /// Error rates strictly above this value are flagged in the report.
    pub error_rate_threshold: f64,
    pub title: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            results_dir: None,
            output: None,
            runtimes: DEFAULT_RUNTIMES.iter().map(|s| s.to_string()).collect(),
            colors: [
                ("fpm", "#EF4444"),
                ("swoole", "#3B82F6"),
                ("franken", "#10B981"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
            error_rate_threshold: 0.01,
            title: "Runtime Benchmark".to_string(),
        }
    }
}

impl ReportSettings {
    /// Read settings from a JSON file and validate them.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            ReportError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let settings: ReportSettings = serde_json::from_str(&content).map_err(|e| {
            ReportError::Config(format!("invalid settings in {}: {e}", path.display()))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ReportError> {
        if self.runtimes.is_empty() {
            return Err(ReportError::Config(
                "at least one runtime must be configured".to_string(),
            ));
        }
        for (i, label) in self.runtimes.iter().enumerate() {
            if label.trim().is_empty() {
                return Err(ReportError::Config("runtime names must not be empty".to_string()));
            }
            if label.contains(['/', '\\']) {
                return Err(ReportError::Config(format!(
                    "runtime '{label}' must not contain path separators"
                )));
            }
            if self.runtimes[..i].contains(label) {
                return Err(ReportError::Config(format!("runtime '{label}' is listed twice")));
            }
        }
        if !(0.0..=1.0).contains(&self.error_rate_threshold) {
            return Err(ReportError::Config(format!(
                "error_rate_threshold must be between 0 and 1 (got {})",
                self.error_rate_threshold
            )));
        }
        Ok(())
    }

    pub fn results_dir(&self) -> PathBuf {
        self.results_dir
            .clone()
            .unwrap_or_else(|| self.root.join(RESULTS_DIR))
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.root.join(REPORT_FILE))
    }

    /// Path of the CSV summary, next to the HTML report.
    pub fn csv_path(&self) -> PathBuf {
        self.output_path().with_extension("csv")
    }

    /// Path of the JSON summary, next to the HTML report.
    pub fn json_path(&self) -> PathBuf {
        self.output_path().with_extension("json")
    }

    /// Configured color of `label`, or a stable fallback for unknown labels.
    pub fn color_for(&self, label: &str) -> String {
        match self.colors.get(label) {
            Some(color) => color.clone(),
            None => fallback_color(label).to_string(),
        }
    }
}

/// FNV-1a over the label bytes keeps the fallback stable across runs.
fn fallback_color(label: &str) -> &'static str {
    let hash = label
        .bytes()
        .fold(0x811c_9dc5_u32, |h, b| (h ^ b as u32).wrapping_mul(0x0100_0193));
    FALLBACK_PALETTE[hash as usize % FALLBACK_PALETTE.len()]
}
