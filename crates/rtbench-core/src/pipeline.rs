//! End-to-end report generation.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::collector;
use crate::error::ReportError;
use crate::report::export::{export_csv, export_json};
use crate::report::io::{stage, StagedFile};
use crate::report::{render_html, ReportModel};
use crate::results::RuntimeLabel;
use crate::settings::ReportSettings;

/// Secondary outputs written next to the HTML report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub csv: bool,
    pub json: bool,
}

/// Files written by [`generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOutcome {
    pub html: PathBuf,
    pub exports: Vec<PathBuf>,
    /// Runtimes present in the report, in display order.
    pub runtimes: Vec<RuntimeLabel>,
}

/// Collect results, render the report and write it to disk.
///
/// All outputs are rendered and staged before anything is replaced. The HTML
/// report is committed last, so a failed run leaves the previous report as it
/// was.
pub async fn generate(
    settings: &ReportSettings,
    exports: ExportOptions,
    generated_at: DateTime<Utc>,
) -> Result<ReportOutcome, ReportError> {
    settings.validate()?;

    let set = collector::collect(&settings.results_dir(), &settings.runtimes).await?;
    let model = ReportModel::build(&set, settings, generated_at);

    let html = render_html(&model)?;
    let mut extra = Vec::new();
    if exports.csv {
        extra.push((settings.csv_path(), export_csv(&model)?));
    }
    if exports.json {
        extra.push((settings.json_path(), export_json(&model)?));
    }

    let mut staged = Vec::with_capacity(extra.len());
    for (path, content) in &extra {
        match stage(path, content).await {
            Ok(file) => staged.push(file),
            Err(e) => {
                discard_all(staged).await;
                return Err(e);
            }
        }
    }
    let report = match stage(settings.output_path(), &html).await {
        Ok(file) => file,
        Err(e) => {
            discard_all(staged).await;
            return Err(e);
        }
    };

    let mut written = Vec::with_capacity(staged.len());
    let mut pending = staged.into_iter();
    while let Some(file) = pending.next() {
        match file.commit().await {
            Ok(path) => {
                tracing::info!(path = %path.display(), "Summary exported");
                written.push(path);
            }
            Err(e) => {
                discard_all(pending.chain(std::iter::once(report))).await;
                return Err(e);
            }
        }
    }
    let html_path = report.commit().await?;
    tracing::info!(path = %html_path.display(), runtimes = set.len(), "Report generated");

    Ok(ReportOutcome {
        html: html_path,
        exports: written,
        runtimes: set.labels().map(str::to_string).collect(),
    })
}

async fn discard_all(files: impl IntoIterator<Item = StagedFile>) {
    for file in files {
        file.discard().await;
    }
}

/// What the collector selected for one configured runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RuntimeStatus {
    pub label: RuntimeLabel,
    pub source: Option<String>,
    pub captured_at: Option<DateTime<Utc>>,
    pub metric_count: usize,
}

impl RuntimeStatus {
    pub fn is_missing(&self) -> bool {
        self.source.is_none()
    }
}

/// Report the selected result file of every configured runtime without
/// rendering anything.
pub async fn inspect(settings: &ReportSettings) -> Result<Vec<RuntimeStatus>, ReportError> {
    settings.validate()?;
    let set = collector::collect(&settings.results_dir(), &settings.runtimes).await?;

    Ok(settings
        .runtimes
        .iter()
        .map(|label| match set.get(label) {
            Some(artifact) => RuntimeStatus {
                label: label.clone(),
                source: Some(artifact.source.clone()),
                captured_at: Some(artifact.captured_at),
                metric_count: artifact.metrics.len(),
            },
            None => RuntimeStatus {
                label: label.clone(),
                source: None,
                captured_at: None,
                metric_count: 0,
            },
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
