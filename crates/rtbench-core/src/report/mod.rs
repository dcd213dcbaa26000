pub mod export;
pub mod format;
pub mod io;
pub mod render;

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::results::schema::{self, ScenarioMetricKey};
use crate::results::{ComparisonSet, MetricSummary, ResultArtifact, RuntimeLabel};
use crate::settings::ReportSettings;

pub use format::{fixed2, round2, Figure, NOT_AVAILABLE};
pub use render::render_html;

// ---------------------------------------------------------------------------
// Rankings
// ---------------------------------------------------------------------------

/// Best-in-class marker shown on a runtime card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    /// Highest throughput of the set.
    Fastest,
    /// Lowest mean request duration of the set.
    MostEfficient,
}

/// Set-wide best values. Only artifacts that carry the metric take part.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rankings {
    pub max_throughput: Option<f64>,
    pub min_avg_latency: Option<f64>,
}

impl Rankings {
    pub fn compute(set: &ComparisonSet) -> Self {
        let max_throughput = set
            .iter()
            .filter_map(ResultArtifact::throughput)
            .fold(None, |best: Option<f64>, v| Some(best.map_or(v, |b| b.max(v))));
        let min_avg_latency = set
            .iter()
            .filter_map(ResultArtifact::avg_latency)
            .fold(None, |best: Option<f64>, v| Some(best.map_or(v, |b| b.min(v))));
        Self {
            max_throughput,
            min_avg_latency,
        }
    }

    /// Badges earned by `artifact`. The two badges are independent, and every
    /// runtime that ties with the best value gets the badge.
    pub fn badges_for(&self, artifact: &ResultArtifact) -> Vec<Badge> {
        let mut badges = Vec::new();
        if artifact.throughput().is_some() && artifact.throughput() == self.max_throughput {
            badges.push(Badge::Fastest);
        }
        if artifact.avg_latency().is_some() && artifact.avg_latency() == self.min_avg_latency {
            badges.push(Badge::MostEfficient);
        }
        badges
    }
}

// ---------------------------------------------------------------------------
// View model
// ---------------------------------------------------------------------------

/// Summary card of one runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RuntimeCard {
    pub label: RuntimeLabel,
    pub color: String,
    pub source: String,
    pub captured_at: String,
    /// Requests per second.
    pub throughput: Figure,
    pub avg_latency: Figure,
    pub p95_latency: Figure,
    /// `(1 - error rate) * 100`.
    pub success_rate: Figure,
    /// Error rate above the configured threshold.
    pub error_flag: bool,
    pub badges: Vec<Badge>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ScenarioCell {
    pub label: RuntimeLabel,
    pub avg: Figure,
}

/// One workload row of the latency table, with a cell per runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ScenarioRow {
    pub scenario: &'static str,
    pub metric: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub cells: Vec<ScenarioCell>,
}

/// Data embedded in the page for the client-side bar charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ChartPayload {
    pub runtimes: Vec<RuntimeLabel>,
    pub colors: BTreeMap<RuntimeLabel, String>,
    /// Every metric of every runtime, values rounded to two decimals.
    pub metrics: BTreeMap<RuntimeLabel, BTreeMap<String, MetricSummary>>,
    /// Requests per second, in `runtimes` order.
    pub throughput: Vec<Option<f64>>,
    /// p95 request duration (ms), in `runtimes` order.
    pub p95_latency: Vec<Option<f64>>,
}

/// Everything the renderer and the exports need, already formatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ReportModel {
    pub title: String,
    pub subtitle: String,
    pub generated_at: String,
    pub results_dir: String,
    pub runtimes: Vec<RuntimeCard>,
    pub scenarios: Vec<ScenarioRow>,
    pub chart: ChartPayload,
}

impl ReportModel {
    /// Derive the report contents from a comparison set.
    ///
    /// `generated_at` is the only time-dependent input; the same set and
    /// timestamp always give the same model.
    pub fn build(
        set: &ComparisonSet,
        settings: &ReportSettings,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let rankings = Rankings::compute(set);
        let runtimes = set
            .iter()
            .map(|artifact| build_card(artifact, &rankings, settings))
            .collect();
        let scenarios = schema::SCENARIOS
            .iter()
            .map(|key| build_scenario_row(key, set))
            .collect();

        let labels: Vec<RuntimeLabel> = set.labels().map(str::to_string).collect();
        Self {
            title: settings.title.clone(),
            subtitle: format!("Comparing {}", join_labels(&labels)),
            generated_at: generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            results_dir: settings.results_dir().display().to_string(),
            runtimes,
            scenarios,
            chart: build_chart(set, settings),
        }
    }
}

fn build_card(
    artifact: &ResultArtifact,
    rankings: &Rankings,
    settings: &ReportSettings,
) -> RuntimeCard {
    let error_rate = artifact.error_rate();
    RuntimeCard {
        label: artifact.label.clone(),
        color: settings.color_for(&artifact.label),
        source: artifact.source.clone(),
        captured_at: artifact
            .captured_at
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        throughput: artifact.throughput().into(),
        avg_latency: artifact.avg_latency().into(),
        p95_latency: artifact.p95_latency().into(),
        success_rate: error_rate.map(|r| (1.0 - r) * 100.0).into(),
        error_flag: error_rate.is_some_and(|r| r > settings.error_rate_threshold),
        badges: rankings.badges_for(artifact),
    }
}

fn build_scenario_row(key: &ScenarioMetricKey, set: &ComparisonSet) -> ScenarioRow {
    ScenarioRow {
        scenario: key.scenario,
        metric: key.metric,
        title: key.title,
        description: key.description,
        cells: set
            .iter()
            .map(|artifact| ScenarioCell {
                label: artifact.label.clone(),
                avg: artifact.value(key.metric, schema::field::AVG).into(),
            })
            .collect(),
    }
}

fn build_chart(set: &ComparisonSet, settings: &ReportSettings) -> ChartPayload {
    let rounded = |metrics: &BTreeMap<String, MetricSummary>| -> BTreeMap<String, MetricSummary> {
        metrics
            .iter()
            .map(|(name, m)| {
                let values = m
                    .values
                    .iter()
                    .filter(|(_, v)| v.is_finite())
                    .map(|(field, v)| (field.clone(), round2(*v)))
                    .collect();
                let summary = MetricSummary {
                    kind: m.kind.clone(),
                    values,
                };
                (name.clone(), summary)
            })
            .collect()
    };

    ChartPayload {
        runtimes: set.labels().map(str::to_string).collect(),
        colors: set
            .labels()
            .map(|l| (l.to_string(), settings.color_for(l)))
            .collect(),
        metrics: set
            .iter()
            .map(|a| (a.label.clone(), rounded(&a.metrics)))
            .collect(),
        throughput: set.iter().map(|a| a.throughput().map(round2)).collect(),
        p95_latency: set.iter().map(|a| a.p95_latency().map(round2)).collect(),
    }
}

/// `a`, `a and b`, `a, b and c`.
fn join_labels(labels: &[RuntimeLabel]) -> String {
    match labels {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
