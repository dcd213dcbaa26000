pub mod schema;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ReportError;

/// Name of one benchmarked runtime, e.g. `fpm` or `swoole`.
pub type RuntimeLabel = String;

// ---------------------------------------------------------------------------
// MetricSummary — one metric of a k6 summary export
// ---------------------------------------------------------------------------

/// Statistical summary of a single k6 metric.
///
/// Only numeric entries of the `values` object are kept. Which fields exist
/// depends on the metric type: trends carry `avg`/`p(95)`, counters and rates
/// carry `rate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    /// k6 metric type (`counter`, `trend`, `rate`, `gauge`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub values: BTreeMap<String, f64>,
}

impl MetricSummary {
    pub fn value(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied()
    }

    /// Events per second.
    pub fn rate(&self) -> Option<f64> {
        self.value(schema::field::RATE)
    }

    pub fn avg(&self) -> Option<f64> {
        self.value(schema::field::AVG)
    }

    pub fn p95(&self) -> Option<f64> {
        self.value(schema::field::P95)
    }

    /// Build a summary from one metric object of the export. Returns `None`
    /// when the object has no `values` object.
    fn from_json(metric: &Value) -> Option<Self> {
        let values = metric.get("values")?.as_object()?;
        let kind = metric
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_string);
        let values = values
            .iter()
            .filter_map(|(field, v)| v.as_f64().map(|n| (field.clone(), n)))
            .collect();
        Some(Self { kind, values })
    }
}

/// Decode the metrics of one result file.
///
/// Accepts either a full k6 summary export (`{"metrics": {...}, ...}`) or a
/// bare mapping of metric name to metric object. Metric entries without a
/// `values` object are skipped; a document with no usable metric at all is
/// rejected.
pub fn parse_metrics(
    source_file: &str,
    content: &str,
) -> Result<BTreeMap<String, MetricSummary>, ReportError> {
    let parse_err = |message: String| ReportError::Parse {
        source_file: source_file.to_string(),
        message,
    };

    let doc: Value = serde_json::from_str(content).map_err(|e| parse_err(e.to_string()))?;
    let root = doc
        .as_object()
        .ok_or_else(|| parse_err("top-level value is not an object".to_string()))?;

    let metrics = match root.get("metrics") {
        Some(Value::Object(inner)) => inner,
        Some(_) => return Err(parse_err("`metrics` is not an object".to_string())),
        None => root,
    };

    let parsed: BTreeMap<String, MetricSummary> = metrics
        .iter()
        .filter_map(|(name, metric)| {
            MetricSummary::from_json(metric).map(|summary| (name.clone(), summary))
        })
        .collect();

    if parsed.is_empty() {
        return Err(parse_err("no metrics with a `values` object".to_string()));
    }
    Ok(parsed)
}

// ---------------------------------------------------------------------------
// ResultArtifact — latest parsed result file of one runtime
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResultArtifact {
    pub label: RuntimeLabel,
    /// File name the metrics were read from.
    pub source: String,
    /// Modification time of the source file.
    pub captured_at: DateTime<Utc>,
    pub metrics: BTreeMap<String, MetricSummary>,
}

impl ResultArtifact {
    pub fn metric(&self, name: &str) -> Option<&MetricSummary> {
        self.metrics.get(name)
    }

    /// Look up `field` of metric `name`; `None` when either is absent.
    pub fn value(&self, name: &str, field: &str) -> Option<f64> {
        self.metric(name).and_then(|m| m.value(field))
    }

    /// Throughput in requests per second.
    pub fn throughput(&self) -> Option<f64> {
        self.value(schema::TOTAL_REQUESTS, schema::field::RATE)
    }

    /// Mean request duration (ms).
    pub fn avg_latency(&self) -> Option<f64> {
        self.value(schema::REQUEST_DURATION, schema::field::AVG)
    }

    pub fn p95_latency(&self) -> Option<f64> {
        self.value(schema::REQUEST_DURATION, schema::field::P95)
    }

    /// Share of failed requests in `0.0..=1.0`.
    pub fn error_rate(&self) -> Option<f64> {
        self.value(schema::REQUEST_FAILED, schema::field::RATE)
    }
}

// ---------------------------------------------------------------------------
// ComparisonSet — one artifact per runtime, in label order
// ---------------------------------------------------------------------------

/// The artifacts being compared, at most one per runtime label.
///
/// Iteration order is insertion order, which the collector keeps equal to the
/// configured label order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComparisonSet {
    artifacts: Vec<ResultArtifact>,
}

impl ComparisonSet {
    /// Build a set from artifacts in the given order.
    ///
    /// When the same label appears twice, the artifact captured later wins
    /// (greater file name on equal times) and keeps the first slot.
    pub fn from_artifacts(artifacts: impl IntoIterator<Item = ResultArtifact>) -> Self {
        let mut set = Self::default();
        for artifact in artifacts {
            match set.artifacts.iter_mut().find(|a| a.label == artifact.label) {
                Some(existing) => {
                    if (artifact.captured_at, &artifact.source)
                        > (existing.captured_at, &existing.source)
                    {
                        *existing = artifact;
                    }
                }
                None => set.artifacts.push(artifact),
            }
        }
        set
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<&ResultArtifact> {
        self.artifacts.iter().find(|a| a.label == label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.artifacts.iter().map(|a| a.label.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResultArtifact> {
        self.artifacts.iter()
    }
}

impl<'a> IntoIterator for &'a ComparisonSet {
    type Item = &'a ResultArtifact;
    type IntoIter = std::slice::Iter<'a, ResultArtifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Build an artifact from `(metric, field, value)` triples.
    pub(crate) fn make_artifact(
        label: &str,
        source: &str,
        secs: i64,
        values: &[(&str, &str, f64)],
    ) -> ResultArtifact {
        let mut metrics: BTreeMap<String, MetricSummary> = BTreeMap::new();
        for (metric, field, value) in values {
            metrics
                .entry(metric.to_string())
                .or_default()
                .values
                .insert(field.to_string(), *value);
        }
        ResultArtifact {
            label: label.to_string(),
            source: source.to_string(),
            captured_at: Utc.timestamp_opt(secs, 0).unwrap(),
            metrics,
        }
    }

    // -----------------------------------------------------------------------
    // parse_metrics
    // -----------------------------------------------------------------------

    #[test]
    fn parse_bare_metric_mapping() {
        let json = r#"{
            "http_reqs": {"values": {"rate": 1000}},
            "http_req_duration": {"values": {"avg": 12.3, "p(95)": 20.1}}
        }"#;
        let metrics = parse_metrics("fpm_1.json", json).expect("should parse");
        assert_eq!(metrics["http_reqs"].rate(), Some(1000.0));
        assert_eq!(metrics["http_req_duration"].avg(), Some(12.3));
        assert_eq!(metrics["http_req_duration"].p95(), Some(20.1));
    }

    #[test]
    fn parse_full_k6_export_uses_metrics_member() {
        let json = r#"{
            "root_group": {"name": "", "checks": []},
            "options": {"summaryTrendStats": ["avg", "p(95)"]},
            "metrics": {
                "http_req_failed": {
                    "type": "rate",
                    "contains": "default",
                    "values": {"rate": 0.02, "passes": 20, "fails": 980},
                    "thresholds": {"rate<0.10": {"ok": true}}
                }
            }
        }"#;
        let metrics = parse_metrics("swoole_1.json", json).expect("should parse");
        assert_eq!(metrics.len(), 1);
        let failed = &metrics["http_req_failed"];
        assert_eq!(failed.kind.as_deref(), Some("rate"));
        assert_eq!(failed.rate(), Some(0.02));
        assert_eq!(failed.value("fails"), Some(980.0));
    }

    #[test]
    fn parse_ignores_non_numeric_values_and_metrics_without_values() {
        let json = r#"{
            "http_reqs": {"values": {"rate": 5, "note": "fast"}},
            "broken": {"type": "trend"},
            "also_broken": 42
        }"#;
        let metrics = parse_metrics("x.json", json).expect("should parse");
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics["http_reqs"].values.len(), 1);
    }

    #[test]
    fn parse_rejects_malformed_json() {
        let err = parse_metrics("fpm_bad.json", "{not json").unwrap_err();
        match err {
            ReportError::Parse { source_file, .. } => assert_eq!(source_file, "fpm_bad.json"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parse_rejects_non_object_document() {
        assert!(parse_metrics("a.json", "[1, 2, 3]").is_err());
        assert!(parse_metrics("a.json", r#"{"metrics": []}"#).is_err());
    }

    #[test]
    fn parse_rejects_document_without_metrics() {
        assert!(parse_metrics("a.json", "{}").is_err());
        assert!(parse_metrics("a.json", r#"{"metrics": {}}"#).is_err());
    }

    // -----------------------------------------------------------------------
    // ResultArtifact accessors
    // -----------------------------------------------------------------------

    #[test]
    fn artifact_accessors_read_well_known_metrics() {
        let a = make_artifact(
            "fpm",
            "fpm_1.json",
            0,
            &[
                ("http_reqs", "rate", 1000.0),
                ("http_req_duration", "avg", 12.3),
                ("http_req_duration", "p(95)", 20.1),
                ("http_req_failed", "rate", 0.0),
            ],
        );
        assert_eq!(a.throughput(), Some(1000.0));
        assert_eq!(a.avg_latency(), Some(12.3));
        assert_eq!(a.p95_latency(), Some(20.1));
        assert_eq!(a.error_rate(), Some(0.0));
    }

    #[test]
    fn artifact_missing_fields_are_none() {
        let a = make_artifact("fpm", "fpm_1.json", 0, &[("http_reqs", "count", 10.0)]);
        assert_eq!(a.throughput(), None);
        assert_eq!(a.avg_latency(), None);
        assert_eq!(a.error_rate(), None);
        assert!(a.metric("heavy_duration").is_none());
    }

    // -----------------------------------------------------------------------
    // ComparisonSet
    // -----------------------------------------------------------------------

    #[test]
    fn comparison_set_preserves_insertion_order() {
        let set = ComparisonSet::from_artifacts(vec![
            make_artifact("swoole", "swoole_1.json", 0, &[]),
            make_artifact("fpm", "fpm_1.json", 0, &[]),
        ]);
        let labels: Vec<_> = set.labels().collect();
        assert_eq!(labels, vec!["swoole", "fpm"]);
    }

    #[test]
    fn comparison_set_keeps_one_artifact_per_label() {
        let set = ComparisonSet::from_artifacts(vec![
            make_artifact("fpm", "fpm_old.json", 10, &[]),
            make_artifact("swoole", "swoole_1.json", 0, &[]),
            make_artifact("fpm", "fpm_new.json", 20, &[]),
        ]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("fpm").unwrap().source, "fpm_new.json");
        assert_eq!(set.labels().next(), Some("fpm"));
    }

    #[test]
    fn comparison_set_empty() {
        let set = ComparisonSet::from_artifacts(Vec::new());
        assert!(set.is_empty());
        assert!(set.get("fpm").is_none());
    }
}
