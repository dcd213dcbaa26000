use super::{Badge, ReportModel};
use crate::error::ReportError;

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Export the runtime summaries as CSV.
///
/// One row per runtime, in report order. The fixed columns are followed by
/// one `<scenario>_avg_ms` column per workload. Missing values are `N/A`.
pub fn export_csv(model: &ReportModel) -> Result<String, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header: Vec<String> = [
        "runtime",
        "source",
        "captured_at",
        "throughput_rps",
        "avg_latency_ms",
        "p95_latency_ms",
        "success_rate_pct",
        "fastest",
        "most_efficient",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    header.extend(model.scenarios.iter().map(|s| format!("{}_avg_ms", s.scenario)));
    writer.write_record(&header)?;

    for (i, card) in model.runtimes.iter().enumerate() {
        let mut record = vec![
            card.label.clone(),
            card.source.clone(),
            card.captured_at.clone(),
            card.throughput.to_string(),
            card.avg_latency.to_string(),
            card.p95_latency.to_string(),
            card.success_rate.to_string(),
            card.badges.contains(&Badge::Fastest).to_string(),
            card.badges.contains(&Badge::MostEfficient).to_string(),
        ];
        // Scenario cells are laid out in the same runtime order as the cards.
        record.extend(model.scenarios.iter().map(|row| {
            row.cells
                .get(i)
                .map(|cell| cell.avg.to_string())
                .unwrap_or_else(|| super::NOT_AVAILABLE.to_string())
        }));
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| ReportError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

// ---------------------------------------------------------------------------
// JSON export
// ---------------------------------------------------------------------------

/// Export the report model as pretty-printed JSON.
pub fn export_json(model: &ReportModel) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(model)?)
}
