use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// No configured runtime produced a usable result file.
    #[error("No benchmark data found in {}", dir.display())]
    NoData { dir: PathBuf },

    /// One result file could not be read or decoded. Recovered per runtime.
    #[error("Parse error in {source_file}: {message}")]
    Parse { source_file: String, message: String },

    #[error("Cannot write report to {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
