pub mod collector;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod results;
pub mod settings;

pub use error::ReportError;
pub use pipeline::{generate, inspect, ExportOptions, ReportOutcome, RuntimeStatus};
pub use results::{ComparisonSet, MetricSummary, ResultArtifact, RuntimeLabel};
pub use settings::ReportSettings;
