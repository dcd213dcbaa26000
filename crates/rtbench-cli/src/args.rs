use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rtbench_core::{ReportError, ReportSettings};

/// Compare runtime benchmark results and render an HTML report.
#[derive(Parser, Debug)]
#[command(name = "rtbench", author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Used when no subcommand is given.
    #[command(flatten)]
    pub generate: GenerateArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the report from the newest result file of each runtime.
    Generate(GenerateArgs),

    /// Show which result file would be used for each runtime.
    Inspect(SourceArgs),
}

/// Where results come from and which runtimes to compare.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct SourceArgs {
    /// Benchmark root; `results/` and the report are resolved against it.
    #[arg(long, env = "RTBENCH_ROOT")]
    pub root: Option<PathBuf>,

    /// Result directory (default: `<root>/results`).
    #[arg(long = "results", env = "RTBENCH_RESULTS_DIR")]
    pub results_dir: Option<PathBuf>,

    /// Runtime to compare; repeat for several (default: fpm, swoole, franken).
    #[arg(long = "runtime", value_name = "LABEL")]
    pub runtimes: Vec<String>,

    /// JSON settings file.
    #[arg(long, env = "RTBENCH_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Report file (default: `<root>/benchmark-report.html`).
    #[arg(short, long, env = "RTBENCH_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Also write a CSV summary next to the report.
    #[arg(long)]
    pub csv: bool,

    /// Also write a JSON summary next to the report.
    #[arg(long)]
    pub json: bool,
}

impl SourceArgs {
    /// Settings from the config file (or defaults) with command-line values
    /// applied on top.
    pub async fn settings(&self) -> Result<ReportSettings, ReportError> {
        let base = match &self.config {
            Some(path) => ReportSettings::load(path).await?,
            None => ReportSettings::default(),
        };
        let settings = self.apply(base);
        settings.validate()?;
        Ok(settings)
    }

    fn apply(&self, mut settings: ReportSettings) -> ReportSettings {
        if let Some(root) = &self.root {
            settings.root = root.clone();
        }
        if let Some(dir) = &self.results_dir {
            settings.results_dir = Some(dir.clone());
        }
        if !self.runtimes.is_empty() {
            settings.runtimes = self.runtimes.clone();
        }
        settings
    }
}

impl GenerateArgs {
    pub async fn settings(&self) -> Result<ReportSettings, ReportError> {
        let mut settings = self.source.settings().await?;
        if let Some(output) = &self.output {
            settings.output = Some(output.clone());
        }
        Ok(settings)
    }
}
