mod args;

use std::process::ExitCode;

use clap::Parser;
use rtbench_core::{ExportOptions, ReportError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use args::{Cli, Commands, GenerateArgs, SourceArgs};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout only carries the command's result.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rtbench=info,rtbench_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Some(Commands::Generate(args)) => generate(&args).await,
        Some(Commands::Inspect(args)) => inspect(&args).await,
        None => generate(&cli.generate).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn generate(args: &GenerateArgs) -> Result<(), ReportError> {
    let settings = args.settings().await?;
    tracing::debug!(?settings, "Resolved settings");
    let exports = ExportOptions {
        csv: args.csv,
        json: args.json,
    };

    let outcome = rtbench_core::generate(&settings, exports, chrono::Utc::now()).await?;

    println!("Report generated: {}", outcome.html.display());
    for path in &outcome.exports {
        println!("Summary written: {}", path.display());
    }
    Ok(())
}

async fn inspect(args: &SourceArgs) -> Result<(), ReportError> {
    let settings = args.settings().await?;
    let statuses = rtbench_core::inspect(&settings).await?;

    let width = statuses.iter().map(|s| s.label.len()).max().unwrap_or(0);
    for status in &statuses {
        match (&status.source, status.captured_at) {
            (Some(source), Some(at)) => println!(
                "{:<width$}  {}  {}  {} metrics",
                status.label,
                source,
                at.format("%Y-%m-%d %H:%M:%S UTC"),
                status.metric_count,
            ),
            _ => println!("{:<width$}  missing", status.label),
        }
    }
    Ok(())
}
