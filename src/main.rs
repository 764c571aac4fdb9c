use anyhow::Result;
use clap::Parser;
use repo_pretrain::cli::{init_tracing, run, Cli};

fn main() -> Result<()> {
    // Load environment (RUST_LOG may live in .env)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.logging_level.as_deref());
    tracing::info!("CLI application startup: tracing initialised, environment loaded");

    let result = run(cli);
    match &result {
        Ok(report) => tracing::info!(
            produced = report.produced,
            failed = report.failed.len(),
            "CLI completed successfully"
        ),
        Err(e) => tracing::error!(error = %e, "CLI exited with error"),
    }
    result.map(|_| ())
}
