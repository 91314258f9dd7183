//! Support ticket triage service
//!
//! # Usage
//!
//! ```bash
//! # HTTP service (extraction sidecar on TRIAGE_EXTRACTOR_URL)
//! triage-service serve --bind 0.0.0.0:8000
//!
//! # Golden-set metrics, then the Markdown report
//! triage-service bench --report METRICS_REPORT.md
//! triage-service report --input .metrics_results.json
//! ```

use anyhow::Result;
use clap::Parser;
use triage_service::cli::{self, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    cli::run(Cli::parse()).await
}
