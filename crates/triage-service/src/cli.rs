//! Command-line interface: `serve`, `bench`, `report`, `presets`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use triage::{
    format_report, load_golden_tickets, DraftComposer, ExtractionProvider, HarnessConfig,
    MetricsHarness, MetricsResults, OpenAiDraftProvider, Preset, RecentTicketMemory,
    TriageService,
};

use crate::config::ServiceConfig;
use crate::server::{self, AppState};

/// Default metrics results file, shared by `bench` and `report`.
pub const DEFAULT_RESULTS_PATH: &str = ".metrics_results.json";

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML file overlaid on the environment configuration
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP triage service
    Serve {
        /// Listen address (overrides TRIAGE_BIND)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Replay the golden ticket set and write the metrics results file
    Bench {
        /// Golden ticket fixture
        #[arg(long, default_value = "triage/tests/fixtures/golden_tickets.json")]
        golden: PathBuf,

        /// Metrics results output
        #[arg(long, default_value = DEFAULT_RESULTS_PATH)]
        out: PathBuf,

        /// Also render the Markdown report to this path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Comma-separated thresholds for the correctness pass
        #[arg(long, value_delimiter = ',')]
        thresholds: Vec<f64>,

        /// Repetitions per stability ticket
        #[arg(long)]
        runs: Option<usize>,
    },

    /// Render the Markdown report from a metrics results file
    Report {
        /// Metrics results input
        #[arg(long, default_value = DEFAULT_RESULTS_PATH)]
        input: PathBuf,

        /// Write here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// List the preset schemas accepted by `/analyze` and the golden set
    Presets,
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = ServiceConfig::load(cli.config.as_deref())?;
    match cli.command {
        Command::Serve { bind } => {
            let addr = bind.unwrap_or_else(|| config.bind.clone());
            serve(&config, &addr).await
        }
        Command::Bench {
            golden,
            out,
            report,
            thresholds,
            runs,
        } => {
            let mut harness = HarnessConfig::default();
            if !thresholds.is_empty() {
                harness.thresholds = thresholds;
            }
            if let Some(runs) = runs {
                harness.stability_runs = runs;
            }
            bench(&config, &golden, &out, report.as_deref(), harness).await
        }
        Command::Report { input, out } => {
            let markdown = render_report(&input)?;
            match out {
                Some(path) => write_report(&path, &markdown),
                None => {
                    print!("{markdown}");
                    Ok(())
                }
            }
        }
        Command::Presets => {
            print!("{}", preset_listing());
            Ok(())
        }
    }
}

/// One line per preset: key, display name, description.
pub fn preset_listing() -> String {
    Preset::ALL
        .iter()
        .map(|p| format!("{:<14} {} - {}\n", p.key(), p.name(), p.description()))
        .collect()
}

/// Wire the shared memory into both the triage service and the draft composer.
pub fn build_state(config: &ServiceConfig) -> Result<AppState> {
    let memory = Arc::new(RecentTicketMemory::with_capacity(config.memory_capacity));
    let extractor = Arc::new(config.extractor()?);
    let drafter = OpenAiDraftProvider::new(config.draft_settings())
        .context("Failed to build draft client")?;
    if config.draft.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; /draft will answer 503");
    }

    let triage = TriageService::new(extractor, memory.clone(), config.triage_config());
    let drafts = DraftComposer::new(Arc::new(drafter), memory);
    Ok(AppState::new(triage, drafts))
}

async fn serve(config: &ServiceConfig, addr: &str) -> Result<()> {
    let state = build_state(config)?;
    info!(
        extractor = %config.extractor_url,
        model = %config.model_id,
        draft_model = %config.draft.model,
        memory_capacity = config.memory_capacity,
        "Triage service starting"
    );
    server::serve(state, addr).await
}

async fn bench(
    config: &ServiceConfig,
    golden_path: &Path,
    out: &Path,
    report: Option<&Path>,
    harness_config: HarnessConfig,
) -> Result<()> {
    let golden = load_golden_tickets(golden_path)?;
    info!(tickets = golden.len(), path = %golden_path.display(), "Loaded golden tickets");

    let extractor = config.extractor()?;
    if !extractor.is_available().await {
        warn!(url = %config.extractor_url, "Extraction model is not reporting healthy");
    }
    let service = TriageService::new(
        Arc::new(extractor),
        Arc::new(RecentTicketMemory::with_capacity(config.memory_capacity)),
        config.triage_config(),
    );

    let results = MetricsHarness::new(&service, &golden, harness_config)
        .run()
        .await?;
    results.write_to(out)?;
    info!(path = %out.display(), "Metrics results written");

    if let Some(path) = report {
        write_report(path, &format_report(&results))?;
    }
    Ok(())
}

pub fn render_report(input: &Path) -> Result<String> {
    let results = MetricsResults::read_from(input)
        .with_context(|| format!("Run `bench` first to produce {}", input.display()))?;
    Ok(format_report(&results))
}

fn write_report(path: &Path, markdown: &str) -> Result<()> {
    std::fs::write(path, markdown)
        .with_context(|| format!("Failed to write report {}", path.display()))?;
    info!(path = %path.display(), "Report written");
    Ok(())
}
