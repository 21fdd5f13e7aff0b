// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use orderflow_cli::commands::{self, RouteInputs};
use orderflow_extract_router::RuleExtractionOutcome;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "orderflow", version, about = "OrderFlow operator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a configuration file and print any warnings.
    ConfigValidate {
        /// Path to the TOML configuration file.
        file: PathBuf,
    },

    /// Show the extractor router's decision for a document (§4.4), for
    /// diagnosing why something did or didn't escalate to an LLM.
    Route {
        /// Path to the document (extension determines its media kind).
        file: PathBuf,

        /// Text coverage ratio, for PDFs (0.0-1.0).
        #[arg(long, default_value_t = 1.0)]
        text_coverage_ratio: f64,

        /// Total extracted text character count, for PDFs.
        #[arg(long, default_value_t = 0)]
        text_chars_total: usize,

        /// Page count, for PDFs.
        #[arg(long, default_value_t = 1)]
        page_count: u32,

        /// Line count from a prior rule-extraction pass, if any.
        #[arg(long)]
        rule_line_count: Option<usize>,

        /// Rule extractor's own confidence, if `rule_line_count` is given.
        #[arg(long, default_value_t = 0.0)]
        rule_confidence: f64,

        /// Lines missing both SKU and description from the rule pass.
        #[arg(long, default_value_t = 0)]
        rule_lines_missing_sku_and_description: usize,

        /// Treat this as an operator-forced retry.
        #[arg(long)]
        operator_retry: bool,

        /// Maximum page count an LLM call may be dispatched for.
        #[arg(long, default_value_t = 20)]
        max_page_count: u32,

        /// Maximum estimated tokens a single LLM call may consume.
        #[arg(long, default_value_t = 50_000)]
        max_tokens_per_call: u64,

        /// Treat the tenant's daily AI cost budget as exhausted.
        #[arg(long)]
        budget_exhausted: bool,
    },

    /// Query the daemon's `/health` endpoint.
    Health {
        /// Base URL of a running `orderflow-daemon`.
        #[arg(long, default_value = "http://127.0.0.1:8089")]
        daemon_url: String,
    },

    /// Query the daemon's `/queue/stats` endpoint.
    QueueStats {
        /// Base URL of a running `orderflow-daemon`.
        #[arg(long, default_value = "http://127.0.0.1:8089")]
        daemon_url: String,
    },

    /// Query the daemon's `/workers/stats` endpoint.
    WorkerStats {
        /// Base URL of a running `orderflow-daemon`.
        #[arg(long, default_value = "http://127.0.0.1:8089")]
        daemon_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug { EnvFilter::new("orderflow=debug") } else { EnvFilter::new("orderflow=info") };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::ConfigValidate { file } => {
            let (config, warnings) = commands::validate_config_file(&file)?;
            println!("configuration valid: {} tenant(s) configured", config.tenants.len());
            for warning in &warnings {
                println!("warning: {warning}");
            }
        }
        Commands::Route {
            file,
            text_coverage_ratio,
            text_chars_total,
            page_count,
            rule_line_count,
            rule_confidence,
            rule_lines_missing_sku_and_description,
            operator_retry,
            max_page_count,
            max_tokens_per_call,
            budget_exhausted,
        } => {
            let media_kind = commands::media_kind_from_path(&file)?;
            let rule_outcome = rule_line_count.map(|line_count| RuleExtractionOutcome {
                line_count,
                extraction_confidence: rule_confidence,
                lines_missing_sku_and_description: rule_lines_missing_sku_and_description,
            });
            let inputs = RouteInputs {
                media_kind,
                text_coverage_ratio,
                text_chars_total,
                page_count,
                rule_outcome,
                operator_retry,
                max_page_count,
                max_tokens_per_call,
                tenant_daily_budget_exhausted: budget_exhausted,
            };
            let choice = commands::route_decision(&inputs);
            println!("{}", serde_json::to_string_pretty(&choice)?);
        }
        Commands::Health { daemon_url } => {
            let body = commands::fetch_json(&daemon_url, "/health").await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Commands::QueueStats { daemon_url } => {
            let body = commands::fetch_json(&daemon_url, "/queue/stats").await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Commands::WorkerStats { daemon_url } => {
            let body = commands::fetch_json(&daemon_url, "/workers/stats").await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}
