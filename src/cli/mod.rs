use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::providers::Providers;
use crate::services::{self, ExchangeRateService, RunSummary};

#[derive(Parser)]
#[command(name = "journal-ingest")]
#[command(about = "Refresh shared market data for the trading journal")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Store the current Santiment snapshot")]
    MarketData {
        #[arg(long, help = "Asset slug, defaults to SANTIMENT_ASSET")]
        asset: Option<String>,
    },

    #[command(about = "Run the Dune whale-flow query and store its rows")]
    Dune {
        #[arg(long, help = "Query id, defaults to DUNE_QUERY_ID")]
        query_id: Option<u64>,
    },

    #[command(about = "Refresh the cached USD to VND exchange rate")]
    ExchangeRate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

#[derive(Debug, Serialize)]
struct RateSummary {
    rate: f64,
}

pub async fn run(cli: Cli, config: &AppConfig) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    let pool = DatabaseManager::connect(&config.database)
        .context("failed to configure database pool")?;
    let providers = Providers::from_config(&config.providers)
        .context("failed to build provider clients")?;

    match cli.command {
        Commands::MarketData { asset } => {
            let asset = asset.unwrap_or_else(|| config.providers.santiment_asset.clone());
            let summary = services::ingest_market_data(&pool, &providers.santiment, &asset).await?;
            print_summary(&summary, output_format)
        }
        Commands::Dune { query_id } => {
            let query_id = query_id.unwrap_or(config.providers.dune_query_id);
            let summary = services::ingest_dune(&pool, &providers.dune, query_id).await?;
            print_summary(&summary, output_format)
        }
        Commands::ExchangeRate => {
            // A zero TTL forces a fetch from the provider
            let service =
                ExchangeRateService::new(pool, &providers.currency, chrono::Duration::zero());
            let rate = service.usd_to_vnd().await?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string(&RateSummary { rate })?),
                OutputFormat::Text => println!("USD/VND rate: {}", rate),
            }
            Ok(())
        }
    }
}

fn print_summary(summary: &RunSummary, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(summary)?),
        OutputFormat::Text => println!("{}", summary.message),
    }
    Ok(())
}

