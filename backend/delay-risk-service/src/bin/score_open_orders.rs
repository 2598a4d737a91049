//! Score an ERP open-orders CSV export in one batch and print the result as JSON.
//!
//! Uses the same configuration (model and schema paths) as the HTTP service.

use anyhow::{Context, Result};
use clap::Parser;
use delay_risk_service::models::BatchScoreResponse;
use delay_risk_service::services::{erp_source, ScoringContext};
use delay_risk_service::Config;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "score-open-orders", about = "Score open orders for late-shipment risk")]
struct Args {
    /// CSV export of open orders (header row required)
    #[arg(short, long)]
    input: String,

    /// Override the configured decision threshold
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Score only the first N orders
    #[arg(short, long)]
    limit: Option<usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(threshold) = args.threshold {
        config.decision_threshold = threshold;
    }

    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.default_log_filter())),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    config
        .validate()
        .context("Configuration validation failed")?;

    let scoring = ScoringContext::load(&config).context("Failed to load late-shipment model")?;

    let mut orders = erp_source::load_open_orders(&args.input, scoring.contract())
        .with_context(|| format!("Failed to read {}", args.input))?;
    if let Some(limit) = args.limit {
        orders.truncate(limit);
    }

    let batch = scoring
        .score_many(&orders)
        .context("Failed to score open orders")?;

    info!(
        orders = batch.summary.count,
        late = batch.summary.positive_count,
        late_rate = batch.summary.positive_rate,
        "Scored open orders"
    );

    let response = BatchScoreResponse::from(&batch);
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
