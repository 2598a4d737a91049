use actix_web::{middleware, web, App, HttpServer};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use delay_risk_service::{handlers, AppState, Config, ScoringContext};

#[actix_web::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize tracing
    init_tracing(&config);

    config
        .validate()
        .context("Configuration validation failed")?;

    info!(
        "Starting delay-risk-service v{} on {}:{}",
        env!("CARGO_PKG_VERSION"),
        config.http_host,
        config.http_port
    );

    // The model must be loaded before accepting traffic; no degraded mode.
    let scoring = match ScoringContext::load(&config) {
        Ok(scoring) => Arc::new(scoring),
        Err(e) => {
            error!("Failed to load late-shipment model: {}", e);
            return Err(e).context("Refusing to start without a model");
        }
    };

    let state = web::Data::new(AppState {
        scoring,
        batch_max_size: config.batch_max_size,
    });

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind((config.http_host.as_str(), config.http_port))
    .with_context(|| format!("Failed to bind {}:{}", config.http_host, config.http_port))?
    .run()
    .await
    .context("HTTP server error")?;

    info!("delay-risk-service stopped");
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_log_filter()));

    if config.json_logs() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}
