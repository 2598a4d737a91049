use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // HTTP server config
    pub http_host: String,
    pub http_port: u16,

    // Model artifact (classifier + feature schema, loaded as a pair)
    pub model_path: String,
    pub schema_path: String,

    // Scoring
    pub decision_threshold: f64,
    pub batch_max_size: usize,

    // Observability
    pub log_level: String,
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();

        let config = config::Config::builder()
            .set_default("http_host", "0.0.0.0")?
            .set_default("http_port", 8012)?
            .set_default("model_path", "models/delay_model.onnx")?
            .set_default("schema_path", "models/feature_columns.json")?
            .set_default("decision_threshold", 0.5)?
            .set_default("batch_max_size", 1000)?
            .set_default("log_level", "info")?
            .set_default("log_format", "text")?
            .add_source(config::Environment::default().separator("__"))
            .build()?;

        config.try_deserialize()
    }

    pub fn validate(&self) -> Result<()> {
        if self.http_port == 0 {
            return Err(anyhow!("HTTP port must be greater than 0"));
        }

        if self.model_path.is_empty() {
            return Err(anyhow!("Model path is required"));
        }

        if self.schema_path.is_empty() {
            return Err(anyhow!("Schema path is required"));
        }

        if !(0.0..=1.0).contains(&self.decision_threshold) {
            return Err(anyhow!("Decision threshold must be between 0 and 1"));
        }

        if self.batch_max_size == 0 || self.batch_max_size > 100_000 {
            return Err(anyhow!("Batch max size must be between 1 and 100000"));
        }

        Ok(())
    }

    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> String {
        format!("{},actix_web=info,delay_risk_service={}", self.log_level, self.log_level)
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}
