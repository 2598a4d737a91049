#![allow(dead_code)]

use delay_risk_service::models::OrderRecord;
use delay_risk_service::{Config, ScoringContext};
use std::path::{Path, PathBuf};

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn test_config() -> Config {
    Config {
        http_host: "127.0.0.1".to_string(),
        http_port: 8012,
        model_path: fixture("delay_model.json").display().to_string(),
        schema_path: fixture("feature_columns.json").display().to_string(),
        decision_threshold: 0.5,
        batch_max_size: 10,
        log_level: "debug".to_string(),
        log_format: "text".to_string(),
    }
}

pub fn load_context() -> ScoringContext {
    ScoringContext::load(&test_config()).expect("fixture model loads")
}

/// On-time order: healthy stock, reliable supplier, plant A.
pub fn on_time_order(order_id: &str) -> OrderRecord {
    OrderRecord::new()
        .with("order_id", order_id)
        .with("customer_id", "C0042")
        .with("item_id", "ITEM0007")
        .with("plant", "PLANT_A")
        .with("order_date", "2024-03-01")
        .with("requested_ship_date", "2024-03-06")
        .with("promised_ship_date", "2024-03-08")
        .with("order_priority", 2i64)
        .with("order_qty", 120i64)
        .with("current_available_qty", 80i64)
        .with("historical_lead_time_days", 7.2)
        .with("supplier_reliability_score", 0.91)
        .with("num_open_orders_customer", 4i64)
        .with("past_due_invoices_flag", 0i64)
        .with("weekday_ordered", 4i64)
        .with("month_ordered", 3i64)
}

/// Late order: low priority, short stock, shaky supplier, past-due invoices.
pub fn late_order(order_id: &str) -> OrderRecord {
    on_time_order(order_id)
        .with("customer_id", "C0107")
        .with("plant", "PLANT_C")
        .with("order_priority", 3i64)
        .with("order_qty", 300i64)
        .with("current_available_qty", 50i64)
        .with("supplier_reliability_score", 0.6)
        .with("past_due_invoices_flag", 1i64)
}
