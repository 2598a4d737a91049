/// HTTP surface of the delay-risk service.
///
/// Thin adapter over `ScoringContext`: request parsing, batch size limit and
/// response shaping only.
use actix_web::{get, post, web, HttpResponse};
use serde_json::json;
use std::sync::Arc;

use crate::error::{Result, ScoringError};
use crate::models::{BatchScoreResponse, HealthResponse, OrderRecord, OrderScoreResponse};
use crate::services::ScoringContext;

/// Request body limit; a full batch of open orders is well below this.
const JSON_LIMIT_BYTES: usize = 8 * 1024 * 1024;

pub struct AppState {
    pub scoring: Arc<ScoringContext>,
    pub batch_max_size: usize,
}

/// Register routes and JSON extraction settings.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_LIMIT_BYTES)
            .error_handler(|err, _req| ScoringError::validation("body", err.to_string()).into()),
    )
    .service(root)
    .service(health)
    .service(score_order)
    .service(batch_score);
}

#[get("/")]
pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "message": "ERP Delay Risk API is running"
    }))
}

#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let schema = state.scoring.schema();

    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        model_kind: state.scoring.model_kind().to_string(),
        schema_fingerprint: schema.fingerprint().to_string(),
        feature_count: schema.len(),
    })
}

/// POST /score_order
#[post("/score_order")]
pub async fn score_order(
    state: web::Data<AppState>,
    order: web::Json<OrderRecord>,
) -> Result<HttpResponse> {
    let prediction = state.scoring.score_one(&order)?;
    Ok(HttpResponse::Ok().json(OrderScoreResponse::from(&prediction)))
}

/// POST /batch_score
///
/// Scores the whole array as one unit on the blocking pool.
#[post("/batch_score")]
pub async fn batch_score(
    state: web::Data<AppState>,
    orders: web::Json<Vec<OrderRecord>>,
) -> Result<HttpResponse> {
    let orders = orders.into_inner();

    if orders.len() > state.batch_max_size {
        return Err(ScoringError::validation(
            "orders",
            format!(
                "batch of {} orders exceeds the limit of {}",
                orders.len(),
                state.batch_max_size
            ),
        ));
    }

    let scoring = Arc::clone(&state.scoring);
    let batch = web::block(move || scoring.score_many(&orders))
        .await
        .map_err(|e| ScoringError::Internal(format!("blocking task failed: {}", e)))??;

    Ok(HttpResponse::Ok().json(BatchScoreResponse::from(&batch)))
}
