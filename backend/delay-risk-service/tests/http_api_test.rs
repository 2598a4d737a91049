mod common;

use actix_web::{http::StatusCode, test, web, App};
use common::{late_order, load_context, on_time_order};
use delay_risk_service::handlers;
use delay_risk_service::models::{BatchScoreResponse, HealthResponse, OrderScoreResponse};
use delay_risk_service::AppState;
use serde_json::Value;
use std::sync::Arc;

fn state() -> web::Data<AppState> {
    web::Data::new(AppState {
        scoring: Arc::new(load_context()),
        batch_max_size: 10,
    })
}

#[actix_web::test]
async fn root_reports_running() {
    let app =
        test::init_service(App::new().app_data(state()).configure(handlers::configure)).await;

    let resp: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp["status"], "ok");
}

#[actix_web::test]
async fn health_exposes_model_and_schema() {
    let app =
        test::init_service(App::new().app_data(state()).configure(handlers::configure)).await;

    let resp: HealthResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/health").to_request(),
    )
    .await;

    assert_eq!(resp.model_kind, "logistic");
    assert_eq!(resp.feature_count, 15);
    assert_eq!(resp.schema_fingerprint.len(), 64);
}

#[actix_web::test]
async fn score_order_returns_prediction() {
    let app =
        test::init_service(App::new().app_data(state()).configure(handlers::configure)).await;

    let resp: OrderScoreResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/score_order")
            .set_json(late_order("O100002"))
            .to_request(),
    )
    .await;

    assert_eq!(resp.order_id, "O100002");
    assert_eq!(resp.late_flag_pred, 1);
    assert!(resp.late_probability >= 0.5 && resp.late_probability <= 1.0);
}

#[actix_web::test]
async fn score_order_missing_field_returns_400() {
    let app =
        test::init_service(App::new().app_data(state()).configure(handlers::configure)).await;

    let mut order = on_time_order("O1");
    order.remove("plant");

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/score_order")
            .set_json(order)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["field"], "plant");
    assert_eq!(body["code"], 400);
}

#[actix_web::test]
async fn score_order_malformed_body_returns_400() {
    let app =
        test::init_service(App::new().app_data(state()).configure(handlers::configure)).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/score_order")
            .insert_header(("content-type", "application/json"))
            .set_payload(r#"{"order_id": ["not", "flat"]}"#)
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn batch_score_summarises_results() {
    let app =
        test::init_service(App::new().app_data(state()).configure(handlers::configure)).await;

    let orders = vec![late_order("O1"), on_time_order("O2"), late_order("O3")];
    let resp: BatchScoreResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/batch_score")
            .set_json(&orders)
            .to_request(),
    )
    .await;

    assert_eq!(resp.n_orders, 3);
    assert_eq!(resp.late_count, 2);
    assert!((resp.late_rate - 0.667).abs() < 1e-3);
    let ids: Vec<&str> = resp.results.iter().map(|r| r.order_id.as_str()).collect();
    assert_eq!(ids, vec!["O1", "O2", "O3"]);
}

#[actix_web::test]
async fn batch_score_empty_returns_zeros() {
    let app =
        test::init_service(App::new().app_data(state()).configure(handlers::configure)).await;

    let resp: BatchScoreResponse = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/batch_score")
            .set_json(Vec::<Value>::new())
            .to_request(),
    )
    .await;

    assert_eq!(resp.n_orders, 0);
    assert_eq!(resp.late_count, 0);
    assert_eq!(resp.late_rate, 0.0);
    assert!(resp.results.is_empty());
}

#[actix_web::test]
async fn batch_score_rejects_oversized_batch() {
    let app =
        test::init_service(App::new().app_data(state()).configure(handlers::configure)).await;

    let orders: Vec<_> = (0..11).map(|i| on_time_order(&format!("O{}", i))).collect();
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/batch_score")
            .set_json(&orders)
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn batch_score_reports_failing_record_index() {
    let app =
        test::init_service(App::new().app_data(state()).configure(handlers::configure)).await;

    let orders = vec![
        on_time_order("O1"),
        on_time_order("O2").with("order_date", "next tuesday"),
    ];
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/batch_score")
            .set_json(&orders)
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["record"], 1);
    assert_eq!(body["field"], "order_date");
}
