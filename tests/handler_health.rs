mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use link_pulse::domain::click_pipeline::PipelineConfig;

#[tokio::test]
async fn test_health_endpoint_success() {
    let ctx = common::create_test_state(PipelineConfig::default());
    let server = common::test_server(ctx.state.clone());

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["click_pipeline"]["status"], "ok");
    assert_eq!(json["checks"]["click_pipeline"]["state"], "running");
    assert_eq!(json["checks"]["click_pipeline"]["capacity"], 1024);
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_health_reports_database_failure() {
    let ctx = common::create_test_state(PipelineConfig::default());
    ctx.links.ping_fails.store(true, Ordering::SeqCst);
    let server = common::test_server(ctx.state.clone());

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), 503);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["database"]["status"], "error");
    assert!(json["checks"]["database"]["message"].is_string());
}

#[tokio::test]
async fn test_health_degraded_after_pipeline_shutdown() {
    let ctx = common::create_test_state(PipelineConfig::default());
    ctx.pipeline.shutdown(Duration::from_secs(5)).await.unwrap();
    let server = common::test_server(ctx.state.clone());

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), 503);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["checks"]["click_pipeline"]["status"], "error");
    assert_eq!(json["checks"]["click_pipeline"]["state"], "stopped");
    assert_eq!(json["checks"]["click_pipeline"]["queued"], 0);
}
