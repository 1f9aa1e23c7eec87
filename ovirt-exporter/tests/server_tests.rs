//! HTTP surface and scrape pipeline tests

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::*;
use ovirt_exporter::config::ExporterConfig;
use ovirt_exporter::{server, AppState};
use tower::ServiceExt;

fn engine() -> ScriptedTransport {
    ScriptedTransport::new()
        .respond("hosts", hosts(&[host("h1", "host-a", "c1", "up")]))
        .respond("hosts/h1", named("host", "h1", "host-a"))
        .respond("clusters/c1", named("cluster", "c1", "Default"))
        .respond(
            "hosts/h1/statistics",
            statistics(&[("memory.used", "gauge", "integer", "bytes", 512.0)]),
        )
        .respond("hosts/h1/nics", "<host_nics/>")
        .respond("vms", vms(&[vm("v1", "web-01", Some("h1"), "c1", "up")]))
        .respond("vms/v1/statistics", statistics(&[]))
        .respond("vms/v1/nics", "<nics/>")
        .respond("vms/v1/snapshots", "<snapshots/>")
        .respond("vms/v1/diskattachments", "<disk_attachments/>")
        .fail("storagedomains")
}

fn state(transport: Arc<ScriptedTransport>) -> Arc<AppState> {
    Arc::new(AppState::new(ExporterConfig::default(), transport).unwrap())
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = server::router(state(Arc::new(engine())));

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; version=0.0.4"
    );

    let body = body_text(response).await;
    assert!(body.contains(r#"ovirt_host_up{name="host-a",cluster="Default"} 1"#));
    assert!(body.contains(r#"ovirt_host_memory_used_bytes{name="host-a",cluster="Default"} 512"#));
    assert!(body.contains(r#"ovirt_vm_up{name="web-01",host="host-a",cluster="Default"} 1"#));
    assert!(body.contains(r#"ovirt_vm_snapshots{name="web-01",host="host-a",cluster="Default"} 0"#));
    assert!(body.contains(r#"ovirt_collectors_duration_count{collector="storage_domain"} 1"#));
    assert!(!body.contains("ovirt_storage_up"));
}

#[tokio::test]
async fn test_every_scrape_uses_fresh_collectors() {
    let transport = Arc::new(engine());
    let state = state(transport.clone());

    state.scrape().await.unwrap();
    let second = state.scrape().await.unwrap();

    assert_eq!(transport.fetch_count("hosts"), 2);
    assert_eq!(transport.fetch_count("vms"), 2);
    assert_eq!(transport.fetch_count("hosts/h1/statistics"), 2);

    // Names live for the process.
    assert_eq!(transport.fetch_count("clusters/c1"), 1);
    assert_eq!(transport.fetch_count("hosts/h1"), 1);

    assert!(second.contains(r#"ovirt_collectors_duration_count{collector="host"} 2"#));
}

#[tokio::test]
async fn test_custom_metrics_path_and_landing_page() {
    let mut config = ExporterConfig::default();
    config.server.metrics_path = "/probe".to_string();
    let state = Arc::new(AppState::new(config, Arc::new(engine())).unwrap());
    let app = server::router(state);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(r#"<a href="/probe">"#));

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/probe").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unreachable_engine_still_answers() {
    let state = state(Arc::new(ScriptedTransport::new()));

    let body = state.scrape().await.unwrap();
    assert!(!body.contains("ovirt_host_up"));
    assert!(body.contains("ovirt_collectors_duration"));
}
