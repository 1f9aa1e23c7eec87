///! HTTP surface: landing page and metrics endpoint

use std::sync::Arc;

use axum::{
    extract::State,
    http::header::CONTENT_TYPE,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;

use crate::error::Result;
use crate::exposition;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let metrics_path = state.config.server.metrics_path.clone();

    Router::new()
        .route("/", get(landing_page))
        .route(&metrics_path, get(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn landing_page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(format!(
        r#"<html>
<head><title>oVirt Exporter (Version {version})</title></head>
<body>
<h1>oVirt Exporter</h1>
<p><a href="{path}">Metrics</a></p>
</body>
</html>"#,
        version = env!("CARGO_PKG_VERSION"),
        path = state.config.server.metrics_path,
    ))
}

async fn metrics(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse> {
    let body = state.scrape().await?;
    Ok(([(CONTENT_TYPE, exposition::CONTENT_TYPE)], body))
}
