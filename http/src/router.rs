use crate::{
    credentials,
    download,
    events,
};
use axum::{
    response::Html,
    routing::{
        get,
        post,
    },
    Router,
};
use dsl_monitor_config::WebConfig;
use dsl_monitor_supervisor::Supervisor;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub supervisor: Supervisor,
    pub config: Arc<WebConfig>,
}

pub fn create_router(supervisor: Supervisor, config: WebConfig) -> Router {
    let state = AppState {
        supervisor,
        config: Arc::new(config),
    };

    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/events", get(events::handler))
        .route("/download", get(download::handler))
        .route("/password", post(credentials::password))
        .route("/passphrase", post(credentials::passphrase))
        .route("/encryption-passphrase", post(credentials::encryption_passphrase))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(include_str!("index.html"))
}

async fn healthz() -> &'static str {
    "Hello!"
}
