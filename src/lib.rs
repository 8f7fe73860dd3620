use std::{any::Any, sync::Arc};

use axum::{
    response::Response,
    routing::{any, get},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{debug, error};

pub mod consent_event;
pub mod db_service;
pub mod discord;
pub mod env_utils;
pub mod request_metadata;
pub mod route_handlers;
pub mod utils;

use env_utils::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        AppState {
            config: Arc::new(config),
            http_client: reqwest::Client::new(),
        }
    }
}

/**
 * main router for the app, the consent route accepts every method so it can answer 405 itself
 **/
pub fn get_main_router(state: AppState) -> Router {
    debug!("initializing router(s) ...");

    Router::new()
        .route("/healthcheck", get(|| async { "Ok" }))
        .nest("/api", get_api_router())
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}

fn get_api_router() -> Router<AppState> {
    Router::new().route("/consent", any(route_handlers::consent::handler))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    error!("Unexpected panic while handling request: {}", details);

    route_handlers::consent::server_error_response()
}
