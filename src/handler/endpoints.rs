//! Endpoint handlers
//!
//! One function per route. None of them return an error status: `/api/info`
//! reports introspection failures inside its 200 body.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::sync::Arc;

use crate::config::AppState;
use crate::http;
use crate::info::{self, HealthStatus, InfoResponse, GREETING};
use crate::logger;

/// `GET /`
pub fn greeting() -> Response<Full<Bytes>> {
    http::build_text_response(GREETING)
}

/// `GET /api/info`
pub async fn server_info(state: &Arc<AppState>) -> Response<Full<Bytes>> {
    logger::log_info("Server info requested");

    let result = info::gather(Arc::clone(&state.facts)).await;
    if let Err(e) = &result {
        logger::log_error(&format!("Failed to collect server info: {e}"));
    }

    http::json_response(StatusCode::OK, &InfoResponse::from(result))
}

/// `GET /health`
pub fn health() -> Response<Full<Bytes>> {
    http::json_response(StatusCode::OK, &HealthStatus::up())
}
