//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, an explicit
//! `(method, path)` route table, and dispatch to the endpoint handlers.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, CONTENT_LENGTH, SERVER};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;

use super::endpoints;
use crate::config::AppState;
use crate::http;
use crate::logger;

/// Handler selected by the route table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Greeting,
    ServerInfo,
    Health,
}

pub struct Route {
    pub method: Method,
    pub path: &'static str,
    pub endpoint: Endpoint,
}

/// Every route the server answers. `HEAD` is served by the `GET` entry.
pub static ROUTES: [Route; 3] = [
    Route {
        method: Method::GET,
        path: "/",
        endpoint: Endpoint::Greeting,
    },
    Route {
        method: Method::GET,
        path: "/api/info",
        endpoint: Endpoint::ServerInfo,
    },
    Route {
        method: Method::GET,
        path: "/health",
        endpoint: Endpoint::Health,
    },
];

/// Look up the route for an exact path
pub fn find_route(method: &Method, path: &str) -> Option<Endpoint> {
    let method = if *method == Method::HEAD {
        &Method::GET
    } else {
        method
    };
    ROUTES
        .iter()
        .find(|r| r.method == *method && r.path == path)
        .map(|r| r.endpoint)
}

fn endpoint_paths() -> Vec<&'static str> {
    ROUTES.iter().map(|r| r.path).collect()
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method();
    let path = req.uri().path();
    let is_head = *method == Method::HEAD;

    logger::log_headers_count(req.headers().len(), state.config.logging.show_headers);

    let response = if let Some(resp) = check_http_method(method, state.config.http.enable_cors) {
        resp
    } else if let Some(resp) = check_body_size(&req, state.config.http.max_body_size) {
        resp
    } else {
        match find_route(method, path) {
            Some(endpoint) => dispatch(endpoint, &state).await,
            None => http::build_404_response(path, &endpoint_paths()),
        }
    };

    Ok(finalize(response, &state.config.http.server_name, is_head))
}

async fn dispatch(endpoint: Endpoint, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    match endpoint {
        Endpoint::Greeting => endpoints::greeting(),
        Endpoint::ServerInfo => endpoints::server_info(state).await,
        Endpoint::Health => endpoints::health(),
    }
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match method {
        &Method::GET | &Method::HEAD => None,
        &Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get(CONTENT_LENGTH)?;
    let Ok(size_str) = content_length.to_str() else {
        logger::log_warning("Content-Length header contains non-ASCII characters");
        return None;
    };
    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(http::build_413_response())
        }
        Ok(_) => None,
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            None
        }
    }
}

/// Stamp the `Server` header and drop the body for `HEAD`
fn finalize(
    response: Response<Full<Bytes>>,
    server_name: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let (mut parts, body) = response.into_parts();

    if let Ok(value) = HeaderValue::from_str(server_name) {
        parts.headers.insert(SERVER, value);
    }

    if !is_head {
        return Response::from_parts(parts, body);
    }

    let length = body.size_hint().exact().unwrap_or(0);
    parts.headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
    Response::from_parts(parts, Full::new(Bytes::new()))
}
