// Connection handling module
// Accepts a single TCP connection and serves it on its own task

use http_body_util::Full;
use hyper::body::{Body, Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;

use crate::config::{AppState, PerformanceConfig};
use crate::handler;
use crate::logger::{self, AccessLogEntry};

/// Accept a connection unless the connection limit is reached.
///
/// Returns `false` when the connection was rejected and dropped.
pub fn accept_connection(stream: TcpStream, peer_addr: SocketAddr, state: &Arc<AppState>) -> bool {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = state.active_connections.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            state.active_connections.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection rejected."
            ));
            drop(stream);
            return false;
        }
    }

    logger::log_connection_accepted(&peer_addr);
    handle_connection(stream, peer_addr, Arc::clone(state));
    true
}

/// Serve one HTTP/1.1 connection in a spawned local task.
///
/// Keep-alive is on when `performance.keep_alive_timeout` is non-zero; the
/// whole connection is bounded by [`connection_timeout`]. The connection
/// counter is decremented when the task ends.
fn handle_connection(stream: TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    tokio::task::spawn_local(async move {
        let io = TokioIo::new(stream);

        let perf = &state.config.performance;
        let timeout_duration = connection_timeout(perf);

        let mut builder = http1::Builder::new();
        builder.keep_alive(perf.keep_alive_timeout > 0);

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| serve_request(req, peer_addr, Arc::clone(&service_state))),
        );

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => logger::log_warning(&format!(
                "Connection from {peer_addr} timed out after {} seconds",
                timeout_duration.as_secs()
            )),
        }

        state.active_connections.fetch_sub(1, Ordering::SeqCst);
    });
}

/// Upper bound on a connection's lifetime.
///
/// The largest of the read, write and (when enabled) keep-alive timeouts, so
/// an idle keep-alive connection can live up to `keep_alive_timeout`.
pub(crate) fn connection_timeout(perf: &PerformanceConfig) -> Duration {
    let io_secs = perf.read_timeout.max(perf.write_timeout);
    Duration::from_secs(io_secs.max(perf.keep_alive_timeout))
}

/// Route one request and write its access log line
async fn serve_request(
    req: Request<Incoming>,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let entry = state
        .config
        .logging
        .access_log
        .then(|| AccessLogEntry::from_request(&req, peer_addr));

    let response = handler::handle_request(req, Arc::clone(&state)).await?;

    if let Some(mut entry) = entry {
        let body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.finish(response.status().as_u16(), body_bytes, started.elapsed());
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}
