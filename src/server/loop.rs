// Server loop module
// Accepts connections until shutdown, then drains in-flight connections

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::signal::SignalHandler;
use crate::config::AppState;
use crate::logger;

/// How often the drain phase re-checks the connection counter
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Pause after a failed accept so a persistent error (e.g. EMFILE) does not spin
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Run the accept loop on the current `LocalSet`.
///
/// Returns after shutdown has been requested, the listener has been closed,
/// and in-flight connections have finished or `performance.shutdown_timeout`
/// has elapsed.
pub async fn run_server(
    listener: TcpListener,
    state: Arc<AppState>,
    signals: Arc<SignalHandler>,
) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = signals.wait_for_shutdown();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state);
                    }
                    Err(e) => accept_failed(&e).await,
                }
            }

            () = &mut shutdown => break,
        }
    }

    // Stop accepting before draining
    drop(listener);
    logger::log_shutdown_started(state.connection_count());

    let grace = Duration::from_secs(state.config.performance.shutdown_timeout);
    let remaining = drain_connections(&state, grace).await;
    logger::log_shutdown_complete(remaining);
    Ok(())
}

async fn accept_failed(err: &std::io::Error) {
    logger::log_error(&format!("Failed to accept connection: {err}"));
    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
}

/// Wait for the connection counter to reach zero, returning what is left at the deadline
async fn drain_connections(state: &AppState, grace: Duration) -> usize {
    let deadline = tokio::time::Instant::now() + grace;

    loop {
        let active = state.connection_count();
        if active == 0 || tokio::time::Instant::now() >= deadline {
            return active;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::info::testing::FakeFacts;
    use crate::info::GREETING;
    use crate::server::create_reusable_listener;
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    async fn get(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await.unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn test_state(config: &Config) -> Arc<AppState> {
        Arc::new(AppState::with_facts(config, Arc::new(FakeFacts::default())))
    }

    #[tokio::test]
    async fn test_serves_endpoints_over_tcp() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
                let addr = listener.local_addr().unwrap();
                let state = test_state(&Config::default());
                let signals = Arc::new(SignalHandler::new());
                let server = tokio::task::spawn_local(run_server(
                    listener,
                    Arc::clone(&state),
                    Arc::clone(&signals),
                ));

                let root = get(addr, "/").await;
                assert!(root.starts_with("HTTP/1.1 200 OK"));
                assert!(root.ends_with(GREETING));

                let health = get(addr, "/health").await;
                assert!(health.starts_with("HTTP/1.1 200 OK"));
                assert!(health.contains("\"status\": \"UP\""));

                let info = get(addr, "/api/info").await;
                assert!(info.starts_with("HTTP/1.1 200 OK"));
                assert!(info.contains("\"hostname\": \"test-host\""));

                let missing = get(addr, "/nope").await;
                assert!(missing.starts_with("HTTP/1.1 404 Not Found"));

                signals.request_shutdown();
                tokio::time::timeout(Duration::from_secs(5), server)
                    .await
                    .expect("server should stop")
                    .unwrap()
                    .unwrap();
                assert_eq!(state.connection_count(), 0);
            })
            .await;
    }

    #[tokio::test]
    async fn test_connection_limit_rejects_extra_clients() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let mut config = Config::default();
                config.performance.max_connections = Some(0);
                let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
                let addr = listener.local_addr().unwrap();
                let signals = Arc::new(SignalHandler::new());
                let server = tokio::task::spawn_local(run_server(
                    listener,
                    test_state(&config),
                    Arc::clone(&signals),
                ));

                // Rejected connections are closed without a response
                let mut stream = TcpStream::connect(addr).await.unwrap();
                let mut buf = Vec::new();
                let read = tokio::time::timeout(
                    Duration::from_secs(5),
                    stream.read_to_end(&mut buf),
                )
                .await
                .expect("server should close the connection");
                assert_eq!(read.unwrap_or(0), 0);
                assert!(buf.is_empty());

                signals.request_shutdown();
                server.await.unwrap().unwrap();
            })
            .await;
    }

    #[tokio::test]
    async fn test_accept_error_backs_off() {
        let err = std::io::Error::other("too many open files");
        let started = std::time::Instant::now();
        accept_failed(&err).await;
        assert!(started.elapsed() >= ACCEPT_ERROR_BACKOFF);
    }

    #[tokio::test]
    async fn test_drain_gives_up_at_deadline() {
        let state = test_state(&Config::default());
        state
            .active_connections
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let remaining = drain_connections(&state, Duration::from_millis(120)).await;
        assert_eq!(remaining, 1);
    }
}
