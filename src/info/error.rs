use thiserror::Error;

/// Failure while gathering host, runtime or memory facts.
///
/// Never surfaces as an HTTP error status: `/api/info` renders it as the
/// `error` field of a normal 200 body.
#[derive(Debug, Error)]
pub enum InfoError {
    #[error("unable to determine local hostname")]
    Hostname,

    #[error("{host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{host}: no address associated with hostname")]
    NoAddress { host: String },

    #[error("unable to determine available processors: {0}")]
    Processors(#[source] std::io::Error),

    #[error("memory statistics unavailable")]
    Memory,

    #[error("introspection task failed: {0}")]
    Task(String),
}
