//! Request handler module
//!
//! Route table dispatch and the three endpoint handlers.

pub mod endpoints;
pub mod router;

// Re-export main entry point
pub use router::{find_route, handle_request, Endpoint, ROUTES};
