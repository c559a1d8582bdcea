//! HTTP protocol layer module
//!
//! Response builders shared by every route, decoupled from the endpoint logic.

pub mod response;

// Re-export commonly used types
pub use response::{
    build_404_response, build_405_response, build_413_response, build_options_response,
    build_text_response, json_response,
};
