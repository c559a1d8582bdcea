//! server-info
//!
//! A small HTTP service reporting host and runtime facts:
//! - `GET /` greeting text
//! - `GET /api/info` hostname, address, runtime/OS versions, CPU and memory
//! - `GET /health` liveness status

pub mod config;
pub mod handler;
pub mod http;
pub mod info;
pub mod logger;
pub mod server;
