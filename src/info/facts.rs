//! Platform introspection
//!
//! Every call here may block (name resolution goes through the system
//! resolver), so callers run lookups on the blocking pool.

use std::net::{IpAddr, ToSocketAddrs};
use sysinfo::System;

use super::InfoError;

/// Compiler version captured by `build.rs`, e.g. `rustc 1.82.0 (f6e511eec 2024-10-15)`
const RUSTC_VERSION: &str = env!("SERVER_INFO_RUSTC_VERSION");

/// Memory counters in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryStats {
    pub free: u64,
    pub max: u64,
}

/// Source of the facts reported by `/api/info`
pub trait HostFacts: Send + Sync {
    fn hostname(&self) -> Result<String, InfoError>;

    /// Resolve `hostname` to one local address
    fn resolve(&self, hostname: &str) -> Result<IpAddr, InfoError>;

    fn runtime_version(&self) -> String;

    fn os_name(&self) -> String;

    fn os_version(&self) -> String;

    fn available_processors(&self) -> Result<usize, InfoError>;

    fn memory(&self) -> Result<MemoryStats, InfoError>;
}

/// Facts source backed by `sysinfo` and the system resolver
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemFacts;

impl SystemFacts {
    pub const fn new() -> Self {
        Self
    }
}

impl HostFacts for SystemFacts {
    fn hostname(&self) -> Result<String, InfoError> {
        System::host_name()
            .filter(|name| !name.is_empty())
            .ok_or(InfoError::Hostname)
    }

    fn resolve(&self, hostname: &str) -> Result<IpAddr, InfoError> {
        let addrs = (hostname, 0)
            .to_socket_addrs()
            .map_err(|source| InfoError::Resolve {
                host: hostname.to_string(),
                source,
            })?;
        pick_address(addrs.map(|a| a.ip())).ok_or_else(|| InfoError::NoAddress {
            host: hostname.to_string(),
        })
    }

    fn runtime_version(&self) -> String {
        parse_rustc_version(RUSTC_VERSION)
    }

    fn os_name(&self) -> String {
        System::name().unwrap_or_else(|| std::env::consts::OS.to_string())
    }

    // Kernel release on Linux, product version elsewhere
    fn os_version(&self) -> String {
        System::kernel_version()
            .or_else(System::os_version)
            .unwrap_or_else(|| "unknown".to_string())
    }

    fn available_processors(&self) -> Result<usize, InfoError> {
        std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .map_err(InfoError::Processors)
    }

    fn memory(&self) -> Result<MemoryStats, InfoError> {
        let mut sys = System::new();
        sys.refresh_memory();

        // Container limits win over host totals
        let stats = match sys.cgroup_limits() {
            Some(limits) => MemoryStats {
                free: limits.free_memory,
                max: limits.total_memory,
            },
            None => MemoryStats {
                free: sys.available_memory(),
                max: sys.total_memory(),
            },
        };

        if stats.max == 0 {
            return Err(InfoError::Memory);
        }
        Ok(stats)
    }
}

/// First IPv4 address if any, otherwise the first address
fn pick_address(addrs: impl IntoIterator<Item = IpAddr>) -> Option<IpAddr> {
    let mut first = None;
    for addr in addrs {
        if addr.is_ipv4() {
            return Some(addr);
        }
        first.get_or_insert(addr);
    }
    first
}

/// `rustc 1.82.0 (f6e511eec 2024-10-15)` -> `1.82.0`
fn parse_rustc_version(raw: &str) -> String {
    raw.split_whitespace()
        .nth(1)
        .unwrap_or(raw)
        .to_string()
}
