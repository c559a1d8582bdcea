//! Server introspection
//!
//! Builds the payloads served by the info endpoints. Nothing is cached:
//! each call to [`gather`] performs one fresh round of platform queries.

mod error;
mod facts;
mod types;

use std::sync::Arc;

pub use error::InfoError;
pub use facts::{HostFacts, MemoryStats, SystemFacts};
pub use types::{
    timestamp_now, HealthStatus, InfoResponse, ServerInfo, GREETING, STATUS_UP, TIMESTAMP_FORMAT,
};

/// Query every fact once, failing on the first lookup error
pub fn collect(facts: &dyn HostFacts) -> Result<ServerInfo, InfoError> {
    let hostname = facts.hostname()?;
    let ip = facts.resolve(&hostname)?;
    let available_processors = facts.available_processors()?;
    let memory = facts.memory()?;

    Ok(ServerInfo {
        hostname,
        ip: ip.to_string(),
        runtime_version: facts.runtime_version(),
        os_name: facts.os_name(),
        os_version: facts.os_version(),
        timestamp: timestamp_now(),
        available_processors,
        free_memory: memory.free,
        max_memory: memory.max,
    })
}

/// Run [`collect`] on the blocking pool
pub async fn gather(facts: Arc<dyn HostFacts>) -> Result<ServerInfo, InfoError> {
    tokio::task::spawn_blocking(move || collect(facts.as_ref()))
        .await
        .map_err(|e| InfoError::Task(e.to_string()))?
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::io;
    use std::net::{IpAddr, Ipv4Addr};

    /// Fixed-answer facts source; each flag makes the matching call fail
    #[derive(Debug, Default, Clone, Copy)]
    pub struct FakeFacts {
        pub fail_hostname: bool,
        pub fail_resolve: bool,
        pub fail_memory: bool,
    }

    impl HostFacts for FakeFacts {
        fn hostname(&self) -> Result<String, InfoError> {
            if self.fail_hostname {
                return Err(InfoError::Hostname);
            }
            Ok("test-host".to_string())
        }

        fn resolve(&self, hostname: &str) -> Result<IpAddr, InfoError> {
            if self.fail_resolve {
                return Err(InfoError::Resolve {
                    host: hostname.to_string(),
                    source: io::Error::new(io::ErrorKind::NotFound, "Name or service not known"),
                });
            }
            Ok(IpAddr::V4(Ipv4Addr::new(172, 17, 0, 2)))
        }

        fn runtime_version(&self) -> String {
            "1.82.0".to_string()
        }

        fn os_name(&self) -> String {
            "Linux".to_string()
        }

        fn os_version(&self) -> String {
            "6.1.0".to_string()
        }

        fn available_processors(&self) -> Result<usize, InfoError> {
            Ok(4)
        }

        fn memory(&self) -> Result<MemoryStats, InfoError> {
            if self.fail_memory {
                return Err(InfoError::Memory);
            }
            Ok(MemoryStats {
                free: 512 * 1024 * 1024,
                max: 2 * 1024 * 1024 * 1024,
            })
        }
    }
}
