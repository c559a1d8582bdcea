// Response payloads for the info endpoints
// All of them are built per request and dropped after serialization

use chrono::Local;
use serde::{Deserialize, Serialize};

use super::InfoError;

/// Body of `GET /`
pub const GREETING: &str = "Hello from the Rust server-info application in Docker!";

/// Constant status reported by `GET /health`
pub const STATUS_UP: &str = "UP";

/// Local date-time layout used for every timestamp field
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Host and runtime facts returned by `GET /api/info`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub hostname: String,
    pub ip: String,
    pub runtime_version: String,
    pub os_name: String,
    pub os_version: String,
    pub timestamp: String,
    pub available_processors: usize,
    /// Bytes
    pub free_memory: u64,
    /// Bytes
    pub max_memory: u64,
}

/// Either the full info payload or the single `error` field that replaces it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum InfoResponse {
    Info(ServerInfo),
    Error { error: String },
}

impl InfoResponse {
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

impl From<Result<ServerInfo, InfoError>> for InfoResponse {
    fn from(result: Result<ServerInfo, InfoError>) -> Self {
        match result {
            Ok(info) => Self::Info(info),
            Err(e) => Self::Error {
                error: e.to_string(),
            },
        }
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
    pub time: String,
}

impl HealthStatus {
    pub fn up() -> Self {
        Self {
            status: STATUS_UP.to_string(),
            time: timestamp_now(),
        }
    }
}

/// Current local date-time, e.g. `2024-05-01T13:45:10.123`
pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn sample() -> ServerInfo {
        ServerInfo {
            hostname: "box".to_string(),
            ip: "10.0.0.7".to_string(),
            runtime_version: "1.82.0".to_string(),
            os_name: "Linux".to_string(),
            os_version: "6.1.0".to_string(),
            timestamp: timestamp_now(),
            available_processors: 4,
            free_memory: 1024,
            max_memory: 4096,
        }
    }

    #[test]
    fn test_server_info_field_names() {
        let value = serde_json::to_value(sample()).unwrap();
        let obj = value.as_object().unwrap();
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            [
                "availableProcessors",
                "freeMemory",
                "hostname",
                "ip",
                "maxMemory",
                "osName",
                "osVersion",
                "runtimeVersion",
                "timestamp",
            ]
        );
        assert!(obj["availableProcessors"].is_u64());
        assert!(obj["maxMemory"].is_u64());
    }

    #[test]
    fn test_error_replaces_all_fields() {
        let resp = InfoResponse::from(Err(InfoError::Hostname));
        assert!(resp.is_error());

        let value = serde_json::to_value(&resp).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(obj["error"], "unable to determine local hostname");
    }

    #[test]
    fn test_untagged_deserialize_picks_variant() {
        let info: InfoResponse = serde_json::from_value(serde_json::to_value(sample()).unwrap()).unwrap();
        assert!(!info.is_error());

        let err: InfoResponse = serde_json::from_str(r#"{"error":"boom"}"#).unwrap();
        assert_eq!(
            err,
            InfoResponse::Error {
                error: "boom".to_string()
            }
        );
    }

    #[test]
    fn test_health_status_up() {
        let health = HealthStatus::up();
        assert_eq!(health.status, "UP");
        assert!(NaiveDateTime::parse_from_str(&health.time, "%Y-%m-%dT%H:%M:%S%.f").is_ok());
    }
}
