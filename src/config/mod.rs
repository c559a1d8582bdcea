// Configuration module entry point
// Loads layered configuration and holds per-process runtime state

mod state;
mod types;

use ::config::builder::DefaultState;
use ::config::{ConfigBuilder, ConfigError, Environment, File, FileFormat, Map};
use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Sources, lowest precedence first: built-in defaults, the config file
    /// (optional), `APP_*` environment variables (`APP_SERVER__PORT=9090`),
    /// and finally a plain `PORT` variable for container platforms.
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, std::env::vars())
    }

    /// Same as [`Self::load_from`] with an explicit set of environment variables
    pub fn load_with_env<I, K, V>(config_path: &str, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let port = vars.get("PORT").cloned();

        let settings = with_defaults(::config::Config::builder())?
            .add_source(File::with_name(config_path).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(vars)),
            )
            .set_override_option("server.port", port)?
            .build()?;

        settings.try_deserialize()
    }

    /// Parse configuration from TOML text, applying the same defaults as files
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        with_defaults(::config::Config::builder())?
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    builder
        .set_default("server.host", types::DEFAULT_HOST)?
        .set_default("server.port", i64::from(types::DEFAULT_PORT))?
        .set_default("logging.level", types::DEFAULT_LOG_LEVEL)?
        .set_default("logging.access_log", true)?
        .set_default("logging.show_headers", false)?
        .set_default("logging.access_log_format", types::DEFAULT_ACCESS_LOG_FORMAT)?
        .set_default("performance.keep_alive_timeout", types::DEFAULT_KEEP_ALIVE_TIMEOUT)?
        .set_default("performance.read_timeout", types::DEFAULT_READ_TIMEOUT)?
        .set_default("performance.write_timeout", types::DEFAULT_WRITE_TIMEOUT)?
        .set_default("performance.shutdown_timeout", types::DEFAULT_SHUTDOWN_TIMEOUT)?
        .set_default("http.server_name", types::DEFAULT_SERVER_NAME)?
        .set_default("http.enable_cors", false)?
        .set_default("http.max_body_size", types::DEFAULT_MAX_BODY_SIZE)
}
