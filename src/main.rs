use clap::Parser;
use std::sync::Arc;

use server_info::config::{AppState, Config, DEFAULT_CONFIG_PATH};
use server_info::logger;
use server_info::server::{self, SignalHandler};

/// Serve host and runtime information over HTTP
#[derive(Debug, Parser)]
#[command(name = "server-info", version, about)]
struct Cli {
    /// Config file path without extension (config.toml, config.yaml, ...)
    #[arg(short, long, env = "APP_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = Config::load_from(&cli.config)?;
    logger::init(&cfg)?;

    // Worker threads default to the CPU core count
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    let state = Arc::new(AppState::new(&cfg));
    let signals = Arc::new(SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals))?;

    logger::log_server_start(&addr, &cfg);

    // Connection tasks use spawn_local
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::run_server(listener, state, signals))
        .await
}
