use std::sync::Arc;
use tokio::sync::Notify;

mod config;
mod handler;
mod http;
mod logger;
mod server;
mod store;

use config::{AppState, Config, StorageBackend};

/// Config file used when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Requests are handled one at a time on a single thread
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = tokio::task::LocalSet::new();
    local.block_on(&runtime, async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    let store = store::open(&cfg.storage)?;
    let location = match cfg.storage.backend {
        StorageBackend::Memory => "in process",
        StorageBackend::Sqlite => cfg.storage.sqlite_path.as_str(),
    };
    logger::log_store_opened(store.backend_name(), location);
    let state = Arc::new(AppState::new(&cfg, store));

    let listener = server::create_listener(addr)?;
    logger::log_server_start(&addr, &cfg);

    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown))?;

    let remaining = server::run_server_loop(listener, Arc::clone(&state), shutdown).await;
    if remaining > 0 {
        logger::log_warning(&format!(
            "{remaining} connection(s) still open at shutdown"
        ));
    }

    state.dispose()?;
    logger::log_store_disposed(state.store.backend_name());
    Ok(())
}
