use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

mod cache;
mod catalog;
mod config;
mod handler;
mod http;
mod loader;
mod logger;
mod render;
mod routing;
mod server;
mod store;

/// Config file used when none is given on the command line (extension optional)
const DEFAULT_CONFIG: &str = "config";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Worker thread count follows the config, CPU cores otherwise
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;

    let store = store::open(&cfg.backend)?;
    let state = Arc::new(config::AppState::new(cfg, store));
    let backend = state.loader.backend_name();
    logger::log_server_start(&addr, &state.config, backend);

    if state.config.pages.warm_on_start {
        logger::log_warm_start(backend);
        cache::warm(
            &state.pages,
            &state.loader,
            &state.config.edge.cached_prefix,
            &state.config.http.site_title,
        )
        .await;
    }

    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    // Connections are served with spawn_local
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::run_server_loop(
            listener,
            state,
            Arc::new(AtomicUsize::new(0)),
            Arc::clone(&signals.shutdown),
        ))
        .await
}
