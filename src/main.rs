//! Administrative configuration server.
//!
//! # Architecture Overview
//!
//! ```text
//!   config file ──▶ loader ──▶ resolver ──▶ ConfigStore (ArcSwap)
//!        ▲                        │               │
//!        │                        ▼               ▼
//!     watcher /            ResolutionIssues   AdminActions ──▶ ExternalApiGateway
//!     SIGHUP                (logs, metrics)    (ban/unban)      (best-effort POST)
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use admin_config::banlist::AdminActions;
use admin_config::config::watcher::ConfigWatcher;
use admin_config::config::{builtin_registry, ConfigStore};
use admin_config::external_api::{ExternalApiCredentials, ExternalApiGateway};
use admin_config::lifecycle::{signals, Shutdown};
use admin_config::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "admin-config")]
#[command(about = "Administrative configuration store", long_about = None)]
struct Args {
    /// Raw configuration document (.json or .toml).
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Reload the document when the file changes.
    #[arg(short, long)]
    watch: bool,

    /// Expose Prometheus metrics on this address.
    #[arg(long)]
    metrics_address: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init();

    tracing::info!("admin-config v{} starting", env!("CARGO_PKG_VERSION"));

    if let Some(addr) = args.metrics_address {
        metrics::init_metrics(addr);
    }

    // A broken schema is a programming error: refuse to start
    let registry = Arc::new(builtin_registry().inspect_err(|e| {
        tracing::error!(error = %e, "Invalid configuration schema");
    })?);

    let store = Arc::new(ConfigStore::open(registry, &args.config)?);
    let state = store.load();
    tracing::info!(
        path = %args.config.display(),
        server_name = %state.config.general.server_name,
        language = %state.config.general.language,
        issues = state.issues.len(),
        degraded = state.is_degraded(),
        external_api = ExternalApiCredentials::from_config(&state.config.general).is_some(),
        "Configuration loaded"
    );

    let actions = AdminActions::new(Arc::clone(&store), ExternalApiGateway::new());
    tracing::debug!(?actions, "Administrative actions ready");

    let (watcher, mut documents) = ConfigWatcher::new(&args.config);
    let _watcher = if args.watch {
        Some(watcher.run()?)
    } else {
        None
    };

    let mut reloads = signals::reload_requests();
    let shutdown = Shutdown::new();
    let mut shutdown_rx = shutdown.subscribe();

    let reload_store = Arc::clone(&store);
    let reload_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                Some(document) = documents.recv() => {
                    if let Err(e) = reload_store.apply(&document) {
                        tracing::error!(error = %e, "Failed to apply reloaded configuration");
                    }
                }
                Some(()) = reloads.recv() => {
                    // Errors are logged by the store
                    let _ = reload_store.reload();
                }
                _ = shutdown_rx.recv() => break,
            }
        }
    });

    let signal = signals::shutdown_signal().await;
    shutdown.trigger(signal);
    let _ = reload_task.await;

    tracing::info!("Shutdown complete");
    Ok(())
}
