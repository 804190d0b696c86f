//! Ledger Engine Server
//!
//! Binary entry point: parses CLI arguments, wires the in-memory storage
//! collaborators into an entity registry, and serves the HTTP surface.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --host 0.0.0.0 --port 3000
//! cargo run -- --mailbox-capacity 256
//! ```
//!
//! Log verbosity follows `RUST_LOG` (e.g. `RUST_LOG=ledger_engine=debug`).

use std::sync::Arc;

use ledger_engine::api::create_router;
use ledger_engine::cli;
use ledger_engine::core::EntityRegistry;
use ledger_engine::store::InMemoryEventLog;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ledger_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = cli::parse_args();

    let log = Arc::new(InMemoryEventLog::new());
    let mut registry = EntityRegistry::new(log);
    if let Some(capacity) = args.mailbox_capacity {
        registry = registry.with_mailbox_capacity(capacity);
    }

    let app = create_router(Arc::new(registry));

    let bind_address = args.bind_address();
    let listener = match TcpListener::bind(&bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Error: failed to bind {bind_address}: {e}");
            std::process::exit(1);
        }
    };

    info!("ledger engine listening on http://{bind_address}");
    info!("  POST /accounts                    - create account");
    info!("  GET  /accounts/{{id}}               - get account");
    info!("  POST /accounts/{{id}}/adjustments   - adjust balance");
    info!("  GET  /health                      - health check");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        eprintln!("Error: server failed: {e}");
        std::process::exit(1);
    }

    info!("ledger engine stopped");
}

/// Resolve when the process receives SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
