mod config;
mod error;
mod handlers;
mod middleware;
mod response;
mod router;
mod state;
mod storage;
mod utils;

use anyhow::Context;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|arg| arg == "--help") {
        println!("filemanager-server");
        println!("An HTTP service for browsing and managing files under a single storage directory.");
        println!();
        println!("USAGE:");
        println!("    filemanager-server [OPTIONS]");
        println!();
        println!("OPTIONS:");
        println!("    --config=<PATH>               Reads settings from a JSON file. [env: FILEMANAGER_CONFIG]");
        println!("    --storage-path=<PATH>         Sets the storage root directory. [env: STORAGE_PATH] [default: ./storage]");
        println!("    --static-prefix=<PREFIX>      Sets the URL prefix for static file serving. [env: STATIC_PREFIX] [default: /images]");
        println!("    --host=<HOST>                 Sets the listening host. [env: HOST] [default: 0.0.0.0]");
        println!("    --port=<PORT>                 Sets the listening port. [env: PORT] [default: 3000]");
        println!("    --batch-concurrency=<N>       Sets the per-request limit of concurrent file operations. [env: BATCH_CONCURRENCY] [default: 16]");
        println!("    --max-upload-size=<BYTES>     Sets the maximum upload request size in bytes. [env: MAX_UPLOAD_SIZE] [default: 104857600]");
        println!();
        println!("    --help                        Prints this help information.");
        println!();

        process::exit(0);
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "filemanager_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::load()?;

    let root = utils::path::StorageRoot::open(&config.storage_path)
        .await
        .with_context(|| {
            format!(
                "failed to open storage root {}",
                config.storage_path.display()
            )
        })?;
    tracing::info!(root = %root.path().display(), static_prefix = %config.static_prefix, "storage ready");

    let storage = storage::Storage::new(root, config.batch_concurrency);
    let addr = config.listen_addr();
    let state = state::AppState::new(config, storage);
    let app = router::create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    tracing::info!("Server running on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = wait_for_ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                wait_for_ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        wait_for_ctrl_c().await;
    }

    tracing::info!("Shutdown signal received, stopping server...");
}

async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
