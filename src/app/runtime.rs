use anyhow::{Context, Result};
use tracing::info;

use crate::app::{cli, config, logging};
use crate::core::Storefront;
use crate::transport::jsonrpc;

pub async fn run(args: cli::Args) -> Result<()> {
    let mut settings = config::Settings::load(&args.config).context("load configuration")?;
    if let Some(addr) = args.rpc_addr {
        settings.rpc.addr = addr;
    }
    logging::init(&settings.logging)?;

    info!("Starting storefrontd");

    let backend = settings.store.build_backend()?;
    info!(backend = backend.name(), "Store backend ready");

    let storefront = Storefront::new(backend, settings.storefront.clone());
    storefront.spawn_catalog_load().await;

    let (handle, addr) = jsonrpc::start_rpc(storefront, &settings.rpc).await?;
    info!(%addr, "JSON-RPC listening");

    let stop_handle = handle.clone();

    tokio::select! {
        _ = shutdown_signal() => {
            info!("Shutting down…");
            let _ = stop_handle.stop();
        }
        _ = handle.stopped() => {}
    }

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
