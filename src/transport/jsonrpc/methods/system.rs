use anyhow::Result;
use jsonrpsee::server::RpcModule;
use serde::Serialize;

use crate::core::Storefront;
use crate::core::catalog::CatalogStatus;
use crate::transport::jsonrpc::RpcError;

const HELP_METHOD: &str = "system.help";

#[derive(Clone, Debug, Serialize)]
struct StorefrontInfo {
    version: &'static str,
    build: &'static str,
    backend: &'static str,
    uptime_secs: u64,
    catalog: CatalogStatus,
    open_inquiries: usize,
}

pub fn module(state: Storefront) -> Result<RpcModule<Storefront>> {
    let mut m = RpcModule::new(state);

    m.register_method("system.ping", |_p, _state, _| "pong")?;

    m.register_async_method("system.get_info", |_p, state, _| async move {
        Ok::<StorefrontInfo, RpcError>(StorefrontInfo {
            version: env!("CARGO_PKG_VERSION"),
            build: option_env!("GIT_HASH").unwrap_or("unknown"),
            backend: state.store.name(),
            uptime_secs: state.uptime().as_secs(),
            catalog: state.catalog_status().await,
            open_inquiries: state.open_inquiries().await,
        })
    })?;

    Ok(m)
}

/// Registers `system.help` over whatever is on `root` at call time, so it
/// must run after every other module is merged.
pub fn register_help(root: &mut RpcModule<Storefront>) -> Result<()> {
    let mut names: Vec<&'static str> = root.method_names().collect();
    names.push(HELP_METHOD);
    names.sort_unstable();
    names.dedup();
    root.register_method(HELP_METHOD, move |_p, _state, _| names.clone())?;
    Ok(())
}
