#![forbid(unsafe_code)]

use std::net::SocketAddr;

use anyhow::Result;
use jsonrpsee::server::{RpcModule, ServerHandle};

use crate::app::config::RpcConfig;
use crate::core::Storefront;

mod error;
mod params;
mod server;

pub mod methods;

pub use error::RpcError;

/// All storefront methods on one module, with `system.help` listing them.
pub fn rpc_module(state: Storefront) -> Result<RpcModule<Storefront>> {
    let mut root = RpcModule::new(state.clone());
    methods::register_all(&mut root, state)?;
    Ok(root)
}

/// Binds the listener and starts serving. Returns the bound address so a
/// `:0` port can be reported.
pub async fn start_rpc(state: Storefront, rpc_cfg: &RpcConfig) -> Result<(ServerHandle, SocketAddr)> {
    let addr = server::listen_addr(rpc_cfg)?;
    let server = server::build_server(addr, rpc_cfg).await?;
    let bound = server.local_addr()?;
    let handle = server.start(rpc_module(state)?);
    Ok((handle, bound))
}
