#![forbid(unsafe_code)]

use std::net::SocketAddr;

use anyhow::{Context, Result};
use jsonrpsee::server::{BatchRequestConfig, Server, ServerBuilder, ServerConfig};

use crate::app::config::RpcConfig;

pub fn listen_addr(rpc_cfg: &RpcConfig) -> Result<SocketAddr> {
    rpc_cfg
        .addr
        .parse()
        .with_context(|| format!("invalid rpc.addr {}", rpc_cfg.addr))
}

/// `0` turns batches off; unset leaves them unlimited.
fn batch_config(limit: Option<u32>) -> BatchRequestConfig {
    match limit {
        None => BatchRequestConfig::Unlimited,
        Some(0) => BatchRequestConfig::Disabled,
        Some(limit) => BatchRequestConfig::Limit(limit),
    }
}

fn server_config(rpc_cfg: &RpcConfig) -> ServerConfig {
    ServerConfig::builder()
        .max_request_body_size(rpc_cfg.max_request_body_size)
        .max_response_body_size(rpc_cfg.max_response_body_size)
        .max_connections(rpc_cfg.max_connections)
        .set_batch_request_config(batch_config(rpc_cfg.batch_request_limit))
        .build()
}

pub async fn build_server(addr: SocketAddr, rpc_cfg: &RpcConfig) -> Result<Server> {
    let server = ServerBuilder::with_config(server_config(rpc_cfg))
        .build(addr)
        .await
        .with_context(|| format!("bind json-rpc listener on {addr}"))?;
    Ok(server)
}
