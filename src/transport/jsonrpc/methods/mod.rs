#![forbid(unsafe_code)]

use anyhow::Result;
use jsonrpsee::server::RpcModule;

use crate::core::Storefront;

pub mod catalog;
pub mod inquiry;
pub mod system;

pub fn register_all(root: &mut RpcModule<Storefront>, state: Storefront) -> Result<()> {
    root.merge(system::module(state.clone())?)?;
    root.merge(catalog::module(state.clone())?)?;
    root.merge(inquiry::module(state)?)?;
    system::register_help(root)?;
    Ok(())
}
