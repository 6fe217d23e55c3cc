#![forbid(unsafe_code)]

use anyhow::Result;
use jsonrpsee::server::RpcModule;
use jsonrpsee::types::Params;
use serde::{Deserialize, Serialize};

use crate::core::Storefront;
use crate::core::catalog::CatalogStatus;
use crate::core::model::Listing;
use crate::core::view::{CatalogPage, TierChip, tier_bar};
use crate::transport::jsonrpc::RpcError;
use crate::transport::jsonrpc::params::{TierParams, parse_tier, parse_tier_opt};

#[derive(Clone, Debug, Serialize)]
struct CatalogTiersResponse {
    tiers: Vec<TierChip>,
}

#[derive(Debug, Deserialize)]
struct SelectTierParams {
    tier: String,
}

#[derive(Debug, Deserialize)]
struct ListingGetParams {
    id: String,
}

#[derive(Clone, Debug, Serialize)]
struct ListingGetResponse {
    listing: Listing,
}

pub fn module(state: Storefront) -> Result<RpcModule<Storefront>> {
    let mut m = RpcModule::new(state);

    m.register_async_method("catalog.status", |_p, state, _| async move {
        Ok::<CatalogStatus, RpcError>(state.catalog_status().await)
    })?;

    m.register_async_method("catalog.tiers", |_p, state, _| async move {
        let selected = state.selected_tier().await;
        Ok::<CatalogTiersResponse, RpcError>(CatalogTiersResponse {
            tiers: tier_bar(selected),
        })
    })?;

    m.register_async_method("catalog.page", |params, state, _| async move {
        let params = optional_tier_params(&params)?;
        page(&state, params).await
    })?;

    m.register_async_method("catalog.select_tier", |params, state, _| async move {
        let SelectTierParams { tier } = params
            .parse()
            .map_err(|e| RpcError::InvalidParams(e.to_string()))?;
        let selector = parse_tier(&tier)?;
        Ok::<CatalogPage, RpcError>(state.select_tier(selector).await)
    })?;

    m.register_async_method("catalog.get", |params, state, _| async move {
        let ListingGetParams { id } = params
            .parse()
            .map_err(|e| RpcError::InvalidParams(e.to_string()))?;
        get(&state, &id).await
    })?;

    Ok(m)
}

fn optional_tier_params(params: &Params<'_>) -> Result<TierParams, RpcError> {
    if params.as_str().is_none() {
        return Ok(TierParams::default());
    }
    params
        .parse()
        .map_err(|e| RpcError::InvalidParams(e.to_string()))
}

async fn page(state: &Storefront, params: TierParams) -> Result<CatalogPage, RpcError> {
    match parse_tier_opt(params.tier.as_deref())? {
        Some(selector) => Ok(state.page_for(selector).await),
        None => Ok(state.page().await),
    }
}

async fn get(state: &Storefront, id: &str) -> Result<ListingGetResponse, RpcError> {
    let listing = state
        .listing(id)
        .await
        .ok_or_else(|| RpcError::NotFound(format!("listing {id}")))?;
    Ok(ListingGetResponse { listing })
}
