#![forbid(unsafe_code)]

use anyhow::Result;
use jsonrpsee::server::RpcModule;
use serde::{Deserialize, Serialize};

use crate::core::Storefront;
use crate::core::inquiry::DraftUpdate;
use crate::core::view::InquiryView;
use crate::transport::jsonrpc::RpcError;
use crate::transport::jsonrpc::params::SessionParams;

#[derive(Debug, Deserialize)]
struct InquiryOpenParams {
    account_id: String,
}

#[derive(Debug, Deserialize)]
struct InquiryUpdateParams {
    session_id: String,
    #[serde(flatten)]
    update: DraftUpdate,
}

#[derive(Clone, Debug, Serialize)]
struct InquiryCloseResponse {
    closed: bool,
}

pub fn module(state: Storefront) -> Result<RpcModule<Storefront>> {
    let mut m = RpcModule::new(state);

    m.register_async_method("inquiry.open", |params, state, _| async move {
        let InquiryOpenParams { account_id } = params
            .parse()
            .map_err(|e| RpcError::InvalidParams(e.to_string()))?;
        open(&state, &account_id).await
    })?;

    m.register_async_method("inquiry.update", |params, state, _| async move {
        let InquiryUpdateParams { session_id, update } = params
            .parse()
            .map_err(|e| RpcError::InvalidParams(e.to_string()))?;
        update_draft(&state, &session_id, update).await
    })?;

    m.register_async_method("inquiry.submit", |params, state, _| async move {
        let SessionParams { session_id } = params
            .parse()
            .map_err(|e| RpcError::InvalidParams(e.to_string()))?;
        submit(&state, &session_id).await
    })?;

    m.register_async_method("inquiry.status", |params, state, _| async move {
        let SessionParams { session_id } = params
            .parse()
            .map_err(|e| RpcError::InvalidParams(e.to_string()))?;
        status(&state, &session_id).await
    })?;

    m.register_async_method("inquiry.close", |params, state, _| async move {
        let SessionParams { session_id } = params
            .parse()
            .map_err(|e| RpcError::InvalidParams(e.to_string()))?;
        let closed = state.close_inquiry(&session_id).await;
        Ok::<InquiryCloseResponse, RpcError>(InquiryCloseResponse { closed })
    })?;

    Ok(m)
}

async fn open(state: &Storefront, account_id: &str) -> Result<InquiryView, RpcError> {
    let session = state.open_inquiry(account_id).await?;
    Ok(InquiryView::from(&session))
}

async fn update_draft(
    state: &Storefront,
    session_id: &str,
    update: DraftUpdate,
) -> Result<InquiryView, RpcError> {
    let session = state.update_inquiry(session_id, update).await?;
    Ok(InquiryView::from(&session))
}

async fn submit(state: &Storefront, session_id: &str) -> Result<InquiryView, RpcError> {
    let session = state.submit_inquiry(session_id).await?;
    Ok(InquiryView::from(&session))
}

async fn status(state: &Storefront, session_id: &str) -> Result<InquiryView, RpcError> {
    let session = state
        .inquiry(session_id)
        .await
        .ok_or_else(|| RpcError::NotFound(format!("inquiry session {session_id}")))?;
    Ok(InquiryView::from(&session))
}
