#![forbid(unsafe_code)]

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::core::model::{Inquiry, Listing};

use super::{ListingQuery, ListingStore, StoreError};

const REST_PREFIX: [&str; 2] = ["rest", "v1"];

/// Client for a Supabase-style PostgREST endpoint.
#[derive(Clone)]
pub struct PostgrestStore {
    http: reqwest::Client,
    base: Url,
    anon_key: String,
    listings_table: String,
    inquiries_table: String,
}

#[derive(Debug, Serialize)]
struct SelectParams<'a> {
    select: &'a str,
    status: String,
    order: String,
}

impl PostgrestStore {
    pub fn new(
        base_url: &str,
        anon_key: impl Into<String>,
        listings_table: impl Into<String>,
        inquiries_table: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(StoreError::Query(format!(
                "store url cannot be a base: {base_url}"
            )));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base,
            anon_key: anon_key.into(),
            listings_table: listings_table.into(),
            inquiries_table: inquiries_table.into(),
        })
    }

    pub(crate) fn table_url(&self, table: &str) -> Result<Url, StoreError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Query(format!("store url cannot be a base: {}", self.base)))?
            .pop_if_empty()
            .extend(REST_PREFIX)
            .push(table);
        Ok(url)
    }

    fn auth_headers(&self) -> Result<HeaderMap, StoreError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&self.anon_key)
            .map_err(|e| StoreError::Query(format!("invalid anon key: {e}")))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.anon_key))
            .map_err(|e| StoreError::Query(format!("invalid anon key: {e}")))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }

    pub(crate) fn listings_request(
        &self,
        query: &ListingQuery,
    ) -> Result<reqwest::RequestBuilder, StoreError> {
        let params = SelectParams {
            select: "*",
            status: format!("eq.{}", query.status),
            order: encode_order(query),
        };
        let qs = serde_qs::to_string(&params).map_err(|e| StoreError::Query(e.to_string()))?;
        let mut url = self.table_url(&self.listings_table)?;
        url.set_query(Some(&qs));
        Ok(self.http.get(url).headers(self.auth_headers()?))
    }

    pub(crate) fn inquiry_request(
        &self,
        inquiry: &Inquiry,
    ) -> Result<reqwest::RequestBuilder, StoreError> {
        let url = self.table_url(&self.inquiries_table)?;
        Ok(self
            .http
            .post(url)
            .headers(self.auth_headers()?)
            .header("Prefer", "return=minimal")
            .json(&[inquiry]))
    }
}

fn encode_order(query: &ListingQuery) -> String {
    query
        .order
        .iter()
        .map(|key| {
            let dir = if key.descending { "desc" } else { "asc" };
            format!("{}.{dir}", key.column.as_str())
        })
        .collect::<Vec<_>>()
        .join(",")
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

impl ListingStore for PostgrestStore {
    async fn fetch_listings(&self, query: &ListingQuery) -> Result<Vec<Listing>, StoreError> {
        let request = self.listings_request(query)?;
        let response = check_status(request.send().await?).await?;
        let listings = response.json::<Vec<Listing>>().await?;
        debug!(count = listings.len(), table = %self.listings_table, "fetched listings");
        Ok(listings)
    }

    async fn insert_inquiry(&self, inquiry: &Inquiry) -> Result<(), StoreError> {
        let request = self.inquiry_request(inquiry)?;
        check_status(request.send().await?).await?;
        debug!(account_id = %inquiry.account_id, table = %self.inquiries_table, "inserted inquiry");
        Ok(())
    }
}
