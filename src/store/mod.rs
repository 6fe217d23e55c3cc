#![forbid(unsafe_code)]

use std::cmp::Ordering;
use std::future::Future;

use thiserror::Error;

use crate::core::model::{Inquiry, Listing, STATUS_AVAILABLE};

pub mod memory;
pub mod postgrest;

pub use memory::MemoryStore;
pub use postgrest::PostgrestStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("store returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid store url: {0}")]
    Url(#[from] url::ParseError),
    #[error("failed to encode query: {0}")]
    Query(String),
    #[error("failed to read fixtures: {0}")]
    Fixtures(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListingColumn {
    Featured,
    Price,
}

impl ListingColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingColumn::Featured => "featured",
            ListingColumn::Price => "price",
        }
    }

    fn compare(&self, a: &Listing, b: &Listing) -> Ordering {
        match self {
            ListingColumn::Featured => a.featured.cmp(&b.featured),
            ListingColumn::Price => a.price.total_cmp(&b.price),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderBy {
    pub column: ListingColumn,
    pub descending: bool,
}

impl OrderBy {
    pub fn desc(column: ListingColumn) -> Self {
        Self {
            column,
            descending: true,
        }
    }
}

/// A listings read: an equality filter on `status` plus ordered sort keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingQuery {
    pub status: String,
    pub order: Vec<OrderBy>,
}

impl ListingQuery {
    /// Available listings, featured first, then most expensive first.
    pub fn available_catalog() -> Self {
        Self {
            status: STATUS_AVAILABLE.to_string(),
            order: vec![
                OrderBy::desc(ListingColumn::Featured),
                OrderBy::desc(ListingColumn::Price),
            ],
        }
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        listing.status == self.status
    }

    pub fn compare(&self, a: &Listing, b: &Listing) -> Ordering {
        for key in &self.order {
            let ord = key.column.compare(a, b);
            let ord = if key.descending { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Applies the filter and a stable sort, the way the hosted store does.
    pub fn apply(&self, listings: &[Listing]) -> Vec<Listing> {
        let mut out: Vec<Listing> = listings
            .iter()
            .filter(|listing| self.matches(listing))
            .cloned()
            .collect();
        out.sort_by(|a, b| self.compare(a, b));
        out
    }
}

pub trait ListingStore: Send + Sync {
    fn fetch_listings(
        &self,
        query: &ListingQuery,
    ) -> impl Future<Output = Result<Vec<Listing>, StoreError>> + Send;

    fn insert_inquiry(
        &self,
        inquiry: &Inquiry,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// The configured backend.
#[derive(Clone)]
pub enum Backend {
    Postgrest(PostgrestStore),
    Memory(MemoryStore),
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Postgrest(_) => "postgrest",
            Backend::Memory(_) => "memory",
        }
    }
}

impl ListingStore for Backend {
    async fn fetch_listings(&self, query: &ListingQuery) -> Result<Vec<Listing>, StoreError> {
        match self {
            Backend::Postgrest(store) => store.fetch_listings(query).await,
            Backend::Memory(store) => store.fetch_listings(query).await,
        }
    }

    async fn insert_inquiry(&self, inquiry: &Inquiry) -> Result<(), StoreError> {
        match self {
            Backend::Postgrest(store) => store.insert_inquiry(inquiry).await,
            Backend::Memory(store) => store.insert_inquiry(inquiry).await,
        }
    }
}
