#![forbid(unsafe_code)]

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::core::model::{Listing, TierSelector};
use crate::store::{ListingQuery, ListingStore};

/// Listings in the order the store returned them, narrowed to one tier.
pub fn filter_by_tier(catalog: &[Listing], selector: TierSelector) -> Vec<Listing> {
    match selector {
        TierSelector::All => catalog.to_vec(),
        TierSelector::Only(_) => catalog
            .iter()
            .filter(|listing| selector.matches(listing.tier))
            .cloned()
            .collect(),
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Partition {
    pub featured: Vec<Listing>,
    pub regular: Vec<Listing>,
}

pub fn partition(filtered: &[Listing]) -> Partition {
    let (featured, regular): (Vec<Listing>, Vec<Listing>) = filtered
        .iter()
        .cloned()
        .partition(|listing| listing.featured);
    Partition { featured, regular }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogStatus {
    pub loading: bool,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_error: Option<String>,
}

/// Catalog state owned by the storefront. Every mutation recomputes the
/// filtered view; readers never see a stale derivation.
#[derive(Clone, Debug, Default)]
pub struct CatalogState {
    listings: Vec<Listing>,
    loading: bool,
    load_error: Option<String>,
    selector: TierSelector,
    filtered: Vec<Listing>,
}

impl CatalogState {
    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    pub fn finish_load(&mut self, listings: Vec<Listing>) {
        self.listings = listings;
        self.loading = false;
        self.load_error = None;
        self.recompute();
    }

    /// A failed load leaves an empty catalog behind.
    pub fn fail_load(&mut self, error: String) {
        self.listings.clear();
        self.loading = false;
        self.load_error = Some(error);
        self.recompute();
    }

    pub fn select_tier(&mut self, selector: TierSelector) {
        self.selector = selector;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.filtered = filter_by_tier(&self.listings, self.selector);
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn status(&self) -> CatalogStatus {
        CatalogStatus {
            loading: self.loading,
            total: self.listings.len(),
            load_error: self.load_error.clone(),
        }
    }

    pub fn selector(&self) -> TierSelector {
        self.selector
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn filtered(&self) -> &[Listing] {
        &self.filtered
    }

    pub fn partition(&self) -> Partition {
        partition(&self.filtered)
    }

    pub fn find(&self, id: &str) -> Option<&Listing> {
        self.listings.iter().find(|listing| listing.id == id)
    }

    /// Whether the listing is part of the currently filtered view.
    pub fn is_displayed(&self, id: &str) -> bool {
        self.filtered.iter().any(|listing| listing.id == id)
    }
}

/// Runs the one catalog read. Store failures degrade to an empty catalog;
/// the loading flag is cleared on every path.
pub async fn load_catalog<S: ListingStore>(store: &S, catalog: &RwLock<CatalogState>) -> usize {
    catalog.write().await.begin_load();

    match store.fetch_listings(&ListingQuery::available_catalog()).await {
        Ok(listings) => {
            let count = listings.len();
            catalog.write().await.finish_load(listings);
            info!(count, "Catalog loaded");
            count
        }
        Err(err) => {
            error!(error = %err, "Error fetching listings");
            catalog.write().await.fail_load(err.to_string());
            0
        }
    }
}
