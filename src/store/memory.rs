#![forbid(unsafe_code)]

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::core::model::{Inquiry, Listing};

use super::{ListingQuery, ListingStore, StoreError};

/// Process-local store, seeded from a JSON array of listing rows.
#[derive(Clone, Default)]
pub struct MemoryStore {
    listings: Arc<RwLock<Vec<Listing>>>,
    inquiries: Arc<RwLock<Vec<Inquiry>>>,
    fail_fetch: Arc<AtomicBool>,
    fail_insert: Arc<AtomicBool>,
    latency: Option<Duration>,
}

impl MemoryStore {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self {
            listings: Arc::new(RwLock::new(listings)),
            ..Self::default()
        }
    }

    pub fn from_fixture_file(path: &Path) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Fixtures(format!("{}: {e}", path.display())))?;
        let listings: Vec<Listing> = serde_json::from_str(&raw)
            .map_err(|e| StoreError::Fixtures(format!("{}: {e}", path.display())))?;
        Ok(Self::new(listings))
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_insert(&self, fail: bool) {
        self.fail_insert.store(fail, Ordering::SeqCst);
    }

    pub fn inquiries(&self) -> Vec<Inquiry> {
        self.inquiries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl ListingStore for MemoryStore {
    async fn fetch_listings(&self, query: &ListingQuery) -> Result<Vec<Listing>, StoreError> {
        self.simulate_latency().await;
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("listings fetch disabled".to_string()));
        }
        let listings = self.listings.read().unwrap_or_else(|e| e.into_inner());
        Ok(query.apply(&listings))
    }

    async fn insert_inquiry(&self, inquiry: &Inquiry) -> Result<(), StoreError> {
        self.simulate_latency().await;
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("inquiry insert disabled".to_string()));
        }
        self.inquiries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(inquiry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{STATUS_AVAILABLE, Tier};
    use crate::core::model::fixtures::listing;
    use std::io::Write;

    #[tokio::test]
    async fn fetch_applies_query() {
        let store = MemoryStore::new(vec![
            listing("cheap", Tier::Gold, 100.0, false),
            listing("pricey", Tier::Gold, 800.0, false),
        ]);
        let out = store
            .fetch_listings(&ListingQuery::available_catalog())
            .await
            .expect("fetch");
        assert_eq!(out[0].id, "pricey");
        assert_eq!(out[1].id, "cheap");
    }

    #[tokio::test]
    async fn injected_failures_surface_as_errors() {
        let store = MemoryStore::new(Vec::new());
        store.set_fail_fetch(true);
        store.set_fail_insert(true);
        assert!(store
            .fetch_listings(&ListingQuery::available_catalog())
            .await
            .is_err());
        assert!(store.insert_inquiry(&Inquiry::for_listing("x")).await.is_err());
        assert!(store.inquiries().is_empty());
    }

    #[tokio::test]
    async fn inserts_are_not_deduplicated() {
        let store = MemoryStore::new(Vec::new());
        let inquiry = Inquiry::for_listing("acc");
        store.insert_inquiry(&inquiry).await.expect("first");
        store.insert_inquiry(&inquiry).await.expect("second");
        assert_eq!(store.inquiries().len(), 2);
    }

    #[test]
    fn loads_fixture_file() {
        let rows = vec![listing("a", Tier::Diamond, 10.0, true)];
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(serde_json::to_string(&rows).expect("json").as_bytes())
            .expect("write");
        let store = MemoryStore::from_fixture_file(file.path()).expect("store");
        assert_eq!(store.listings.read().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn demo_fixtures_hide_sold_listings() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/listings.json");
        let store = MemoryStore::from_fixture_file(&path).expect("demo fixtures");
        let out = store
            .fetch_listings(&ListingQuery::available_catalog())
            .await
            .expect("fetch");
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].tier, Tier::Conqueror);
        assert!(out.iter().all(|l| l.status == STATUS_AVAILABLE));
    }

    #[test]
    fn rejects_malformed_fixture_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(b"{not json").expect("write");
        match MemoryStore::from_fixture_file(file.path()) {
            Err(StoreError::Fixtures(msg)) => assert!(msg.contains(&file.path().display().to_string())),
            _ => panic!("expected fixture error"),
        }
    }
}
