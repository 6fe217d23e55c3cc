use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::app::config::StorefrontConfig;
use crate::core::catalog::{CatalogState, CatalogStatus, load_catalog};
use crate::core::inquiry::{DraftUpdate, InquiryError};
use crate::core::model::{Inquiry, Listing, TierSelector};
use crate::core::session::{InquirySession, InquirySessionStore};
use crate::core::view::{CatalogPage, catalog_page};
use crate::store::{Backend, ListingStore};

#[derive(Clone)]
pub struct Storefront {
    started: Instant,
    pub store: Backend,
    pub(crate) catalog: Arc<RwLock<CatalogState>>,
    pub(crate) sessions: InquirySessionStore,
    pub config: StorefrontConfig,
}

impl Storefront {
    pub fn new(store: Backend, config: StorefrontConfig) -> Self {
        Self {
            started: Instant::now(),
            store,
            catalog: Arc::new(RwLock::new(CatalogState::default())),
            sessions: InquirySessionStore::new(config.session_ttl_secs),
            config,
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    pub async fn load_catalog(&self) -> usize {
        load_catalog(&self.store, &self.catalog).await
    }

    /// Starts the one catalog load in the background; the loading flag is
    /// raised before this returns.
    pub async fn spawn_catalog_load(&self) -> tokio::task::JoinHandle<usize> {
        self.catalog.write().await.begin_load();
        let storefront = self.clone();
        tokio::spawn(async move { storefront.load_catalog().await })
    }

    pub async fn catalog_status(&self) -> CatalogStatus {
        self.catalog.read().await.status()
    }

    pub async fn open_inquiries(&self) -> usize {
        self.sessions.len().await
    }

    pub async fn selected_tier(&self) -> TierSelector {
        self.catalog.read().await.selector()
    }

    pub async fn page(&self) -> CatalogPage {
        catalog_page(&*self.catalog.read().await)
    }

    /// Renders a page for `selector` without touching the stored selection.
    pub async fn page_for(&self, selector: TierSelector) -> CatalogPage {
        let catalog = self.catalog.read().await;
        if catalog.selector() == selector {
            return catalog_page(&catalog);
        }
        let mut scratch = (*catalog).clone();
        drop(catalog);
        scratch.select_tier(selector);
        catalog_page(&scratch)
    }

    pub async fn select_tier(&self, selector: TierSelector) -> CatalogPage {
        let mut catalog = self.catalog.write().await;
        catalog.select_tier(selector);
        info!(tier = %selector, shown = catalog.filtered().len(), "Tier selected");
        catalog_page(&catalog)
    }

    pub async fn listing(&self, id: &str) -> Option<Listing> {
        self.catalog.read().await.find(id).cloned()
    }

    pub async fn open_inquiry(&self, account_id: &str) -> Result<InquirySession, InquiryError> {
        let listing = {
            let catalog = self.catalog.read().await;
            if !catalog.is_displayed(account_id) {
                return Err(InquiryError::ListingNotDisplayed(account_id.to_string()));
            }
            catalog
                .find(account_id)
                .cloned()
                .ok_or_else(|| InquiryError::ListingNotDisplayed(account_id.to_string()))?
        };
        let session = self.sessions.open(listing).await;
        debug!(session_id = %session.id, account_id, "Inquiry opened");
        Ok(session)
    }

    pub async fn update_inquiry(
        &self,
        session_id: &str,
        update: DraftUpdate,
    ) -> Result<InquirySession, InquiryError> {
        self.sessions.update(session_id, update).await
    }

    pub async fn inquiry(&self, session_id: &str) -> Option<InquirySession> {
        self.sessions.get(session_id).await
    }

    pub async fn close_inquiry(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).await
    }

    /// Sends the draft once. Success schedules the session to close after the
    /// configured delay; failure leaves the draft in place for a retry.
    ///
    /// The write runs on its own task, so a caller that goes away neither
    /// aborts it nor leaves the session stuck in flight.
    pub async fn submit_inquiry(&self, session_id: &str) -> Result<InquirySession, InquiryError> {
        let draft = self.sessions.begin_submit(session_id).await?;
        let attempt = tokio::spawn(self.clone().settle_submit(session_id.to_string(), draft));
        match attempt.await {
            Ok(result) => result,
            Err(err) => {
                error!(error = %err, session_id, "Inquiry submit task failed");
                self.sessions.finish_submit(session_id, false).await;
                Err(InquiryError::SubmitFailed {
                    cause: err.to_string(),
                })
            }
        }
    }

    async fn settle_submit(
        self,
        session_id: String,
        draft: Inquiry,
    ) -> Result<InquirySession, InquiryError> {
        let outcome = self.store.insert_inquiry(&draft).await;
        let succeeded = outcome.is_ok();
        if let Err(err) = &outcome {
            error!(error = %err, session_id, account_id = %draft.account_id, "Error submitting inquiry");
        }

        let Some(session) = self.sessions.finish_submit(&session_id, succeeded).await else {
            debug!(session_id, succeeded, "Inquiry closed before the write settled");
            return Err(InquiryError::SessionNotFound(session_id));
        };

        match outcome {
            Ok(()) => {
                info!(session_id, account_id = %draft.account_id, "Inquiry submitted");
                self.schedule_close(session_id);
                Ok(session)
            }
            Err(err) => Err(InquiryError::SubmitFailed {
                cause: err.to_string(),
            }),
        }
    }

    fn schedule_close(&self, session_id: String) {
        let sessions = self.sessions.clone();
        let delay = Duration::from_millis(self.config.auto_close_ms);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if sessions.remove_if_submitted(&session_id).await {
                debug!(session_id, "Inquiry closed after submit");
            }
        });
    }
}
