#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

use crate::core::inquiry::{DraftUpdate, InquiryError, SUBMIT_FAILED_NOTICE, validate_draft};
use crate::core::model::{Inquiry, Listing};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitPhase {
    Editing,
    Submitting,
    Submitted,
}

/// One open purchase form: the listing it was opened for and the draft
/// being typed into it.
#[derive(Clone, Debug)]
pub struct InquirySession {
    pub id: String,
    pub listing: Listing,
    pub draft: Inquiry,
    pub phase: SubmitPhase,
    pub notice: Option<String>,
    pub attempts: u32,
    pub expires_at: Option<Instant>,
}

impl InquirySession {
    /// A session whose write is in flight never expires; the outcome still
    /// has to land on it.
    pub fn is_expired(&self) -> bool {
        if self.submitting() {
            return false;
        }
        self.expires_at
            .map(|expires_at| expires_at <= Instant::now())
            .unwrap_or(false)
    }

    pub fn submitting(&self) -> bool {
        self.phase == SubmitPhase::Submitting
    }

    pub fn submitted(&self) -> bool {
        self.phase == SubmitPhase::Submitted
    }
}

pub fn session_expires_at(ttl: Option<Duration>) -> Option<Instant> {
    ttl.map(|ttl| Instant::now() + ttl)
}

/// Live inquiry sessions keyed by id. Sessions idle past the ttl are dropped
/// on the next access; every `open` also sweeps the whole map.
#[derive(Clone, Default)]
pub struct InquirySessionStore {
    inner: Arc<Mutex<HashMap<String, InquirySession>>>,
    ttl: Option<Duration>,
}

impl InquirySessionStore {
    /// `ttl_secs == 0` disables expiry.
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            inner: Arc::default(),
            ttl: (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs)),
        }
    }

    pub async fn open(&self, listing: Listing) -> InquirySession {
        let session = InquirySession {
            id: Uuid::new_v4().to_string(),
            draft: Inquiry::for_listing(listing.id.clone()),
            listing,
            phase: SubmitPhase::Editing,
            notice: None,
            attempts: 0,
            expires_at: session_expires_at(self.ttl),
        };
        let mut sessions = self.inner.lock().await;
        sessions.retain(|_, session| !session.is_expired());
        sessions.insert(session.id.clone(), session.clone());
        session
    }

    pub async fn get(&self, session_id: &str) -> Option<InquirySession> {
        let mut sessions = self.inner.lock().await;
        live_session(&mut sessions, session_id).cloned()
    }

    pub async fn update(
        &self,
        session_id: &str,
        update: DraftUpdate,
    ) -> Result<InquirySession, InquiryError> {
        let mut sessions = self.inner.lock().await;
        let session = live_session(&mut sessions, session_id)
            .ok_or_else(|| InquiryError::SessionNotFound(session_id.to_string()))?;
        if session.submitted() {
            return Err(InquiryError::AlreadySubmitted);
        }
        update.apply(&mut session.draft);
        session.expires_at = session_expires_at(self.ttl);
        Ok(session.clone())
    }

    /// Moves the session into flight and hands back the draft to send.
    pub async fn begin_submit(&self, session_id: &str) -> Result<Inquiry, InquiryError> {
        let mut sessions = self.inner.lock().await;
        let session = live_session(&mut sessions, session_id)
            .ok_or_else(|| InquiryError::SessionNotFound(session_id.to_string()))?;
        match session.phase {
            SubmitPhase::Submitting => return Err(InquiryError::InFlight),
            SubmitPhase::Submitted => return Err(InquiryError::AlreadySubmitted),
            SubmitPhase::Editing => {}
        }
        validate_draft(&session.draft)?;
        session.phase = SubmitPhase::Submitting;
        session.notice = None;
        session.attempts += 1;
        Ok(session.draft.clone())
    }

    /// Records the outcome of an attempt. Returns `None` when the session was
    /// closed while the write was in flight.
    pub async fn finish_submit(&self, session_id: &str, succeeded: bool) -> Option<InquirySession> {
        let mut sessions = self.inner.lock().await;
        let session = sessions.get_mut(session_id)?;
        if succeeded {
            session.phase = SubmitPhase::Submitted;
            session.notice = None;
        } else {
            session.phase = SubmitPhase::Editing;
            session.notice = Some(SUBMIT_FAILED_NOTICE.to_string());
            session.expires_at = session_expires_at(self.ttl);
        }
        Some(session.clone())
    }

    pub async fn remove(&self, session_id: &str) -> bool {
        let mut sessions = self.inner.lock().await;
        sessions.remove(session_id).is_some()
    }

    pub async fn remove_if_submitted(&self, session_id: &str) -> bool {
        let mut sessions = self.inner.lock().await;
        let submitted = sessions
            .get(session_id)
            .map(|session| session.submitted())
            .unwrap_or(false);
        if submitted {
            sessions.remove(session_id);
        }
        submitted
    }

    pub async fn len(&self) -> usize {
        let mut sessions = self.inner.lock().await;
        sessions.retain(|_, session| !session.is_expired());
        sessions.len()
    }
}

fn live_session<'a>(
    sessions: &'a mut HashMap<String, InquirySession>,
    session_id: &str,
) -> Option<&'a mut InquirySession> {
    let expired = sessions
        .get(session_id)
        .map(|session| session.is_expired())
        .unwrap_or(false);
    if expired {
        sessions.remove(session_id);
        return None;
    }
    sessions.get_mut(session_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Tier;
    use crate::core::model::fixtures::listing;

    fn contact() -> DraftUpdate {
        DraftUpdate {
            customer_name: Some("Vikram".to_string()),
            customer_email: Some("vikram@example.com".to_string()),
            customer_phone: Some("+91 91234 56789".to_string()),
            message: None,
        }
    }

    #[tokio::test]
    async fn open_creates_blank_draft_for_listing() {
        let store = InquirySessionStore::default();
        let session = store.open(listing("acc-7", Tier::Ace, 3000.0, false)).await;
        assert_eq!(session.draft.account_id, "acc-7");
        assert_eq!(session.phase, SubmitPhase::Editing);
        assert!(store.get(&session.id).await.is_some());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn each_open_gets_a_fresh_session() {
        let store = InquirySessionStore::default();
        let a = store.open(listing("acc", Tier::Ace, 1.0, false)).await;
        let b = store.open(listing("acc", Tier::Ace, 1.0, false)).await;
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn begin_submit_requires_contact_fields() {
        let store = InquirySessionStore::default();
        let session = store.open(listing("acc", Tier::Gold, 1.0, false)).await;
        let err = store.begin_submit(&session.id).await.expect_err("blank");
        assert!(matches!(err, InquiryError::MissingField("customer_name")));
        let after = store.get(&session.id).await.expect("session");
        assert_eq!(after.phase, SubmitPhase::Editing);
        assert_eq!(after.attempts, 0);
    }

    #[tokio::test]
    async fn second_submit_while_in_flight_is_rejected() {
        let store = InquirySessionStore::default();
        let session = store.open(listing("acc", Tier::Gold, 1.0, false)).await;
        store.update(&session.id, contact()).await.expect("update");
        store.begin_submit(&session.id).await.expect("first");
        let err = store.begin_submit(&session.id).await.expect_err("second");
        assert!(matches!(err, InquiryError::InFlight));
    }

    #[tokio::test]
    async fn failed_attempt_keeps_draft_and_sets_notice() {
        let store = InquirySessionStore::default();
        let session = store.open(listing("acc", Tier::Gold, 1.0, false)).await;
        let edited = store.update(&session.id, contact()).await.expect("update");
        store.begin_submit(&session.id).await.expect("begin");
        let after = store
            .finish_submit(&session.id, false)
            .await
            .expect("still open");
        assert_eq!(after.phase, SubmitPhase::Editing);
        assert_eq!(after.draft, edited.draft);
        assert_eq!(after.notice.as_deref(), Some(SUBMIT_FAILED_NOTICE));

        store.begin_submit(&session.id).await.expect("retry");
        let retried = store.get(&session.id).await.expect("session");
        assert_eq!(retried.attempts, 2);
        assert!(retried.notice.is_none());
    }

    #[tokio::test]
    async fn submitted_session_is_frozen() {
        let store = InquirySessionStore::default();
        let session = store.open(listing("acc", Tier::Gold, 1.0, false)).await;
        store.update(&session.id, contact()).await.expect("update");
        store.begin_submit(&session.id).await.expect("begin");
        store.finish_submit(&session.id, true).await.expect("open");

        assert!(matches!(
            store.begin_submit(&session.id).await,
            Err(InquiryError::AlreadySubmitted)
        ));
        assert!(matches!(
            store.update(&session.id, DraftUpdate::default()).await,
            Err(InquiryError::AlreadySubmitted)
        ));
    }

    #[tokio::test]
    async fn outcome_for_closed_session_is_dropped() {
        let store = InquirySessionStore::default();
        let session = store.open(listing("acc", Tier::Gold, 1.0, false)).await;
        store.update(&session.id, contact()).await.expect("update");
        store.begin_submit(&session.id).await.expect("begin");
        assert!(store.remove(&session.id).await);
        assert!(store.finish_submit(&session.id, true).await.is_none());
    }

    #[tokio::test]
    async fn remove_if_submitted_skips_editing_sessions() {
        let store = InquirySessionStore::default();
        let session = store.open(listing("acc", Tier::Gold, 1.0, false)).await;
        assert!(!store.remove_if_submitted(&session.id).await);
        assert!(store.get(&session.id).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn idle_sessions_expire_after_ttl() {
        let store = InquirySessionStore::new(60);
        let idle = store.open(listing("acc", Tier::Gold, 1.0, false)).await;
        let busy = store.open(listing("acc", Tier::Gold, 1.0, false)).await;

        tokio::time::sleep(Duration::from_secs(45)).await;
        store.update(&busy.id, contact()).await.expect("touch");

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(store.get(&idle.id).await.is_none());
        assert!(matches!(
            store.update(&idle.id, contact()).await,
            Err(InquiryError::SessionNotFound(_))
        ));
        assert!(store.get(&busy.id).await.is_some());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_sessions_are_swept_on_open() {
        let store = InquirySessionStore::new(60);
        for _ in 0..1_000 {
            store.open(listing("acc", Tier::Ace, 1.0, false)).await;
        }
        tokio::time::sleep(Duration::from_secs(7 * 24 * 3600)).await;
        store.open(listing("acc", Tier::Ace, 1.0, false)).await;
        assert_eq!(store.inner.lock().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_session_outlives_ttl() {
        let store = InquirySessionStore::new(60);
        let session = store.open(listing("acc", Tier::Gold, 1.0, false)).await;
        store.update(&session.id, contact()).await.expect("update");
        store.begin_submit(&session.id).await.expect("begin");

        tokio::time::sleep(Duration::from_secs(120)).await;
        let after = store
            .finish_submit(&session.id, false)
            .await
            .expect("still tracked");
        assert_eq!(after.phase, SubmitPhase::Editing);
        assert!(store.get(&session.id).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_ttl_keeps_sessions() {
        let store = InquirySessionStore::new(0);
        let session = store.open(listing("acc", Tier::Gold, 1.0, false)).await;
        assert!(session.expires_at.is_none());
        tokio::time::sleep(Duration::from_secs(7 * 24 * 3600)).await;
        assert!(store.get(&session.id).await.is_some());
    }
}
