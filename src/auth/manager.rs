//! Process-wide token cache with on-demand and forced refresh

use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;

use super::clock::Clock;
use super::oauth::TokenSource;
use super::tokens::StoredToken;
use crate::error::Result;

/// Holds at most one access token and hands out valid bearer values.
///
/// The slot is always replaced wholesale. Acquisitions are funnelled through
/// `acquire_gate`, so concurrent callers that all find the slot empty or
/// expired share a single round trip to the identity endpoint.
pub struct TokenManager {
    source: Arc<dyn TokenSource>,
    clock: Arc<dyn Clock>,
    current: RwLock<Option<StoredToken>>,
    acquire_gate: Mutex<()>,
}

impl TokenManager {
    pub fn new(source: Arc<dyn TokenSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            clock,
            current: RwLock::new(None),
            acquire_gate: Mutex::new(()),
        }
    }

    /// Return the cached token if it is still fresh, otherwise mint, store
    /// and return a new one.
    pub async fn get_valid_token(&self) -> Result<String> {
        if let Some(token) = self.fresh_cached() {
            return Ok(token);
        }

        let _gate = self.acquire_gate.lock().await;

        // Another caller may have refilled the slot while we waited
        if let Some(token) = self.fresh_cached() {
            tracing::debug!("Token refreshed by a concurrent caller");
            return Ok(token);
        }

        tracing::info!("Access token missing or expired, acquiring...");
        self.acquire().await
    }

    /// Mint a new token regardless of what is cached. Used after the API
    /// has rejected the cached token with 401.
    pub async fn refresh_token(&self) -> Result<String> {
        let _gate = self.acquire_gate.lock().await;
        tracing::info!("Forcing access token refresh");
        self.acquire().await
    }

    /// Fail fast at startup if no token can be obtained.
    pub async fn initialize_token(&self) -> Result<()> {
        self.get_valid_token().await.map(|_| ())
    }

    /// The cached token, fresh or not.
    pub fn snapshot(&self) -> Option<StoredToken> {
        self.read_slot().clone()
    }

    fn fresh_cached(&self) -> Option<String> {
        let now = self.clock.now_millis();
        self.read_slot()
            .as_ref()
            .filter(|t| !t.is_expired(now))
            .map(|t| t.token.clone())
    }

    async fn acquire(&self) -> Result<String> {
        let token = self.source.fetch_token().await?;
        let value = token.token.clone();

        let mut slot = self.current.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(token);
        Ok(value)
    }

    // A poisoned lock still holds a whole token; the slot is never partially written
    fn read_slot(&self) -> std::sync::RwLockReadGuard<'_, Option<StoredToken>> {
        self.current.read().unwrap_or_else(|e| e.into_inner())
    }
}
