//! Device/token session store.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use crate::api::{AccountService, TokenStatus};
use crate::identity::{DeviceIdentity, IdentityProvider};

/// Balance shown before the first status fetch completes, so the client is usable right away.
const PLACEHOLDER_TOKENS: u32 = 5;

/// Snapshot of the device session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque device identifier, empty until initialization completes
    pub device_id: String,
    /// Remaining generations as last reported by the account service
    pub tokens_remaining: u32,
    /// Premium flag as last reported by the account service
    pub is_premium: bool,
    /// Set once a device id has been assigned; never cleared
    pub is_initialized: bool,
    /// Whether `device_id` is a random fallback rather than a real fingerprint
    pub is_fallback: bool,
    /// Set once a status fetch has succeeded; until then the balance is the placeholder
    pub is_confirmed: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            device_id: String::new(),
            tokens_remaining: PLACEHOLDER_TOKENS,
            is_premium: false,
            is_initialized: false,
            is_fallback: false,
            is_confirmed: false,
        }
    }
}

/// Owns the session and keeps its balance in sync with the account service.
///
/// Readers take snapshots; only `initialize` and `refresh` mutate. Concurrent refreshes are not
/// deduplicated and whichever response lands last wins.
pub struct SessionStore {
    state: RwLock<Session>,
    init_lock: AsyncMutex<()>, // Serializes initialize() so the provider runs at most once
    identity: Arc<dyn IdentityProvider>,
    accounts: Arc<dyn AccountService>,
}

impl SessionStore {
    /// Create a store with placeholder values. Nothing is fetched until `initialize`.
    pub fn new(identity: Arc<dyn IdentityProvider>, accounts: Arc<dyn AccountService>) -> Self {
        Self { state: RwLock::new(Session::default()), init_lock: AsyncMutex::new(()), identity, accounts }
    }

    /// Copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.state.read().clone()
    }

    /// Current device id (empty before initialization).
    pub fn device_id(&self) -> String {
        self.state.read().device_id.clone()
    }

    pub fn tokens_remaining(&self) -> u32 {
        self.state.read().tokens_remaining
    }

    fn is_initialized(&self) -> bool {
        self.state.read().is_initialized
    }

    /// Assign the device id and load the initial balance.
    ///
    /// Idempotent: once initialized, further calls return immediately. Never fails; after it
    /// returns the session is initialized with a non-empty device id.
    pub async fn initialize(&self) {
        if self.is_initialized() {
            return;
        }

        let _guard = self.init_lock.lock().await;
        if self.is_initialized() {
            // Another caller finished while we waited for the lock
            return;
        }

        let identity = DeviceIdentity::resolve(self.identity.as_ref()).await;
        {
            let mut state = self.state.write();
            state.device_id = identity.id().to_string();
            state.is_fallback = identity.is_fallback();
            state.is_initialized = true;
        }

        match identity {
            DeviceIdentity::Identified(device_id) => match self.accounts.token_status(&device_id).await {
                Ok(status) => self.apply_status(&status),
                Err(e) => warn!("Initial token status fetch failed, keeping placeholder balance: {}", e),
            },
            DeviceIdentity::Fallback(_) => {
                // NOTE: unlike the identified path, no status fetch here. The placeholder balance
                // stays until the next refresh(). Open with product whether fallback devices
                // should load their balance during initialization.
                debug!("Skipping initial status fetch for fallback device id");
            }
        }
    }

    /// Re-fetch the balance for the current device.
    ///
    /// No-op before initialization. Failures are logged and leave the cached values untouched.
    pub async fn refresh(&self) {
        let device_id = self.device_id();
        if device_id.is_empty() {
            debug!("Refresh requested before device initialization, ignoring");
            return;
        }

        match self.accounts.token_status(&device_id).await {
            Ok(status) => self.apply_status(&status),
            Err(e) => warn!("Failed to refresh token status: {}", e),
        }
    }

    /// Overwrite the balance from a single response under one write lock.
    fn apply_status(&self, status: &TokenStatus) {
        let mut state = self.state.write();
        state.tokens_remaining = status.tokens_remaining;
        state.is_premium = status.is_premium;
        state.is_confirmed = true;
        info!("💰 Tokens remaining: {}{}", state.tokens_remaining, if state.is_premium { " (premium)" } else { "" });
    }
}
