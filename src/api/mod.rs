//! Account service API: token balances, speech generation and checkout.
//!
//! The session store only needs token status, so it depends on the narrow `AccountService`
//! trait rather than on the HTTP client directly.

mod client;
mod error;

use async_trait::async_trait;

pub use client::{AccountClient, SpeechRequest, TokenStatus};
pub use error::ApiError;

/// Source of per-device token status.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Fetch the current balance for `device_id`.
    async fn token_status(&self, device_id: &str) -> Result<TokenStatus, ApiError>;
}
