//! Post-checkout balance refresh.

use std::time::Duration;

use tracing::info;

use crate::session::{Session, SessionStore};

/// Wait for the payment webhook to land, then refresh and return the session.
pub async fn run(store: &SessionStore, settle_delay: Duration) -> Session {
    if !settle_delay.is_zero() {
        info!("⏳ Waiting {}ms for the payment to be processed", settle_delay.as_millis());
        tokio::time::sleep(settle_delay).await;
    }

    store.refresh().await;
    store.snapshot()
}
