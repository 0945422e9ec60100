//! Device identity: a best-effort stable identifier for this machine.
//!
//! Identification can fail (no machine id, sandboxed environment). Callers always get an id
//! anyway: `DeviceIdentity::resolve` falls back to a random pseudo-identity, and keeps which
//! of the two happened so it can be logged.

mod fingerprint;

use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;
use tracing::{info, warn};

pub use fingerprint::MachineFingerprint;

/// Prefix marking ids that were not derived from the device.
const FALLBACK_PREFIX: &str = "fallback-";

/// Random characters appended to the fallback prefix.
const FALLBACK_SUFFIX_LEN: usize = 8;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Produces an opaque identifier for the current device.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Identify the device. Any error means the device could not be identified.
    async fn identify(&self) -> Result<String>;
}

/// Outcome of device identification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceIdentity {
    /// Id reported by the identity provider
    Identified(String),
    /// Random id generated because the provider failed
    Fallback(String),
}

impl DeviceIdentity {
    /// Ask `provider` for an id, falling back to a random one on any failure.
    pub async fn resolve(provider: &dyn IdentityProvider) -> Self {
        match provider.identify().await {
            Ok(id) if !id.is_empty() => {
                info!("Device identified as {}", id);
                DeviceIdentity::Identified(id)
            }
            Ok(_) => {
                let id = fallback_id();
                warn!("Identity provider returned an empty id, using fallback {}", id);
                DeviceIdentity::Fallback(id)
            }
            Err(e) => {
                let id = fallback_id();
                warn!("Device identification failed ({:#}), using fallback {}", e, id);
                DeviceIdentity::Fallback(id)
            }
        }
    }

    /// The identifier, whichever way it was obtained.
    pub fn id(&self) -> &str {
        match self {
            DeviceIdentity::Identified(id) | DeviceIdentity::Fallback(id) => id,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, DeviceIdentity::Fallback(_))
    }
}

/// Generate a random pseudo-identity. Collisions are tolerable; this is not a security boundary.
pub fn fallback_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..FALLBACK_SUFFIX_LEN).map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char).collect();
    format!("{}{}", FALLBACK_PREFIX, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    #[async_trait]
    impl IdentityProvider for Fixed {
        async fn identify(&self) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Unsupported;

    #[async_trait]
    impl IdentityProvider for Unsupported {
        async fn identify(&self) -> Result<String> {
            anyhow::bail!("fingerprinting blocked")
        }
    }

    #[test]
    fn test_fallback_id_shape() {
        let id = fallback_id();
        assert!(id.starts_with(FALLBACK_PREFIX));
        assert_eq!(id.len(), FALLBACK_PREFIX.len() + FALLBACK_SUFFIX_LEN);
        assert!(id[FALLBACK_PREFIX.len()..].bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn test_fallback_ids_differ() {
        assert_ne!(fallback_id(), fallback_id());
    }

    #[tokio::test]
    async fn test_resolve_identified() {
        let identity = DeviceIdentity::resolve(&Fixed("abc123")).await;
        assert_eq!(identity, DeviceIdentity::Identified("abc123".into()));
        assert_eq!(identity.id(), "abc123");
        assert!(!identity.is_fallback());
    }

    #[tokio::test]
    async fn test_resolve_falls_back_on_error() {
        let identity = DeviceIdentity::resolve(&Unsupported).await;
        assert!(identity.is_fallback());
        assert!(identity.id().starts_with(FALLBACK_PREFIX));
    }

    #[tokio::test]
    async fn test_resolve_falls_back_on_empty_id() {
        let identity = DeviceIdentity::resolve(&Fixed("")).await;
        assert!(identity.is_fallback());
        assert!(!identity.id().is_empty());
    }
}
