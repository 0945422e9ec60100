//! Pricing tiers and checkout.

use anyhow::Result;
use tracing::{error, info, warn};

use crate::api::AccountClient;
use crate::config::Tier;
use crate::session::SessionStore;

/// A purchasable plan as presented to users.
#[derive(Debug, Clone, Copy)]
pub struct Plan {
    pub tier: Tier,
    pub price: &'static str,
    pub generations: Option<u32>, // None means unlimited
    pub popular: bool,
    pub features: &'static [&'static str],
}

pub const PLANS: &[Plan] = &[
    Plan {
        tier: Tier::Starter,
        price: "$4.99",
        generations: Some(50),
        popular: false,
        features: &["50 generations", "All 12 voices", "MP3 download", "Credits never expire"],
    },
    Plan {
        tier: Tier::Pro,
        price: "$9.99",
        generations: Some(150),
        popular: true,
        features: &["150 generations", "All 12 voices", "MP3 download", "Credits never expire", "Priority support"],
    },
    Plan {
        tier: Tier::Unlimited,
        price: "$9.99/mo",
        generations: None,
        popular: false,
        features: &["Unlimited generations", "All 12 voices", "MP3 download", "Priority support", "Cancel anytime"],
    },
];

/// Look up the plan for a tier.
pub fn plan(tier: Tier) -> &'static Plan {
    match tier {
        Tier::Starter => &PLANS[0],
        Tier::Pro => &PLANS[1],
        Tier::Unlimited => &PLANS[2],
    }
}

/// Print all plans.
pub fn print_pricing() {
    println!("═══════════════════════════════════════════════════════════════════");
    println!("  Pricing");
    println!("═══════════════════════════════════════════════════════════════════");

    for plan in PLANS {
        let credits = plan.generations.map(|n| n.to_string()).unwrap_or_else(|| "∞".to_string());
        println!();
        println!("── {} {} ── {} generations{}", plan.tier, plan.price, credits, if plan.popular { "  ★ Most popular" } else { "" });
        for feature in plan.features {
            println!("  ✓ {}", feature);
        }
    }

    println!();
    println!("Usage:");
    println!("  ./tts-client checkout pro");
}

/// Start a checkout session for `tier` and return the URL to complete payment at.
///
/// A fallback device id only lives for one run, so credits bought with it would be lost.
/// Checkout refuses such ids unless `allow_fallback_id` is set.
///
/// # Errors
/// Returns an error for a fallback id without `allow_fallback_id`, or the service's message if
/// the checkout session cannot be created.
pub async fn checkout(store: &SessionStore, client: &AccountClient, tier: Tier, success_url: &str, allow_fallback_id: bool) -> Result<String> {
    let session = store.snapshot();
    if session.is_fallback {
        if !allow_fallback_id {
            anyhow::bail!(
                "This device could not be identified, so purchased credits would be tied to the temporary id {} and lost \
                 after this run. Re-run with --allow-fallback-id to buy anyway",
                session.device_id
            );
        }
        warn!("⚠️  Buying with temporary device id {}; credits will not be visible to later runs", session.device_id);
    }

    let plan = plan(tier);
    info!("💳 Creating checkout for {} ({})", plan.tier, plan.price);

    match client.create_checkout(tier.as_product_id(), &session.device_id, success_url).await {
        Ok(url) => {
            info!("Checkout ready, returning to {} when done", success_url);
            Ok(url)
        }
        Err(e) => {
            error!("Failed to create checkout (HTTP {}): {}", e.status().map(|s| s.to_string()).unwrap_or_else(|| "-".into()), e);
            Err(e.into())
        }
    }
}
