//! Lifecycle Triggers
//!
//! Host-side events (subscription cancelled, billing schedule edited)
//! forwarded to the platform. The id-resolution rule is the contract this
//! module owns: the parent order id when one exists, the subscription's
//! own id otherwise.

use std::sync::Arc;

use payzen_core::{PlatformClient, Result, Subscription, SubscriptionUpdate};

use crate::info::{end_date, Frequency};

/// Forwards host subscription events to the platform
pub struct SubscriptionLifecycle {
    platform: Arc<dyn PlatformClient>,
}

impl SubscriptionLifecycle {
    pub fn new(platform: Arc<dyn PlatformClient>) -> Self {
        Self { platform }
    }

    fn order_id(subscription: &dyn Subscription) -> u64 {
        subscription.parent_id().unwrap_or_else(|| subscription.id())
    }

    /// The host cancelled the subscription: cancel its online counterpart
    pub async fn cancel(&self, subscription: &dyn Subscription) -> Result<()> {
        self.platform
            .cancel_subscription(subscription.id(), Self::order_id(subscription))
            .await
    }

    /// The host edited the billing schedule: push the new terms.
    ///
    /// `saved` is the host's signal that the edit was actually persisted;
    /// without it this is a no-op so unrelated page loads never trigger
    /// spurious updates.
    pub async fn update(&self, subscription: &dyn Subscription, saved: bool) -> Result<()> {
        if !saved {
            return Ok(());
        }

        let update = SubscriptionUpdate {
            amount: subscription.total(),
            frequency: Frequency::from_billing_period(&subscription.billing_period())?
                .as_str()
                .to_string(),
            interval: subscription.billing_interval(),
            end_date: end_date(subscription),
        };

        self.platform
            .update_subscription(subscription.id(), Self::order_id(subscription), &update)
            .await
    }
}
