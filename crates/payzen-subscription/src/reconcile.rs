//! Notification Reconciliation
//!
//! Applies platform notifications to local subscription and order state.
//! Metadata is written delete-then-set, so redelivering the same
//! notification leaves the same state behind.

use std::sync::Arc;

use payzen_core::{currency, OrderStatus, PaymentResponse, Result, SubscriptionRegistry};

use crate::info::METHOD_SUBSCRIPTION;

pub const META_SUBSCRIPTION_ID: &str = "Subscription ID";
pub const META_SUBSCRIPTION_AMOUNT: &str = "Subscription amount";
pub const META_EFFECT_DATE: &str = "Effect date";
pub const META_RECURRENCE_NUMBER: &str = "Recurrence number";

/// `20260901` → `2026-09-01`; anything else passes through unchanged
fn format_effect_date(raw: &str) -> String {
    if raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}-{}-{}", &raw[0..4], &raw[4..6], &raw[6..8])
    } else {
        raw.to_string()
    }
}

/// Display string for the recurring amount carried by a notification
fn display_sub_amount(response: &PaymentResponse, currency_code: Option<&str>) -> String {
    match (
        response.sub_amount().and_then(|a| a.parse::<i64>().ok()),
        currency_code,
    ) {
        (Some(minor), Some(code)) => currency::display_amount(minor, code),
        _ => response.sub_amount().unwrap_or_default().to_string(),
    }
}

/// Applies subscription lifecycle notifications to local state
pub struct Reconciler {
    registry: Arc<dyn SubscriptionRegistry>,
    method_id: String,
}

impl Reconciler {
    pub fn new(registry: Arc<dyn SubscriptionRegistry>) -> Self {
        Self {
            registry,
            method_id: METHOD_SUBSCRIPTION.to_string(),
        }
    }

    pub fn with_method_id(registry: Arc<dyn SubscriptionRegistry>, method_id: &str) -> Self {
        Self {
            registry,
            method_id: method_id.to_string(),
        }
    }

    /// Apply a new-subscription registration result to the order's
    /// subscription.
    ///
    /// Metadata is overwritten unconditionally; success marks the payment
    /// complete, anything else marks it failed. There is no pending
    /// branch here, unlike renewals.
    pub fn process_subscription(&self, order_id: u64, response: &PaymentResponse) -> Result<()> {
        let Some(subscription) = self
            .registry
            .subscriptions_for_order(order_id)
            .into_iter()
            .next()
        else {
            tracing::debug!(order_id, "No subscription attached to order; dropping notification");
            return Ok(());
        };

        for key in [META_SUBSCRIPTION_ID, META_SUBSCRIPTION_AMOUNT, META_EFFECT_DATE] {
            subscription.delete_meta(key);
        }

        subscription.set_meta(
            META_SUBSCRIPTION_ID,
            response.subscription_id().unwrap_or_default(),
        );
        subscription.set_meta(
            META_SUBSCRIPTION_AMOUNT,
            &display_sub_amount(response, response.sub_currency()),
        );
        subscription.set_meta(
            META_EFFECT_DATE,
            &format_effect_date(response.sub_effect_date().unwrap_or_default()),
        );

        let successful = response.is_successful();
        tracing::info!(
            order_id,
            subscription_id = subscription.id(),
            online_id = response.subscription_id().unwrap_or_default(),
            successful,
            "Processed subscription registration"
        );

        if successful {
            subscription.payment_complete();
        } else {
            subscription.payment_failed();
        }

        Ok(())
    }

    /// Apply a recurring-installment result to the latest renewal order.
    ///
    /// A renewal notification implicitly confirms the payment method, so a
    /// subscription still carrying another gateway's method is migrated
    /// first. A missing renewal order drops the notification.
    pub fn process_renewal(&self, order_id: u64, response: &PaymentResponse) -> Result<()> {
        let Some(subscription) = self
            .registry
            .subscriptions_for_order(order_id)
            .into_iter()
            .next()
        else {
            tracing::debug!(order_id, "No subscription attached to order; dropping notification");
            return Ok(());
        };

        if subscription.payment_method() != self.method_id {
            subscription.set_payment_method(&self.method_id);
            subscription.save()?;
            tracing::info!(
                subscription_id = subscription.id(),
                method = %self.method_id,
                "Migrated subscription payment method"
            );
        }

        let Some(renewal_order) = subscription
            .last_renewal_order()
            .and_then(|id| self.registry.order(id))
        else {
            tracing::debug!(
                subscription_id = subscription.id(),
                "No renewal order generated yet; dropping notification"
            );
            return Ok(());
        };

        for key in [META_SUBSCRIPTION_ID, META_SUBSCRIPTION_AMOUNT, META_RECURRENCE_NUMBER] {
            renewal_order.delete_meta(key);
        }

        renewal_order.set_meta(
            META_SUBSCRIPTION_ID,
            response.subscription_id().unwrap_or_default(),
        );
        renewal_order.set_meta(
            META_SUBSCRIPTION_AMOUNT,
            &display_sub_amount(response, response.currency()),
        );
        renewal_order.set_meta(
            META_RECURRENCE_NUMBER,
            response.recurrence_number().unwrap_or_default(),
        );

        let outcome = if response.is_successful() {
            renewal_order.payment_complete();
            "complete"
        } else if response.is_pending_payment() {
            renewal_order.update_status(OrderStatus::OnHold);
            "on-hold"
        } else {
            renewal_order.update_status(OrderStatus::Failed);
            "failed"
        };

        tracing::info!(
            subscription_id = subscription.id(),
            renewal_order_id = renewal_order.id(),
            recurrence = response.recurrence_number().unwrap_or_default(),
            outcome,
            "Processed subscription renewal"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rust_decimal_macros::dec;

    use payzen_core::{MemoryOrder, MemorySubscription, MemorySubscriptionRegistry, Order, Subscription};

    fn success_response() -> PaymentResponse {
        PaymentResponse::from_params([
            ("result", "00"),
            ("trans_status", "AUTHORISED"),
            ("subscription", "sub-42"),
            ("sub_amount", "2590"),
            ("sub_currency", "978"),
            ("sub_effect_date", "20260901"),
            ("recurrence_number", "2"),
            ("currency", "978"),
        ])
    }

    fn response_with_status(status: &str) -> PaymentResponse {
        let mut params: Vec<(String, String)> = [
            ("result", "00"),
            ("subscription", "sub-42"),
            ("sub_amount", "2590"),
            ("sub_currency", "978"),
            ("recurrence_number", "2"),
            ("currency", "978"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        params.push(("trans_status".to_string(), status.to_string()));
        PaymentResponse::from_params(params)
    }

    struct Fixture {
        registry: Arc<MemorySubscriptionRegistry>,
        subscription: Arc<MemorySubscription>,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(MemorySubscriptionRegistry::new());
        let subscription = Arc::new(
            MemorySubscription::new(10, dec!(25.90), "month", 1)
                .with_payment_method(METHOD_SUBSCRIPTION),
        );
        registry.insert_subscription(subscription.clone());
        registry.link_order(1, 10);
        Fixture {
            registry,
            subscription,
        }
    }

    fn reconciler(fixture: &Fixture) -> Reconciler {
        Reconciler::new(fixture.registry.clone())
    }

    #[test]
    fn test_new_subscription_success() {
        let fx = fixture();
        reconciler(&fx)
            .process_subscription(1, &success_response())
            .unwrap();

        let meta = fx.subscription.meta_snapshot();
        assert_eq!(meta.get(META_SUBSCRIPTION_ID).map(String::as_str), Some("sub-42"));
        assert_eq!(
            meta.get(META_SUBSCRIPTION_AMOUNT).map(String::as_str),
            Some("25.90 EUR")
        );
        assert_eq!(meta.get(META_EFFECT_DATE).map(String::as_str), Some("2026-09-01"));
        assert_eq!(fx.subscription.payment_results(), vec![true]);
    }

    #[test]
    fn test_new_subscription_failure_has_no_pending_branch() {
        let fx = fixture();
        // Pending status still counts as failed for initial registration.
        reconciler(&fx)
            .process_subscription(1, &response_with_status("WAITING_AUTHORISATION"))
            .unwrap();
        assert_eq!(fx.subscription.payment_results(), vec![false]);
    }

    #[test]
    fn test_new_subscription_metadata_idempotent() {
        let fx = fixture();
        let rec = reconciler(&fx);
        rec.process_subscription(1, &success_response()).unwrap();
        let first = fx.subscription.meta_snapshot();

        rec.process_subscription(1, &success_response()).unwrap();
        assert_eq!(fx.subscription.meta_snapshot(), first);
    }

    #[test]
    fn test_new_subscription_without_subscription_is_noop() {
        let registry = Arc::new(MemorySubscriptionRegistry::new());
        let rec = Reconciler::new(registry);
        assert!(rec.process_subscription(99, &success_response()).is_ok());
    }

    fn renewal_fixture() -> (Fixture, Arc<MemoryOrder>) {
        let fx = fixture();
        let renewal = Arc::new(MemoryOrder::new(2, dec!(25.90), "EUR"));
        fx.registry.insert_order(renewal.clone());
        let subscription = Arc::new(
            MemorySubscription::new(10, dec!(25.90), "month", 1)
                .with_payment_method(METHOD_SUBSCRIPTION)
                .with_last_renewal_order(2),
        );
        fx.registry.insert_subscription(subscription.clone());
        (
            Fixture {
                registry: fx.registry,
                subscription,
            },
            renewal,
        )
    }

    #[test]
    fn test_renewal_success_marks_order_complete() {
        let (fx, renewal) = renewal_fixture();
        reconciler(&fx).process_renewal(1, &success_response()).unwrap();

        assert!(renewal.is_paid());
        let meta = renewal.meta_snapshot();
        assert_eq!(meta.get(META_SUBSCRIPTION_ID).map(String::as_str), Some("sub-42"));
        assert_eq!(meta.get(META_RECURRENCE_NUMBER).map(String::as_str), Some("2"));
        assert_eq!(
            meta.get(META_SUBSCRIPTION_AMOUNT).map(String::as_str),
            Some("25.90 EUR")
        );
    }

    #[test]
    fn test_renewal_pending_goes_on_hold() {
        let (fx, renewal) = renewal_fixture();
        reconciler(&fx)
            .process_renewal(1, &response_with_status("WAITING_AUTHORISATION"))
            .unwrap();

        assert!(!renewal.is_paid());
        assert_eq!(renewal.status(), OrderStatus::OnHold);
    }

    #[test]
    fn test_renewal_refused_fails_order() {
        let (fx, renewal) = renewal_fixture();
        reconciler(&fx)
            .process_renewal(1, &response_with_status("REFUSED"))
            .unwrap();

        assert!(!renewal.is_paid());
        assert_eq!(renewal.status(), OrderStatus::Failed);
    }

    #[test]
    fn test_renewal_migrates_payment_method() {
        let (fx, _) = renewal_fixture();
        fx.subscription.set_payment_method("other_gateway");

        reconciler(&fx).process_renewal(1, &success_response()).unwrap();

        assert_eq!(fx.subscription.payment_method(), METHOD_SUBSCRIPTION);
        assert_eq!(fx.subscription.save_count(), 1);
    }

    #[test]
    fn test_renewal_keeps_matching_payment_method() {
        let (fx, _) = renewal_fixture();
        reconciler(&fx).process_renewal(1, &success_response()).unwrap();
        assert_eq!(fx.subscription.save_count(), 0);
    }

    #[test]
    fn test_renewal_without_renewal_order_is_benign() {
        let fx = fixture(); // subscription has no renewal order
        assert!(reconciler(&fx).process_renewal(1, &success_response()).is_ok());
    }

    #[test]
    fn test_effect_date_reformat() {
        assert_eq!(format_effect_date("20260901"), "2026-09-01");
        assert_eq!(format_effect_date("not-a-date"), "not-a-date");
        assert_eq!(format_effect_date(""), "");
    }
}
