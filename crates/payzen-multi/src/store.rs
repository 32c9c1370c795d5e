//! Schedule Persistence
//!
//! Bridges checkout submission and outbound-request assembly: the computed
//! schedule is parked in the transient store keyed by order id, then
//! consumed exactly once when the request is built. A second consume for
//! the same order observes nothing.

use std::sync::Arc;
use std::time::Duration;

use payzen_core::{GatewayError, Order, PaymentRequest, Result, TransientStore};

use crate::schedule::SelectedSchedule;

/// Order metadata key the host displays as the payment method name
pub const META_PAYMENT_METHOD_TITLE: &str = "_payment_method_title";

/// Transient-backed schedule store, keyed by order id
pub struct ScheduleStore {
    transients: Arc<dyn TransientStore>,
    ttl: Duration,
}

impl ScheduleStore {
    /// Must outlive the checkout-to-platform round trip
    pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

    pub fn new(transients: Arc<dyn TransientStore>) -> Self {
        Self::with_ttl(transients, Self::DEFAULT_TTL)
    }

    pub fn with_ttl(transients: Arc<dyn TransientStore>, ttl: Duration) -> Self {
        Self { transients, ttl }
    }

    fn key(order_id: u64) -> String {
        format!("payzenmulti_option_{order_id}")
    }

    pub fn store(&self, order_id: u64, schedule: &SelectedSchedule) -> Result<()> {
        let value = serde_json::to_value(schedule)?;
        self.transients.set(&Self::key(order_id), value, self.ttl);
        Ok(())
    }

    /// Read and delete the schedule for an order; absent on the second call
    pub fn consume(&self, order_id: u64) -> Result<Option<SelectedSchedule>> {
        let key = Self::key(order_id);
        let Some(value) = self.transients.get(&key) else {
            return Ok(None);
        };
        self.transients.delete(&key);

        let schedule = serde_json::from_value(value)?;
        Ok(Some(schedule))
    }

    /// Checkout-time bookkeeping: persist the schedule and tag the order's
    /// payment method title with the installment count
    pub fn record_checkout(&self, order: &dyn Order, schedule: &SelectedSchedule) -> Result<()> {
        self.store(order.id(), schedule)?;

        let title = order.meta(META_PAYMENT_METHOD_TITLE).unwrap_or_default();
        order.set_meta(
            META_PAYMENT_METHOD_TITLE,
            &format!("{title} ({} x)", schedule.count),
        );

        tracing::info!(
            order_id = order.id(),
            count = schedule.count,
            period_days = schedule.period_days,
            "Stored installment schedule"
        );
        Ok(())
    }

    /// Request-assembly step: consume the stored schedule and encode it.
    ///
    /// Running twice for the same order finds no schedule and fails; the
    /// caller surfaces this as an expired payment session.
    pub fn fill_installment_fields(
        &self,
        request: &mut PaymentRequest,
        order_id: u64,
    ) -> Result<()> {
        let schedule = self
            .consume(order_id)?
            .ok_or(GatewayError::MissingSchedule(order_id))?;
        schedule.fill_request(request);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use payzen_core::{MemoryOrder, MemoryTransientStore};

    fn schedule() -> SelectedSchedule {
        SelectedSchedule {
            total_amount: 10000,
            first_amount: Some(3300),
            count: 3,
            period_days: 30,
            contract: None,
        }
    }

    fn store() -> ScheduleStore {
        ScheduleStore::new(Arc::new(MemoryTransientStore::new()))
    }

    #[test]
    fn test_consume_once() {
        let store = store();
        store.store(42, &schedule()).unwrap();

        assert_eq!(store.consume(42).unwrap(), Some(schedule()));
        assert_eq!(store.consume(42).unwrap(), None);
    }

    #[test]
    fn test_consume_is_per_order() {
        let store = store();
        store.store(1, &schedule()).unwrap();
        assert_eq!(store.consume(2).unwrap(), None);
        assert_eq!(store.consume(1).unwrap(), Some(schedule()));
    }

    #[test]
    fn test_fill_installment_fields() {
        let store = store();
        store.store(42, &schedule()).unwrap();

        let mut request = PaymentRequest::new(42, 10000, "978");
        store.fill_installment_fields(&mut request, 42).unwrap();

        assert_eq!(request.get("count"), Some("3"));
        assert_eq!(request.get("first"), Some("3300"));
    }

    #[test]
    fn test_second_fill_reports_missing_schedule() {
        let store = store();
        store.store(42, &schedule()).unwrap();

        let mut request = PaymentRequest::new(42, 10000, "978");
        store.fill_installment_fields(&mut request, 42).unwrap();

        let second = store.fill_installment_fields(&mut request, 42);
        assert!(matches!(second, Err(GatewayError::MissingSchedule(42))));
    }

    #[test]
    fn test_record_checkout_tags_method_title() {
        let store = store();
        let order = MemoryOrder::new(42, dec!(100), "EUR");
        order.set_meta(META_PAYMENT_METHOD_TITLE, "Pay in several times");

        store.record_checkout(&order, &schedule()).unwrap();

        assert_eq!(
            order.meta(META_PAYMENT_METHOD_TITLE).as_deref(),
            Some("Pay in several times (3 x)")
        );
        assert!(store.consume(42).unwrap().is_some());
    }
}
