//! Subscription Collaborator Interfaces
//!
//! Capability view of the host's subscription entities plus the lookup
//! registry the reconciler uses to resolve subscriptions from orders.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::Result;
use crate::order::Order;

/// The timestamps a subscription entity records
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeKind {
    Start,
    NextPayment,
    TrialEnd,
    End,
}

/// Capability view of a host subscription
pub trait Subscription: Send + Sync {
    fn id(&self) -> u64;

    /// Parent (initial) order id, if the subscription has one
    fn parent_id(&self) -> Option<u64>;

    /// Recurring total in major currency units
    fn total(&self) -> Decimal;

    fn billing_interval(&self) -> u32;

    /// Host billing period keyword: "day", "week", "month" or "year"
    fn billing_period(&self) -> String;

    fn time(&self, kind: TimeKind) -> Option<DateTime<Utc>>;

    fn payment_method(&self) -> String;

    fn set_payment_method(&self, method_id: &str);

    fn save(&self) -> Result<()>;

    /// Id of the most recent renewal-type order generated for this
    /// subscription, if any
    fn last_renewal_order(&self) -> Option<u64>;

    fn meta(&self, key: &str) -> Option<String>;

    /// Replace semantics: any previous value for `key` is discarded
    fn set_meta(&self, key: &str, value: &str);

    fn delete_meta(&self, key: &str);

    fn payment_complete(&self);

    fn payment_failed(&self);
}

/// Lookups the reconciler needs from the host subscription system
pub trait SubscriptionRegistry: Send + Sync {
    fn subscription(&self, id: u64) -> Option<Arc<dyn Subscription>>;

    fn order(&self, id: u64) -> Option<Arc<dyn Order>>;

    /// Subscriptions directly attached to an order, in creation order
    fn subscriptions_for_order(&self, order_id: u64) -> Vec<Arc<dyn Subscription>>;

    /// Subscriptions reachable through an order's renewal linkage
    fn subscriptions_for_renewal_order(&self, order_id: u64) -> Vec<Arc<dyn Subscription>>;

    /// Replacement order id when `order_id` is a failed order that has
    /// been superseded by a retry
    fn failed_order_replaced_by(&self, order_id: u64) -> Option<u64>;
}

struct SubscriptionState {
    meta: HashMap<String, String>,
    payment_method: String,
    times: HashMap<TimeKind, DateTime<Utc>>,
    last_renewal_order: Option<u64>,
    payment_results: Vec<bool>,
    saved: u32,
}

/// In-memory subscription (for development and tests)
pub struct MemorySubscription {
    id: u64,
    parent_id: Option<u64>,
    total: Decimal,
    billing_period: String,
    billing_interval: u32,
    state: RwLock<SubscriptionState>,
}

impl MemorySubscription {
    pub fn new(id: u64, total: Decimal, billing_period: &str, billing_interval: u32) -> Self {
        Self {
            id,
            parent_id: None,
            total,
            billing_period: billing_period.to_string(),
            billing_interval,
            state: RwLock::new(SubscriptionState {
                meta: HashMap::new(),
                payment_method: String::new(),
                times: HashMap::new(),
                last_renewal_order: None,
                payment_results: Vec::new(),
                saved: 0,
            }),
        }
    }

    pub fn with_parent(mut self, parent_id: u64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_payment_method(self, method_id: &str) -> Self {
        self.state.write().unwrap().payment_method = method_id.to_string();
        self
    }

    pub fn with_time(self, kind: TimeKind, at: DateTime<Utc>) -> Self {
        self.state.write().unwrap().times.insert(kind, at);
        self
    }

    pub fn with_last_renewal_order(self, order_id: u64) -> Self {
        self.state.write().unwrap().last_renewal_order = Some(order_id);
        self
    }

    /// Recorded payment outcomes, in order (true = complete, false = failed)
    pub fn payment_results(&self) -> Vec<bool> {
        self.state.read().unwrap().payment_results.clone()
    }

    /// Number of times `save` has been called
    pub fn save_count(&self) -> u32 {
        self.state.read().unwrap().saved
    }

    /// Snapshot of the metadata map
    pub fn meta_snapshot(&self) -> HashMap<String, String> {
        self.state.read().unwrap().meta.clone()
    }
}

impl Subscription for MemorySubscription {
    fn id(&self) -> u64 {
        self.id
    }

    fn parent_id(&self) -> Option<u64> {
        self.parent_id
    }

    fn total(&self) -> Decimal {
        self.total
    }

    fn billing_interval(&self) -> u32 {
        self.billing_interval
    }

    fn billing_period(&self) -> String {
        self.billing_period.clone()
    }

    fn time(&self, kind: TimeKind) -> Option<DateTime<Utc>> {
        self.state.read().unwrap().times.get(&kind).copied()
    }

    fn payment_method(&self) -> String {
        self.state.read().unwrap().payment_method.clone()
    }

    fn set_payment_method(&self, method_id: &str) {
        self.state.write().unwrap().payment_method = method_id.to_string();
    }

    fn save(&self) -> Result<()> {
        self.state.write().unwrap().saved += 1;
        Ok(())
    }

    fn last_renewal_order(&self) -> Option<u64> {
        self.state.read().unwrap().last_renewal_order
    }

    fn meta(&self, key: &str) -> Option<String> {
        self.state.read().unwrap().meta.get(key).cloned()
    }

    fn set_meta(&self, key: &str, value: &str) {
        self.state
            .write()
            .unwrap()
            .meta
            .insert(key.to_string(), value.to_string());
    }

    fn delete_meta(&self, key: &str) {
        self.state.write().unwrap().meta.remove(key);
    }

    fn payment_complete(&self) {
        self.state.write().unwrap().payment_results.push(true);
    }

    fn payment_failed(&self) {
        self.state.write().unwrap().payment_results.push(false);
    }
}

#[derive(Default)]
struct RegistryState {
    subscriptions: HashMap<u64, Arc<dyn Subscription>>,
    orders: HashMap<u64, Arc<dyn Order>>,
    order_links: HashMap<u64, Vec<u64>>,
    renewal_links: HashMap<u64, Vec<u64>>,
    replaced: HashMap<u64, u64>,
}

/// In-memory subscription registry (for development and tests)
#[derive(Default)]
pub struct MemorySubscriptionRegistry {
    state: RwLock<RegistryState>,
}

impl MemorySubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_subscription(&self, subscription: Arc<dyn Subscription>) {
        self.state
            .write()
            .unwrap()
            .subscriptions
            .insert(subscription.id(), subscription);
    }

    pub fn insert_order(&self, order: Arc<dyn Order>) {
        self.state.write().unwrap().orders.insert(order.id(), order);
    }

    /// Attach a subscription directly to its originating order
    pub fn link_order(&self, order_id: u64, subscription_id: u64) {
        self.state
            .write()
            .unwrap()
            .order_links
            .entry(order_id)
            .or_default()
            .push(subscription_id);
    }

    /// Attach a subscription to one of its renewal orders
    pub fn link_renewal_order(&self, order_id: u64, subscription_id: u64) {
        self.state
            .write()
            .unwrap()
            .renewal_links
            .entry(order_id)
            .or_default()
            .push(subscription_id);
    }

    /// Record that a failed order was superseded by a retry order
    pub fn set_failed_order_replaced_by(&self, failed_order_id: u64, replacement_order_id: u64) {
        self.state
            .write()
            .unwrap()
            .replaced
            .insert(failed_order_id, replacement_order_id);
    }

    fn resolve(&self, links: &[u64]) -> Vec<Arc<dyn Subscription>> {
        let state = self.state.read().unwrap();
        links
            .iter()
            .filter_map(|id| state.subscriptions.get(id).cloned())
            .collect()
    }
}

impl SubscriptionRegistry for MemorySubscriptionRegistry {
    fn subscription(&self, id: u64) -> Option<Arc<dyn Subscription>> {
        self.state.read().unwrap().subscriptions.get(&id).cloned()
    }

    fn order(&self, id: u64) -> Option<Arc<dyn Order>> {
        self.state.read().unwrap().orders.get(&id).cloned()
    }

    fn subscriptions_for_order(&self, order_id: u64) -> Vec<Arc<dyn Subscription>> {
        let links = self
            .state
            .read()
            .unwrap()
            .order_links
            .get(&order_id)
            .cloned()
            .unwrap_or_default();
        self.resolve(&links)
    }

    fn subscriptions_for_renewal_order(&self, order_id: u64) -> Vec<Arc<dyn Subscription>> {
        let links = self
            .state
            .read()
            .unwrap()
            .renewal_links
            .get(&order_id)
            .cloned()
            .unwrap_or_default();
        self.resolve(&links)
    }

    fn failed_order_replaced_by(&self, order_id: u64) -> Option<u64> {
        self.state.read().unwrap().replaced.get(&order_id).copied()
    }
}
