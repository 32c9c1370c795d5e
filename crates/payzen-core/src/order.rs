//! Order and Cart Collaborator Interfaces
//!
//! Narrow capability views of the host checkout system's objects. The
//! gateway never owns orders; it reads totals, writes metadata and applies
//! payment outcomes through these traits.

use std::collections::HashMap;
use std::sync::RwLock;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order status vocabulary shared with the host checkout system
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    Processing,
    OnHold,
    Failed,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::OnHold => "on-hold",
            OrderStatus::Failed => "failed",
            OrderStatus::Completed => "completed",
        }
    }
}

/// Cart being checked out
pub trait Cart: Send + Sync {
    /// Cart total in major currency units
    fn total(&self) -> Decimal;
}

/// Fixed-amount cart (for tests and availability probes)
pub struct FixedCart(pub Decimal);

impl Cart for FixedCart {
    fn total(&self) -> Decimal {
        self.0
    }
}

/// Capability view of a host order
pub trait Order: Send + Sync {
    fn id(&self) -> u64;

    /// Order total in major currency units
    fn total(&self) -> Decimal;

    /// Alphabetic currency code (e.g. "EUR")
    fn currency(&self) -> String;

    fn meta(&self, key: &str) -> Option<String>;

    /// Replace semantics: any previous value for `key` is discarded
    fn set_meta(&self, key: &str, value: &str);

    fn delete_meta(&self, key: &str);

    /// Mark the order paid; the host decides the resulting status
    fn payment_complete(&self);

    fn update_status(&self, status: OrderStatus);

    fn status(&self) -> OrderStatus;

    /// URL of the host's order-pay page for this order
    fn checkout_payment_url(&self) -> String;
}

struct OrderState {
    meta: HashMap<String, String>,
    status: OrderStatus,
    paid: bool,
}

/// In-memory order (for development and tests)
pub struct MemoryOrder {
    id: u64,
    total: Decimal,
    currency: String,
    state: RwLock<OrderState>,
}

impl MemoryOrder {
    pub fn new(id: u64, total: Decimal, currency: &str) -> Self {
        Self {
            id,
            total,
            currency: currency.to_string(),
            state: RwLock::new(OrderState {
                meta: HashMap::new(),
                status: OrderStatus::Pending,
                paid: false,
            }),
        }
    }

    /// Whether `payment_complete` has been applied
    pub fn is_paid(&self) -> bool {
        self.state.read().unwrap().paid
    }

    /// Snapshot of the metadata map
    pub fn meta_snapshot(&self) -> HashMap<String, String> {
        self.state.read().unwrap().meta.clone()
    }
}

impl Order for MemoryOrder {
    fn id(&self) -> u64 {
        self.id
    }

    fn total(&self) -> Decimal {
        self.total
    }

    fn currency(&self) -> String {
        self.currency.clone()
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
        let mut state = self.state.write().unwrap();
        state.paid = true;
        state.status = OrderStatus::Processing;
    }

    fn update_status(&self, status: OrderStatus) {
        self.state.write().unwrap().status = status;
    }

    fn status(&self) -> OrderStatus {
        self.state.read().unwrap().status
    }

    fn checkout_payment_url(&self) -> String {
        format!("/checkout/order-pay/{}", self.id)
    }
}
