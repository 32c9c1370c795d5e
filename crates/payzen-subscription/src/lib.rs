//! # payzen-subscription
//!
//! Recurring-payment lifecycle reconciliation for the PayZen gateway.
//!
//! The platform reports subscription events asynchronously; this crate
//! translates those notifications into local state transitions:
//!
//! - **Classification** — is the inbound order a new subscription, a
//!   renewal, a failed-renewal retry, or a payment-method change? Decided
//!   per event from the order's linkage and the change marker; nothing is
//!   persisted.
//! - **Reconciliation** — delete-then-set metadata plus a payment outcome:
//!   complete/failed for initial registrations, complete/on-hold/failed
//!   for renewals. Redelivering the same notification is idempotent.
//! - **Lifecycle triggers** — host-side cancel/update events forwarded to
//!   the platform's management API.
//!
//! Date arithmetic (effect date, end date, frequency mapping) lives in
//! [`info`] and is deliberately order-sensitive: see
//! [`info::effect_date`].

pub mod info;
mod lifecycle;
mod reconcile;

pub use info::{
    effect_date, end_date, mark_payment_method_change, subscription_info, Frequency,
    SubscriptionInfo, METHOD_SUBSCRIPTION,
};
pub use lifecycle::SubscriptionLifecycle;
pub use reconcile::{
    Reconciler, META_EFFECT_DATE, META_RECURRENCE_NUMBER, META_SUBSCRIPTION_AMOUNT,
    META_SUBSCRIPTION_ID,
};
