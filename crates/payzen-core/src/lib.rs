//! # payzen-core
//!
//! Collaborator abstractions and platform wire types for the PayZen
//! gateway.
//!
//! The gateway itself is glue between a host checkout system and the
//! payment platform. This crate owns the seams on both sides:
//!
//! - capability traits for the host's objects (carts, orders,
//!   subscriptions, subscription lookups, transient storage) — one narrow
//!   trait per collaborator role, never one fat interface;
//! - the platform's wire vocabulary (outbound request field map, inbound
//!   notification record, currency table);
//! - the async management client used to cancel or update an online
//!   subscription.
//!
//! In-memory implementations of every trait ship alongside for
//! development and tests.

pub mod currency;
mod error;
mod order;
mod platform;
mod request;
mod response;
mod subscription;
mod transient;

pub use error::{GatewayError, Result};
pub use order::{Cart, FixedCart, MemoryOrder, Order, OrderStatus};
pub use platform::{
    MockPlatformClient, PlatformCall, PlatformClient, RestPlatformClient, SubscriptionUpdate,
};
pub use request::PaymentRequest;
pub use response::{PaymentResponse, TransactionStatus};
pub use subscription::{
    MemorySubscription, MemorySubscriptionRegistry, Subscription, SubscriptionRegistry, TimeKind,
};
pub use transient::{MemoryTransientStore, TransientStore};
