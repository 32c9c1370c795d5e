//! # payzen-multi
//!
//! Installment ("pay in several times") plan selection and schedule
//! building for the PayZen gateway.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐   select    ┌──────────────┐   store    ┌───────────────┐
//! │   Checkout   │────────────▶│   Schedule   │───────────▶│  Transient    │
//! │  submission  │             │  computation │  by order  │  store (TTL)  │
//! └──────────────┘             └──────────────┘            └───────┬───────┘
//!                                                                  │ consume
//!                                                                  ▼  (once)
//!                                                          ┌───────────────┐
//!                                                          │ Request fill  │
//!                                                          │ amount/first/ │
//!                                                          │ count/period  │
//!                                                          └───────────────┘
//! ```
//!
//! Eligibility is an amount-bracket filter over the configured options;
//! a single eligible option is auto-selected. The platform computes the
//! individual installment amounts — this crate's contract ends at the
//! total, the optional first-installment override, the count and the
//! period.

mod option;
mod plans;
mod schedule;
mod store;

pub use option::{sanitize_options, InstallmentOption};
pub use plans::InstallmentPlans;
pub use schedule::SelectedSchedule;
pub use store::{ScheduleStore, META_PAYMENT_METHOD_TITLE};
