//! Subscription Read Model
//!
//! Derives the recurrence description the platform needs from a host
//! subscription: effect date, frequency, interval and end date. Never
//! persisted — recomputed each time a request is built.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use payzen_core::{
    currency, GatewayError, PaymentRequest, Result, Subscription, SubscriptionRegistry, TimeKind,
    TransientStore,
};

/// Identifier of this gateway's recurring payment method
pub const METHOD_SUBSCRIPTION: &str = "payzensubscription";

/// Platform billing frequency
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }

    /// Map the host's billing period keyword. An unmapped period is a
    /// configuration error; guessing a frequency would bill customers on
    /// the wrong cadence.
    pub fn from_billing_period(period: &str) -> Result<Self> {
        match period {
            "day" => Ok(Frequency::Daily),
            "week" => Ok(Frequency::Weekly),
            "month" => Ok(Frequency::Monthly),
            "year" => Ok(Frequency::Yearly),
            other => Err(GatewayError::Config(format!(
                "unmapped billing period: {other}"
            ))),
        }
    }
}

fn ts(subscription: &dyn Subscription, kind: TimeKind) -> i64 {
    subscription.time(kind).map_or(0, |t| t.timestamp())
}

/// First charge date for the online subscription.
///
/// The branches below are evaluated in order and later assignments
/// overwrite earlier ones; a trial that already ended moves the start to
/// the next payment date even for a payment-method change.
pub fn effect_date(
    subscription: &dyn Subscription,
    is_payment_change: bool,
    now: DateTime<Utc>,
) -> NaiveDate {
    let mut start = if is_payment_change {
        // Payment method changes act on the subscription, not the
        // original order.
        ts(subscription, TimeKind::NextPayment)
    } else {
        ts(subscription, TimeKind::Start)
    };

    let trial_end = ts(subscription, TimeKind::TrialEnd);

    if trial_end <= now.timestamp() {
        // No trial left: the first cycle was paid with the order, so
        // recurrences begin at the next payment date.
        start = ts(subscription, TimeKind::NextPayment);
    } else if trial_end > start {
        // Subscription starts after the trial period.
        start = trial_end;
    }

    DateTime::from_timestamp(start, 0)
        .unwrap_or_default()
        .date_naive()
}

/// Platform convention: the supplied end date is the day before the
/// recorded subscription end
pub fn end_date(subscription: &dyn Subscription) -> Option<NaiveDate> {
    subscription
        .time(TimeKind::End)
        .map(|end| (end - chrono::Duration::days(1)).date_naive())
}

/// Recurrence description for request building
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscriptionInfo {
    pub effect_date: NaiveDate,

    /// Reserved for a future initial-amount feature, always `None`
    pub init_amount: Option<i64>,
    /// Reserved, always `None`
    pub init_number: Option<u32>,

    /// Recurring amount in major currency units
    pub amount: Decimal,
    pub frequency: Frequency,
    pub interval: u32,
    pub end_date: Option<NaiveDate>,
}

impl SubscriptionInfo {
    pub fn from_subscription(
        subscription: &dyn Subscription,
        is_payment_change: bool,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        Ok(Self {
            effect_date: effect_date(subscription, is_payment_change, now),
            init_amount: None,
            init_number: None,
            amount: subscription.total(),
            frequency: Frequency::from_billing_period(&subscription.billing_period())?,
            interval: subscription.billing_interval(),
            end_date: end_date(subscription),
        })
    }

    /// Recurrence rule in the platform's `RRULE` dialect
    pub fn rrule(&self) -> String {
        let mut rule = format!(
            "RRULE:FREQ={};INTERVAL={}",
            self.frequency.as_str(),
            self.interval
        );
        if let Some(until) = self.end_date {
            rule.push_str(&format!(";UNTIL={}", until.format("%Y%m%d")));
        }
        rule
    }

    /// Encode the recurrence fields into the outbound request
    pub fn encode(&self, request: &mut PaymentRequest, cur: &currency::CurrencyInfo) {
        request.set_opt(
            "sub_amount",
            currency::to_minor(self.amount, cur).map(|minor| minor.to_string()),
        );
        request.set("sub_effect_date", self.effect_date.format("%Y%m%d").to_string());
        request.set("sub_desc", self.rrule());
    }
}

fn change_marker_key(order_id: u64) -> String {
    format!("{METHOD_SUBSCRIPTION}_change_payment_{order_id}")
}

/// Record that the customer is changing the payment method on an existing
/// subscription; `previous_method` is the method being replaced
pub fn mark_payment_method_change(
    transients: &dyn TransientStore,
    order_id: u64,
    previous_method: &str,
    ttl: Duration,
) {
    transients.set(
        &change_marker_key(order_id),
        Value::String(previous_method.to_string()),
        ttl,
    );
}

/// Derive the recurrence description for an order, classifying the event
/// on the way.
///
/// Consumes the payment-method-change marker. Returns `Ok(None)` when
/// there is nothing to encode: the "change" did not actually change the
/// method, or no subscription is attached to the order.
pub fn subscription_info(
    order_id: u64,
    registry: &dyn SubscriptionRegistry,
    transients: &dyn TransientStore,
    now: DateTime<Utc>,
) -> Result<Option<SubscriptionInfo>> {
    let key = change_marker_key(order_id);
    let previous_method = transients
        .get(&key)
        .and_then(|value| value.as_str().map(String::from));
    transients.delete(&key);

    let is_payment_change = previous_method.is_some();

    let subscription = if is_payment_change {
        if previous_method.as_deref() == Some(METHOD_SUBSCRIPTION) {
            // The previous method was already ours; double-processing a
            // no-change change would re-register the subscription.
            return Ok(None);
        }
        // In the change flow the order id identifies the subscription.
        registry.subscription(order_id)
    } else if registry.failed_order_replaced_by(order_id).is_some() {
        // Failed-renewal retry: the subscription hangs off the renewal
        // linkage, not the order itself.
        registry
            .subscriptions_for_renewal_order(order_id)
            .into_iter()
            .next()
    } else {
        registry.subscriptions_for_order(order_id).into_iter().next()
    };

    match subscription {
        Some(subscription) => Ok(Some(SubscriptionInfo::from_subscription(
            subscription.as_ref(),
            is_payment_change,
            now,
        )?)),
        None => Ok(None),
    }
}
