//! Outbound Payment Request
//!
//! Field-map builder for the form posted to the payment platform. The
//! transport/signature layer is external; this type only owns the field
//! vocabulary (`amount`, `first`, `count`, `period`, `contracts`, ...)
//! and the `payment_config` encoding for split payments.

use std::collections::BTreeMap;

/// Outbound request field map
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaymentRequest {
    fields: BTreeMap<String, String>,
}

impl PaymentRequest {
    /// Start a request for an order, seeding the fields every payment
    /// carries
    pub fn new(order_id: u64, amount: i64, currency_num_code: &str) -> Self {
        let mut request = Self::default();
        request.set("order_id", order_id.to_string());
        request.set("amount", amount.to_string());
        request.set("currency", currency_num_code);
        request
    }

    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        self.fields.insert(field.to_string(), value.into());
    }

    /// Set a field, or clear it when the value is absent
    pub fn set_opt(&mut self, field: &str, value: Option<String>) {
        match value {
            Some(value) => self.set(field, value),
            None => {
                self.fields.remove(field);
            }
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// The `amount` field, when set and numeric
    pub fn amount(&self) -> Option<i64> {
        self.get("amount").and_then(|a| a.parse().ok())
    }

    /// Encode a split payment.
    ///
    /// `first` is the overridden first-installment amount; `None` means
    /// equal installments computed by the platform. A count of 1 collapses
    /// to a single payment.
    pub fn set_multi_payment(&mut self, amount: i64, first: Option<i64>, count: u32, period_days: u32) {
        self.set("amount", amount.to_string());

        if count <= 1 {
            self.set("payment_config", "SINGLE");
            self.set_opt("first", None);
            self.set_opt("count", None);
            self.set_opt("period", None);
            return;
        }

        self.set_opt("first", first.map(|f| f.to_string()));
        self.set("count", count.to_string());
        self.set("period", period_days.to_string());

        let first_part = first.map(|f| format!("first={f};")).unwrap_or_default();
        self.set(
            "payment_config",
            format!("MULTI:{first_part}count={count};period={period_days}"),
        );
    }

    /// All fields in stable (sorted) order, as the signing layer expects
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
