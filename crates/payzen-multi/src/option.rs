//! Installment Option Configuration
//!
//! Admin-configured split-payment brackets. Options are validated at save
//! time; invalid entries are dropped rather than partially stored.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use payzen_core::{GatewayError, Result};

/// A configured installment choice
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstallmentOption {
    /// Display label shown to the customer
    pub label: String,

    /// Minimum cart amount (inclusive) to enable this option
    #[serde(default)]
    pub amount_min: Option<Decimal>,

    /// Maximum cart amount (inclusive) to enable this option
    #[serde(default)]
    pub amount_max: Option<Decimal>,

    /// Platform contract identifier to charge against
    #[serde(default)]
    pub contract: Option<String>,

    /// Total number of installments
    pub count: u32,

    /// Days between installments
    pub period_days: u32,

    /// First installment as a percentage of the total; unset means equal
    /// installments
    #[serde(default)]
    pub first_percent: Option<Decimal>,
}

impl InstallmentOption {
    pub fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(GatewayError::Config("option label is required".into()));
        }
        if self.amount_min.is_some_and(|min| min < Decimal::ZERO) {
            return Err(GatewayError::Config("min amount must be non-negative".into()));
        }
        if self.amount_max.is_some_and(|max| max < Decimal::ZERO) {
            return Err(GatewayError::Config("max amount must be non-negative".into()));
        }
        if self.count < 1 {
            return Err(GatewayError::Config("count must be at least 1".into()));
        }
        if self.period_days < 1 {
            return Err(GatewayError::Config("period must be at least 1 day".into()));
        }
        if let Some(first) = self.first_percent {
            if first < Decimal::ZERO || first > Decimal::ONE_HUNDRED {
                return Err(GatewayError::Config(
                    "first payment percentage must be within 0..=100".into(),
                ));
            }
        }
        Ok(())
    }

    /// Eligibility: unset bounds are open-ended, set bounds are inclusive
    pub fn matches_amount(&self, amount: Decimal) -> bool {
        self.amount_min.is_none_or(|min| amount >= min)
            && self.amount_max.is_none_or(|max| amount <= max)
    }
}

/// Save-time sanitization: keep valid options in configuration order, drop
/// the rest
pub fn sanitize_options(
    options: Vec<(String, InstallmentOption)>,
) -> Vec<(String, InstallmentOption)> {
    options
        .into_iter()
        .filter(|(code, option)| match option.validate() {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(code = %code, %error, "Dropping invalid installment option");
                false
            }
        })
        .collect()
}
