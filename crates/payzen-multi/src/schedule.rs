//! Payment Schedule Computation
//!
//! Turns a chosen option and an order total into the concrete values the
//! platform needs. The platform computes the per-installment amounts from
//! these four values; this component's contract ends at producing them.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use payzen_core::PaymentRequest;

use crate::option::InstallmentOption;

/// Concrete schedule derived at checkout for one order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedSchedule {
    /// Order total in minor currency units
    pub total_amount: i64,

    /// First-installment override in minor units; `None` signals equal
    /// installments
    pub first_amount: Option<i64>,

    /// Number of installments
    pub count: u32,

    /// Days between installments
    pub period_days: u32,

    /// Platform contract to charge against
    pub contract: Option<String>,
}

impl SelectedSchedule {
    /// Compute the schedule for a chosen option.
    ///
    /// The first installment is `first_percent` of the total, rounded
    /// half away from zero to a whole minor unit.
    pub fn build(option: &InstallmentOption, total_amount: i64) -> Self {
        let first_amount = option.first_percent.and_then(|percent| {
            (Decimal::from(total_amount) * percent / Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_i64()
        });

        Self {
            total_amount,
            first_amount,
            count: option.count,
            period_days: option.period_days,
            contract: option.contract.clone(),
        }
    }

    /// The `contracts` field value, when a contract is configured
    pub fn contract_spec(&self) -> Option<String> {
        self.contract
            .as_deref()
            .filter(|contract| !contract.is_empty())
            .map(|contract| format!("CB={contract}"))
    }

    /// Encode the schedule into the outbound request
    pub fn fill_request(&self, request: &mut PaymentRequest) {
        request.set_multi_payment(
            self.total_amount,
            self.first_amount,
            self.count,
            self.period_days,
        );
        request.set_opt("contracts", self.contract_spec());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn option(count: u32, first_percent: Option<Decimal>) -> InstallmentOption {
        InstallmentOption {
            label: format!("{count}x"),
            amount_min: None,
            amount_max: None,
            contract: None,
            count,
            period_days: 30,
            first_percent,
        }
    }

    #[test]
    fn test_first_amount_rounding() {
        let schedule = SelectedSchedule::build(&option(3, Some(dec!(33))), 100);
        assert_eq!(schedule.first_amount, Some(33));

        // 50.5 rounds away from zero.
        let schedule = SelectedSchedule::build(&option(2, Some(dec!(50.5))), 100);
        assert_eq!(schedule.first_amount, Some(51));
    }

    #[test]
    fn test_no_first_percent_means_equal_installments() {
        let schedule = SelectedSchedule::build(&option(3, None), 100);
        assert_eq!(schedule.first_amount, None);
    }

    #[test]
    fn test_contract_spec() {
        let mut opt = option(3, None);
        opt.contract = Some("1234567".into());
        let schedule = SelectedSchedule::build(&opt, 10000);
        assert_eq!(schedule.contract_spec().as_deref(), Some("CB=1234567"));

        opt.contract = Some(String::new());
        let schedule = SelectedSchedule::build(&opt, 10000);
        assert_eq!(schedule.contract_spec(), None);
    }

    #[test]
    fn test_fill_request_field_set() {
        let mut opt = option(4, Some(dec!(25)));
        opt.contract = Some("555".into());
        let schedule = SelectedSchedule::build(&opt, 20000);

        let mut request = PaymentRequest::new(1, 20000, "978");
        schedule.fill_request(&mut request);

        assert_eq!(request.get("amount"), Some("20000"));
        assert_eq!(request.get("first"), Some("5000"));
        assert_eq!(request.get("count"), Some("4"));
        assert_eq!(request.get("period"), Some("30"));
        assert_eq!(request.get("contracts"), Some("CB=555"));
    }

    #[test]
    fn test_fill_request_without_contract_clears_field() {
        let schedule = SelectedSchedule::build(&option(3, None), 9000);
        let mut request = PaymentRequest::new(1, 9000, "978");
        request.set("contracts", "CB=stale");
        schedule.fill_request(&mut request);
        assert_eq!(request.get("contracts"), None);
    }
}
