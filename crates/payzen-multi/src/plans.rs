//! Installment Plan Selection
//!
//! Eligibility filtering and customer selection over the configured
//! options. Configuration order is significant: the first eligible option
//! is the default display selection, and the only eligible option is
//! auto-selected without customer input.

use rust_decimal::Decimal;

use payzen_core::{currency, Cart, GatewayError, Result};

use crate::option::{sanitize_options, InstallmentOption};
use crate::schedule::SelectedSchedule;

/// The configured installment options, keyed and ordered as the admin
/// saved them
pub struct InstallmentPlans {
    options: Vec<(String, InstallmentOption)>,
}

impl InstallmentPlans {
    /// Build from saved configuration, dropping invalid entries
    pub fn new(options: Vec<(String, InstallmentOption)>) -> Self {
        Self {
            options: sanitize_options(options),
        }
    }

    pub fn options(&self) -> &[(String, InstallmentOption)] {
        &self.options
    }

    /// Options eligible for an amount, in configuration order
    pub fn available_for(&self, amount: Decimal) -> Vec<&(String, InstallmentOption)> {
        self.options
            .iter()
            .filter(|(_, option)| option.matches_amount(amount))
            .collect()
    }

    pub fn available(&self, cart: &dyn Cart) -> Vec<&(String, InstallmentOption)> {
        self.available_for(cart.total())
    }

    /// Availability precondition surfaced to checkout: with no eligible
    /// option the gateway hides itself rather than erroring
    pub fn is_available(&self, cart: &dyn Cart) -> bool {
        !self.available_for(cart.total()).is_empty()
    }

    /// Resolve the option the payment will use.
    ///
    /// A single eligible option is auto-selected. Otherwise the submitted
    /// code must name an eligible option; a missing or unrecognized code
    /// blocks payment processing.
    pub fn select(
        &self,
        amount: Decimal,
        submitted: Option<&str>,
    ) -> Result<&(String, InstallmentOption)> {
        let eligible = self.available_for(amount);

        if eligible.is_empty() {
            return Err(GatewayError::Unavailable(format!(
                "no installment option for amount {amount}"
            )));
        }

        match submitted {
            Some(code) => eligible
                .into_iter()
                .find(|(eligible_code, _)| eligible_code == code)
                .ok_or_else(|| GatewayError::InvalidSelection(code.to_string())),
            None if eligible.len() == 1 => Ok(eligible[0]),
            None => Err(GatewayError::InvalidSelection(
                "an installment option must be chosen".into(),
            )),
        }
    }

    /// Checkout entry point: resolve the selection and compute the
    /// schedule for the cart total, in the cart currency's minor units
    pub fn build_schedule(
        &self,
        cart: &dyn Cart,
        cur: &currency::CurrencyInfo,
        submitted: Option<&str>,
    ) -> Result<SelectedSchedule> {
        let amount = cart.total();
        let (_, option) = self.select(amount, submitted)?;
        let total_minor = currency::to_minor(amount, cur).ok_or_else(|| {
            GatewayError::Config(format!("cart total {amount} not representable in {}", cur.alpha))
        })?;
        Ok(SelectedSchedule::build(option, total_minor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use payzen_core::FixedCart;

    fn bracket(code: &str, min: Option<Decimal>, max: Option<Decimal>) -> (String, InstallmentOption) {
        (
            code.to_string(),
            InstallmentOption {
                label: format!("option {code}"),
                amount_min: min,
                amount_max: max,
                contract: None,
                count: 3,
                period_days: 30,
                first_percent: None,
            },
        )
    }

    fn plans() -> InstallmentPlans {
        InstallmentPlans::new(vec![
            bracket("low", None, Some(dec!(100))),
            bracket("mid", Some(dec!(100)), Some(dec!(500))),
            bracket("high", Some(dec!(500)), None),
        ])
    }

    #[test]
    fn test_eligibility_order_preserved() {
        let plans = plans();
        let codes: Vec<&str> = plans
            .available_for(dec!(100))
            .iter()
            .map(|(code, _)| code.as_str())
            .collect();
        assert_eq!(codes, vec!["low", "mid"]);
    }

    #[test]
    fn test_boundary_amounts_eligible() {
        let plans = plans();
        assert_eq!(plans.available_for(dec!(500)).len(), 2); // mid and high
        assert_eq!(plans.available_for(dec!(500.01)).len(), 1); // high only
    }

    #[test]
    fn test_gateway_unavailable_without_options() {
        let plans = InstallmentPlans::new(vec![bracket("mid", Some(dec!(100)), Some(dec!(500)))]);
        assert!(!plans.is_available(&FixedCart(dec!(50))));
        assert!(plans.is_available(&FixedCart(dec!(200))));
    }

    #[test]
    fn test_single_option_auto_selected() {
        let plans = plans();
        let (code, _) = plans.select(dec!(1000), None).unwrap();
        assert_eq!(code, "high");
    }

    #[test]
    fn test_multiple_options_require_submission() {
        let plans = plans();
        assert!(matches!(
            plans.select(dec!(100), None),
            Err(GatewayError::InvalidSelection(_))
        ));

        let (code, _) = plans.select(dec!(100), Some("mid")).unwrap();
        assert_eq!(code, "mid");
    }

    #[test]
    fn test_unknown_or_ineligible_code_rejected() {
        let plans = plans();
        assert!(matches!(
            plans.select(dec!(100), Some("nope")),
            Err(GatewayError::InvalidSelection(_))
        ));
        // "high" exists but is not eligible at this amount.
        assert!(matches!(
            plans.select(dec!(100), Some("high")),
            Err(GatewayError::InvalidSelection(_))
        ));
    }

    #[test]
    fn test_build_schedule_for_cart() {
        let mut options = vec![bracket("high", Some(dec!(500)), None)];
        options[0].1.first_percent = Some(dec!(33));
        let plans = InstallmentPlans::new(options);

        let eur = payzen_core::currency::find_by_alpha("EUR").unwrap();
        let schedule = plans
            .build_schedule(&FixedCart(dec!(1000)), eur, None)
            .unwrap();

        assert_eq!(schedule.total_amount, 100000);
        assert_eq!(schedule.first_amount, Some(33000));
        assert_eq!(schedule.count, 3);
    }

    #[test]
    fn test_no_eligible_option_is_unavailable() {
        let plans = InstallmentPlans::new(vec![bracket("mid", Some(dec!(100)), Some(dec!(500)))]);
        assert!(matches!(
            plans.select(dec!(50), Some("mid")),
            Err(GatewayError::Unavailable(_))
        ));
    }
}
