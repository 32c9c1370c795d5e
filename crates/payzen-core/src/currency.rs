//! Currency Table
//!
//! Minimal ISO-4217 table covering the currencies the platform settles in.
//! The platform speaks numeric codes and minor units; the host and the
//! metadata the gateway writes use display strings.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// A supported settlement currency
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurrencyInfo {
    /// Alphabetic ISO code ("EUR")
    pub alpha: &'static str,
    /// Numeric ISO code as the platform sends it ("978")
    pub num_code: &'static str,
    /// Number of minor-unit digits
    pub decimals: u32,
}

pub const CURRENCIES: &[CurrencyInfo] = &[
    CurrencyInfo { alpha: "AUD", num_code: "036", decimals: 2 },
    CurrencyInfo { alpha: "CAD", num_code: "124", decimals: 2 },
    CurrencyInfo { alpha: "CHF", num_code: "756", decimals: 2 },
    CurrencyInfo { alpha: "EUR", num_code: "978", decimals: 2 },
    CurrencyInfo { alpha: "GBP", num_code: "826", decimals: 2 },
    CurrencyInfo { alpha: "JPY", num_code: "392", decimals: 0 },
    CurrencyInfo { alpha: "USD", num_code: "840", decimals: 2 },
];

/// Look up by numeric ISO code
pub fn find_by_num(code: &str) -> Option<&'static CurrencyInfo> {
    CURRENCIES.iter().find(|c| c.num_code == code)
}

/// Look up by alphabetic ISO code
pub fn find_by_alpha(code: &str) -> Option<&'static CurrencyInfo> {
    CURRENCIES.iter().find(|c| c.alpha.eq_ignore_ascii_case(code))
}

/// Format a minor-unit amount for display: `2590` / `"978"` → `"25.90 EUR"`.
///
/// An unknown currency falls back to the raw minor-unit value so the
/// metadata stays readable rather than wrong.
pub fn display_amount(minor: i64, num_code: &str) -> String {
    match find_by_num(num_code) {
        Some(currency) => {
            let value = Decimal::new(minor, currency.decimals);
            format!("{value} {}", currency.alpha)
        }
        None => format!("{minor} {num_code}"),
    }
}

/// Convert a major-unit amount to platform minor units
pub fn to_minor(amount: Decimal, currency: &CurrencyInfo) -> Option<i64> {
    let scaled = amount * Decimal::from(10i64.pow(currency.decimals));
    scaled
        .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_display_amount_two_decimals() {
        assert_eq!(display_amount(2590, "978"), "25.90 EUR");
        assert_eq!(display_amount(100, "840"), "1.00 USD");
    }

    #[test]
    fn test_display_amount_zero_decimals() {
        assert_eq!(display_amount(500, "392"), "500 JPY");
    }

    #[test]
    fn test_display_amount_unknown_currency() {
        assert_eq!(display_amount(2590, "999"), "2590 999");
    }

    #[test]
    fn test_to_minor() {
        let eur = find_by_alpha("eur").unwrap();
        assert_eq!(to_minor(dec!(25.90), eur), Some(2590));
        assert_eq!(to_minor(dec!(25.905), eur), Some(2591));

        let jpy = find_by_num("392").unwrap();
        assert_eq!(to_minor(dec!(500), jpy), Some(500));
    }
}
