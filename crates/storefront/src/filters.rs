//! Askama filters shared by pages and fragments.

#![allow(clippy::unnecessary_wraps)]

use std::borrow::Borrow;
use std::fmt::Display;

use rust_decimal::Decimal;

use greengrocer_core::Price;

/// Formats an amount as `$X.XX`, rounding half-up to cents.
///
/// Usage in templates: `{{ product.price|money }}`
#[askama::filter_fn]
pub fn money(amount: impl Borrow<Decimal>, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(Price::usd(*amount.borrow()).display())
}

/// The current year, for the footer.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use askama::Template;

    use super::*;
    use crate::filters;

    #[derive(Template)]
    #[template(source = "{{ amount|money }}", ext = "html")]
    struct MoneyTemplate {
        amount: Decimal,
    }

    fn render(amount: Decimal) -> String {
        MoneyTemplate { amount }.render().unwrap()
    }

    #[test]
    fn test_money_pads_to_cents() {
        assert_eq!(render(Decimal::new(3, 0)), "$3.00");
        assert_eq!(render(Decimal::new(299, 2)), "$2.99");
    }

    #[test]
    fn test_money_rounds_half_up() {
        assert_eq!(render(Decimal::new(12345, 3)), "$12.35");
        assert_eq!(render(Decimal::ZERO), "$0.00");
    }
}
