use api_types::currency::CurrencyView;
use serde::{Deserialize, Serialize};

use crate::Money;

/// Currency a transaction is booked in.
///
/// ## Minor units
///
/// The engine stores monetary values as an `i64` number of **minor units**
/// (see [`Money`]). `decimals` says how many fraction digits are used when
/// converting between:
/// - major units (human input/output, e.g. `10.50 EUR`)
/// - minor units (stored integers, e.g. `1050`)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    pub id: i64,
    pub code: String,
    pub decimals: u8,
}

impl Currency {
    /// Fraction digits used when a draft has no currency yet.
    pub const DEFAULT_DECIMALS: u8 = 2;

    #[must_use]
    pub fn new(id: i64, code: impl Into<String>, decimals: u8) -> Self {
        Self {
            id,
            code: code.into(),
            decimals,
        }
    }

    /// Formats an amount with thousands grouping, e.g. `1,234.50`.
    #[must_use]
    pub fn format(&self, amount: Money) -> String {
        amount.format_major(self.decimals, true)
    }

    /// Smallest positive amount, `10^-decimals` in major units: one minor
    /// unit whatever the scale.
    #[must_use]
    pub const fn step(&self) -> Money {
        Money::new(1)
    }

    /// Parses user input in major units.
    pub fn parse(&self, input: &str) -> crate::ResultEngine<Money> {
        Money::parse_major(input, self.decimals)
    }

    /// Short hint shown below amount inputs.
    ///
    /// `positive` switches between "positive" and "non-negative" wording.
    #[must_use]
    pub fn input_hint(&self, positive: bool) -> String {
        let sign = if positive { "positive" } else { "non-negative" };
        match self.decimals {
            0 => format!("{sign}, no decimals"),
            d => format!("{sign}, up to {d} decimals"),
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.code)
    }
}

impl From<&CurrencyView> for Currency {
    fn from(view: &CurrencyView) -> Self {
        Self::new(view.id, view.code.clone(), view.decimals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_uses_currency_decimals() {
        let eur = Currency::new(1, "EUR", 2);
        let jpy = Currency::new(2, "JPY", 0);
        assert_eq!(eur.format(Money::new(123_450)), "1,234.50");
        assert_eq!(jpy.format(Money::new(123_450)), "123,450");
    }

    #[test]
    fn input_hint_mentions_decimals() {
        assert_eq!(
            Currency::new(1, "EUR", 2).input_hint(true),
            "positive, up to 2 decimals"
        );
        assert_eq!(
            Currency::new(2, "JPY", 0).input_hint(false),
            "non-negative, no decimals"
        );
    }

    #[test]
    fn step_is_one_minor_unit() {
        let eur = Currency::new(1, "EUR", 2);
        let jpy = Currency::new(2, "JPY", 0);
        assert_eq!(eur.format(eur.step()), "0.01");
        assert_eq!(jpy.format(jpy.step()), "1");
        let bhd = Currency::new(3, "BHD", 3);
        assert_eq!(bhd.format(bhd.step()), "0.001");
    }

    #[test]
    fn converts_from_wire_view() {
        let view = CurrencyView {
            id: 4,
            code: "CHF".to_string(),
            decimals: 2,
        };
        let currency = Currency::from(&view);
        assert_eq!(currency.to_string(), "CHF");
        assert_eq!(currency.parse("3,5").unwrap(), Money::new(350));
    }
}
