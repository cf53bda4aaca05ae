//! Supported currencies, the configured currency set and amount formatting

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Currencies a price can be stored in, in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Inr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyInfo {
    pub code: Currency,
    pub symbol: &'static str,
    pub name: &'static str,
    pub locale: &'static str,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::Usd, Currency::Eur, Currency::Gbp, Currency::Inr];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Inr => "INR",
        }
    }

    pub fn info(&self) -> CurrencyInfo {
        let (symbol, name, locale) = match self {
            Self::Usd => ("$", "US Dollar", "en-US"),
            Self::Eur => ("€", "Euro", "en-GB"),
            Self::Gbp => ("£", "British Pound", "en-GB"),
            Self::Inr => ("₹", "Indian Rupee", "en-IN"),
        };
        CurrencyInfo {
            code: *self,
            symbol,
            name,
            locale,
        }
    }

    /// Suffix appended to a price field name on store documents, USD is unsuffixed
    pub fn field_suffix(&self) -> &'static str {
        match self {
            Self::Usd => "",
            other => other.code(),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            "INR" => Ok(Currency::Inr),
            _ => Err(format!("unsupported currency: {}", s)),
        }
    }
}

/// The one supported-currency list every price projection reads from.
///
/// Always non-empty, deduplicated and in canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Currency>", into = "Vec<Currency>")]
pub struct CurrencySet(Vec<Currency>);

impl CurrencySet {
    pub fn new(currencies: impl IntoIterator<Item = Currency>) -> Result<Self, String> {
        let mut currencies: Vec<Currency> = currencies.into_iter().collect();
        currencies.sort();
        currencies.dedup();
        if currencies.is_empty() {
            return Err(String::from("at least one supported currency is required"));
        }
        Ok(Self(currencies))
    }

    pub fn contains(&self, currency: Currency) -> bool {
        self.0.contains(&currency)
    }

    pub fn iter(&self) -> impl Iterator<Item = Currency> + '_ {
        self.0.iter().copied()
    }

    pub fn infos(&self) -> Vec<CurrencyInfo> {
        self.iter().map(|currency| currency.info()).collect()
    }
}

impl Default for CurrencySet {
    fn default() -> Self {
        Self(vec![Currency::Usd, Currency::Eur, Currency::Gbp])
    }
}

impl TryFrom<Vec<Currency>> for CurrencySet {
    type Error = String;

    fn try_from(currencies: Vec<Currency>) -> Result<Self, Self::Error> {
        CurrencySet::new(currencies)
    }
}

impl From<CurrencySet> for Vec<Currency> {
    fn from(set: CurrencySet) -> Self {
        set.0
    }
}

/// Formats an amount with the currency symbol, 0 to 2 fraction digits and the
/// digit grouping of the currency's locale.
pub fn format_amount(amount: Decimal, currency: Currency) -> String {
    let rounded = amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let digits = rounded.abs().to_string();
    let (integer, fraction) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (digits.as_str(), None),
    };
    let grouped = group_digits(integer, currency == Currency::Inr);

    match fraction {
        Some(fraction) => format!("{}{}{}.{}", sign, currency.info().symbol, grouped, fraction),
        None => format!("{}{}{}", sign, currency.info().symbol, grouped),
    }
}

fn group_digits(digits: &str, lakh: bool) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let size = if lakh { 2 } else { 3 };

    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(size);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_currency_set_is_canonical() {
        let set = CurrencySet::new([Currency::Gbp, Currency::Usd, Currency::Gbp]).unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Currency::Usd, Currency::Gbp]);
    }

    #[test]
    fn test_currency_set_rejects_empty() {
        assert!(CurrencySet::new(Vec::new()).is_err());
        assert!(serde_json::from_str::<CurrencySet>("[]").is_err());
    }

    #[test]
    fn test_default_currency_set_excludes_inr() {
        let set = CurrencySet::default();
        assert!(set.contains(Currency::Usd));
        assert!(!set.contains(Currency::Inr));
    }

    #[test]
    fn test_currency_codes_serialize_uppercase() {
        assert_eq!(serde_json::to_string(&Currency::Eur).unwrap(), "\"EUR\"");
        assert_eq!(Currency::try_from("gbp"), Ok(Currency::Gbp));
        assert!(Currency::try_from("JPY").is_err());
    }

    #[test]
    fn test_field_suffix() {
        assert_eq!(Currency::Usd.field_suffix(), "");
        assert_eq!(Currency::Inr.field_suffix(), "INR");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(149), Currency::Usd), "$149");
        assert_eq!(format_amount(dec!(149.50), Currency::Eur), "€149.5");
        assert_eq!(format_amount(dec!(1299.999), Currency::Gbp), "£1,300");
        assert_eq!(format_amount(dec!(1234567.25), Currency::Usd), "$1,234,567.25");
    }

    #[test]
    fn test_format_amount_lakh_grouping() {
        assert_eq!(format_amount(dec!(1234567), Currency::Inr), "₹12,34,567");
        assert_eq!(format_amount(dec!(12400), Currency::Inr), "₹12,400");
    }
}
