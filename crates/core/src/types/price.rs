//! Retail prices in Kenyan Shillings.
//!
//! The catalog overloads a zero amount to mean "price on request - contact
//! us for a quote". Such items stay in the cart but contribute nothing to
//! monetary totals, and their display string is "Contact for pricing"
//! rather than a formatted amount.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A retail price in Kenyan Shillings.
///
/// Serializes as a bare JSON number to match the upstream catalog data
/// shape (`"price": 45000`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Price(Decimal);

impl Price {
    /// The "contact for pricing" sentinel.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether this is the zero sentinel meaning "price on request".
    #[must_use]
    pub fn is_quote(&self) -> bool {
        self.0.is_zero()
    }

    /// Format as a shilling amount, e.g. `"KSh 45,000"`.
    ///
    /// Whole amounts render without cents; fractional amounts keep two
    /// decimal places. Always numeric, even for the zero sentinel.
    #[must_use]
    pub fn format(&self) -> String {
        format!("KSh {}", group_thousands(self.0))
    }

    /// Sentinel-aware display string for product cards and cart lines.
    ///
    /// Returns `"Contact for pricing"` for the zero sentinel, otherwise the
    /// formatted amount.
    #[must_use]
    pub fn display(&self) -> String {
        if self.is_quote() {
            "Contact for pricing".to_string()
        } else {
            self.format()
        }
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        rust_decimal::serde::float::deserialize(deserializer).map(Self)
    }
}

/// Render a decimal with comma-grouped thousands.
///
/// Whole amounts drop the fractional part entirely; anything else is
/// rounded to two decimal places.
fn group_thousands(amount: Decimal) -> String {
    let rounded = amount.round_dp(2).normalize();
    let raw = rounded.abs().to_string();
    let (whole, frac) = raw.split_once('.').map_or((raw.as_str(), None), |(w, f)| (w, Some(f)));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    let digits: Vec<char> = whole.chars().collect();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    match frac {
        Some(frac) => format!("{sign}{grouped}.{frac:0<2}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn price(amount: &str) -> Price {
        Price::new(amount.parse::<Decimal>().unwrap())
    }

    #[test]
    fn test_zero_is_quote_sentinel() {
        assert!(Price::ZERO.is_quote());
        assert_eq!(Price::ZERO.display(), "Contact for pricing");
        assert_eq!(Price::ZERO.format(), "KSh 0");
    }

    #[test]
    fn test_format_groups_thousands() {
        assert_eq!(price("450").format(), "KSh 450");
        assert_eq!(price("4500").format(), "KSh 4,500");
        assert_eq!(price("45000").format(), "KSh 45,000");
        assert_eq!(price("1250000").format(), "KSh 1,250,000");
    }

    #[test]
    fn test_format_keeps_cents_when_fractional() {
        assert_eq!(price("1999.5").format(), "KSh 1,999.50");
        assert_eq!(price("1999.00").format(), "KSh 1,999");
    }

    #[test]
    fn test_display_for_priced_item() {
        assert_eq!(price("85000").display(), "KSh 85,000");
    }

    #[test]
    fn test_serde_bare_number() {
        let p: Price = serde_json::from_str("45000").unwrap();
        assert_eq!(p, price("45000"));
        let p: Price = serde_json::from_str("0").unwrap();
        assert!(p.is_quote());
    }
}
