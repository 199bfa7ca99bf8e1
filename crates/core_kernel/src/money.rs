//! Money types with precise decimal arithmetic
//!
//! This module provides a type-safe representation of monetary values
//! using rust_decimal for precise calculations without floating-point errors.
//! Invoice amounts are rounded to two decimal places with standard
//! (half-away-from-zero) rounding at every computation step.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub, Mul, Neg};
use std::str::FromStr;
use thiserror::Error;

/// Currency codes following ISO 4217
///
/// PLN is the local (accounting) currency; every foreign-currency invoice
/// additionally carries PLN equivalents computed from an exchange rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    PLN,
    EUR,
    USD,
    GBP,
    CHF,
}

impl Currency {
    /// The local accounting currency
    pub const LOCAL: Currency = Currency::PLN;

    /// Returns true for the local accounting currency
    pub fn is_local(&self) -> bool {
        *self == Self::LOCAL
    }

    /// Returns the number of decimal places for this currency
    pub fn decimal_places(&self) -> u32 {
        2
    }

    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::PLN => "PLN",
            Currency::EUR => "EUR",
            Currency::USD => "USD",
            Currency::GBP => "GBP",
            Currency::CHF => "CHF",
        }
    }

    /// Polish name of the major unit, declined for a given count
    ///
    /// Polish nouns take three plural forms: 1 złoty, 2-4 złote, 5+ złotych
    /// (with 12-14 always taking the many form). Used by the amount-in-words
    /// renderer.
    pub fn major_unit_name(&self, count: u64) -> &'static str {
        let forms = match self {
            Currency::PLN => ("złoty", "złote", "złotych"),
            Currency::EUR => ("euro", "euro", "euro"),
            Currency::USD => ("dolar", "dolary", "dolarów"),
            Currency::GBP => ("funt", "funty", "funtów"),
            Currency::CHF => ("frank", "franki", "franków"),
        };
        pick_plural_form(count, forms)
    }

    /// Polish name of the minor unit in the genitive plural
    ///
    /// The fractional part of an amount is always rendered as `NN/100` of
    /// the minor unit, so only the genitive plural form is ever needed.
    pub fn minor_unit_name(&self) -> &'static str {
        match self {
            Currency::PLN => "groszy",
            Currency::EUR => "centów",
            Currency::USD => "centów",
            Currency::GBP => "pensów",
            Currency::CHF => "centymów",
        }
    }
}

/// Selects the Polish plural form for a cardinal count.
fn pick_plural_form(count: u64, (one, few, many): (&'static str, &'static str, &'static str)) -> &'static str {
    if count == 1 {
        return one;
    }
    let last_two = count % 100;
    let last = count % 10;
    if (2..=4).contains(&last) && !(12..=14).contains(&last_two) {
        few
    } else {
        many
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PLN" => Ok(Currency::PLN),
            "EUR" => Ok(Currency::EUR),
            "USD" => Ok(Currency::USD),
            "GBP" => Ok(Currency::GBP),
            "CHF" => Ok(Currency::CHF),
            other => Err(MoneyError::UnknownCurrency(other.to_string())),
        }
    }
}

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Currency mismatch: cannot operate on {0} and {1}")]
    CurrencyMismatch(String, String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    #[error("Invalid VAT rate: {0} (must be between 0 and 100)")]
    InvalidVatRate(Decimal),
}

/// A monetary amount with associated currency
///
/// Money uses rust_decimal for precise arithmetic without floating-point
/// errors. Amounts are stored with 4 decimal places internally to keep
/// precision through rate multiplication; invoice-facing values are obtained
/// via [`Money::round2`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Creates a new Money value
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self {
            amount: amount.round_dp(4),
            currency,
        }
    }

    /// Creates Money from an integer amount in minor units (e.g., grosze)
    pub fn from_minor(minor_units: i64, currency: Currency) -> Self {
        let divisor = Decimal::new(10_i64.pow(currency.decimal_places()), 0);
        Self::new(Decimal::new(minor_units, 0) / divisor, currency)
    }

    /// Creates a zero amount in the specified currency
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: dec!(0),
            currency,
        }
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is positive
    pub fn is_positive(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative()
    }

    /// Rounds to two decimal places with standard half-away-from-zero rounding
    ///
    /// Invoice arithmetic rounds at every step (net, then VAT, then gross),
    /// never only on the final value, and never truncates.
    pub fn round2(&self) -> Self {
        Self {
            amount: self
                .amount
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            currency: self.currency,
        }
    }

    /// Splits the rounded amount into whole major units and minor units
    ///
    /// Returns `(major, minor)` where minor is in 0..100. Negative amounts
    /// yield the absolute decomposition.
    pub fn split_units(&self) -> (u64, u8) {
        let rounded = self.round2().amount.abs();
        let major = rounded.trunc();
        let minor = ((rounded - major) * dec!(100)).round();
        (
            major.to_u64().unwrap_or(u64::MAX),
            minor.to_u8().unwrap_or(0),
        )
    }

    /// Checked addition that returns an error on currency mismatch
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        Ok(Self::new(self.amount + other.amount, self.currency))
    }

    /// Checked subtraction that returns an error on currency mismatch
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        Ok(Self::new(self.amount - other.amount, self.currency))
    }

    /// Multiplies by a scalar (e.g., for rate calculations)
    pub fn multiply(&self, factor: Decimal) -> Self {
        Self::new(self.amount * factor, self.currency)
    }

    /// Converts to the local currency at the given exchange rate
    ///
    /// The conversion multiplies the already-rounded amount and rounds the
    /// result to two decimals.
    pub fn to_local(&self, rate: Decimal) -> Money {
        Money::new(self.round2().amount * rate, Currency::LOCAL).round2()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.round2().amount, self.currency.code())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.checked_add(&other)
            .expect("Currency mismatch in Money::add")
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.checked_sub(&other)
            .expect("Currency mismatch in Money::sub")
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.amount, self.currency)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, factor: Decimal) -> Self {
        self.multiply(factor)
    }
}

/// A VAT rate expressed as a percentage in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VatRate(Decimal);

impl VatRate {
    /// Creates a VAT rate from a percentage value (e.g., 23 for 23%)
    pub fn from_percentage(percentage: Decimal) -> Result<Self, MoneyError> {
        if percentage < dec!(0) || percentage > dec!(100) {
            return Err(MoneyError::InvalidVatRate(percentage));
        }
        Ok(Self(percentage))
    }

    /// The standard Polish VAT rate, 23%
    pub fn standard() -> Self {
        Self(dec!(23))
    }

    /// Zero rate
    pub fn zero() -> Self {
        Self(dec!(0))
    }

    /// Returns the rate as a percentage
    pub fn as_percentage(&self) -> Decimal {
        self.0
    }

    /// Applies this rate to a money amount, rounding to two decimals
    pub fn apply(&self, money: &Money) -> Money {
        money.multiply(self.0 / dec!(100)).round2()
    }
}

impl fmt::Display for VatRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_creation() {
        let m = Money::new(dec!(100.50), Currency::PLN);
        assert_eq!(m.amount(), dec!(100.50));
        assert_eq!(m.currency(), Currency::PLN);
    }

    #[test]
    fn test_money_from_minor() {
        let m = Money::from_minor(10050, Currency::PLN);
        assert_eq!(m.amount(), dec!(100.50));
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::new(dec!(100.00), Currency::PLN);
        let b = Money::new(dec!(50.00), Currency::PLN);

        assert_eq!((a + b).amount(), dec!(150.00));
        assert_eq!((a - b).amount(), dec!(50.00));
    }

    #[test]
    fn test_currency_mismatch() {
        let pln = Money::new(dec!(100.00), Currency::PLN);
        let eur = Money::new(dec!(100.00), Currency::EUR);

        let result = pln.checked_add(&eur);
        assert!(matches!(result, Err(MoneyError::CurrencyMismatch(_, _))));
    }

    #[test]
    fn test_round2_is_half_away_from_zero() {
        assert_eq!(Money::new(dec!(2.675), Currency::PLN).round2().amount(), dec!(2.68));
        assert_eq!(Money::new(dec!(2.665), Currency::PLN).round2().amount(), dec!(2.67));
        assert_eq!(Money::new(dec!(-2.675), Currency::PLN).round2().amount(), dec!(-2.68));
    }

    #[test]
    fn test_split_units() {
        let m = Money::new(dec!(123.68), Currency::PLN);
        assert_eq!(m.split_units(), (123, 68));

        let whole = Money::new(dec!(1230.00), Currency::PLN);
        assert_eq!(whole.split_units(), (1230, 0));
    }

    #[test]
    fn test_to_local_rounds_after_conversion() {
        let m = Money::new(dec!(100.55), Currency::EUR);
        let local = m.to_local(dec!(4.3123));
        assert_eq!(local.currency(), Currency::PLN);
        assert_eq!(local.amount(), dec!(433.60));
    }

    #[test]
    fn test_vat_rate_bounds() {
        assert!(VatRate::from_percentage(dec!(23)).is_ok());
        assert!(VatRate::from_percentage(dec!(0)).is_ok());
        assert!(VatRate::from_percentage(dec!(100)).is_ok());
        assert!(VatRate::from_percentage(dec!(-1)).is_err());
        assert!(VatRate::from_percentage(dec!(100.01)).is_err());
    }

    #[test]
    fn test_vat_rate_apply() {
        let rate = VatRate::from_percentage(dec!(23)).unwrap();
        let net = Money::new(dec!(100.55), Currency::PLN);
        assert_eq!(rate.apply(&net).amount(), dec!(23.13));
    }

    #[test]
    fn test_currency_parsing() {
        assert_eq!("pln".parse::<Currency>().unwrap(), Currency::PLN);
        assert_eq!("EUR".parse::<Currency>().unwrap(), Currency::EUR);
        assert!(matches!(
            "XXX".parse::<Currency>(),
            Err(MoneyError::UnknownCurrency(_))
        ));
    }

    #[test]
    fn test_major_unit_declension() {
        assert_eq!(Currency::PLN.major_unit_name(1), "złoty");
        assert_eq!(Currency::PLN.major_unit_name(2), "złote");
        assert_eq!(Currency::PLN.major_unit_name(5), "złotych");
        assert_eq!(Currency::PLN.major_unit_name(12), "złotych");
        assert_eq!(Currency::PLN.major_unit_name(22), "złote");
        assert_eq!(Currency::PLN.major_unit_name(123), "złote");
        assert_eq!(Currency::PLN.major_unit_name(1230), "złotych");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn round2_never_changes_value_by_more_than_half_grosz(
            amount in -1_000_000_000i64..1_000_000_000i64
        ) {
            let money = Money::new(Decimal::new(amount, 4), Currency::PLN);
            let rounded = money.round2();
            let diff = (money.amount() - rounded.amount()).abs();
            prop_assert!(diff <= dec!(0.005));
        }

        #[test]
        fn money_arithmetic_is_associative(
            a in -1_000_000i64..1_000_000i64,
            b in -1_000_000i64..1_000_000i64,
            c in -1_000_000i64..1_000_000i64
        ) {
            let ma = Money::from_minor(a, Currency::PLN);
            let mb = Money::from_minor(b, Currency::PLN);
            let mc = Money::from_minor(c, Currency::PLN);

            prop_assert_eq!((ma + mb) + mc, ma + (mb + mc));
        }

        #[test]
        fn split_units_minor_is_below_hundred(
            minor in 0i64..1_000_000_000i64
        ) {
            let money = Money::from_minor(minor, Currency::PLN);
            let (_, fraction) = money.split_units();
            prop_assert!(fraction < 100);
        }
    }
}
