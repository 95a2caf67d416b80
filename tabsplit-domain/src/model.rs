use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use indexmap::{IndexMap, IndexSet};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use thiserror::Error;

const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// A monetary amount in integer minor units (cents).
///
/// All bill arithmetic happens on this type; decimal values only appear at the
/// conversion boundaries (user entry, receipt extraction, display).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Self = Self(0);

    pub fn zero() -> Self {
        Self(0)
    }

    pub fn from_minor(value: i64) -> Self {
        Self(value)
    }

    pub fn from_major(value: i64) -> Self {
        Self(value * MINOR_UNITS_PER_MAJOR)
    }

    pub fn minor_units(self) -> i64 {
        self.0
    }

    pub fn as_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Converts a decimal amount, rounding half away from zero to the cent.
    ///
    /// Used for extracted receipt values, which arrive with whatever precision
    /// the vision provider produced. Amounts beyond the representable range
    /// saturate.
    pub fn from_decimal_lossy(value: Decimal) -> Self {
        let minor = (value * Decimal::from(MINOR_UNITS_PER_MAJOR))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        match minor.to_i64() {
            Some(minor) => Self(minor),
            None if minor.is_sign_negative() => Self(i64::MIN),
            None => Self(i64::MAX),
        }
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }
}

/// Renders a fixed two-decimal amount, e.g. `12.50`, never `12.5` or `12.500`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let minor = self.0.unsigned_abs();
        write!(
            f,
            "{sign}{}.{:02}",
            minor / MINOR_UNITS_PER_MAJOR as u64,
            minor % MINOR_UNITS_PER_MAJOR as u64
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoneyConversionError {
    #[error("amount has sub-cent precision")]
    SubCentPrecision,
    #[error("amount does not fit the representable money range")]
    OutOfRange,
}

/// Strict conversion for user-entered amounts: rejects sub-cent precision.
impl TryFrom<Decimal> for Money {
    type Error = MoneyConversionError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        let minor = value * Decimal::from(MINOR_UNITS_PER_MAJOR);
        if minor.fract() != Decimal::ZERO {
            return Err(MoneyConversionError::SubCentPrecision);
        }
        minor
            .to_i64()
            .map(Self)
            .ok_or(MoneyConversionError::OutOfRange)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillValidationError {
    #[error("price must not be negative (got {price})")]
    NegativePrice { price: Money },
    #[error("charge value must not be negative (got {value})")]
    NegativeChargeValue { value: Decimal },
    #[error("name must not be blank")]
    BlankName,
}

/// A tip or tax, expressed either as a percentage of the bill subtotal or as a
/// fixed amount added regardless of subtotal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChargePolicy {
    Percentage(Decimal),
    FixedAmount(Money),
}

impl ChargePolicy {
    pub fn percentage(value: Decimal) -> Result<Self, BillValidationError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(BillValidationError::NegativeChargeValue { value });
        }
        Ok(Self::Percentage(value))
    }

    pub fn fixed_amount(value: Money) -> Result<Self, BillValidationError> {
        if value.is_negative() {
            return Err(BillValidationError::NegativeChargeValue {
                value: value.as_decimal(),
            });
        }
        Ok(Self::FixedAmount(value))
    }

    /// The charge amount against the given subtotal, rounded half away from
    /// zero to the cent. `None` when the percentage arithmetic leaves the
    /// representable range.
    pub fn amount_of(&self, subtotal: Money) -> Option<Money> {
        match self {
            Self::Percentage(value) => {
                let amount = Decimal::from(subtotal.minor_units())
                    .checked_mul(*value)?
                    .checked_div(Decimal::ONE_HUNDRED)?
                    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
                amount.to_i64().map(Money::from_minor)
            }
            Self::FixedAmount(amount) => Some(*amount),
        }
    }
}

impl Default for ChargePolicy {
    fn default() -> Self {
        Self::Percentage(Decimal::ZERO)
    }
}

/// A priced line on the bill and the set of people sharing it.
///
/// `shared_by` may be empty: the item then counts toward the subtotal and
/// total but is allocated to nobody.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub price: Money,
    pub shared_by: IndexSet<String>,
}

impl Item {
    pub fn new(
        name: impl Into<String>,
        price: Money,
        shared_by: impl IntoIterator<Item = String>,
    ) -> Result<Self, BillValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BillValidationError::BlankName);
        }
        if price.is_negative() {
            return Err(BillValidationError::NegativePrice { price });
        }
        Ok(Self {
            name,
            price,
            shared_by: shared_by.into_iter().collect(),
        })
    }

    pub fn unassigned(name: impl Into<String>, price: Money) -> Result<Self, BillValidationError> {
        Self::new(name, price, [])
    }
}

/// The allocation computed for one bill snapshot. Derived, never stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitResult {
    pub subtotal: Money,
    pub tip_amount: Money,
    pub tax_amount: Money,
    pub total: Money,
    pub per_person: IndexMap<String, Money>,
}

pub type People = IndexSet<String>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::whole(Money::from_minor(1250), "12.50")]
    #[case::trailing_zero(Money::from_minor(460), "4.60")]
    #[case::sub_one(Money::from_minor(5), "0.05")]
    #[case::zero(Money::ZERO, "0.00")]
    #[case::negative(Money::from_minor(-1234), "-12.34")]
    #[case::negative_cents(Money::from_minor(-7), "-0.07")]
    fn money_displays_two_decimals(#[case] amount: Money, #[case] expected: &str) {
        assert_eq!(amount.to_string(), expected);
    }

    #[test]
    fn strict_conversion_rejects_sub_cent_precision() {
        let err = Money::try_from(Decimal::new(12345, 3)).expect_err("12.345 should be rejected");
        assert_eq!(err, MoneyConversionError::SubCentPrecision);
    }

    #[test]
    fn strict_conversion_accepts_cent_precision() {
        let money = Money::try_from(Decimal::new(1250, 2)).expect("12.50 should convert");
        assert_eq!(money, Money::from_minor(1250));
    }

    #[rstest]
    #[case::rounds_up(Decimal::new(12345, 3), 1235)]
    #[case::rounds_down(Decimal::new(12344, 3), 1234)]
    #[case::midpoint_away(Decimal::new(125, 3), 13)]
    #[case::negative_midpoint(Decimal::new(-125, 3), -13)]
    fn lossy_conversion_rounds_half_away_from_zero(#[case] value: Decimal, #[case] minor: i64) {
        assert_eq!(Money::from_decimal_lossy(value), Money::from_minor(minor));
    }

    #[test]
    fn percentage_policy_rejects_negative_value() {
        let err = ChargePolicy::percentage(Decimal::from(-10)).expect_err("should reject");
        assert!(matches!(err, BillValidationError::NegativeChargeValue { .. }));
    }

    #[test]
    fn fixed_policy_rejects_negative_amount() {
        let err = ChargePolicy::fixed_amount(Money::from_minor(-1)).expect_err("should reject");
        assert!(matches!(err, BillValidationError::NegativeChargeValue { .. }));
    }

    #[rstest]
    #[case::ten_percent(Decimal::from(10), Money::from_minor(2400), Money::from_minor(240))]
    #[case::fractional_rate(Decimal::new(725, 2), Money::from_minor(10000), Money::from_minor(725))]
    #[case::rounds_to_cent(Decimal::from(10), Money::from_minor(5), Money::from_minor(1))]
    #[case::zero_subtotal(Decimal::from(15), Money::ZERO, Money::ZERO)]
    fn percentage_amount_of_subtotal(
        #[case] rate: Decimal,
        #[case] subtotal: Money,
        #[case] expected: Money,
    ) {
        let policy = ChargePolicy::percentage(rate).expect("valid policy");
        assert_eq!(policy.amount_of(subtotal), Some(expected));
    }

    #[test]
    fn fixed_amount_ignores_subtotal() {
        let policy = ChargePolicy::fixed_amount(Money::from_minor(500)).expect("valid policy");
        assert_eq!(policy.amount_of(Money::ZERO), Some(Money::from_minor(500)));
        assert_eq!(
            policy.amount_of(Money::from_major(1_000)),
            Some(Money::from_minor(500))
        );
    }

    #[test]
    fn item_rejects_negative_price() {
        let err = Item::unassigned("Pizza", Money::from_minor(-100)).expect_err("should reject");
        assert!(matches!(err, BillValidationError::NegativePrice { .. }));
    }

    #[test]
    fn item_rejects_blank_name() {
        let err = Item::unassigned("  ", Money::from_minor(100)).expect_err("should reject");
        assert_eq!(err, BillValidationError::BlankName);
    }

    #[test]
    fn item_deduplicates_shared_by() {
        let item = Item::new(
            "Pizza",
            Money::from_minor(2000),
            ["Ana".to_string(), "Ben".to_string(), "Ana".to_string()],
        )
        .expect("valid item");
        assert_eq!(item.shared_by.len(), 2);
    }
}
