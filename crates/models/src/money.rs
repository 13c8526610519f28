//! Currency amounts held as integer cents.
//!
//! On the wire an amount is a JSON number with at most two fractional digits
//! (`15.5`, `1.20`); decimal strings are accepted as well. Storage is a
//! `BIGINT` column so arithmetic never touches floating point.

use std::{fmt, str::FromStr};

use rust_decimal::{prelude::ToPrimitive, Decimal};
use sea_orm::DeriveValueType;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::ModelError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, DeriveValueType)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self { Money(cents) }

    pub const fn cents(self) -> i64 { self.0 }

    /// Convert a decimal amount, rejecting sub-cent precision.
    pub fn from_decimal(d: Decimal) -> Result<Self, ModelError> {
        let normalized = d.normalize();
        if normalized.scale() > 2 {
            return Err(ModelError::Validation(format!("amount {d} has more than two decimal places")));
        }
        normalized
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .map(Money)
            .ok_or_else(|| ModelError::Validation(format!("amount {d} is out of range")))
    }

    pub fn to_decimal(self) -> Decimal { Decimal::new(self.0, 2) }

    pub fn is_negative(self) -> bool { self.0 < 0 }

    pub fn checked_add(self, other: Money) -> Option<Money> { self.0.checked_add(other.0).map(Money) }

    pub fn checked_sub(self, other: Money) -> Option<Money> { self.0.checked_sub(other.0).map(Money) }

    pub fn checked_mul(self, qty: i64) -> Option<Money> { self.0.checked_mul(qty).map(Money) }

    /// Absolute distance between two amounts.
    pub fn abs_diff(self, other: Money) -> u64 { self.0.abs_diff(other.0) }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl FromStr for Money {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let d = Decimal::from_str(s.trim())
            .map_err(|_| ModelError::Validation(format!("'{s}' is not a decimal amount")))?;
        Money::from_decimal(d)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Exact for any realistic amount: cents fit well inside f64's 53-bit mantissa.
        serializer.serialize_f64(self.0 as f64 / 100.0)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl<'de> de::Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a decimal amount with at most two fractional digits")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        Money::from_decimal(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        Money::from_decimal(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        if !v.is_finite() {
            return Err(E::custom("amount must be finite"));
        }
        // Display yields the shortest representation that round-trips, so 1.2 stays "1.2".
        Money::from_str(&v.to_string()).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        Money::from_str(v).map_err(E::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_numbers_and_strings() {
        let m: Money = serde_json::from_str("15.50").unwrap();
        assert_eq!(m.cents(), 1550);
        let m: Money = serde_json::from_str("1.2").unwrap();
        assert_eq!(m.cents(), 120);
        let m: Money = serde_json::from_str("20").unwrap();
        assert_eq!(m.cents(), 2000);
        let m: Money = serde_json::from_str("\"0.80\"").unwrap();
        assert_eq!(m.cents(), 80);
    }

    #[test]
    fn rejects_sub_cent_precision() {
        assert!(serde_json::from_str::<Money>("1.005").is_err());
        assert!(serde_json::from_str::<Money>("\"abc\"").is_err());
        // 0.1 + 0.2 in f64 is not a two-digit amount
        assert!(serde_json::from_str::<Money>("0.30000000000000004").is_err());
    }

    #[test]
    fn out_of_range_amounts_are_validation_errors() {
        // both overflow the cents conversion rather than the decimal parse
        let huge_str = serde_json::from_str::<Money>("\"79228162514264337593543950335\"").unwrap_err();
        assert!(huge_str.to_string().contains("out of range"));
        let huge_num = serde_json::from_str::<Money>("70000000000000000000000000000").unwrap_err();
        assert!(huge_num.to_string().contains("out of range"));
        // fits a decimal and the multiplication, but not an i64
        assert!("100000000000000000000".parse::<Money>().is_err());
    }

    #[test]
    fn serializes_as_number() {
        let json = serde_json::to_value(Money::from_cents(210)).unwrap();
        assert_eq!(json, serde_json::json!(2.1));
    }

    #[test]
    fn arithmetic_stays_exact() {
        let total = Money::from_cents(1550)
            .checked_add(Money::from_cents(120).checked_mul(2).unwrap())
            .unwrap();
        assert_eq!(total.cents(), 1790);
        let change = Money::from_cents(2000).checked_sub(total).unwrap();
        assert_eq!(change.to_string(), "2.10");
        assert_eq!(Money::from_cents(100).abs_diff(Money::from_cents(99)), 1);
    }
}
