use crate::types::errors::AmountError;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::ops::AddAssign;
use std::str::FromStr;
use tracing::error;

/// A non-negative, finite amount of money in whatever currency the user logs in.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Amount(Decimal);

impl Amount {
    pub fn zero() -> Self {
        Amount(Decimal::ZERO)
    }

    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_zero() {
            return Ok(Amount::zero());
        }

        if value.is_sign_negative() {
            return Err(AmountError::Negative(value.to_string()));
        }

        Ok(Amount(value.normalize()))
    }

    /// Converts a number coming from a JSON payload.
    pub fn from_f64(value: f64) -> Result<Self, AmountError> {
        if !value.is_finite() {
            return Err(AmountError::NonFinite);
        }

        let decimal = Decimal::from_f64(value).ok_or(AmountError::OutOfRange)?;
        Amount::new(decimal)
    }

    /// Reads the number at the start of free text, ignoring whatever follows it.
    ///
    /// `"120 for lunch"` yields 120 and `"  4.50 coffee"` yields 4.5, while text that
    /// does not open with a number (`"coffee 45"`, `"₹45"`) is rejected.
    pub fn parse_leading(text: &str) -> Result<Self, AmountError> {
        let trimmed = text.trim_start();
        let bytes = trimmed.as_bytes();

        let mut end = 0;
        let mut is_negative = false;

        if let Some(sign @ (b'+' | b'-')) = bytes.first() {
            is_negative = *sign == b'-';
            end = 1;
        }

        let start = end;
        let mut digits = 0;
        let mut seen_dot = false;

        while let Some(byte) = bytes.get(end) {
            match byte {
                b'0'..=b'9' => digits += 1,
                b'.' if !seen_dot => seen_dot = true,
                _ => break
            }
            end += 1;
        }

        if digits == 0 {
            return Err(AmountError::NotANumber(text.to_string()));
        }

        let (integer, fraction) = trimmed[start..end].split_once('.')
            .unwrap_or((&trimmed[start..end], ""));
        let integer = if integer.is_empty() { "0" } else { integer };

        let literal = if fraction.is_empty() {
            integer.to_string()
        } else {
            format!("{integer}.{fraction}")
        };

        let value = Decimal::from_str(&literal).map_err(|_| AmountError::OutOfRange)?;

        if is_negative && !value.is_zero() {
            return Err(AmountError::Negative(format!("-{literal}")));
        }

        Amount::new(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    #[cfg(test)]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    pub fn times(self, factor: u32) -> Amount {
        Amount(self.0.saturating_mul(Decimal::from(factor)))
    }

    /// Whole number of times `divisor` fits in the amount. A zero divisor yields `u64::MAX`.
    pub fn floor_div(self, divisor: u32) -> u64 {
        self.0.checked_div(Decimal::from(divisor))
            .and_then(|quotient| quotient.floor().to_u64())
            .unwrap_or(u64::MAX)
    }
}

impl AddAssign<Amount> for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        if let Some(new_val) = self.checked_add(rhs) {
            self.0 = new_val.0;
        } else {
            error!("Amount AddAssign error: Overflow")
        }
    }
}

impl From<u32> for Amount {
    fn from(value: u32) -> Self {
        Amount(Decimal::from(value))
    }
}

impl Display for Amount {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0.normalize())
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        let decimal = Decimal::from_str(value)
            .map_err(|_| AmountError::NotANumber(value.to_string()))?;

        Amount::new(decimal)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.0.to_f64().unwrap_or_default())
    }
}

struct AmountVisitor;

impl de::Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("a non-negative number or numeric string")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Amount, E> {
        Amount::new(Decimal::from(value)).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Amount, E> {
        Amount::new(Decimal::from(value)).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Amount, E> {
        Amount::from_f64(value).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Amount, E> {
        Amount::from_str(value).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}
