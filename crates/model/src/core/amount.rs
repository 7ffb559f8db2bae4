use bigdecimal::BigDecimal;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, Visitor},
};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid amount '{input}': expected an optionally signed sequence of decimal digits")]
pub struct ParseAmountError {
    pub input: String,
}

/// Exact integer amount used for monetary ledger fields (balances, fees, rewards).
///
/// The inner decimal is always kept at scale 0, so two amounts are equal
/// exactly when they denote the same integer, however they were written.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(BigDecimal);

impl Amount {
    pub fn zero() -> Self {
        Amount(BigDecimal::from(0))
    }

    pub fn is_negative(&self) -> bool {
        self.0 < BigDecimal::from(0)
    }

    pub fn as_decimal(&self) -> &BigDecimal {
        &self.0
    }

    fn is_integer_literal(s: &str) -> bool {
        let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
        !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
    }
}

impl FromStr for Amount {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseAmountError {
            input: s.to_string(),
        };

        if !Self::is_integer_literal(s) {
            return Err(err());
        }

        let decimal = BigDecimal::from_str(s).map_err(|_| err())?;
        Ok(Amount(decimal.with_scale(0)))
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount(BigDecimal::from(value))
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount(BigDecimal::from(value))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Print through the integer part so large values never switch to exponent notation.
        let (digits, _) = self.0.with_scale(0).as_bigint_and_exponent();
        write!(f, "{digits}")
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct AmountVisitor;

impl Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a decimal integer string or an integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        Amount::from_str(v).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Ok(Amount::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount::from(v))
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}
