use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::Display;
use std::str::FromStr;

/// Number of decimal places between STX and its base unit.
pub const STX_DECIMALS: u32 = 6;

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid digits regex"));
static NOT_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\d\.\-]+").expect("valid cleanup regex"));

/// A strictly positive amount of uSTX, the indivisible base unit of STX.
///
/// Held as a canonical decimal string (no sign, no leading zeros) so any
/// length is accepted, the same as the wallet side which treats amounts as
/// big integers. Use [`MicroStx::as_u128`] when a machine integer is needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MicroStx(String);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MicroStxParseError {
    #[error("Amount is empty")]
    Empty,
    #[error("Negative value is not allowed")]
    Negative,
    #[error("Amount {0:?} is not an integer number of uSTX")]
    NotAnInteger(String),
    #[error("Amount must be greater than zero")]
    Zero,
    #[error("Invalid number format")]
    InvalidFormat,
    #[error("Too big of a precision: {0} decimals vs {max} on STX", max = STX_DECIMALS)]
    WrongPrecision(u32),
    #[error("Amount is out of range")]
    OutOfRange,
}

impl MicroStx {
    /// Parses an integer literal in uSTX. Only ASCII digits are accepted.
    pub fn parse(input: &str) -> Result<Self, MicroStxParseError> {
        if input.is_empty() {
            return Err(MicroStxParseError::Empty);
        }
        if let Some(rest) = input.strip_prefix('-') {
            if DIGITS.is_match(rest) {
                return Err(MicroStxParseError::Negative);
            }
        }
        if !DIGITS.is_match(input) {
            return Err(MicroStxParseError::NotAnInteger(input.to_string()));
        }
        let canonical = input.trim_start_matches('0');
        if canonical.is_empty() {
            return Err(MicroStxParseError::Zero);
        }
        Ok(MicroStx(canonical.to_string()))
    }

    /// Converts a human-readable STX amount such as `"1.5"` or `"1,000 STX"`
    /// into uSTX.
    pub fn from_stx(input: &str) -> Result<Self, MicroStxParseError> {
        let cleaned = NOT_NUMERIC.replace_all(input, "");
        if cleaned.is_empty() {
            return Err(MicroStxParseError::Empty);
        }
        let parsed = Decimal::from_str(&cleaned)
            .map_err(|_| MicroStxParseError::InvalidFormat)?
            .normalize();
        if parsed.is_sign_negative() && !parsed.is_zero() {
            return Err(MicroStxParseError::Negative);
        }
        let scale = parsed.scale();
        if scale > STX_DECIMALS {
            return Err(MicroStxParseError::WrongPrecision(scale));
        }
        let micro = parsed
            .mantissa()
            .unsigned_abs()
            .checked_mul(10u128.pow(STX_DECIMALS - scale))
            .ok_or(MicroStxParseError::OutOfRange)?;
        MicroStx::try_from(micro)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The amount as a machine integer, or `None` if it does not fit in `u128`.
    pub fn as_u128(&self) -> Option<u128> {
        self.0.parse().ok()
    }
}

impl TryFrom<u128> for MicroStx {
    type Error = MicroStxParseError;

    fn try_from(value: u128) -> Result<Self, Self::Error> {
        if value == 0 {
            return Err(MicroStxParseError::Zero);
        }
        Ok(MicroStx(value.to_string()))
    }
}

impl FromStr for MicroStx {
    type Err = MicroStxParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MicroStx::parse(s)
    }
}

impl Display for MicroStx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for MicroStx {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for MicroStx {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        MicroStx::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonicalizes() {
        assert_eq!(MicroStx::parse("0001000").unwrap().as_str(), "1000");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(MicroStx::parse(""), Err(MicroStxParseError::Empty));
        assert_eq!(MicroStx::parse("0"), Err(MicroStxParseError::Zero));
        assert_eq!(MicroStx::parse("000"), Err(MicroStxParseError::Zero));
        assert_eq!(MicroStx::parse("-5"), Err(MicroStxParseError::Negative));
        assert!(matches!(
            MicroStx::parse("1.5"),
            Err(MicroStxParseError::NotAnInteger(_))
        ));
        assert!(matches!(
            MicroStx::parse(" 12"),
            Err(MicroStxParseError::NotAnInteger(_))
        ));
    }

    #[test]
    fn test_parse_beyond_u128() {
        let huge = "340282366920938463463374607431768211456000";
        let amount = MicroStx::parse(huge).unwrap();
        assert_eq!(amount.as_str(), huge);
        assert_eq!(amount.as_u128(), None);
    }

    #[test]
    fn test_from_stx() {
        assert_eq!(MicroStx::from_stx("1.5").unwrap().as_u128(), Some(1_500_000));
        assert_eq!(MicroStx::from_stx("1,000 STX").unwrap().as_u128(), Some(1_000_000_000));
        assert_eq!(MicroStx::from_stx("0.000001").unwrap().as_u128(), Some(1));
        assert_eq!(MicroStx::from_stx("2.500000").unwrap().as_u128(), Some(2_500_000));
    }

    #[test]
    fn test_from_stx_errors() {
        assert_eq!(
            MicroStx::from_stx("0.0000001"),
            Err(MicroStxParseError::WrongPrecision(7))
        );
        assert_eq!(MicroStx::from_stx("-1"), Err(MicroStxParseError::Negative));
        assert_eq!(MicroStx::from_stx("0"), Err(MicroStxParseError::Zero));
        assert_eq!(MicroStx::from_stx("STX"), Err(MicroStxParseError::Empty));
        assert_eq!(MicroStx::from_stx("1.2.3"), Err(MicroStxParseError::InvalidFormat));
    }

    #[test]
    fn test_deserialize_rejects_zero() {
        assert!(serde_json::from_str::<MicroStx>("\"0\"").is_err());
        let amount: MicroStx = serde_json::from_str("\"250\"").unwrap();
        assert_eq!(serde_json::to_string(&amount).unwrap(), "\"250\"");
    }
}
