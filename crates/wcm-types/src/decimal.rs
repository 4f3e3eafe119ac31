use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Positive scales that would print more leading zeros than this use
/// exponent notation instead.
const MAX_LEADING_ZEROS: usize = 6;

/// A decimal number stored as an unscaled integer and a base-10 scale.
///
/// The value is `unscaled × 10^-scale`. Scale is significant for equality:
/// `1.5` and `1.50` are different values, as they are in the store's
/// native decimal encoding.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Decimal {
    unscaled: i128,
    scale: i32,
}

impl Decimal {
    /// Create a decimal from its raw parts.
    pub const fn new(unscaled: i128, scale: i32) -> Self {
        Self { unscaled, scale }
    }

    /// Construct a decimal from an integer with zero scale.
    pub const fn from_i64(value: i64) -> Self {
        Self::new(value as i128, 0)
    }

    pub fn unscaled(&self) -> i128 {
        self.unscaled
    }

    pub fn scale(&self) -> i32 {
        self.scale
    }
}

impl fmt::Debug for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Decimal({self})")
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.unscaled);
        }
        if self.scale < 0 {
            // Exponent form keeps the scale recoverable on parse.
            return write!(f, "{}E+{}", self.unscaled, self.scale.unsigned_abs());
        }

        let digits = self.unscaled.unsigned_abs().to_string();
        let scale = self.scale.unsigned_abs() as usize;
        if scale > digits.len() + MAX_LEADING_ZEROS {
            return write!(f, "{}E-{}", self.unscaled, self.scale);
        }
        let padded = if digits.len() <= scale {
            format!("{}{}", "0".repeat(scale + 1 - digits.len()), digits)
        } else {
            digits
        };
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        if self.unscaled < 0 {
            f.write_str("-")?;
        }
        write!(f, "{int_part}.{frac_part}")
    }
}

impl FromStr for Decimal {
    type Err = TypeError;

    /// Parse `[+-]digits[.digits][(e|E)[+-]digits]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TypeError::InvalidDecimal(s.to_string());

        let (mantissa, exponent) = match s.find(['e', 'E']) {
            Some(pos) => {
                let exp: i64 = s[pos + 1..].parse().map_err(|_| invalid())?;
                (&s[..pos], exp)
            }
            None => (s, 0),
        };

        let (negative, unsigned) = match mantissa.as_bytes().first() {
            Some(b'-') => (true, &mantissa[1..]),
            Some(b'+') => (false, &mantissa[1..]),
            _ => (false, mantissa),
        };

        let (int_digits, frac_digits) = match unsigned.split_once('.') {
            Some((i, f)) => (i, f),
            None => (unsigned, ""),
        };
        if int_digits.is_empty() && frac_digits.is_empty() {
            return Err(invalid());
        }
        if !int_digits
            .bytes()
            .chain(frac_digits.bytes())
            .all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        // Negative values accumulate downwards so i128::MIN stays reachable.
        let mut unscaled: i128 = 0;
        for b in int_digits.bytes().chain(frac_digits.bytes()) {
            let digit = i128::from(b - b'0');
            unscaled = unscaled
                .checked_mul(10)
                .and_then(|v| {
                    if negative {
                        v.checked_sub(digit)
                    } else {
                        v.checked_add(digit)
                    }
                })
                .ok_or_else(invalid)?;
        }

        let frac_len = i64::try_from(frac_digits.len()).map_err(|_| invalid())?;
        let scale = frac_len
            .checked_sub(exponent)
            .and_then(|scale| i32::try_from(scale).ok())
            .ok_or_else(invalid)?;
        Ok(Self::new(unscaled, scale))
    }
}

impl TryFrom<String> for Decimal {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Decimal> for String {
    fn from(value: Decimal) -> Self {
        value.to_string()
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}
