use std::{
    fmt,
    ops::{Add, AddAssign},
    str::FromStr,
};

use crate::LedgerError;

/// Expense amount represented as **integer kopecks**.
///
/// Use this type for **all** monetary values in the ledger to avoid
/// floating-point drift. Sheet cells store the canonical two-decimal
/// rendering.
///
/// # Examples
///
/// ```rust
/// use ledger::Amount;
///
/// let amount: Amount = "150.50".parse().unwrap();
/// assert_eq!(amount.kopecks(), 15050);
/// assert_eq!(amount.to_string(), "150.50");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects
/// more than 2 decimals and negative values):
///
/// ```rust
/// use ledger::Amount;
///
/// assert_eq!("10".parse::<Amount>().unwrap().kopecks(), 1000);
/// assert_eq!("10,5".parse::<Amount>().unwrap().kopecks(), 1050);
/// assert!("12.345".parse::<Amount>().is_err());
/// assert!("-3".parse::<Amount>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Creates a new amount from integer kopecks.
    #[must_use]
    pub const fn from_kopecks(kopecks: i64) -> Self {
        Self(kopecks)
    }

    /// Returns the raw value in kopecks.
    #[must_use]
    pub const fn kopecks(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rubles = self.0 / 100;
        let kopecks = self.0 % 100;
        write!(f, "{rubles}.{kopecks:02}")
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl FromStr for Amount {
    type Err = LedgerError;

    /// Parses a decimal string into kopecks.
    ///
    /// Accepts `.` or `,` as decimal separator and surrounding whitespace.
    ///
    /// Validation rules:
    /// - max 2 fractional digits (rejects `12.345`)
    /// - rejects signs, empty and invalid strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LedgerError::InvalidInput(format!("invalid amount: {s:?}"));
        let overflow = || LedgerError::InvalidInput("amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::InvalidInput("empty amount".to_string()));
        }

        let normalized = trimmed.replace(',', ".");
        let mut parts = normalized.split('.');
        let rubles_str = parts.next().ok_or_else(invalid)?;
        let kopecks_str = parts.next();

        if parts.next().is_some() {
            return Err(invalid());
        }

        if rubles_str.is_empty() || !rubles_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let rubles: i64 = rubles_str.parse().map_err(|_| invalid())?;

        let kopecks: i64 = match kopecks_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                match frac.len() {
                    1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                    2 => frac.parse::<i64>().map_err(|_| invalid())?,
                    _ => {
                        return Err(LedgerError::InvalidInput("too many decimals".to_string()));
                    }
                }
            }
        };

        let total = rubles
            .checked_mul(100)
            .and_then(|v| v.checked_add(kopecks))
            .ok_or_else(overflow)?;

        Ok(Amount(total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_two_decimals() {
        assert_eq!(Amount::from_kopecks(0).to_string(), "0.00");
        assert_eq!(Amount::from_kopecks(1).to_string(), "0.01");
        assert_eq!(Amount::from_kopecks(10).to_string(), "0.10");
        assert_eq!(Amount::from_kopecks(15050).to_string(), "150.50");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("150".parse::<Amount>().unwrap().kopecks(), 15000);
        assert_eq!("150.5".parse::<Amount>().unwrap().kopecks(), 15050);
        assert_eq!("150,50".parse::<Amount>().unwrap().kopecks(), 15050);
        assert_eq!("  2.30 ".parse::<Amount>().unwrap().kopecks(), 230);
    }

    #[test]
    fn parse_rejects_more_than_two_decimals() {
        assert!("12.345".parse::<Amount>().is_err());
        assert!("0.001".parse::<Amount>().is_err());
    }

    #[test]
    fn parse_rejects_signs_and_garbage() {
        assert!("".parse::<Amount>().is_err());
        assert!("-5".parse::<Amount>().is_err());
        assert!("+5".parse::<Amount>().is_err());
        assert!("abc".parse::<Amount>().is_err());
        assert!("1.2.3".parse::<Amount>().is_err());
    }
}
