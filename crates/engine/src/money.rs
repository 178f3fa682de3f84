use std::{
    fmt,
    ops::Neg,
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Signed money amount represented as **integer cents**.
///
/// Use this type for **all** monetary values in the engine (salary, cost
/// basis, posting amounts) so that every generated transaction balances to
/// the cent without floating-point drift.
///
/// The value is signed:
/// - positive = debit (money flowing into the posting's account)
/// - negative = credit
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// Parsing from configuration (rejects > 2 decimals):
///
/// ```rust
/// use engine::MoneyCents;
///
/// assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
/// assert_eq!("10.5".parse::<MoneyCents>().unwrap().cents(), 1050);
/// assert!("12.345".parse::<MoneyCents>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawAmount", into = "String")]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Rounds a major-unit value (e.g. a quoted price) to the nearest cent.
    ///
    /// Non-finite input maps to zero.
    #[must_use]
    pub fn from_major(value: f64) -> Self {
        if !value.is_finite() {
            return Self::ZERO;
        }
        Self((value * 100.0).round() as i64)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    /// Checked multiplication by a whole number of units (returns `None` on
    /// overflow).
    #[must_use]
    pub fn checked_times(self, units: i64) -> Option<MoneyCents> {
        self.0.checked_mul(units).map(MoneyCents)
    }

    /// Number of whole units of `price` that `self` can buy.
    ///
    /// Never negative: a zero or negative price, or a negative budget, buys
    /// nothing.
    ///
    /// ```rust
    /// use engine::MoneyCents;
    ///
    /// assert_eq!(MoneyCents::new(100_000).whole_units_at(MoneyCents::new(8_412)), 11);
    /// assert_eq!(MoneyCents::new(100_000).whole_units_at(MoneyCents::ZERO), 0);
    /// ```
    #[must_use]
    pub const fn whole_units_at(self, price: MoneyCents) -> i64 {
        if price.0 <= 0 || self.0 <= 0 {
            return 0;
        }
        self.0 / price.0
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        let text = format!("{sign}{units}.{cents:02}");
        f.pad(&text)
    }
}

impl From<MoneyCents> for String {
    fn from(value: MoneyCents) -> Self {
        value.to_string()
    }
}

impl Neg for MoneyCents {
    type Output = MoneyCents;

    fn neg(self) -> Self::Output {
        MoneyCents(-self.0)
    }
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    /// Parses a decimal string into cents.
    ///
    /// Accepts an optional leading `+`/`-` and `.` as decimal separator.
    ///
    /// Validation rules:
    /// - max 2 fractional digits (rejects `12.345`)
    /// - rejects empty/invalid strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || EngineError::InvalidAmount("empty amount".to_string());
        let invalid = || EngineError::InvalidAmount(format!("invalid amount: {s}"));
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, trimmed)
        };

        let rest = rest.trim();
        if rest.is_empty() {
            return Err(empty());
        }

        let mut parts = rest.split('.');
        let units_str = parts.next().ok_or_else(invalid)?;
        let cents_str = parts.next();

        if parts.next().is_some() {
            return Err(invalid());
        }

        if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let units: i64 = units_str.parse().map_err(|_| invalid())?;

        let cents: i64 = match cents_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                match frac.len() {
                    1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                    2 => frac.parse::<i64>().map_err(|_| invalid())?,
                    _ => return Err(EngineError::InvalidAmount("too many decimals".to_string())),
                }
            }
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(overflow)?;

        let signed = if negative {
            total.checked_neg().ok_or_else(overflow)?
        } else {
            total
        };

        Ok(MoneyCents(signed))
    }
}

/// Wire shape accepted for amounts in configuration files: a decimal string
/// (`"3500.00"`), an integer (`3500`) or a float (`3500.5`).
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Int(i64),
    Float(f64),
    Text(String),
}

impl TryFrom<RawAmount> for MoneyCents {
    type Error = EngineError;

    fn try_from(raw: RawAmount) -> Result<Self, Self::Error> {
        match raw {
            RawAmount::Int(units) => units
                .checked_mul(100)
                .map(MoneyCents)
                .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string())),
            RawAmount::Float(value) if value.is_finite() => Ok(MoneyCents::from_major(value)),
            RawAmount::Float(value) => Err(EngineError::InvalidAmount(format!(
                "invalid amount: {value}"
            ))),
            RawAmount::Text(text) => text.parse(),
        }
    }
}
