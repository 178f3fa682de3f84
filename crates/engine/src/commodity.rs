use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Unit symbol carried by an amount: either a cash currency (`GBP`, `USD`) or
/// a traded commodity (`GOOG`, `VWRL`).
///
/// The ledger format treats both the same way, so the engine does too. The
/// symbol is validated on construction:
/// - 1 to 24 characters
/// - starts with an uppercase ASCII letter, ends with an uppercase letter or
///   digit
/// - inner characters are uppercase letters, digits, `'`, `.`, `_` or `-`
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Commodity(String);

impl Commodity {
    const MAX_LEN: usize = 24;

    /// Wraps a symbol known to be valid (built-in defaults).
    pub(crate) fn known(code: &str) -> Self {
        Self(code.to_string())
    }

    /// Canonical symbol.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Commodity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for Commodity {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let symbol = value.trim().to_ascii_uppercase();
        let invalid = || EngineError::InvalidCommodity(format!("invalid symbol: {value:?}"));

        let first = symbol.chars().next().ok_or_else(invalid)?;
        let last = symbol.chars().last().ok_or_else(invalid)?;
        if symbol.len() > Self::MAX_LEN
            || !first.is_ascii_uppercase()
            || !(last.is_ascii_uppercase() || last.is_ascii_digit())
            || !symbol
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || "'._-".contains(c))
        {
            return Err(invalid());
        }
        Ok(Self(symbol))
    }
}

impl TryFrom<String> for Commodity {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<Commodity> for String {
    fn from(value: Commodity) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_tickers_and_currencies() {
        assert_eq!(Commodity::try_from("GBP").unwrap().code(), "GBP");
        assert_eq!(Commodity::try_from("vwrl").unwrap().code(), "VWRL");
        assert_eq!(Commodity::try_from("BRK.B").unwrap().code(), "BRK.B");
        assert_eq!(Commodity::try_from("VUSA2").unwrap().code(), "VUSA2");
    }

    #[test]
    fn rejects_malformed_symbols() {
        assert!(Commodity::try_from("").is_err());
        assert!(Commodity::try_from("1ABC").is_err());
        assert!(Commodity::try_from("ABC-").is_err());
        assert!(Commodity::try_from("A B").is_err());
        assert!(Commodity::try_from("ABCDEFGHIJKLMNOPQRSTUVWXYZ").is_err());
    }
}
