//! Transaction postings.
//!
//! A [`Posting`] is a single account/amount leg of a
//! [`Transaction`](crate::Transaction).
//!
//! Amounts are signed:
//! - positive values debit the account (assets grow, expenses accrue)
//! - negative values credit it
//!
//! Cash amounts are carried as [`MoneyCents`]; commodity acquisitions carry a
//! whole number of units plus the per-unit [`Cost`] they were bought at.

use std::fmt;

use crate::{Account, Commodity, MoneyCents};

/// Numeric part of an amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quantity {
    /// Cash, exact to the cent.
    Cents(MoneyCents),
    /// Whole commodity units. Fractional units are never produced.
    Units(i64),
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cents(amount) => fmt::Display::fmt(amount, f),
            Self::Units(units) => fmt::Display::fmt(units, f),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Amount {
    pub quantity: Quantity,
    pub commodity: Commodity,
}

impl Amount {
    pub fn cash(amount: MoneyCents, commodity: Commodity) -> Self {
        Self {
            quantity: Quantity::Cents(amount),
            commodity,
        }
    }
}

/// Per-unit acquisition price recorded on a commodity posting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cost {
    pub per_unit: MoneyCents,
    pub commodity: Commodity,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Posting {
    pub account: Account,
    /// `None` when the amount is elided and inferred as the balancing
    /// remainder.
    pub amount: Option<Amount>,
    pub cost: Option<Cost>,
}

impl Posting {
    /// Cash leg of `amount` in `commodity`.
    pub fn cash(account: Account, amount: MoneyCents, commodity: Commodity) -> Self {
        Self {
            account,
            amount: Some(Amount::cash(amount, commodity)),
            cost: None,
        }
    }

    /// Acquisition of `units` of `commodity`, each at `cost`.
    pub fn at_cost(account: Account, units: i64, commodity: Commodity, cost: Cost) -> Self {
        Self {
            account,
            amount: Some(Amount {
                quantity: Quantity::Units(units),
                commodity,
            }),
            cost: Some(cost),
        }
    }

    /// Posting whose amount is left to the ledger to infer.
    pub fn elided(account: Account) -> Self {
        Self {
            account,
            amount: None,
            cost: None,
        }
    }

    /// Unit held by the posting's account, if an amount is present.
    #[must_use]
    pub fn commodity(&self) -> Option<&Commodity> {
        self.amount.as_ref().map(|a| &a.commodity)
    }

    /// Balancing weight of the posting: the amount itself for cash legs,
    /// `units × cost` in the cost commodity for acquisitions.
    ///
    /// Returns `None` for elided postings or on overflow.
    #[must_use]
    pub fn weight(&self) -> Option<(MoneyCents, &Commodity)> {
        let amount = self.amount.as_ref()?;
        match (&amount.quantity, &self.cost) {
            (Quantity::Units(units), Some(cost)) => cost
                .per_unit
                .checked_times(*units)
                .map(|total| (total, &cost.commodity)),
            (Quantity::Cents(cents), _) => Some((*cents, &amount.commodity)),
            (Quantity::Units(units), None) => MoneyCents::new(*units)
                .checked_times(100)
                .map(|total| (total, &amount.commodity)),
        }
    }
}

impl fmt::Display for Posting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.amount {
            None => write!(f, "  {}", self.account),
            Some(amount) => {
                write!(
                    f,
                    "  {:<42} {:>10} {}",
                    self.account, amount.quantity, amount.commodity
                )?;
                if let Some(cost) = &self.cost {
                    write!(f, " {{{} {}}}", cost.per_unit, cost.commodity)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gbp() -> Commodity {
        Commodity::try_from("GBP").unwrap()
    }

    #[test]
    fn cash_weight_is_the_amount() {
        let posting = Posting::cash(
            Account::try_from("Expenses:Food:Groceries").unwrap(),
            MoneyCents::new(4_250),
            gbp(),
        );
        assert_eq!(posting.weight(), Some((MoneyCents::new(4_250), &gbp())));
    }

    #[test]
    fn cost_weight_multiplies_units() {
        let posting = Posting::at_cost(
            Account::try_from("Assets:Lalit:UK:Vanguard:ISA:VWRL").unwrap(),
            11,
            Commodity::try_from("VWRL").unwrap(),
            Cost {
                per_unit: MoneyCents::new(8_412),
                commodity: gbp(),
            },
        );
        assert_eq!(posting.weight(), Some((MoneyCents::new(92_532), &gbp())));
        assert_eq!(
            posting.to_string(),
            "  Assets:Lalit:UK:Vanguard:ISA:VWRL                  11 VWRL {84.12 GBP}"
        );
    }

    #[test]
    fn elided_posting_has_no_weight() {
        let posting = Posting::elided(Account::try_from("Equity:Opening-Balances").unwrap());
        assert_eq!(posting.weight(), None);
        assert_eq!(posting.to_string(), "  Equity:Opening-Balances");
    }
}
