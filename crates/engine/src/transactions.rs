//! Transaction primitives.
//!
//! A `Transaction` is a dated, atomic event made of two or more `Posting`s
//! whose weights net to zero per commodity. Construction goes through
//! [`Transaction::balanced`] or [`TransactionBuilder`], both of which reject
//! unbalanced input, so a `Transaction` value is always balanced.

use std::{collections::BTreeMap, fmt};

use chrono::NaiveDate;

use crate::{Commodity, EngineError, MoneyCents, Posting, ResultEngine};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Flag {
    #[default]
    Cleared,
    Pending,
}

impl Flag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cleared => "*",
            Self::Pending => "!",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub flag: Flag,
    pub payee: Option<String>,
    pub narration: String,
    postings: Vec<Posting>,
}

impl Transaction {
    /// Builds a cleared two-leg transaction, checking that the legs net to
    /// zero.
    pub fn balanced(
        date: NaiveDate,
        payee: &str,
        narration: &str,
        first: Posting,
        second: Posting,
    ) -> ResultEngine<Self> {
        Self::builder(date, narration)
            .payee(payee)
            .posting(first)
            .posting(second)
            .build()
    }

    pub fn builder(date: NaiveDate, narration: &str) -> TransactionBuilder {
        TransactionBuilder {
            date,
            flag: Flag::Cleared,
            payee: None,
            narration: narration.to_string(),
            postings: Vec::new(),
        }
    }

    pub fn postings(&self) -> &[Posting] {
        &self.postings
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date.format("%Y-%m-%d"), self.flag.as_str())?;
        if let Some(payee) = &self.payee {
            write!(f, " {}", quoted(payee))?;
        }
        write!(f, " {}", quoted(&self.narration))?;
        for posting in &self.postings {
            write!(f, "\n{posting}")?;
        }
        Ok(())
    }
}

/// Double-quoted string literal with `"` and `\` escaped.
pub(crate) fn quoted(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Accumulates postings and validates them on [`build`](Self::build).
#[derive(Debug)]
pub struct TransactionBuilder {
    date: NaiveDate,
    flag: Flag,
    payee: Option<String>,
    narration: String,
    postings: Vec<Posting>,
}

impl TransactionBuilder {
    pub fn flag(mut self, flag: Flag) -> Self {
        self.flag = flag;
        self
    }

    pub fn payee(mut self, payee: &str) -> Self {
        self.payee = Some(payee.to_string());
        self
    }

    pub fn posting(mut self, posting: Posting) -> Self {
        self.postings.push(posting);
        self
    }

    /// Validates and returns the transaction.
    ///
    /// - at least two postings
    /// - at most one elided posting
    /// - without an elided posting, weights sum to zero per commodity
    pub fn build(self) -> ResultEngine<Transaction> {
        let label = format!("{} {}", self.date, self.narration);
        if self.postings.len() < 2 {
            return Err(EngineError::Unbalanced(format!(
                "{label}: at least two postings are required"
            )));
        }

        let elided = self.postings.iter().filter(|p| p.amount.is_none()).count();
        if elided > 1 {
            return Err(EngineError::Unbalanced(format!(
                "{label}: only one posting may omit its amount"
            )));
        }

        if elided == 0 {
            let mut totals: BTreeMap<&Commodity, MoneyCents> = BTreeMap::new();
            for posting in &self.postings {
                let (weight, commodity) = posting.weight().ok_or_else(|| {
                    EngineError::InvalidAmount(format!("{label}: posting weight overflows"))
                })?;
                let total = totals.entry(commodity).or_default();
                *total = total.checked_add(weight).ok_or_else(|| {
                    EngineError::InvalidAmount(format!("{label}: total overflows"))
                })?;
            }
            if let Some((commodity, residual)) = totals.iter().find(|(_, total)| !total.is_zero()) {
                return Err(EngineError::Unbalanced(format!(
                    "{label}: residual {residual} {commodity}"
                )));
            }
        }

        Ok(Transaction {
            date: self.date,
            flag: self.flag,
            payee: self.payee,
            narration: self.narration,
            postings: self.postings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Account, Cost};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()
    }

    fn gbp() -> Commodity {
        Commodity::try_from("GBP").unwrap()
    }

    fn account(name: &str) -> Account {
        Account::try_from(name).unwrap()
    }

    #[test]
    fn balanced_pair_renders_as_block() {
        let tx = Transaction::balanced(
            date(),
            "Landlord",
            "Rent",
            Posting::cash(account("Expenses:Housing:Rent"), MoneyCents::new(120_000), gbp()),
            Posting::cash(
                account("Assets:Lalit:UK:HSBC:Current:GBP"),
                MoneyCents::new(-120_000),
                gbp(),
            ),
        )
        .unwrap();

        let text = tx.to_string();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("2022-01-01 * \"Landlord\" \"Rent\""));
        assert!(lines.next().unwrap().trim_end().ends_with("1200.00 GBP"));
        assert!(lines.next().unwrap().trim_end().ends_with("-1200.00 GBP"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn rejects_residual() {
        let err = Transaction::balanced(
            date(),
            "Tesco",
            "Groceries",
            Posting::cash(account("Expenses:Food:Groceries"), MoneyCents::new(100), gbp()),
            Posting::cash(account("Liabilities:Lalit:UK:Amex:GBP"), MoneyCents::new(-99), gbp()),
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::Unbalanced("2022-01-01 Groceries: residual 0.01 GBP".to_string())
        );
    }

    #[test]
    fn cost_leg_balances_against_cash() {
        let tx = Transaction::balanced(
            date(),
            "Vanguard",
            "ISA Buy VWRL",
            Posting::at_cost(
                account("Assets:Lalit:UK:Vanguard:ISA:VWRL"),
                11,
                Commodity::try_from("VWRL").unwrap(),
                Cost {
                    per_unit: MoneyCents::new(8_412),
                    commodity: gbp(),
                },
            ),
            Posting::cash(
                account("Assets:Lalit:UK:Vanguard:ISA:GBP"),
                MoneyCents::new(-92_532),
                gbp(),
            ),
        );
        assert!(tx.is_ok());
    }

    #[test]
    fn one_elided_posting_is_inferred() {
        let tx = Transaction::builder(date(), "Opening Balance")
            .posting(Posting::cash(
                account("Assets:Lalit:UK:HSBC:Current:GBP"),
                MoneyCents::new(500_000),
                gbp(),
            ))
            .posting(Posting::elided(account("Equity:Opening-Balances")))
            .build()
            .unwrap();
        assert_eq!(tx.payee, None);
        assert!(tx.to_string().starts_with("2022-01-01 * \"Opening Balance\"\n"));
    }

    #[test]
    fn rejects_two_elided_or_single_posting() {
        let two_elided = Transaction::builder(date(), "x")
            .posting(Posting::elided(account("Equity:Opening-Balances")))
            .posting(Posting::elided(account("Assets:Cash")))
            .build();
        assert!(matches!(two_elided, Err(EngineError::Unbalanced(_))));

        let single = Transaction::builder(date(), "x")
            .posting(Posting::elided(account("Assets:Cash")))
            .build();
        assert!(matches!(single, Err(EngineError::Unbalanced(_))));
    }

    #[test]
    fn quotes_are_escaped() {
        let tx = Transaction::balanced(
            date(),
            "Nando's",
            "Dinner \"late\"",
            Posting::cash(account("Expenses:Food:Restaurant"), MoneyCents::new(1), gbp()),
            Posting::cash(account("Liabilities:Lalit:UK:Amex:GBP"), MoneyCents::new(-1), gbp()),
        )
        .unwrap();
        assert!(tx
            .to_string()
            .starts_with("2022-01-01 * \"Nando's\" \"Dinner \\\"late\\\"\""));
    }
}
