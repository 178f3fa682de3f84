//! Account names and the chart of accounts used by the generator.
//!
//! An [`Account`] is a hierarchical, colon-separated name rooted at one of the
//! five ledger account types (`Assets:UK:HSBC:Current:GBP`). The [`Chart`]
//! is the fixed set of accounts a generated ledger opens, each with the single
//! unit it is allowed to hold.

use crate::{Commodity, EngineError, ResultEngine, profile::Profile};

const ROOTS: [&str; 5] = ["Assets", "Liabilities", "Equity", "Income", "Expenses"];

/// Validated account name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Account(String);

impl Account {
    /// Builds an account from its segments, validating the result.
    pub fn from_segments<I, S>(segments: I) -> ResultEngine<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = segments
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(":");
        Self::try_from(joined.as_str())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Top-level account type (`Assets`, `Expenses`, ...).
    #[must_use]
    pub fn root(&self) -> &str {
        self.0.split(':').next().unwrap_or_default()
    }
}

impl core::fmt::Display for Account {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.pad(&self.0)
    }
}

impl TryFrom<&str> for Account {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut segments = value.split(':');
        let root = segments.next().unwrap_or_default();
        if !ROOTS.contains(&root) {
            return Err(EngineError::InvalidAccount(format!(
                "{value}: root must be one of {}",
                ROOTS.join(", ")
            )));
        }

        let mut depth = 0;
        for segment in segments {
            depth += 1;
            if !is_valid_segment(segment) {
                return Err(EngineError::InvalidAccount(format!(
                    "{value}: invalid segment {segment:?}"
                )));
            }
        }
        if depth == 0 {
            return Err(EngineError::InvalidAccount(format!(
                "{value}: at least one sub-account is required"
            )));
        }

        Ok(Self(value.to_string()))
    }
}

/// Checks a single non-root component: leading uppercase letter or digit,
/// then letters, digits or dashes.
pub(crate) fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() || c.is_ascii_digit() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// The accounts a generated ledger opens.
#[derive(Clone, Debug)]
pub struct Chart {
    pub current: Account,
    pub isa_fund: Account,
    pub isa_cash: Account,
    pub gia_fund: Account,
    pub gia_cash: Account,
    pub brokerage_stock: Account,
    pub brokerage_cash: Account,
    pub card: Account,
    pub salary: Account,
    pub stock_vest: Account,
    pub rent: Account,
    pub groceries: Account,
    pub restaurant: Account,
    pub transport: Account,
    pub opening_balances: Account,
    declarations: Vec<(Account, Commodity)>,
}

impl Chart {
    /// Derives account names from the profile's owner and symbols.
    pub fn for_profile(profile: &Profile) -> ResultEngine<Self> {
        let owner = profile.owner.as_str();
        let cash = &profile.currency;
        let stock = &profile.stock.symbol;
        let stock_cash = &profile.stock.currency;
        let fund = &profile.fund.symbol;

        let asset = |path: &[&str], unit: &Commodity| {
            let mut segments = vec!["Assets", owner];
            segments.extend_from_slice(path);
            segments.push(unit.code());
            Account::from_segments(segments)
        };

        let current = asset(&["UK", "HSBC", "Current"], cash)?;
        let isa_fund = asset(&["UK", "Vanguard", "ISA"], fund)?;
        let isa_cash = asset(&["UK", "Vanguard", "ISA"], cash)?;
        let gia_fund = asset(&["UK", "Vanguard", "GIA"], fund)?;
        let gia_cash = asset(&["UK", "Vanguard", "GIA"], cash)?;
        let brokerage_stock = asset(&["US", "Schwab", "Brokerage"], stock)?;
        let brokerage_cash = asset(&["US", "Schwab", "Brokerage"], stock_cash)?;
        let card = Account::from_segments(["Liabilities", owner, "UK", "Amex", cash.code()])?;
        let salary = Account::from_segments(["Income", owner, "UK", "Google", "Salary"])?;
        let stock_vest = Account::from_segments(["Income", owner, "UK", "Google", "Stock-Vest"])?;
        let rent = Account::try_from("Expenses:Housing:Rent")?;
        let groceries = Account::try_from("Expenses:Food:Groceries")?;
        let restaurant = Account::try_from("Expenses:Food:Restaurant")?;
        let transport = Account::try_from("Expenses:Transport:Tube")?;
        let opening_balances = Account::try_from("Equity:Opening-Balances")?;

        let declarations = vec![
            (current.clone(), cash.clone()),
            (isa_fund.clone(), fund.clone()),
            (isa_cash.clone(), cash.clone()),
            (gia_fund.clone(), fund.clone()),
            (gia_cash.clone(), cash.clone()),
            (brokerage_stock.clone(), stock.clone()),
            (brokerage_cash.clone(), stock_cash.clone()),
            (card.clone(), cash.clone()),
            (salary.clone(), cash.clone()),
            (stock_vest.clone(), stock_cash.clone()),
            (rent.clone(), cash.clone()),
            (groceries.clone(), cash.clone()),
            (restaurant.clone(), cash.clone()),
            (transport.clone(), cash.clone()),
            (opening_balances.clone(), cash.clone()),
        ];

        Ok(Self {
            current,
            isa_fund,
            isa_cash,
            gia_fund,
            gia_cash,
            brokerage_stock,
            brokerage_cash,
            card,
            salary,
            stock_vest,
            rent,
            groceries,
            restaurant,
            transport,
            opening_balances,
            declarations,
        })
    }

    /// Every account of the chart with its permitted unit, in declaration
    /// order.
    #[must_use]
    pub fn declarations(&self) -> &[(Account, Commodity)] {
        &self.declarations
    }
}
