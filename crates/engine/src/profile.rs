//! Generation profile: date range, seed and the financial constants driving
//! every generated event.
//!
//! All fields have defaults, so a partial configuration file only needs to
//! name what it changes.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    Commodity, EngineError, MoneyCents, ResultEngine, accounts::is_valid_segment,
    resolver::FALLBACK_PRICE,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub title: String,
    /// Account segment naming the person the ledger belongs to.
    pub owner: String,
    pub start_date: NaiveDate,
    /// Inclusive.
    pub end_date: NaiveDate,
    /// Date of every `open` and `commodity` directive.
    pub open_date: NaiveDate,
    pub seed: u64,
    /// Operating currency.
    pub currency: Commodity,
    pub opening_balance: MoneyCents,
    pub salary: MoneyCents,
    pub rent: MoneyCents,
    pub stock: StockPlan,
    pub fund: FundPlan,
    /// Fixed monthly card payment. Not derived from the card balance.
    pub card_payment: MoneyCents,
    #[serde(deserialize_with = "groceries_patch")]
    pub groceries: Discretionary,
    #[serde(deserialize_with = "restaurant_patch")]
    pub restaurant: Discretionary,
    pub pricing: Pricing,
}

/// Monthly equity vest, bought back at cost in the equity's currency.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockPlan {
    pub symbol: Commodity,
    pub name: String,
    pub currency: Commodity,
    pub monthly_amount: MoneyCents,
}

/// Index fund bought monthly in two accounts, priced in the operating currency.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundPlan {
    pub symbol: Commodity,
    pub name: String,
    pub isa_amount: MoneyCents,
    pub gia_amount: MoneyCents,
}

/// Daily Bernoulli trial with an amount drawn uniformly from `min..=max`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Discretionary {
    pub probability: f64,
    pub min: MoneyCents,
    pub max: MoneyCents,
}

impl Discretionary {
    pub fn groceries() -> Self {
        Self {
            probability: 0.15,
            min: MoneyCents::new(3_000),
            max: MoneyCents::new(12_000),
        }
    }

    pub fn restaurant() -> Self {
        Self {
            probability: 0.08,
            min: MoneyCents::new(2_000),
            max: MoneyCents::new(8_000),
        }
    }
}

/// Partial `Discretionary` table: missing keys keep the event's defaults.
#[derive(Deserialize)]
struct DiscretionaryPatch {
    probability: Option<f64>,
    min: Option<MoneyCents>,
    max: Option<MoneyCents>,
}

impl DiscretionaryPatch {
    fn apply(self, base: Discretionary) -> Discretionary {
        Discretionary {
            probability: self.probability.unwrap_or(base.probability),
            min: self.min.unwrap_or(base.min),
            max: self.max.unwrap_or(base.max),
        }
    }
}

fn groceries_patch<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Discretionary, D::Error> {
    DiscretionaryPatch::deserialize(deserializer)
        .map(|patch| patch.apply(Discretionary::groceries()))
}

fn restaurant_patch<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Discretionary, D::Error> {
    DiscretionaryPatch::deserialize(deserializer)
        .map(|patch| patch.apply(Discretionary::restaurant()))
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pricing {
    /// Approximate prices used before a symbol's first observation.
    pub seeds: BTreeMap<Commodity, f64>,
    pub fallback: f64,
    /// Path written in the trailing `include` directive. Derived from the
    /// price file location when unset.
    pub include: Option<String>,
}

fn symbol(code: &str) -> Commodity {
    Commodity::known(code)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            title: "Demo Financials".to_string(),
            owner: "Lalit".to_string(),
            start_date: date(2022, 1, 1),
            end_date: date(2024, 4, 1),
            open_date: date(2020, 1, 1),
            seed: 42,
            currency: symbol("GBP"),
            opening_balance: MoneyCents::new(500_000),
            salary: MoneyCents::new(350_000),
            rent: MoneyCents::new(120_000),
            stock: StockPlan::default(),
            fund: FundPlan::default(),
            card_payment: MoneyCents::new(50_000),
            groceries: Discretionary::groceries(),
            restaurant: Discretionary::restaurant(),
            pricing: Pricing::default(),
        }
    }
}

impl Default for StockPlan {
    fn default() -> Self {
        Self {
            symbol: symbol("GOOG"),
            name: "Alphabet Inc Class C".to_string(),
            currency: symbol("USD"),
            monthly_amount: MoneyCents::new(30_000),
        }
    }
}

impl Default for FundPlan {
    fn default() -> Self {
        Self {
            symbol: symbol("VWRL"),
            name: "Vanguard FTSE All-World UCITS ETF".to_string(),
            isa_amount: MoneyCents::new(100_000),
            gia_amount: MoneyCents::new(80_000),
        }
    }
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            seeds: BTreeMap::from([
                (symbol("GOOG"), 136.0),
                (symbol("VWRL"), 84.0),
                (symbol("USD"), 0.74),
            ]),
            fallback: FALLBACK_PRICE,
            include: None,
        }
    }
}

impl Pricing {
    /// Seed prices keyed by symbol code, as consumed by the resolver.
    #[must_use]
    pub fn seed_map(&self) -> BTreeMap<String, f64> {
        self.seeds
            .iter()
            .map(|(symbol, price)| (symbol.code().to_string(), *price))
            .collect()
    }
}

impl Profile {
    /// Date of the opening-balance transaction: the day before the first
    /// generated day.
    #[must_use]
    pub fn opening_date(&self) -> NaiveDate {
        self.start_date
            .checked_sub_days(Days::new(1))
            .unwrap_or(self.start_date)
    }

    /// Rejects configurations that would produce an empty or invalid ledger.
    pub fn validate(&self) -> ResultEngine<()> {
        let invalid = |msg: String| Err(EngineError::InvalidConfig(msg));

        if self.end_date < self.start_date {
            return invalid(format!(
                "end date {} is before start date {}",
                self.end_date, self.start_date
            ));
        }
        if self.open_date > self.opening_date() {
            return invalid(format!(
                "open date {} must not be after {}",
                self.open_date,
                self.opening_date()
            ));
        }
        if !is_valid_segment(&self.owner) {
            return invalid(format!("owner {:?} is not a valid account segment", self.owner));
        }

        let traded = [&self.stock.symbol, &self.fund.symbol];
        let cash = [&self.currency, &self.stock.currency];
        if traded[0] == traded[1] {
            return invalid(format!("stock and fund share the symbol {}", traded[0]));
        }
        if let Some(symbol) = traded.into_iter().find(|symbol| cash.contains(symbol)) {
            return invalid(format!("{symbol} is both a traded symbol and a cash currency"));
        }

        let fixed = [
            ("opening_balance", self.opening_balance),
            ("salary", self.salary),
            ("rent", self.rent),
            ("stock.monthly_amount", self.stock.monthly_amount),
            ("fund.isa_amount", self.fund.isa_amount),
            ("fund.gia_amount", self.fund.gia_amount),
            ("card_payment", self.card_payment),
        ];
        for (name, amount) in fixed {
            if amount.is_negative() {
                return invalid(format!("{name} must be >= 0, got {amount}"));
            }
        }

        for (name, event) in [("groceries", &self.groceries), ("restaurant", &self.restaurant)] {
            if !(0.0..=1.0).contains(&event.probability) {
                return invalid(format!(
                    "{name}.probability must be within [0, 1], got {}",
                    event.probability
                ));
            }
            if event.min.is_negative() || event.min > event.max {
                return invalid(format!(
                    "{name} range {}..={} is invalid",
                    event.min, event.max
                ));
            }
        }

        if !(self.pricing.fallback.is_finite() && self.pricing.fallback > 0.0) {
            return invalid(format!(
                "pricing.fallback must be > 0, got {}",
                self.pricing.fallback
            ));
        }
        if let Some((name, price)) = self
            .pricing
            .seeds
            .iter()
            .find(|(_, price)| !(price.is_finite() && **price > 0.0))
        {
            return invalid(format!("seed price for {name} must be > 0, got {price}"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let profile = Profile::default();
        assert_eq!(profile.validate(), Ok(()));
        assert_eq!(profile.opening_date(), date(2021, 12, 31));
    }

    #[test]
    fn rejects_inverted_range() {
        let profile = Profile {
            start_date: date(2022, 2, 1),
            end_date: date(2022, 1, 31),
            ..Profile::default()
        };
        assert!(matches!(profile.validate(), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn single_day_range_is_valid() {
        let profile = Profile {
            start_date: date(2022, 1, 1),
            end_date: date(2022, 1, 1),
            ..Profile::default()
        };
        assert_eq!(profile.validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_probability_and_amounts() {
        let mut profile = Profile::default();
        profile.groceries.probability = 1.5;
        assert!(profile.validate().is_err());

        let mut profile = Profile::default();
        profile.restaurant.min = MoneyCents::new(9_000);
        assert!(profile.validate().is_err());

        let profile = Profile {
            rent: MoneyCents::new(-1),
            ..Profile::default()
        };
        assert!(profile.validate().is_err());
    }

    #[test]
    fn rejects_open_date_after_opening_balance() {
        let profile = Profile {
            open_date: date(2022, 1, 1),
            ..Profile::default()
        };
        assert!(profile.validate().is_err());
    }

    #[test]
    fn rejects_traded_symbol_reused_as_currency() {
        let mut profile = Profile::default();
        profile.fund.symbol = symbol("GBP");
        assert!(matches!(profile.validate(), Err(EngineError::InvalidConfig(_))));

        let mut profile = Profile::default();
        profile.stock.symbol = symbol("VWRL");
        assert!(matches!(profile.validate(), Err(EngineError::InvalidConfig(_))));

        let mut profile = Profile::default();
        profile.stock.currency = symbol("GOOG");
        assert!(profile.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_prices() {
        let mut profile = Profile::default();
        profile.pricing.fallback = 0.0;
        assert!(profile.validate().is_err());

        let mut profile = Profile::default();
        profile.pricing.seeds.insert(symbol("GOOG"), -1.0);
        assert!(profile.validate().is_err());
    }
}
