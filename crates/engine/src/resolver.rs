//! Carry-forward price resolution.
//!
//! [`ResolverState`] remembers the last price seen for each symbol during one
//! generation run. Resolution order for `(date, symbol)`:
//!
//! 1. an observation on exactly `date` (which also becomes the last known
//!    price)
//! 2. the last known price
//! 3. the configured seed price for the symbol
//! 4. the fallback price
//!
//! Dates must be resolved in non-decreasing order for step 2 to mean "the most
//! recent observation at or before `date`".

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::PriceSeries;

/// Default last-resort price when neither history nor a seed exists.
pub const FALLBACK_PRICE: f64 = 100.0;

#[derive(Clone, Debug)]
pub struct ResolverState {
    last_known: BTreeMap<String, f64>,
    seeds: BTreeMap<String, f64>,
    fallback: f64,
    last_date: Option<NaiveDate>,
}

impl Default for ResolverState {
    fn default() -> Self {
        Self::new(BTreeMap::new(), FALLBACK_PRICE)
    }
}

impl ResolverState {
    pub fn new(seeds: BTreeMap<String, f64>, fallback: f64) -> Self {
        Self {
            last_known: BTreeMap::new(),
            seeds,
            fallback,
            last_date: None,
        }
    }

    /// Last price observed for `symbol` so far, if any.
    #[must_use]
    pub fn last_known(&self, symbol: &str) -> Option<f64> {
        self.last_known.get(symbol).copied()
    }

    /// Resolves the price of `symbol` on `date`, updating the carry-forward
    /// state.
    pub fn resolve(&mut self, series: &PriceSeries, date: NaiveDate, symbol: &str) -> f64 {
        if let Some(previous) = self.last_date
            && date < previous
        {
            tracing::warn!("resolving {symbol} for {date} after {previous}: carry-forward may be stale");
        }
        self.last_date = Some(date);

        if let Some(price) = series.get(date, symbol) {
            self.last_known.insert(symbol.to_string(), price);
            return price;
        }
        if let Some(price) = self.last_known(symbol) {
            return price;
        }
        if let Some(price) = self.seeds.get(symbol) {
            return *price;
        }
        tracing::warn!("no price for {symbol} on {date}, using fallback {}", self.fallback);
        self.fallback
    }
}

/// Free-function form of [`ResolverState::resolve`].
pub fn resolve(
    series: &PriceSeries,
    state: &mut ResolverState,
    date: NaiveDate,
    symbol: &str,
) -> f64 {
    state.resolve(series, date, symbol)
}
