//! Price time series loaded from a ledger price file.
//!
//! Each meaningful line has the shape
//!
//! ```text
//! 2022-01-03 price VWRL 84.12 GBP
//! ```
//!
//! Blank lines and lines starting with `;` are comments. Any other line that
//! does not parse as a price observation is skipped, never reported as an
//! error: the file may carry unrelated directives.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use chrono::NaiveDate;

use crate::{EngineError, ResultEngine};

const COMMENT_MARKER: char = ';';
const PRICE_KEYWORD: &str = "price";

/// Observed prices keyed by date, then by symbol.
///
/// Read-only once loaded. Later observations for the same date and symbol
/// replace earlier ones.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PriceSeries {
    observations: BTreeMap<NaiveDate, BTreeMap<String, f64>>,
}

impl PriceSeries {
    /// Loads a price file from disk. Fails only if the file cannot be opened
    /// or read.
    pub fn load(path: &Path) -> ResultEngine<Self> {
        let file = File::open(path).map_err(|err| EngineError::io(path, err))?;
        let series = Self::from_reader(BufReader::new(file))
            .map_err(|err| EngineError::io(path, err))?;
        tracing::info!(
            "Loaded prices for {} dates from {}",
            series.len(),
            path.display()
        );
        Ok(series)
    }

    /// Parses price lines from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R) -> std::io::Result<Self> {
        let mut series = Self::default();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with(COMMENT_MARKER) {
                continue;
            }
            match parse_price_line(trimmed) {
                Some((date, symbol, value)) => series.insert(date, symbol, value),
                None => tracing::debug!("skipping non-price line {}: {trimmed}", index + 1),
            }
        }
        Ok(series)
    }

    pub fn insert(&mut self, date: NaiveDate, symbol: &str, value: f64) {
        self.observations
            .entry(date)
            .or_default()
            .insert(symbol.to_string(), value);
    }

    /// Price of `symbol` observed exactly on `date`.
    #[must_use]
    pub fn get(&self, date: NaiveDate, symbol: &str) -> Option<f64> {
        self.observations.get(&date)?.get(symbol).copied()
    }

    /// Number of distinct dates with at least one observation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

impl std::str::FromStr for PriceSeries {
    type Err = std::io::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_reader(s.as_bytes())
    }
}

/// `<date> price <symbol> <value> <currency>`; extra trailing tokens are
/// tolerated. Non-positive values are not prices and are skipped.
fn parse_price_line(line: &str) -> Option<(NaiveDate, &str, f64)> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 5 || tokens[1] != PRICE_KEYWORD {
        return None;
    }
    let date = NaiveDate::parse_from_str(tokens[0], "%Y-%m-%d").ok()?;
    let value: f64 = tokens[3].parse().ok()?;
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    Some((date, tokens[2], value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_observations_and_skips_noise() {
        let text = "\
; prices fetched for the demo
2022-01-03 price VWRL 84.12 GBP

2022-01-03 price GOOG 145.07 USD
2022-01-04 price GOOG 144.42 USD ; trailing comment
2022-01-04 open Assets:Cash GBP
2022-01-05 price VWRL
garbage
2022-13-01 price VWRL 1.0 GBP
2022-01-06 price VWRL abc GBP
";
        let series: PriceSeries = text.parse().unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.get(date(2022, 1, 3), "VWRL"), Some(84.12));
        assert_eq!(series.get(date(2022, 1, 3), "GOOG"), Some(145.07));
        assert_eq!(series.get(date(2022, 1, 4), "GOOG"), Some(144.42));
        assert_eq!(series.get(date(2022, 1, 4), "VWRL"), None);
        assert_eq!(series.get(date(2022, 1, 6), "VWRL"), None);
    }

    #[test]
    fn unsorted_input_is_accepted() {
        let series: PriceSeries = "2022-02-01 price VWRL 80 GBP\n2022-01-01 price VWRL 90 GBP\n"
            .parse()
            .unwrap();
        assert_eq!(series.get(date(2022, 1, 1), "VWRL"), Some(90.0));
        assert_eq!(series.get(date(2022, 2, 1), "VWRL"), Some(80.0));
    }

    #[test]
    fn non_positive_prices_are_skipped() {
        let series: PriceSeries = "\
2022-01-03 price VWRL -84.12 GBP
2022-01-04 price VWRL 0 GBP
2022-01-05 price VWRL 85.00 GBP
"
        .parse()
        .unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.get(date(2022, 1, 3), "VWRL"), None);
        assert_eq!(series.get(date(2022, 1, 4), "VWRL"), None);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = PriceSeries::load(Path::new("/nonexistent/prices.beancount")).unwrap_err();
        assert!(matches!(err, EngineError::Io { .. }));
    }
}
