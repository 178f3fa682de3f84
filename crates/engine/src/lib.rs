//! Deterministic generator of a multi-year, double-entry personal ledger.
//!
//! The [`Engine`] ties the pieces together: a validated [`Profile`], the
//! [`Chart`] of accounts derived from it and a [`PriceSeries`] used to value
//! investment purchases. [`Engine::ledger`] walks the profile's date range and
//! returns a [`Ledger`] ready to be written.
//!
//! ```rust
//! use engine::{Engine, PriceSeries, Profile};
//!
//! let prices: PriceSeries = "2022-01-03 price VWRL 84.12 GBP\n".parse().unwrap();
//! let engine = Engine::builder()
//!     .profile(Profile::default())
//!     .prices(prices)
//!     .build()
//!     .unwrap();
//! let ledger = engine.ledger("prices.beancount").unwrap();
//! assert!(ledger.check().is_ok());
//! ```

pub use accounts::{Account, Chart};
pub use commodity::Commodity;
pub use error::EngineError;
pub use generator::{Generator, generate};
pub use ledger::{Header, JOURNAL_FILE, Ledger, emit, include_path};
pub use money::MoneyCents;
pub use postings::{Amount, Cost, Posting, Quantity};
pub use prices::PriceSeries;
pub use profile::{Discretionary, FundPlan, Pricing, Profile, StockPlan};
pub use resolver::{ResolverState, resolve};
pub use transactions::{Flag, Transaction, TransactionBuilder};

mod accounts;
mod commodity;
mod error;
mod generator;
mod ledger;
mod money;
mod postings;
mod prices;
mod profile;
mod resolver;
mod transactions;

type ResultEngine<T> = Result<T, EngineError>;

#[derive(Debug)]
pub struct Engine {
    profile: Profile,
    chart: Chart,
    prices: PriceSeries,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    /// Generates the transaction body. Each call starts from a fresh resolver
    /// state and random stream, so repeated calls return identical results.
    pub fn generate(&self) -> ResultEngine<Vec<Transaction>> {
        Generator::new(&self.profile, &self.chart, &self.prices).run()
    }

    /// Builds the full document: header, generated body and the `include`
    /// directive pointing at `include`.
    pub fn ledger(&self, include: &str) -> ResultEngine<Ledger> {
        let header = Header::for_profile(&self.profile, &self.chart)?;
        let transactions = self.generate()?;
        tracing::debug!(
            "generated {} transactions between {} and {}",
            transactions.len(),
            self.profile.start_date,
            self.profile.end_date
        );
        Ok(Ledger {
            header,
            transactions,
            include: include.to_string(),
        })
    }
}

/// The builder for `Engine`
#[derive(Debug, Default)]
pub struct EngineBuilder {
    profile: Option<Profile>,
    prices: PriceSeries,
}

impl EngineBuilder {
    /// Pass the generation profile. Defaults to [`Profile::default`].
    pub fn profile(mut self, profile: Profile) -> EngineBuilder {
        self.profile = Some(profile);
        self
    }

    /// Pass the price series. Defaults to an empty series, in which case
    /// every valuation uses the seed or fallback price.
    pub fn prices(mut self, prices: PriceSeries) -> EngineBuilder {
        self.prices = prices;
        self
    }

    /// Validates the profile and builds the `Engine`.
    pub fn build(self) -> ResultEngine<Engine> {
        let profile = self.profile.unwrap_or_default();
        profile.validate()?;
        let chart = Chart::for_profile(&profile)?;
        Ok(Engine {
            profile,
            chart,
            prices: self.prices,
        })
    }
}
