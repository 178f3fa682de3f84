//! Day-by-day event generation.
//!
//! The generator walks every calendar day of the profile's range in order and
//! appends the transactions that happen on that day:
//!
//! - on the 1st: salary, rent, the stock vest pair and the ISA then GIA
//!   transfer/buy pairs;
//! - every day: a groceries trial, then a restaurant trial, both charged to
//!   the credit card;
//! - on the 25th: a fixed card payment from the current account.
//!
//! Prices for the fund and the stock are resolved every day (fund first), so
//! the carry-forward state follows daily observations even on days with no
//! purchase.
//!
//! # Random stream
//!
//! One `ChaCha8Rng` is seeded from the profile seed at the start of the run.
//! Per day the draws are, in order: groceries trigger, groceries amount (only
//! when triggered), restaurant trigger, restaurant amount (only when
//! triggered). Changing this order changes every later amount.

use chrono::{Datelike, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    Account, Chart, Commodity, Cost, EngineError, MoneyCents, Posting, PriceSeries, Profile,
    ResolverState, ResultEngine, Transaction, profile::Discretionary,
};

pub const PAYDAY: u32 = 1;
pub const CARD_PAYMENT_DAY: u32 = 25;

pub struct Generator<'a> {
    profile: &'a Profile,
    chart: &'a Chart,
    prices: &'a PriceSeries,
    resolver: ResolverState,
    rng: ChaCha8Rng,
}

impl<'a> Generator<'a> {
    pub fn new(profile: &'a Profile, chart: &'a Chart, prices: &'a PriceSeries) -> Self {
        Self {
            profile,
            chart,
            prices,
            resolver: ResolverState::new(profile.pricing.seed_map(), profile.pricing.fallback),
            rng: ChaCha8Rng::seed_from_u64(profile.seed),
        }
    }

    /// Consumes the generator and returns every transaction in date order.
    pub fn run(mut self) -> ResultEngine<Vec<Transaction>> {
        let end = self.profile.end_date;
        let mut transactions = Vec::new();
        for date in self.profile.start_date.iter_days().take_while(|d| *d <= end) {
            self.day(date, &mut transactions)?;
        }
        Ok(transactions)
    }

    fn day(&mut self, date: NaiveDate, out: &mut Vec<Transaction>) -> ResultEngine<()> {
        let profile = self.profile;
        let fund_price = self.price(date, &profile.fund.symbol);
        let stock_price = self.price(date, &profile.stock.symbol);

        if date.day() == PAYDAY {
            self.payday(date, fund_price, stock_price, out)?;
        }

        if let Some(amount) = self.draw(&profile.groceries) {
            out.push(self.card_charge(date, "Tesco", "Groceries", &self.chart.groceries, amount)?);
        }
        if let Some(amount) = self.draw(&profile.restaurant) {
            out.push(self.card_charge(date, "Nando's", "Dinner", &self.chart.restaurant, amount)?);
        }

        if date.day() == CARD_PAYMENT_DAY {
            out.push(transfer(
                date,
                "Amex",
                "Payment",
                &self.chart.card,
                &self.chart.current,
                profile.card_payment,
                &profile.currency,
            )?);
        }
        Ok(())
    }

    /// Resolved price rounded to the cent, as used for cost basis.
    fn price(&mut self, date: NaiveDate, symbol: &Commodity) -> MoneyCents {
        MoneyCents::from_major(self.resolver.resolve(self.prices, date, symbol.code()))
    }

    fn payday(
        &self,
        date: NaiveDate,
        fund_price: MoneyCents,
        stock_price: MoneyCents,
        out: &mut Vec<Transaction>,
    ) -> ResultEngine<()> {
        let profile = self.profile;
        let chart = self.chart;
        let cash = &profile.currency;

        out.push(transfer(
            date,
            "Google",
            "Salary",
            &chart.current,
            &chart.salary,
            profile.salary,
            cash,
        )?);
        out.push(transfer(
            date,
            "Landlord",
            "Rent",
            &chart.rent,
            &chart.current,
            profile.rent,
            cash,
        )?);

        // Vest: recognise the income in the stock's currency, then buy at cost.
        let stock = &profile.stock;
        let vest = Lot::budgeted(stock.monthly_amount, stock_price)?;
        out.push(transfer(
            date,
            "Google",
            "RSU Vest",
            &chart.brokerage_cash,
            &chart.stock_vest,
            vest.total,
            &stock.currency,
        )?);
        out.push(vest.purchase(
            date,
            "Schwab",
            &format!("Buy {}", stock.symbol),
            &chart.brokerage_stock,
            &chart.brokerage_cash,
            &stock.symbol,
            &stock.currency,
        )?);

        let fund = &profile.fund;
        let accounts = [
            ("ISA", fund.isa_amount, &chart.isa_cash, &chart.isa_fund),
            ("GIA", fund.gia_amount, &chart.gia_cash, &chart.gia_fund),
        ];
        for (wrapper, budget, cash_account, holding) in accounts {
            let lot = Lot::budgeted(budget, fund_price)?;
            out.push(transfer(
                date,
                "Vanguard",
                &format!("{wrapper} Transfer"),
                cash_account,
                &chart.current,
                lot.total,
                cash,
            )?);
            out.push(lot.purchase(
                date,
                "Vanguard",
                &format!("{wrapper} Buy {}", fund.symbol),
                holding,
                cash_account,
                &fund.symbol,
                cash,
            )?);
        }
        Ok(())
    }

    /// One Bernoulli trial; the amount is only drawn when it succeeds.
    fn draw(&mut self, event: &Discretionary) -> Option<MoneyCents> {
        if self.rng.r#gen::<f64>() < event.probability {
            let cents = self.rng.gen_range(event.min.cents()..=event.max.cents());
            Some(MoneyCents::new(cents))
        } else {
            None
        }
    }

    fn card_charge(
        &self,
        date: NaiveDate,
        payee: &str,
        narration: &str,
        expense: &Account,
        amount: MoneyCents,
    ) -> ResultEngine<Transaction> {
        transfer(
            date,
            payee,
            narration,
            expense,
            &self.chart.card,
            amount,
            &self.profile.currency,
        )
    }
}

/// Whole units bought with a budget at a given unit price.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Lot {
    units: i64,
    price: MoneyCents,
    total: MoneyCents,
}

impl Lot {
    fn budgeted(budget: MoneyCents, price: MoneyCents) -> ResultEngine<Self> {
        let units = budget.whole_units_at(price);
        let total = price
            .checked_times(units)
            .ok_or_else(|| EngineError::InvalidAmount(format!("{units} × {price} overflows")))?;
        Ok(Self {
            units,
            price,
            total,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn purchase(
        &self,
        date: NaiveDate,
        payee: &str,
        narration: &str,
        holding: &Account,
        cash_account: &Account,
        symbol: &Commodity,
        currency: &Commodity,
    ) -> ResultEngine<Transaction> {
        Transaction::balanced(
            date,
            payee,
            narration,
            Posting::at_cost(
                holding.clone(),
                self.units,
                symbol.clone(),
                Cost {
                    per_unit: self.price,
                    commodity: currency.clone(),
                },
            ),
            Posting::cash(cash_account.clone(), -self.total, currency.clone()),
        )
    }
}

/// Moves `amount` from `from` to `to`: `to` is debited, `from` credited.
fn transfer(
    date: NaiveDate,
    payee: &str,
    narration: &str,
    to: &Account,
    from: &Account,
    amount: MoneyCents,
    commodity: &Commodity,
) -> ResultEngine<Transaction> {
    Transaction::balanced(
        date,
        payee,
        narration,
        Posting::cash(to.clone(), amount, commodity.clone()),
        Posting::cash(from.clone(), -amount, commodity.clone()),
    )
}

/// Validates the profile and generates its transactions.
pub fn generate(profile: &Profile, prices: &PriceSeries) -> ResultEngine<Vec<Transaction>> {
    profile.validate()?;
    let chart = Chart::for_profile(profile)?;
    Generator::new(profile, &chart, prices).run()
}
