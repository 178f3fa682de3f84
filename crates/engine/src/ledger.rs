//! Ledger document and emitter.
//!
//! A [`Ledger`] is the full output document: the [`Header`] (options, plugin,
//! extensions, commodities, account openings and the opening balance), the
//! generated transactions in date order and a trailing `include` of the price
//! file so downstream tools resolve historical prices themselves.

use std::{
    collections::HashMap,
    fmt, fs,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;

use crate::{
    Account, Chart, Commodity, EngineError, Posting, Profile, ResultEngine, Transaction,
    transactions::quoted,
};

/// File name of the generated journal inside the output directory.
pub const JOURNAL_FILE: &str = "journal.beancount";

const AUTO_ACCOUNTS_PLUGIN: &str = "beancount.plugins.auto_accounts";
const PORTFOLIO_RETURNS_CONFIG: &str = "{\n  'beangrow_config': 'beangrow.pbtxt',\n}";

/// `custom "fava-extension"` directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extension {
    pub name: String,
    pub config: Option<String>,
}

/// `commodity` directive with an optional `name:` metadata line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommodityDecl {
    pub symbol: Commodity,
    pub name: Option<String>,
}

/// `open` directive restricting an account to a single unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Open {
    pub account: Account,
    pub commodity: Commodity,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub title: String,
    pub operating_currency: Commodity,
    pub plugins: Vec<String>,
    pub extensions: Vec<Extension>,
    /// Date of every extension, commodity and open directive.
    pub declared_on: NaiveDate,
    pub commodities: Vec<CommodityDecl>,
    pub opens: Vec<Open>,
    pub opening_balance: Transaction,
}

impl Header {
    pub fn for_profile(profile: &Profile, chart: &Chart) -> ResultEngine<Self> {
        let opening_balance = Transaction::builder(profile.opening_date(), "Opening Balance")
            .posting(Posting::cash(
                chart.current.clone(),
                profile.opening_balance,
                profile.currency.clone(),
            ))
            .posting(Posting::elided(chart.opening_balances.clone()))
            .build()?;

        let mut commodities = vec![
            CommodityDecl {
                symbol: profile.stock.symbol.clone(),
                name: Some(profile.stock.name.clone()),
            },
            CommodityDecl {
                symbol: profile.fund.symbol.clone(),
                name: Some(profile.fund.name.clone()),
            },
            CommodityDecl {
                symbol: profile.stock.currency.clone(),
                name: None,
            },
        ];
        if profile.currency != profile.stock.currency {
            commodities.push(CommodityDecl {
                symbol: profile.currency.clone(),
                name: None,
            });
        }

        Ok(Self {
            title: profile.title.clone(),
            operating_currency: profile.currency.clone(),
            plugins: vec![AUTO_ACCOUNTS_PLUGIN.to_string()],
            extensions: vec![
                Extension {
                    name: "fava_dashboards".to_string(),
                    config: None,
                },
                Extension {
                    name: "fava_portfolio_returns".to_string(),
                    config: Some(PORTFOLIO_RETURNS_CONFIG.to_string()),
                },
            ],
            declared_on: profile.open_date,
            commodities,
            opens: chart
                .declarations()
                .iter()
                .map(|(account, commodity)| Open {
                    account: account.clone(),
                    commodity: commodity.clone(),
                })
                .collect(),
            opening_balance,
        })
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = self.declared_on.format("%Y-%m-%d");
        writeln!(f, "option \"title\" {}", quoted(&self.title))?;
        writeln!(
            f,
            "option \"operating_currency\" {}",
            quoted(self.operating_currency.code())
        )?;
        for plugin in &self.plugins {
            writeln!(f, "plugin {}", quoted(plugin))?;
        }

        if !self.extensions.is_empty() {
            writeln!(f, "\n; Fava extensions")?;
        }
        for extension in &self.extensions {
            write!(f, "{date} custom \"fava-extension\" {}", quoted(&extension.name))?;
            match &extension.config {
                // Config strings use single quotes, so they are written raw.
                Some(config) => writeln!(f, " \"{config}\"")?,
                None => writeln!(f)?,
            }
        }

        writeln!(f, "\n; Commodities")?;
        for commodity in &self.commodities {
            writeln!(f, "{date} commodity {}", commodity.symbol)?;
            if let Some(name) = &commodity.name {
                writeln!(f, "  name: {}", quoted(name))?;
            }
        }

        writeln!(f)?;
        for open in &self.opens {
            writeln!(f, "{date} open {:<42} {}", open.account, open.commodity)?;
        }

        writeln!(f, "\n; Initial Balance")?;
        writeln!(f, "{}", self.opening_balance)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ledger {
    pub header: Header,
    pub transactions: Vec<Transaction>,
    /// Path of the price file as written in the `include` directive.
    pub include: String,
}

impl Ledger {
    /// Checks what the generator is responsible for: every posting targets an
    /// account opened on or before its date, with the account's declared
    /// unit, and transactions are in non-decreasing date order.
    pub fn check(&self) -> ResultEngine<()> {
        let opens: HashMap<&Account, &Commodity> = self
            .header
            .opens
            .iter()
            .map(|open| (&open.account, &open.commodity))
            .collect();

        let mut previous: Option<NaiveDate> = None;
        for tx in std::iter::once(&self.header.opening_balance).chain(&self.transactions) {
            if let Some(previous) = previous
                && tx.date < previous
            {
                return Err(EngineError::InvalidDocument(format!(
                    "transaction on {} follows one on {previous}",
                    tx.date
                )));
            }
            previous = Some(tx.date);

            for posting in tx.postings() {
                let declared = opens
                    .get(&posting.account)
                    .ok_or_else(|| EngineError::UndeclaredAccount(posting.account.to_string()))?;
                if tx.date < self.header.declared_on {
                    return Err(EngineError::InvalidDocument(format!(
                        "{} is used on {} before it opens on {}",
                        posting.account, tx.date, self.header.declared_on
                    )));
                }
                if let Some(commodity) = posting.commodity()
                    && commodity != *declared
                {
                    return Err(EngineError::InvalidDocument(format!(
                        "{} holds {declared}, got {commodity}",
                        posting.account
                    )));
                }
            }
        }
        Ok(())
    }

    /// Checks the ledger and writes it as [`JOURNAL_FILE`] inside `dir`.
    pub fn write(&self, dir: &Path) -> ResultEngine<PathBuf> {
        self.check()?;
        let path = dir.join(JOURNAL_FILE);
        emit(&self.header, &self.transactions, &self.include, &path)?;
        Ok(path)
    }
}

impl fmt::Display for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_document(f, &self.header, &self.transactions, &self.include)
    }
}

fn write_document(
    f: &mut impl fmt::Write,
    header: &Header,
    transactions: &[Transaction],
    include: &str,
) -> fmt::Result {
    writeln!(f, "{header}")?;
    for tx in transactions {
        writeln!(f, "{tx}\n")?;
    }
    writeln!(f, "include {}", quoted(include))
}

/// Serializes the document to `path`, replacing any existing file.
///
/// The parent directory is created when missing. Content goes to a sibling
/// temporary file first and is renamed into place, so readers never see a
/// partial journal.
pub fn emit(
    header: &Header,
    transactions: &[Transaction],
    include: &str,
    path: &Path,
) -> ResultEngine<()> {
    let mut text = String::new();
    write_document(&mut text, header, transactions, include)
        .map_err(|_| EngineError::InvalidDocument("failed to render journal".to_string()))?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|err| EngineError::io(parent, err))?;
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| JOURNAL_FILE.to_string());
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));
    fs::write(&tmp, text).map_err(|err| EngineError::io(&tmp, err))?;
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(EngineError::io(path, err));
    }

    tracing::info!(
        "Generated {} transactions in {}",
        transactions.len(),
        path.display()
    );
    Ok(())
}

/// Path of `prices` as seen from a journal written in `output_dir`: relative
/// when the price file lives under the output directory, absolute otherwise.
pub fn include_path(prices: &Path, output_dir: &Path) -> String {
    if let Ok(relative) = prices.strip_prefix(output_dir) {
        return relative.to_string_lossy().into_owned();
    }
    std::path::absolute(prices)
        .unwrap_or_else(|_| prices.to_path_buf())
        .to_string_lossy()
        .into_owned()
}
