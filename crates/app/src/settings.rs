//! Settings for the generator.
//!
//! Sources, later ones winning: the TOML file (`config/ledgerseed.toml` unless
//! `--config` says otherwise, optional), `LEDGERSEED_*` environment variables
//! (`__` separates nested keys, e.g. `LEDGERSEED_PROFILE__SEED=7`) and
//! command-line flags.
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use engine::Profile;
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/ledgerseed.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    /// Directory receiving `journal.beancount`.
    pub output_dir: PathBuf,
    /// Price file read before generation and included by the journal.
    pub prices: PathBuf,
    pub profile: Profile,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app: App::default(),
            output_dir: PathBuf::from("demo"),
            prices: PathBuf::from("demo/prices.beancount"),
            profile: Profile::default(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "ledgerseed", disable_version_flag = true)]
#[command(about = "Generate a deterministic demo double-entry ledger")]
pub struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override the output directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Override the price file.
    #[arg(long)]
    prices: Option<PathBuf>,
    /// First generated day (YYYY-MM-DD).
    #[arg(long)]
    start: Option<NaiveDate>,
    /// Last generated day, inclusive (YYYY-MM-DD).
    #[arg(long)]
    end: Option<NaiveDate>,
    /// Random seed for discretionary spending.
    #[arg(long)]
    seed: Option<u64>,
    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    level: Option<String>,
}

pub fn load() -> Result<Settings> {
    from_args(Args::parse())
}

pub fn from_args(args: Args) -> Result<Settings> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(
        config::Environment::with_prefix("LEDGERSEED")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );
    let settings: Settings = builder.build()?.try_deserialize()?;

    Ok(apply_overrides(settings, args))
}

fn apply_overrides(mut settings: Settings, args: Args) -> Settings {
    if let Some(output_dir) = args.output_dir {
        settings.output_dir = output_dir;
    }
    if let Some(prices) = args.prices {
        settings.prices = prices;
    }
    if let Some(start) = args.start {
        settings.profile.start_date = start;
    }
    if let Some(end) = args.end {
        settings.profile.end_date = end;
    }
    if let Some(seed) = args.seed {
        settings.profile.seed = seed;
    }
    if let Some(level) = args.level {
        settings.app.level = level;
    }
    settings
}
