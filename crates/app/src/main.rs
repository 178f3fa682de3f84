use engine::{Engine, PriceSeries, include_path};

mod error;
mod settings;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ledgerseed={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    run(&settings)?;
    Ok(())
}

fn run(settings: &settings::Settings) -> error::Result<()> {
    // Fail on configuration before touching any file.
    settings.profile.validate()?;

    let prices = PriceSeries::load(&settings.prices)?;
    let engine = Engine::builder()
        .profile(settings.profile.clone())
        .prices(prices)
        .build()?;

    let include = settings
        .profile
        .pricing
        .include
        .clone()
        .unwrap_or_else(|| include_path(&settings.prices, &settings.output_dir));
    let ledger = engine.ledger(&include)?;
    let path = ledger.write(&settings.output_dir)?;

    tracing::info!(
        "Wrote {} ({} transactions, {} to {})",
        path.display(),
        ledger.transactions.len(),
        settings.profile.start_date,
        settings.profile.end_date
    );
    Ok(())
}
