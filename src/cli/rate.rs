use super::ui;
use crate::core::{CurrencyPair, RateSource};
use anyhow::{Context, Result};
use rust_decimal::Decimal;

/// Fetches and prints a single quote for `pair`.
pub async fn run(pair: &CurrencyPair, source: &dyn RateSource) -> Result<Decimal> {
    let rate = source
        .fetch_rate()
        .await
        .with_context(|| format!("Failed to fetch {pair} rate"))?;

    println!(
        "{}: {}",
        ui::style_text(&pair.to_string(), ui::StyleType::Label),
        ui::style_text(&rate.to_string(), ui::StyleType::Success)
    );
    Ok(rate)
}
