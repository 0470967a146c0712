//! Exchange rate abstractions

use crate::core::error::FetchError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawCurrencyPair")]
pub struct CurrencyPair {
    pub from: String,
    pub to: String,
}

/// Pair as written in config files; normalized through [`CurrencyPair::new`].
#[derive(Deserialize)]
struct RawCurrencyPair {
    from: String,
    to: String,
}

impl From<RawCurrencyPair> for CurrencyPair {
    fn from(raw: RawCurrencyPair) -> Self {
        CurrencyPair::new(&raw.from, &raw.to)
    }
}

impl CurrencyPair {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.trim().to_uppercase(),
            to: to.trim().to_uppercase(),
        }
    }

    /// Yahoo Finance ticker for the pair, e.g. `USDRUB=X`.
    pub fn yahoo_symbol(&self) -> String {
        format!("{}{}=X", self.from, self.to)
    }
}

impl Default for CurrencyPair {
    fn default() -> Self {
        Self::new("USD", "RUB")
    }
}

impl Display for CurrencyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.from, self.to)
    }
}

/// Parses an exact decimal rate. Accepts plain (`64.25`) and scientific
/// (`6.425e1`) notation; surrounding whitespace is ignored.
pub fn parse_rate(input: &str) -> Result<Decimal, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("value is empty".to_string());
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|e| e.to_string())
}

/// Source of the current exchange rate polled by the watcher.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rate(&self) -> Result<Decimal, FetchError>;
}
