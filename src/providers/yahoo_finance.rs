use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::util::with_retry;
use crate::core::config::YahooProviderConfig;
use crate::core::error::FetchError;
use crate::core::rate::{CurrencyPair, RateSource, parse_rate};

/// Quotes a currency pair from the Yahoo Finance chart API.
pub struct YahooRateSource {
    base_url: String,
    pair: CurrencyPair,
    retries: usize,
    retry_delay_ms: u64,
    client: reqwest::Client,
}

impl YahooRateSource {
    pub fn new(base_url: &str, pair: CurrencyPair) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent("ratewatch/1.0")
            .build()
            .map_err(|e| FetchError::Request {
                symbol: pair.yahoo_symbol(),
                detail: e.to_string(),
            })?;
        Ok(YahooRateSource {
            base_url: base_url.trim_end_matches('/').to_string(),
            pair,
            retries: 0,
            retry_delay_ms: 0,
            client,
        })
    }

    pub fn from_config(config: &YahooProviderConfig, pair: CurrencyPair) -> Result<Self, FetchError> {
        Ok(Self::new(&config.base_url, pair)?.with_retries(config.retries, config.retry_delay_ms))
    }

    pub fn with_retries(mut self, retries: usize, retry_delay_ms: u64) -> Self {
        self.retries = retries;
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    pub fn pair(&self) -> &CurrencyPair {
        &self.pair
    }

    async fn request(&self, url: &str, symbol: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Request {
                symbol: symbol.to_string(),
                detail: e.to_string(),
            })?;

        debug!(status = %response.status(), "Received Yahoo response");

        if !response.status().is_success() {
            return Err(FetchError::Http {
                symbol: symbol.to_string(),
                status: response.status().to_string(),
            });
        }

        response.text().await.map_err(|e| FetchError::Request {
            symbol: symbol.to_string(),
            detail: e.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct YahooCurrencyResponse {
    chart: CurrencyChartResult,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartResult {
    result: Vec<CurrencyChartItem>,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartItem {
    meta: CurrencyChartMeta,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartMeta {
    // Keeps the digits as sent (serde_json `arbitrary_precision`), so the
    // quote never passes through f64.
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: serde_json::Number,
}

fn extract_rate(symbol: &str, body: &str) -> Result<Decimal, FetchError> {
    let data: YahooCurrencyResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Parse {
            symbol: symbol.to_string(),
            detail: e.to_string(),
        })?;

    let item = data
        .chart
        .result
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::NoData {
            symbol: symbol.to_string(),
        })?;

    let raw = item.meta.regular_market_price.to_string();
    let rate = parse_rate(&raw).map_err(|_| FetchError::InvalidRate {
        symbol: symbol.to_string(),
        value: raw.clone(),
    })?;
    if rate <= Decimal::ZERO {
        return Err(FetchError::InvalidRate {
            symbol: symbol.to_string(),
            value: raw,
        });
    }
    Ok(rate)
}

#[async_trait]
impl RateSource for YahooRateSource {
    #[instrument(
        name = "YahooRateFetch",
        skip(self),
        fields(pair = %self.pair)
    )]
    async fn fetch_rate(&self) -> Result<Decimal, FetchError> {
        let symbol = self.pair.yahoo_symbol();
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        debug!("Requesting currency rate from {}", url);

        let body = with_retry(
            || self.request(&url, &symbol),
            self.retries,
            self.retry_delay_ms,
        )
        .await?;

        extract_rate(&symbol, &body)
    }
}
