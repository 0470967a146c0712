//! Typed errors raised by the rate watcher and its rate sources.

use thiserror::Error;

/// Errors surfaced synchronously to the host by [`crate::core::RateWatcher`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WatchError {
    #[error("Invalid {field} rate '{input}': {reason}")]
    InvalidRateFormat {
        field: &'static str,
        input: String,
        reason: String,
    },

    #[error("Rate watch must be started from within a tokio runtime")]
    NoRuntime,
}

/// A failed rate lookup. The watcher treats every variant as "not crossed"
/// and retries on the next tick.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request error: {detail} for currency pair: {symbol}")]
    Request { symbol: String, detail: String },

    #[error("HTTP error: {status} for currency pair: {symbol}")]
    Http { symbol: String, status: String },

    #[error("Failed to parse JSON response for {symbol}: {detail}")]
    Parse { symbol: String, detail: String },

    #[error("No rate data found for currency pair: {symbol}")]
    NoData { symbol: String },

    #[error("Invalid rate '{value}' for currency pair: {symbol}")]
    InvalidRate { symbol: String, value: String },
}
