//! Core rate watching logic and abstractions

pub mod config;
pub mod crossing;
pub mod error;
pub mod log;
pub mod notify;
pub mod rate;
pub mod session;
pub mod watcher;

// Re-export main types for cleaner imports
pub use crossing::{Direction, crossed};
pub use error::{FetchError, WatchError};
pub use notify::Notifier;
pub use rate::{CurrencyPair, RateSource};
pub use session::{WatchSession, WatchStatus};
pub use watcher::{OutcomeCallback, RateWatcher, WatchOutcome, WatchSettings, outcome_callback};
