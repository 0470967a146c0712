//! Delivery of watch outcomes to the user

use crate::core::watcher::WatchOutcome;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, outcome: &WatchOutcome) -> Result<()>;
}
