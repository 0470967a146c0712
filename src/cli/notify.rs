use super::ui;
use crate::core::{CurrencyPair, Notifier, WatchOutcome};
use anyhow::Result;
use async_trait::async_trait;

/// Prints watch outcomes to the terminal.
pub struct ConsoleNotifier {
    pair: CurrencyPair,
}

impl ConsoleNotifier {
    pub fn new(pair: CurrencyPair) -> Self {
        Self { pair }
    }

    pub fn message(&self, outcome: &WatchOutcome) -> String {
        match outcome {
            WatchOutcome::Succeeded {
                rate, observed_at, ..
            } => format!(
                "Current {} rate is {} (at {})",
                self.pair,
                rate,
                observed_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            WatchOutcome::Exhausted { attempts } => {
                format!("Max attempts count reached ({attempts}), stopping watch")
            }
        }
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, outcome: &WatchOutcome) -> Result<()> {
        let message = self.message(outcome);
        let styled = match outcome {
            WatchOutcome::Succeeded { .. } => ui::style_text(&message, ui::StyleType::Success),
            WatchOutcome::Exhausted { .. } => ui::style_text(&message, ui::StyleType::Warning),
        };
        println!("\n{styled}");
        Ok(())
    }
}
