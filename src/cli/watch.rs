use super::ui;
use crate::core::{
    CurrencyPair, Notifier, RateSource, RateWatcher, WatchOutcome, WatchSettings, WatchStatus,
    outcome_callback,
};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Resolves on Ctrl-C. Never resolves if the signal handler is unavailable.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Unable to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

/// Watches `pair` until the rate crosses `target_rate`, the attempt budget runs
/// out or the user interrupts. Returns the final status of the watch.
pub async fn run(
    pair: &CurrencyPair,
    settings: WatchSettings,
    source: Arc<dyn RateSource>,
    notifier: &dyn Notifier,
    start_rate: &str,
    target_rate: &str,
) -> Result<WatchStatus> {
    let (tx, mut rx) = mpsc::channel::<WatchOutcome>(1);
    let on_outcome = outcome_callback(move |outcome| {
        let tx = tx.clone();
        async move {
            // The receiver only goes away once the host stopped waiting.
            let _ = tx.send(outcome).await;
        }
    });

    let watcher = RateWatcher::new(source, on_outcome).with_settings(settings);
    watcher.start(start_rate, target_rate)?;

    let direction = watcher
        .snapshot()
        .map(|session| session.direction().to_string())
        .unwrap_or_default();
    let spinner = ui::new_spinner(format!(
        "Watching {pair} {direction} from {} to {}",
        start_rate.trim(),
        target_rate.trim()
    ));

    let outcome = tokio::select! {
        outcome = rx.recv() => outcome,
        _ = interrupted() => {
            watcher.cancel();
            None
        }
    };
    watcher.wait().await;
    spinner.finish_and_clear();

    if let Some(outcome) = &outcome {
        debug!(?outcome, "Watch finished");
        notifier.notify(outcome).await?;
    } else {
        println!(
            "\n{}",
            ui::style_text("Watch cancelled", ui::StyleType::Subtle)
        );
    }

    let Some(session) = watcher.snapshot() else {
        return Ok(WatchStatus::Idle);
    };
    println!(
        "\n{}",
        ui::session_table(pair, &session, watcher.settings().max_attempts)
    );
    Ok(session.status())
}
