//! Polls a [`RateSource`] on a fixed interval until the rate crosses a target.
//!
//! Each call to [`RateWatcher::start`] spawns one tokio task that owns the
//! timer loop for a fresh [`WatchSession`]. Only one session runs at a time;
//! starting again cancels the previous session first.

use crate::core::error::WatchError;
use crate::core::rate::{RateSource, parse_rate};
use crate::core::session::{TickEnd, TickStart, WatchSession, WatchStatus};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;
use rust_decimal::Decimal;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(5000);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

/// Terminal result of a watch. Cancelled sessions produce no outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    Succeeded {
        rate: Decimal,
        attempts: u32,
        observed_at: DateTime<Utc>,
    },
    Exhausted {
        attempts: u32,
    },
}

/// Invoked at most once per session with its outcome.
pub type OutcomeCallback = Arc<dyn Fn(WatchOutcome) -> BoxFuture<'static, ()> + Send + Sync>;

/// Wraps an async closure into an [`OutcomeCallback`].
pub fn outcome_callback<F, Fut>(f: F) -> OutcomeCallback
where
    F: Fn(WatchOutcome) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |outcome| f(outcome).boxed())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

struct ActiveSession {
    session: Arc<Mutex<WatchSession>>,
    shutdown_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl ActiveSession {
    fn cancel(&self) -> bool {
        let cancelled = lock(&self.session).cancel();
        if cancelled {
            // The task may already be gone; nothing to wake then.
            let _ = self.shutdown_tx.send(true);
        }
        cancelled
    }
}

pub struct RateWatcher {
    source: Arc<dyn RateSource>,
    on_outcome: OutcomeCallback,
    settings: WatchSettings,
    next_id: AtomicU64,
    active: Mutex<Option<ActiveSession>>,
}

impl RateWatcher {
    pub fn new(source: Arc<dyn RateSource>, on_outcome: OutcomeCallback) -> Self {
        Self {
            source,
            on_outcome,
            settings: WatchSettings::default(),
            next_id: AtomicU64::new(0),
            active: Mutex::new(None),
        }
    }

    pub fn with_settings(mut self, settings: WatchSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> WatchSettings {
        self.settings
    }

    /// Parses both rates and starts a new session.
    ///
    /// Fails with [`WatchError::InvalidRateFormat`] without touching any
    /// running session when either rate is malformed.
    pub fn start(&self, start_rate: &str, target_rate: &str) -> Result<(), WatchError> {
        let start = parse_rate(start_rate).map_err(|reason| WatchError::InvalidRateFormat {
            field: "start",
            input: start_rate.to_string(),
            reason,
        })?;
        let target = parse_rate(target_rate).map_err(|reason| WatchError::InvalidRateFormat {
            field: "target",
            input: target_rate.to_string(),
            reason,
        })?;
        self.start_rates(start, target)
    }

    /// Starts a new session, superseding any session that is still running.
    /// The first tick runs immediately.
    ///
    /// Returns [`WatchError::NoRuntime`] outside a tokio runtime; any running
    /// session is left alone then.
    pub fn start_rates(
        &self,
        start_rate: Decimal,
        target_rate: Decimal,
    ) -> Result<(), WatchError> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| WatchError::NoRuntime)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let session = WatchSession::new(id, start_rate, target_rate);
        let direction = session.direction();
        let session = Arc::new(Mutex::new(session));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut active = self.lock_active();
        if let Some(previous) = active.take() {
            if previous.cancel() {
                info!(
                    session = lock(&previous.session).id(),
                    superseded_by = id,
                    "Superseding running rate watch"
                );
            }
        }

        let handle = runtime.spawn(run_watch_loop(
            Arc::clone(&session),
            Arc::clone(&self.source),
            Arc::clone(&self.on_outcome),
            self.settings,
            shutdown_rx,
        ));
        *active = Some(ActiveSession {
            session,
            shutdown_tx,
            handle: Some(handle),
        });

        info!(
            session = id,
            %start_rate,
            %target_rate,
            %direction,
            interval_ms = self.settings.interval.as_millis() as u64,
            max_attempts = self.settings.max_attempts,
            "Rate watch started"
        );
        Ok(())
    }

    /// Cancels the running session, if any. No outcome is reported for it.
    pub fn cancel(&self) {
        let active = self.lock_active();
        if let Some(active) = active.as_ref() {
            if active.cancel() {
                info!(session = lock(&active.session).id(), "Rate watch cancelled");
            }
        }
    }

    /// Status of the most recent session, `Idle` before the first start.
    pub fn status(&self) -> WatchStatus {
        self.snapshot()
            .map_or(WatchStatus::Idle, |session| session.status())
    }

    /// Copy of the most recent session.
    pub fn snapshot(&self) -> Option<WatchSession> {
        let active = self.lock_active();
        active.as_ref().map(|active| lock(&active.session).clone())
    }

    /// Waits for the most recent session's task to finish.
    pub async fn wait(&self) {
        let handle = self
            .lock_active()
            .as_mut()
            .and_then(|active| active.handle.take());
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "Rate watch task failed");
            }
        }
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<ActiveSession>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for RateWatcher {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn lock(session: &Mutex<WatchSession>) -> MutexGuard<'_, WatchSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn run_watch_loop(
    session: Arc<Mutex<WatchSession>>,
    source: Arc<dyn RateSource>,
    on_outcome: OutcomeCallback,
    settings: WatchSettings,
    mut shutdown: watch::Receiver<bool>,
) {
    let id = lock(&session).id();

    loop {
        let step = lock(&session).begin_tick(settings.max_attempts);
        let attempt = match step {
            TickStart::Stopped => {
                debug!(session = id, "Rate watch stopped");
                return;
            }
            TickStart::Exhausted { attempts } => {
                info!(
                    session = id,
                    attempts, "Max attempts count reached, stopping rate watch"
                );
                on_outcome(WatchOutcome::Exhausted { attempts }).await;
                return;
            }
            TickStart::Fetch { attempt } => attempt,
        };
        debug!(session = id, attempt, "Rate check attempt");

        let result = tokio::select! {
            result = source.fetch_rate() => result,
            _ = shutdown.changed() => {
                debug!(session = id, attempt, "Rate watch cancelled during fetch");
                return;
            }
        };
        match &result {
            Ok(rate) => debug!(session = id, attempt, %rate, "Received rate"),
            Err(e) => warn!(
                session = id,
                attempt,
                error = %e,
                "Rate fetch failed, will retry next tick"
            ),
        }

        let end = lock(&session).complete_tick(&result);
        match end {
            TickEnd::Discarded => {
                debug!(session = id, attempt, "Discarding rate for stopped watch");
                return;
            }
            TickEnd::Succeeded { rate, attempts } => {
                info!(session = id, attempts, %rate, "Target rate crossed");
                on_outcome(WatchOutcome::Succeeded {
                    rate,
                    attempts,
                    observed_at: Utc::now(),
                })
                .await;
                return;
            }
            TickEnd::Reschedule => {}
        }

        tokio::select! {
            _ = tokio::time::sleep(settings.interval) => {}
            _ = shutdown.changed() => {
                debug!(session = id, "Rate watch cancelled while waiting");
                return;
            }
        }
    }
}
