//! State of a single rate watch and the transitions a tick applies to it.
//!
//! Nothing here sleeps or performs I/O. The watcher loop asks the session what
//! to do before a fetch ([`WatchSession::begin_tick`]) and feeds the fetch
//! result back ([`WatchSession::complete_tick`]).

use crate::core::crossing::Direction;
use crate::core::error::FetchError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WatchStatus {
    Idle,
    Running,
    Succeeded,
    Exhausted,
    Cancelled,
}

impl Display for WatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                WatchStatus::Idle => "Idle",
                WatchStatus::Running => "Running",
                WatchStatus::Succeeded => "Succeeded",
                WatchStatus::Exhausted => "Exhausted",
                WatchStatus::Cancelled => "Cancelled",
            }
        )
    }
}

/// What the loop should do before issuing a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStart {
    /// Session is no longer running.
    Stopped,
    /// Attempt budget is spent; the session is now `Exhausted`.
    Exhausted { attempts: u32 },
    /// Fetch the rate for this attempt.
    Fetch { attempt: u32 },
}

/// What the loop should do once a fetch has resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickEnd {
    /// Session left `Running` while the fetch was in flight.
    Discarded,
    /// Target crossed; the session is now `Succeeded`.
    Succeeded { rate: Decimal, attempts: u32 },
    /// Not crossed (or the fetch failed); wait for the next tick.
    Reschedule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchSession {
    id: u64,
    start_rate: Decimal,
    target_rate: Decimal,
    direction: Direction,
    attempt: u32,
    status: WatchStatus,
}

impl WatchSession {
    /// Creates a session that is already `Running` with no attempts made.
    pub fn new(id: u64, start_rate: Decimal, target_rate: Decimal) -> Self {
        Self {
            id,
            start_rate,
            target_rate,
            direction: Direction::of(start_rate, target_rate),
            attempt: 0,
            status: WatchStatus::Running,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn start_rate(&self) -> Decimal {
        self.start_rate
    }

    pub fn target_rate(&self) -> Decimal {
        self.target_rate
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn status(&self) -> WatchStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == WatchStatus::Running
    }

    /// Starts a tick. The counter never moves past `max_attempts`: the tick
    /// after the last permitted attempt reports exhaustion without fetching.
    pub fn begin_tick(&mut self, max_attempts: u32) -> TickStart {
        if !self.is_running() {
            return TickStart::Stopped;
        }
        if self.attempt >= max_attempts {
            self.status = WatchStatus::Exhausted;
            return TickStart::Exhausted {
                attempts: self.attempt,
            };
        }
        self.attempt += 1;
        TickStart::Fetch {
            attempt: self.attempt,
        }
    }

    pub fn complete_tick(&mut self, result: &Result<Decimal, FetchError>) -> TickEnd {
        if !self.is_running() {
            return TickEnd::Discarded;
        }
        match result {
            Ok(rate) if self.direction.is_crossed(self.target_rate, *rate) => {
                self.status = WatchStatus::Succeeded;
                TickEnd::Succeeded {
                    rate: *rate,
                    attempts: self.attempt,
                }
            }
            Ok(_) | Err(_) => TickEnd::Reschedule,
        }
    }

    /// Returns true if this call moved the session to `Cancelled`.
    pub fn cancel(&mut self) -> bool {
        if self.is_running() {
            self.status = WatchStatus::Cancelled;
            true
        } else {
            false
        }
    }
}
