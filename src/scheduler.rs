//! Background task that checks for UTC day rollover once an hour.
//!
//! The first check is aligned to the next whole hour after the task is
//! spawned; later checks follow every hour until the task is stopped.

use chrono::{DateTime, Duration as ChronoDuration, DurationRound, Utc};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Interval between rollover checks once running.
pub const CHECK_PERIOD: Duration = Duration::from_secs(3600);

/// Scheduler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Waiting for the first hour boundary
    Armed,
    /// Ticking hourly
    Running,
    /// Stopped, no further checks will fire
    Stopped,
}

/// Time left from `now` until the next whole UTC hour.
///
/// Exactly on the hour counts as a full hour away.
pub fn delay_until_next_hour(now: DateTime<Utc>) -> Duration {
    let hour = ChronoDuration::hours(1);
    let floor = now.duration_trunc(hour).unwrap_or(now);
    let next = floor + hour;
    (next - now).to_std().unwrap_or(CHECK_PERIOD)
}

/// Handle to the rollover task.
///
/// Dropping the handle stops the task.
pub struct DayRollover {
    cancel: CancellationToken,
    state: watch::Receiver<SchedulerState>,
    handle: Option<JoinHandle<()>>,
}

impl DayRollover {
    /// Spawn the task: the first `check` fires after `initial_delay`, later
    /// ones every `period`. Pass [`delay_until_next_hour`] and
    /// [`CHECK_PERIOD`] for hour-aligned checks.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_with<F, Fut>(initial_delay: Duration, period: Duration, check: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let (state_tx, state_rx) = watch::channel(SchedulerState::Armed);

        tracing::debug!(
            initial_delay_secs = initial_delay.as_secs(),
            period_secs = period.as_secs(),
            "Day rollover scheduler armed"
        );

        let handle = tokio::spawn(run(initial_delay, period, cancel.clone(), state_tx, check));

        Self {
            cancel,
            state: state_rx,
            handle: Some(handle),
        }
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    /// Signal the task to stop. A check already in progress completes.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Stop the task and wait for it to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Day rollover task ended abnormally");
            }
        }
    }
}

impl Drop for DayRollover {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run<F, Fut>(
    initial_delay: Duration,
    period: Duration,
    cancel: CancellationToken,
    state: watch::Sender<SchedulerState>,
    mut check: F,
) where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let first_fire = Instant::now() + initial_delay;

    tokio::select! {
        _ = cancel.cancelled() => {
            state.send_replace(SchedulerState::Stopped);
            tracing::debug!("Day rollover scheduler stopped before first check");
            return;
        }
        _ = tokio::time::sleep_until(first_fire) => {}
    }

    state.send_replace(SchedulerState::Running);
    check().await;

    // Anchor later ticks on the boundary, not on when the first check returned.
    let mut ticker = tokio::time::interval_at(first_fire + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => check().await,
        }
    }

    state.send_replace(SchedulerState::Stopped);
    tracing::debug!("Day rollover scheduler stopped");
}
