//! TimerService - state coordinator and advancement loop
//!
//! ## Responsibilities
//!
//! - Single-writer ownership of [`TimerState`]
//! - Command application (start/pause/reset/set_total/set_bell/manual_bell)
//! - ~100ms advancement loop while running, anchored to the monotonic clock
//!
//! Elapsed time is always recomputed from the anchor recorded at
//! start/resume, never accumulated per tick, so scheduler jitter cannot
//! drift the countdown over a multi-minute talk. Pause and reset cancel
//! the loop under the same lock that flips the flags; a run epoch is
//! re-checked before every tick applies, so a tick computed before a
//! pause can never land after it.

use super::command::Command;
use super::{StatePayload, TimerState};
use crate::realtime_hub::{HubMessage, RealtimeHub};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// TimerService instance
pub struct TimerService {
    inner: Arc<Mutex<TimerInner>>,
    realtime: Arc<RealtimeHub>,
}

struct TimerInner {
    state: TimerState,
    /// Monotonic timestamp of the last start/resume; None while not running.
    anchor: Option<Instant>,
    /// Whole seconds already elapsed when the anchor was recorded.
    offset_sec: u64,
    /// Bumped by every start/pause/reset; a loop whose epoch no longer
    /// matches must exit without touching the state.
    epoch: u64,
    cancel: Option<CancellationToken>,
}

impl TimerService {
    /// Create new TimerService
    pub fn new(realtime: Arc<RealtimeHub>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TimerInner {
                state: TimerState::default(),
                anchor: None,
                offset_sec: 0,
                epoch: 0,
                cancel: None,
            })),
            realtime,
        }
    }

    /// Current state snapshot
    pub async fn snapshot(&self) -> TimerState {
        self.inner.lock().await.state.clone()
    }

    /// Apply an operator command and broadcast the resulting state.
    ///
    /// Every command ends in exactly one broadcast: rejected and unknown
    /// commands re-send the unchanged state so viewers stay in sync, and
    /// `manual_bell` sends its one-off cue payload in place of the
    /// standard broadcast.
    pub async fn apply(&self, command: Command) {
        let (payload, spawn) = {
            let mut inner = self.inner.lock().await;
            match command {
                Command::Start => {
                    let spawn = inner.begin_run();
                    (StatePayload::new(inner.state.clone()), spawn)
                }
                Command::Pause => {
                    inner.pause();
                    (StatePayload::new(inner.state.clone()), None)
                }
                Command::Reset => {
                    inner.reset();
                    (StatePayload::new(inner.state.clone()), None)
                }
                Command::SetTotal { minutes, seconds } => {
                    inner.set_total(minutes, seconds);
                    (StatePayload::new(inner.state.clone()), None)
                }
                Command::SetBell {
                    index,
                    minutes,
                    seconds,
                    enabled,
                } => {
                    inner.set_bell(index, minutes, seconds, enabled);
                    (StatePayload::new(inner.state.clone()), None)
                }
                Command::ManualBell { count } => {
                    let count = count.unwrap_or(1) as u32;
                    (
                        StatePayload::with_bells(inner.state.clone(), vec![count]),
                        None,
                    )
                }
                Command::Unknown => (StatePayload::new(inner.state.clone()), None),
            }
        };

        if let Some((epoch, token)) = spawn {
            self.spawn_advancement(epoch, token);
        }

        self.realtime.broadcast(HubMessage::State(payload)).await;
    }

    /// Run the advancement loop until cancelled or the state stops it.
    fn spawn_advancement(&self, epoch: u64, token: CancellationToken) {
        let inner = self.inner.clone();
        let realtime = self.realtime.clone();

        tokio::spawn(async move {
            let mut ticker = time::interval(TICK_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let payload = {
                    let mut inner = inner.lock().await;
                    if inner.epoch != epoch || !inner.state.running || inner.state.paused {
                        break;
                    }
                    inner.advance()
                };

                realtime.broadcast(HubMessage::State(payload)).await;
            }

            tracing::debug!("Advancement loop stopped");
        });
    }
}

impl TimerInner {
    /// Start from idle or resume from pause. Returns the loop handle
    /// material when a new advancement loop must run.
    fn begin_run(&mut self) -> Option<(u64, CancellationToken)> {
        if self.state.running && !self.state.paused {
            return None;
        }

        self.state.running = true;
        self.state.paused = false;
        self.offset_sec = self.state.elapsed_sec;
        self.anchor = Some(Instant::now());
        self.epoch += 1;

        let token = CancellationToken::new();
        self.cancel = Some(token.clone());

        tracing::info!(
            elapsed_sec = self.state.elapsed_sec,
            total_sec = self.state.total_sec,
            "Timer started"
        );

        Some((self.epoch, token))
    }

    fn pause(&mut self) {
        if !self.state.running || self.state.paused {
            return;
        }

        self.state.paused = true;
        self.offset_sec = self.state.elapsed_sec;
        self.anchor = None;
        self.epoch += 1;
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }

        tracing::info!(elapsed_sec = self.state.elapsed_sec, "Timer paused");
    }

    fn reset(&mut self) {
        self.state.running = false;
        self.state.paused = false;
        self.state.elapsed_sec = 0;
        self.state.remaining_sec = self.state.total_sec as i64;
        self.state.over = false;
        for bell in &mut self.state.bells {
            bell.triggered = false;
        }
        self.offset_sec = 0;
        self.anchor = None;
        self.epoch += 1;
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }

        tracing::info!(total_sec = self.state.total_sec, "Timer reset");
    }

    /// Reconfigure the total duration. Allowed only while idle or paused;
    /// a zero duration is ignored.
    fn set_total(&mut self, minutes: Option<u64>, seconds: Option<u64>) {
        if self.state.running && !self.state.paused {
            tracing::debug!("set_total ignored while running");
            return;
        }

        let total = minutes.unwrap_or(3) * 60 + seconds.unwrap_or(0);
        if total == 0 {
            return;
        }

        self.state.total_sec = total;
        self.state.remaining_sec = total as i64;
        self.state.elapsed_sec = 0;
        self.state.over = false;
        for bell in &mut self.state.bells {
            bell.triggered = false;
        }
        self.offset_sec = 0;

        tracing::info!(total_sec = total, "Total duration set");
    }

    /// Reconfigure one bell. An out-of-range index is ignored.
    fn set_bell(
        &mut self,
        index: Option<u64>,
        minutes: Option<u64>,
        seconds: Option<u64>,
        enabled: Option<bool>,
    ) {
        let idx = index.unwrap_or(0) as usize;
        let Some(bell) = self.state.bells.get_mut(idx) else {
            tracing::debug!(index = idx, "set_bell index out of range");
            return;
        };

        bell.at_sec = minutes.unwrap_or(0) * 60 + seconds.unwrap_or(0);
        bell.enabled = enabled.unwrap_or(true);
        bell.triggered = false;

        tracing::info!(
            index = idx,
            at_sec = bell.at_sec,
            enabled = bell.enabled,
            "Bell configured"
        );
    }

    /// One engine tick: recompute elapsed from the anchor, update the
    /// derived fields, and collect bells crossing their threshold.
    fn advance(&mut self) -> StatePayload {
        let anchored = self
            .anchor
            .map(|anchor| anchor.elapsed().as_secs())
            .unwrap_or(0);
        let elapsed_sec = self.offset_sec + anchored;

        self.state.elapsed_sec = elapsed_sec;
        self.state.remaining_sec = self.state.total_sec as i64 - elapsed_sec as i64;
        self.state.over = self.state.remaining_sec < 0;

        let mut fired = Vec::new();
        for bell in &mut self.state.bells {
            if bell.enabled && !bell.triggered && bell.at_sec <= elapsed_sec {
                bell.triggered = true;
                fired.push(bell.count);
            }
        }

        if !fired.is_empty() {
            tracing::info!(elapsed_sec, counts = ?fired, "Bells fired");
        }

        StatePayload::with_bells(self.state.clone(), fired)
    }
}
