//! Countdown timer core
//!
//! ## Responsibilities
//!
//! - Authoritative timer state (single instance per process)
//! - Command decoding and application
//! - Drift-corrected advancement loop with bell threshold detection
//!
//! All mutation funnels through [`TimerService`]; readers only ever see a
//! state whose derived fields (`remaining_sec`, `over`) are consistent.

use serde::{Deserialize, Serialize};

mod command;
mod service;

pub use command::{ClientMessage, Command};
pub use service::TimerService;

/// A configured bell threshold.
///
/// `triggered` flips to true the first time `elapsed_sec` reaches `at_sec`
/// during a run-cycle and stays set until `reset` or `set_total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BellConfig {
    pub enabled: bool,
    pub at_sec: u64,
    pub count: u32,
    pub triggered: bool,
}

impl BellConfig {
    fn new(at_sec: u64, count: u32) -> Self {
        Self {
            enabled: true,
            at_sec,
            count,
            triggered: false,
        }
    }
}

/// Full timer state, broadcast to every viewer as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub running: bool,
    pub paused: bool,
    pub total_sec: u64,
    pub elapsed_sec: u64,
    /// `total_sec - elapsed_sec`; negative once the talk runs over.
    pub remaining_sec: i64,
    pub over: bool,
    pub bells: Vec<BellConfig>,
}

impl Default for TimerState {
    fn default() -> Self {
        let total_sec = 3 * 60;
        Self {
            running: false,
            paused: false,
            total_sec,
            elapsed_sec: 0,
            remaining_sec: total_sec as i64,
            over: false,
            bells: vec![
                BellConfig::new(60, 1),
                BellConfig::new(120, 2),
                BellConfig::new(180, 3),
            ],
        }
    }
}

/// Snapshot payload as delivered to viewers.
///
/// `fire_bells` carries the chime counts to play with this update; it is
/// transient and omitted from the wire format when empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatePayload {
    #[serde(flatten)]
    pub state: TimerState,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fire_bells: Vec<u32>,
}

impl StatePayload {
    pub fn new(state: TimerState) -> Self {
        Self {
            state,
            fire_bells: Vec::new(),
        }
    }

    pub fn with_bells(state: TimerState, fire_bells: Vec<u32>) -> Self {
        Self { state, fire_bells }
    }
}
