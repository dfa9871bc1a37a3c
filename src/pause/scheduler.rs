// Pause Scheduler
//
// Per-tick rules, in order:
// 1. Arm:     new stream while managed and monitoring -> deadline = now + pause
// 2. Enforce: before the deadline, stop the device if it is mining
// 3. Resume:  at/after the deadline, start the device and clear the deadline
//
// A later arm overwrites an earlier deadline; it is not extended.

use crate::clock::format_local;
use crate::rig::{FleetApi, RigState, RigStatusProbe};
use crate::types::{DeviceIdentity, LoopPhase, PowerAction, StreamDelta};
use std::time::Duration;

/// What the enforce/resume rules did this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseStep {
    /// No pause pending
    Idle,
    /// Device not managed; no commands issued
    Unmanaged,
    /// Pause pending and device already stopped
    Holding,
    Stopped,
    StopFailed,
    Resumed,
    /// Start rejected; deadline kept so the next tick retries
    ResumeFailed,
    /// Deadline passed with the device already mining
    Cleared,
}

pub struct PauseScheduler {
    pause_secs: u64,
}

impl PauseScheduler {
    pub fn new(pause: Duration) -> Self {
        Self {
            pause_secs: pause.as_secs(),
        }
    }

    /// Arm rule. Returns the new deadline when one was set.
    pub fn arm(
        &self,
        state: &mut RigState,
        now: u64,
        phase: LoopPhase,
        delta: &StreamDelta,
    ) -> Option<u64> {
        if !state.should_mine || !delta.has_new() {
            return None;
        }

        if phase == LoopPhase::Starting {
            tracing::info!(
                "[Scheduler] {} stream(s) already playing at startup, not pausing",
                delta.new.len()
            );
            return None;
        }

        let deadline = now.saturating_add(self.pause_secs);
        if let Some(previous) = state.pause_deadline {
            if deadline < previous {
                tracing::debug!(
                    "[Scheduler] New deadline {} replaces later deadline {}",
                    deadline,
                    previous
                );
            }
        }
        state.pause_deadline = Some(deadline);

        tracing::info!(
            "[Scheduler] New stream detected, pausing rig until: {}",
            format_local(deadline)
        );
        Some(deadline)
    }

    /// Enforce-pause and resume rules
    pub fn apply<F: FleetApi>(
        &self,
        state: &mut RigState,
        now: u64,
        probe: &RigStatusProbe<F>,
        device: &DeviceIdentity,
    ) -> PauseStep {
        if state.pause_deadline.is_none() {
            return PauseStep::Idle;
        }

        if !state.should_mine {
            return PauseStep::Unmanaged;
        }

        if state.is_paused_at(now) {
            if !state.is_mining {
                return PauseStep::Holding;
            }

            tracing::info!("[Scheduler] Stopping rig");
            match probe.set_power(device, PowerAction::Stop) {
                Ok(()) => {
                    state.is_mining = false;
                    PauseStep::Stopped
                }
                Err(e) => {
                    tracing::error!("[Scheduler] Unable to stop rig: {}", e);
                    PauseStep::StopFailed
                }
            }
        } else {
            if state.is_mining {
                state.pause_deadline = None;
                return PauseStep::Cleared;
            }

            tracing::info!("[Scheduler] Starting rig again");
            match probe.set_power(device, PowerAction::Start) {
                Ok(()) => {
                    state.is_mining = true;
                    state.pause_deadline = None;
                    PauseStep::Resumed
                }
                Err(e) => {
                    // Retried next tick
                    tracing::error!("[Scheduler] Unable to start rig: {}", e);
                    PauseStep::ResumeFailed
                }
            }
        }
    }
}
