// Hang / External-Change Monitor
//
// Runs every rig-check interval. First match wins:
// 1. any miner UNKNOWN        -> kill the miner process, force a resume
// 2. unmanaged and MINING     -> operator re-enabled the device, manage it again
// 3. managed, mining, not MINING -> stopped from outside, stop managing it

use crate::clock::Clock;
use crate::rig::probe::device_status_in;
use crate::rig::{FleetApi, ProcessTable, RigState, RigStatusProbe};
use crate::types::{DeviceIdentity, MiningStatus};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HangOutcome {
    NotDue,
    QueryFailed,
    /// Rig reported UNKNOWN; `killed` is the pid terminated, if any
    Hung { killed: Option<u32> },
    Reenabled,
    ExternallyDisabled,
    /// Managed device missing from the aggregate status
    DeviceMissing,
    Healthy,
}

pub struct HangMonitor {
    interval_secs: u64,
    settle: Duration,
    process_name: String,
    last_check: u64,
}

impl HangMonitor {
    /// `settle` is how long to wait for the miner to come back after a kill
    pub fn new(interval: Duration, settle: Duration, process_name: &str, started_at: u64) -> Self {
        Self {
            interval_secs: interval.as_secs(),
            settle,
            process_name: process_name.to_string(),
            last_check: started_at,
        }
    }

    #[cfg(test)]
    pub fn last_check(&self) -> u64 {
        self.last_check
    }

    pub fn is_due(&self, now: u64) -> bool {
        now >= self.last_check.saturating_add(self.interval_secs)
    }

    pub fn check_if_due<F, P, C>(
        &mut self,
        now: u64,
        state: &mut RigState,
        probe: &RigStatusProbe<F>,
        device: &DeviceIdentity,
        processes: &mut P,
        clock: &C,
    ) -> HangOutcome
    where
        F: FleetApi,
        P: ProcessTable,
        C: Clock,
    {
        if !self.is_due(now) {
            return HangOutcome::NotDue;
        }
        self.check(now, state, probe, device, processes, clock)
    }

    pub fn check<F, P, C>(
        &mut self,
        now: u64,
        state: &mut RigState,
        probe: &RigStatusProbe<F>,
        device: &DeviceIdentity,
        processes: &mut P,
        clock: &C,
    ) -> HangOutcome
    where
        F: FleetApi,
        P: ProcessTable,
        C: Clock,
    {
        // Advance even on failure so a dead API is not hammered every tick
        self.last_check = now;

        let overview = match probe.overview() {
            Ok(overview) => overview,
            Err(e) => {
                tracing::error!("[HangMonitor] Unable to query rig status: {}", e);
                return HangOutcome::QueryFailed;
            }
        };

        if overview.has_unknown() {
            tracing::error!("[HangMonitor] NiceHash rig seems to be hung!");
            return self.recover_hung_miner(now, state, probe, device, processes, clock);
        }

        let status = match device_status_in(&overview, device) {
            Some(status) => status,
            None => {
                tracing::warn!(
                    "[HangMonitor] Device {} missing from rig {} status",
                    device.name,
                    device.rig_id
                );
                return HangOutcome::DeviceMissing;
            }
        };

        if !state.should_mine && status == MiningStatus::Mining {
            state.should_mine = true;
            state.is_mining = true;
            tracing::info!("[HangMonitor] Rig is enabled again, starting monitoring!");
            HangOutcome::Reenabled
        } else if state.should_mine && state.is_mining && status != MiningStatus::Mining {
            state.should_mine = false;
            tracing::warn!(
                "[HangMonitor] Rig seems to have been disabled externally, stopping monitoring"
            );
            HangOutcome::ExternallyDisabled
        } else {
            HangOutcome::Healthy
        }
    }

    fn recover_hung_miner<F, P, C>(
        &self,
        now: u64,
        state: &mut RigState,
        probe: &RigStatusProbe<F>,
        device: &DeviceIdentity,
        processes: &mut P,
        clock: &C,
    ) -> HangOutcome
    where
        F: FleetApi,
        P: ProcessTable,
        C: Clock,
    {
        let pid = match processes.terminate_first_named(&self.process_name) {
            Some(pid) => pid,
            None => {
                tracing::warn!(
                    "[HangMonitor] No running process named '{}' to restart",
                    self.process_name
                );
                return HangOutcome::Hung { killed: None };
            }
        };

        tracing::info!(
            "[HangMonitor] Killed {} (PID {}), waiting {}s for restart",
            self.process_name,
            pid,
            self.settle.as_secs()
        );
        clock.sleep(self.settle);

        // Already elapsed: the next tick takes the resume path
        state.pause_deadline = Some(now);

        match probe.get_status(device) {
            Ok(status) => state.is_mining = status.is_mining(),
            Err(e) => tracing::warn!("[HangMonitor] Unable to refresh rig status: {}", e),
        }

        HangOutcome::Hung { killed: Some(pid) }
    }
}
