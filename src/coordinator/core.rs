// Coordinator
//
// Single-threaded control loop. Each tick:
//   poll sessions -> diff against previous set -> pause rules -> hang check
// A failed poll skips the whole tick. Steady-state errors never end the loop.

use crate::clock::Clock;
use crate::error::Result;
use crate::monitor::{HangMonitor, HangOutcome};
use crate::pause::{PauseScheduler, PauseStep};
use crate::rig::{FleetApi, ProcessTable, RigState, RigStatusProbe};
use crate::session::{SessionSource, SessionTracker};
use crate::types::{DeviceIdentity, LoopPhase, StreamDelta, StreamSet};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    pub poll_interval: Duration,
    pub pause_duration: Duration,
    pub rig_check_interval: Duration,
    pub device_name: String,
    pub rig_id: Option<String>,
    pub process_name: String,
}

/// Outcome of one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickReport {
    PollFailed,
    Completed {
        delta: StreamDelta,
        armed: Option<u64>,
        pause: PauseStep,
        hang: HangOutcome,
    },
}

pub struct Coordinator<S, F, P, C> {
    tracker: SessionTracker<S>,
    probe: RigStatusProbe<F>,
    processes: P,
    clock: C,
    scheduler: PauseScheduler,
    hang_monitor: HangMonitor,
    poll_interval: Duration,
    device: DeviceIdentity,
    state: RigState,
    streams: StreamSet,
    phase: LoopPhase,
}

impl<S, F, P, C> Coordinator<S, F, P, C>
where
    S: SessionSource,
    F: FleetApi,
    P: ProcessTable,
    C: Clock,
{
    /// Startup sequence. Any error here is fatal.
    pub fn start(
        tracker: SessionTracker<S>,
        probe: RigStatusProbe<F>,
        processes: P,
        clock: C,
        settings: CoordinatorSettings,
    ) -> Result<Self> {
        tracker.source().check_connection()?;

        let (device, status) =
            probe.resolve_device(settings.rig_id.as_deref(), &settings.device_name)?;
        let state = RigState::from_initial_status(status);

        if state.is_mining {
            tracing::info!("[Coordinator] Ready, starting monitoring!");
        } else {
            tracing::info!("[Coordinator] Ready, rig is currently not mining");
        }

        let hang_monitor = HangMonitor::new(
            settings.rig_check_interval,
            settings.poll_interval,
            &settings.process_name,
            clock.now(),
        );

        Ok(Self {
            tracker,
            probe,
            processes,
            clock,
            scheduler: PauseScheduler::new(settings.pause_duration),
            hang_monitor,
            poll_interval: settings.poll_interval,
            device,
            state,
            streams: StreamSet::new(),
            phase: LoopPhase::Starting,
        })
    }

    #[cfg(test)]
    pub fn state(&self) -> &RigState {
        &self.state
    }

    #[cfg(test)]
    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    #[cfg(test)]
    pub fn streams(&self) -> &StreamSet {
        &self.streams
    }

    #[cfg(test)]
    pub fn device(&self) -> &DeviceIdentity {
        &self.device
    }

    pub fn tick(&mut self) -> TickReport {
        let now = self.clock.now();

        let current = match self.tracker.poll() {
            Ok(streams) => streams,
            Err(e) => {
                tracing::warn!("[Coordinator] Could not query Plex: {}", e);
                return TickReport::PollFailed;
            }
        };

        let delta = current.delta(&self.streams);
        self.streams = current;

        if delta.has_new() && self.state.should_mine {
            tracing::info!("[Coordinator] Streams: {}", self.streams);
        }
        for ended in &delta.ended {
            tracing::debug!("[Coordinator] Stream ended: {}", ended);
        }
        if !delta.ended.is_empty() && self.streams.is_empty() {
            tracing::debug!("[Coordinator] No active transcodes");
        }

        let armed = self
            .scheduler
            .arm(&mut self.state, now, self.phase, &delta);
        self.phase = LoopPhase::Monitoring;

        let pause = self
            .scheduler
            .apply(&mut self.state, now, &self.probe, &self.device);

        // After the pause rules, so a forced resume lands on the next tick
        let hang = self.hang_monitor.check_if_due(
            now,
            &mut self.state,
            &self.probe,
            &self.device,
            &mut self.processes,
            &self.clock,
        );

        TickReport::Completed {
            delta,
            armed,
            pause,
            hang,
        }
    }

    /// One tick followed by the cadence sleep
    pub fn run_once(&mut self) -> TickReport {
        let report = self.tick();
        self.clock.sleep(self.poll_interval);
        report
    }

    /// Runs until the process is killed
    pub fn run(mut self) -> ! {
        tracing::debug!(
            "[Coordinator] Polling every {}s for device {}",
            self.poll_interval.as_secs(),
            self.device.name
        );
        loop {
            self.run_once();
        }
    }
}
