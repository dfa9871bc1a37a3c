// Test Doubles
//
// In-memory stand-ins for Plex, NiceHash, the process table and the clock.
// Handles are cheap clones sharing one inner state so a test can keep a copy
// after moving the fake into the component under test.

use crate::clock::Clock;
use crate::error::{MonitorError, Result};
use crate::rig::process::ProcessEntry;
use crate::rig::{DeviceSummary, FleetApi, ProcessTable, RigDetail, RigOverview};
use crate::session::{MediaKind, PlaybackSession, SessionSource};
use crate::types::{DeviceIdentity, MiningStatus, PowerAction};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

pub fn session(kind: MediaKind, transcoding: bool, user: &str, guid: &str) -> PlaybackSession {
    PlaybackSession {
        media_kind: kind,
        is_transcoding: transcoding,
        user_id: user.to_string(),
        session_guid: guid.to_string(),
    }
}

/// A transcoding video session
pub fn stream(user: &str, guid: &str) -> PlaybackSession {
    session(MediaKind::Video, true, user, guid)
}

pub fn device_summary(id: &str, name: &str, status: MiningStatus) -> DeviceSummary {
    DeviceSummary {
        id: id.to_string(),
        name: name.to_string(),
        status,
    }
}

pub fn rig_detail(rig_id: &str, devices: Vec<DeviceSummary>) -> RigDetail {
    RigDetail {
        rig_id: rig_id.to_string(),
        miner_status: MiningStatus::Mining,
        devices,
    }
}

/// rig-1 with an idle CPU (dev-a) and a mining "RTX 3080" (dev-b)
pub fn default_fleet() -> FakeFleet {
    FakeFleet::with_rigs(vec![rig_detail(
        "rig-1",
        vec![
            device_summary("dev-a", "CPU", MiningStatus::Idle),
            device_summary("dev-b", "RTX 3080", MiningStatus::Mining),
        ],
    )])
}

/// The "RTX 3080" of `default_fleet`
pub fn test_device() -> DeviceIdentity {
    DeviceIdentity {
        rig_id: "rig-1".to_string(),
        device_id: "dev-b".to_string(),
        name: "RTX 3080".to_string(),
        index: 1,
    }
}

#[derive(Default)]
struct SessionInner {
    queued: VecDeque<Result<Vec<PlaybackSession>>>,
    current: Vec<PlaybackSession>,
    connection_down: bool,
    polls: usize,
}

/// Returns queued responses first, then the current session list
#[derive(Clone, Default)]
pub struct FakeSessionSource {
    inner: Rc<RefCell<SessionInner>>,
}

impl FakeSessionSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: Result<Vec<PlaybackSession>>) {
        self.inner.borrow_mut().queued.push_back(response);
    }

    pub fn set_sessions(&self, sessions: Vec<PlaybackSession>) {
        self.inner.borrow_mut().current = sessions;
    }

    pub fn set_connection_down(&self, down: bool) {
        self.inner.borrow_mut().connection_down = down;
    }

    /// Number of session list requests made
    pub fn polls(&self) -> usize {
        self.inner.borrow().polls
    }
}

impl SessionSource for FakeSessionSource {
    fn list_active_sessions(&self) -> Result<Vec<PlaybackSession>> {
        let mut inner = self.inner.borrow_mut();
        inner.polls += 1;
        match inner.queued.pop_front() {
            Some(response) => response,
            None => Ok(inner.current.clone()),
        }
    }

    fn check_connection(&self) -> Result<()> {
        if self.inner.borrow().connection_down {
            Err(MonitorError::Unreachable("plex down".to_string()))
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
struct FleetInner {
    rigs: Vec<RigDetail>,
    miner_statuses: HashMap<String, u32>,
    commands: Vec<PowerAction>,
    fail_power: bool,
    fail_queries: bool,
    list_calls: usize,
}

/// Fleet whose device status follows successful power commands
#[derive(Clone, Default)]
pub struct FakeFleet {
    inner: Rc<RefCell<FleetInner>>,
}

impl FakeFleet {
    pub fn with_rigs(rigs: Vec<RigDetail>) -> Self {
        let fleet = Self::default();
        fleet.inner.borrow_mut().rigs = rigs;
        fleet
    }

    pub fn set_device_status(&self, device_id: &str, status: MiningStatus) {
        let mut inner = self.inner.borrow_mut();
        for device in inner.rigs.iter_mut().flat_map(|r| r.devices.iter_mut()) {
            if device.id == device_id {
                device.status = status;
            }
        }
    }

    pub fn remove_device(&self, device_id: &str) {
        let mut inner = self.inner.borrow_mut();
        for rig in inner.rigs.iter_mut() {
            rig.devices.retain(|d| d.id != device_id);
        }
    }

    pub fn set_miner_status_count(&self, status: &str, count: u32) {
        self.inner
            .borrow_mut()
            .miner_statuses
            .insert(status.to_string(), count);
    }

    pub fn fail_power(&self, fail: bool) {
        self.inner.borrow_mut().fail_power = fail;
    }

    pub fn fail_queries(&self, fail: bool) {
        self.inner.borrow_mut().fail_queries = fail;
    }

    /// Every power command attempted, including rejected ones
    pub fn commands(&self) -> Vec<PowerAction> {
        self.inner.borrow().commands.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.inner.borrow().list_calls
    }
}

impl FleetApi for FakeFleet {
    fn list_rigs(&self) -> Result<RigOverview> {
        let mut inner = self.inner.borrow_mut();
        inner.list_calls += 1;
        if inner.fail_queries {
            return Err(MonitorError::Unreachable("nicehash down".to_string()));
        }
        Ok(RigOverview {
            rigs: inner.rigs.clone(),
            miner_statuses: inner.miner_statuses.clone(),
        })
    }

    fn get_rig_status(&self, rig_id: &str) -> Result<RigDetail> {
        let inner = self.inner.borrow();
        if inner.fail_queries {
            return Err(MonitorError::Unreachable("nicehash down".to_string()));
        }
        inner
            .rigs
            .iter()
            .find(|r| r.rig_id == rig_id)
            .cloned()
            .ok_or_else(|| MonitorError::NotFound(rig_id.to_string()))
    }

    fn set_device_power(&self, _rig_id: &str, device_id: &str, action: PowerAction) -> Result<()> {
        let fail = {
            let mut inner = self.inner.borrow_mut();
            inner.commands.push(action);
            inner.fail_power
        };
        if fail {
            return Err(MonitorError::CommandFailed(format!("{} rejected", action)));
        }

        let status = match action {
            PowerAction::Stop => MiningStatus::Idle,
            PowerAction::Start => MiningStatus::Mining,
        };
        self.set_device_status(device_id, status);
        Ok(())
    }
}

#[derive(Default)]
struct ProcessInner {
    processes: Vec<ProcessEntry>,
    killed: Vec<u32>,
}

#[derive(Clone, Default)]
pub struct FakeProcessTable {
    inner: Rc<RefCell<ProcessInner>>,
}

impl FakeProcessTable {
    pub fn new(processes: &[(u32, &str)]) -> Self {
        let table = Self::default();
        table.inner.borrow_mut().processes = processes
            .iter()
            .map(|(pid, name)| ProcessEntry {
                pid: *pid,
                name: name.to_string(),
                exe_name: None,
            })
            .collect();
        table
    }

    pub fn insert(&self, entry: ProcessEntry) {
        self.inner.borrow_mut().processes.push(entry);
    }

    pub fn killed(&self) -> Vec<u32> {
        self.inner.borrow().killed.clone()
    }
}

impl ProcessTable for FakeProcessTable {
    fn list_processes(&mut self) -> Vec<ProcessEntry> {
        self.inner.borrow().processes.clone()
    }

    fn terminate(&mut self, pid: u32) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.processes.len();
        inner.processes.retain(|p| p.pid != pid);
        if inner.processes.len() < before {
            inner.killed.push(pid);
            true
        } else {
            false
        }
    }
}

/// Clock that only moves when told to, or when something sleeps on it
#[derive(Clone)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.set(now);
    }

    pub fn advance(&self, secs: u64) {
        self.now.set(self.now.get() + secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration.as_secs());
    }
}
