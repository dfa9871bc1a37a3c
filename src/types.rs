// rigpause Type Definitions
//
// This module contains the shared data structures passed between the
// session tracker, the rig probe and the control loop.

use std::collections::HashSet;
use std::fmt;

/// A transcoding stream, keyed by user and session guid
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamIdentity {
    pub user: String,
    pub session_guid: String,
}

impl StreamIdentity {
    pub fn new(user: impl Into<String>, session_guid: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            session_guid: session_guid.into(),
        }
    }
}

impl fmt::Display for StreamIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.session_guid)
    }
}

/// Active transcoding streams seen in one poll. Replaced wholesale each tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamSet {
    streams: HashSet<StreamIdentity>,
}

impl StreamSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Streams present here but not in `previous`, and the reverse
    pub fn delta(&self, previous: &StreamSet) -> StreamDelta {
        let mut new: Vec<StreamIdentity> =
            self.streams.difference(&previous.streams).cloned().collect();
        let mut ended: Vec<StreamIdentity> =
            previous.streams.difference(&self.streams).cloned().collect();
        new.sort();
        ended.sort();
        StreamDelta { new, ended }
    }
}

impl FromIterator<StreamIdentity> for StreamSet {
    fn from_iter<I: IntoIterator<Item = StreamIdentity>>(iter: I) -> Self {
        Self {
            streams: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for StreamSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self.streams.iter().map(|s| s.to_string()).collect();
        names.sort();
        write!(f, "[{}]", names.join(", "))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamDelta {
    pub new: Vec<StreamIdentity>,
    pub ended: Vec<StreamIdentity>,
}

impl StreamDelta {
    pub fn has_new(&self) -> bool {
        !self.new.is_empty()
    }
}

/// Operating status of a mining device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiningStatus {
    Mining,
    Idle,
    Unknown,
}

impl MiningStatus {
    /// Map a NiceHash `enumName` / `minerStatus` string
    pub fn from_enum_name(name: &str) -> Self {
        match name {
            "MINING" => MiningStatus::Mining,
            "UNKNOWN" => MiningStatus::Unknown,
            _ => MiningStatus::Idle,
        }
    }

    pub fn is_mining(self) -> bool {
        self == MiningStatus::Mining
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    Stop,
    Start,
}

impl PowerAction {
    pub fn as_str(self) -> &'static str {
        match self {
            PowerAction::Stop => "STOP",
            PowerAction::Start => "START",
        }
    }
}

impl fmt::Display for PowerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The managed device, resolved once at startup.
///
/// `index` is the device's position in the rig's device list. It is a cache
/// for responses that omit device ids and is only valid for the device list
/// it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub rig_id: String,
    pub device_id: String,
    pub name: String,
    pub index: usize,
}

/// Control loop phase. Streams already playing when the loop starts must not
/// trigger a pause, so arming is only allowed once `Monitoring`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Starting,
    Monitoring,
}
