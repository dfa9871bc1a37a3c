// Device-Fleet API
//
// Contract for the mining-rig management service and the records it returns

use crate::error::Result;
use crate::types::{MiningStatus, PowerAction};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSummary {
    pub id: String,
    pub name: String,
    pub status: MiningStatus,
}

/// One rig with its devices, in the order the API lists them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RigDetail {
    pub rig_id: String,
    pub miner_status: MiningStatus,
    pub devices: Vec<DeviceSummary>,
}

/// Aggregate status of every rig on the account
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RigOverview {
    pub rigs: Vec<RigDetail>,
    /// Status name -> number of miners in that status
    pub miner_statuses: HashMap<String, u32>,
}

impl RigOverview {
    pub fn rig(&self, rig_id: &str) -> Option<&RigDetail> {
        self.rigs.iter().find(|r| r.rig_id == rig_id)
    }

    /// True when any miner on the account reports UNKNOWN
    pub fn has_unknown(&self) -> bool {
        self.miner_statuses.get("UNKNOWN").copied().unwrap_or(0) > 0
            || self
                .rigs
                .iter()
                .flat_map(|r| r.devices.iter())
                .any(|d| d.status == MiningStatus::Unknown)
    }
}

pub trait FleetApi {
    fn list_rigs(&self) -> Result<RigOverview>;

    fn get_rig_status(&self, rig_id: &str) -> Result<RigDetail>;

    fn set_device_power(&self, rig_id: &str, device_id: &str, action: PowerAction) -> Result<()>;

    fn list_rig_devices(&self, rig_id: &str) -> Result<Vec<DeviceSummary>> {
        Ok(self.get_rig_status(rig_id)?.devices)
    }
}
