// Rig Status Probe
//
// Thin adapter over the fleet API for the one managed device. Never touches
// RigState; callers update it only after a call succeeds.

use crate::error::{MonitorError, Result};
use crate::rig::{DeviceSummary, FleetApi, RigDetail, RigOverview};
use crate::types::{DeviceIdentity, MiningStatus, PowerAction};

pub struct RigStatusProbe<F> {
    api: F,
}

impl<F: FleetApi> RigStatusProbe<F> {
    pub fn new(api: F) -> Self {
        Self { api }
    }

    /// Find the configured device by name. Uses `rig_id` when given, else the
    /// first rig on the account. Returns the identity and its current status.
    pub fn resolve_device(
        &self,
        rig_id: Option<&str>,
        device_name: &str,
    ) -> Result<(DeviceIdentity, MiningStatus)> {
        let rig_id = match rig_id {
            Some(id) => id.to_string(),
            None => self
                .api
                .list_rigs()?
                .rigs
                .into_iter()
                .next()
                .map(|rig| rig.rig_id)
                .ok_or_else(|| MonitorError::NotFound("no mining rigs on account".to_string()))?,
        };

        let devices = self.api.list_rig_devices(&rig_id).map_err(|e| match e {
            MonitorError::NotFound(_) => MonitorError::NotFound(format!("rig '{}'", rig_id)),
            other => other,
        })?;

        let (index, device) = devices
            .into_iter()
            .enumerate()
            .find(|(_, d)| d.name == device_name)
            .ok_or_else(|| {
                MonitorError::NotFound(format!("device '{}' on rig '{}'", device_name, rig_id))
            })?;

        tracing::info!(
            "[RigProbe] Resolved '{}' -> rig={}, device={}, index={}, status={:?}",
            device_name,
            rig_id,
            device.id,
            index,
            device.status
        );

        let identity = DeviceIdentity {
            rig_id,
            device_id: device.id,
            name: device.name,
            index,
        };

        Ok((identity, device.status))
    }

    pub fn get_status(&self, device: &DeviceIdentity) -> Result<MiningStatus> {
        let rig = self.api.get_rig_status(&device.rig_id)?;
        Ok(find_device(&rig, device)
            .map(|d| d.status)
            .unwrap_or(rig.miner_status))
    }

    pub fn set_power(&self, device: &DeviceIdentity, action: PowerAction) -> Result<()> {
        self.api
            .set_device_power(&device.rig_id, &device.device_id, action)
            .map_err(|e| match e {
                MonitorError::CommandFailed(msg) => MonitorError::CommandFailed(msg),
                other => MonitorError::CommandFailed(format!("{} {}: {}", action, device.name, other)),
            })
    }

    /// Aggregate status of all rigs, used by the hang monitor
    pub fn overview(&self) -> Result<RigOverview> {
        self.api.list_rigs()
    }
}

/// Status of `device` within an aggregate overview
pub fn device_status_in(overview: &RigOverview, device: &DeviceIdentity) -> Option<MiningStatus> {
    overview
        .rig(&device.rig_id)
        .and_then(|rig| find_device(rig, device))
        .map(|d| d.status)
}

// Id first; the cached index covers responses without ids
fn find_device<'a>(rig: &'a RigDetail, device: &DeviceIdentity) -> Option<&'a DeviceSummary> {
    rig.devices
        .iter()
        .find(|d| d.id == device.device_id)
        .or_else(|| {
            rig.devices
                .get(device.index)
                .filter(|d| d.id.is_empty())
        })
}
