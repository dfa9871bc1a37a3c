// Rig State
//
// The single process-wide view of the managed device. Owned by the control
// loop and passed by reference to the scheduler and the hang monitor.

use crate::types::MiningStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RigState {
    /// Last known operating status of the device
    pub is_mining: bool,
    /// False while the device is disabled from outside this loop
    pub should_mine: bool,
    /// Unix seconds until which the device stays paused
    pub pause_deadline: Option<u64>,
}

impl RigState {
    /// Initial state from the startup probe. A device that is not mining at
    /// startup is left unmanaged until it is seen mining again.
    pub fn from_initial_status(status: MiningStatus) -> Self {
        let is_mining = status.is_mining();
        Self {
            is_mining,
            should_mine: is_mining,
            pause_deadline: None,
        }
    }

    pub fn is_paused_at(&self, now: u64) -> bool {
        matches!(self.pause_deadline, Some(deadline) if now < deadline)
    }
}
