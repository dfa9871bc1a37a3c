// Rig Module - Mining device control
//
// Device-fleet API access, the status probe built on it, local process
// control for hung miners, and the process-wide rig state

pub mod fleet;
pub mod nicehash;
pub mod probe;
pub mod process;
pub mod state;

pub use fleet::{DeviceSummary, FleetApi, RigDetail, RigOverview};
pub use nicehash::NiceHashClient;
pub use probe::RigStatusProbe;
pub use process::{ProcessTable, SysinfoProcessTable};
pub use state::RigState;
