// Pause Module - Stream-triggered rig pauses
//
// This module owns the pause deadline rules: arm on a new stream, hold the
// device stopped until the deadline, then start it again

pub mod scheduler;

pub use scheduler::{PauseScheduler, PauseStep};
