// Coordinator Module - Control loop orchestration
//
// This module sequences the session poll, the pause rules and the periodic
// hang check on a fixed cadence

pub mod core;

pub use self::core::{Coordinator, CoordinatorSettings};
