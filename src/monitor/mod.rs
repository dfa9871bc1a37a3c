// Monitor Module - Rig health monitoring
//
// This module handles periodic hang detection and external enable/disable
// detection for the managed device

pub mod hang;

pub use hang::{HangMonitor, HangOutcome};
