//! # Communications interface crate.
//!
//! Provides the wire formats exchanged with the robot and the channel used to
//! hand them between the carrier and the control loop.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Sensor and actuator string definitions for the robot
pub mod eqpt;

/// Latest-value exchange channel
pub mod xchg;
