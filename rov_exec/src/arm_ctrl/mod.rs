//! # Arm control module
//!
//! The arm is a base rotation joint, a four bar lift and a two finger
//! gripper, all on hobby servos that are open loop. This module turns high
//! level requests (look here, put the hand there, open to this width) into
//! joint targets, ramps the joints towards those targets each cycle, and
//! converts joint angles to servo space for the command string.
//!
//! ## Frames
//!
//! Cartesian quantities are in the robot body frame, in inches: x to the
//! right, y forwards, z up from the floor, origin at the centre of the body.
//! Joint angles are physical angles in degrees: base counterclockwise from
//! forward, lift up from horizontal, grip opening from straight out.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod kinematics;
mod params;
mod ramp;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use kinematics::*;
pub use params::*;
pub use ramp::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Base servo angle at the physical zero.
///
/// Units: degrees (servo space)
pub const BASE_SERVO_ZERO_DEG: f64 = 90.0;

/// Lift servo angle at the physical zero.
///
/// Units: degrees (servo space)
pub const LIFT_SERVO_ZERO_DEG: f64 = 75.0;

/// Grip servo angle at the physical zero, excluding the closed grip angle.
///
/// Units: degrees (servo space)
pub const GRIP_SERVO_ZERO_DEG: f64 = 90.0;

/// Tilt of the camera relative to the lift link.
///
/// Units: degrees
pub const CAM_TILT_OFFSET_DEG: f64 = 15.0;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ArmCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum ArmCtrlError {
    #[error("Invalid arm parameters: {0}")]
    InvalidParams(String),

    #[error("Received a non-finite arm request: {0}")]
    InvalidTarget(String),
}
