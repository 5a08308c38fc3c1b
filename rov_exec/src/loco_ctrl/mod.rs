//! # Locomotion control module
//!
//! The robot drives on two tracks with no wheel encoders, so the track
//! speeds are open loop. This module corrects requested speeds using the
//! speeds the previous motor commands should have achieved, mixes forward
//! and turn speeds into left and right track commands, and back computes
//! the achievable speeds from the commands actually sent.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod calc_skid_steer;
mod cmd;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use cmd::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during LocoCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum LocoCtrlError {
    #[error("Invalid locomotion parameters: {0}")]
    InvalidParams(String),

    #[error("Received an invalid drive command: {0:?}")]
    InvalidDriveCmd(DriveCmd),
}
