//! Commands passed into LocoCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A command for the tracks.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum DriveCmd {
    /// Drive at the given speeds, with speed correction.
    Drive {
        /// Forward speed
        ///
        /// Units: inches/second
        speed_ips: f64,

        /// Counterclockwise turn rate
        ///
        /// Units: degrees/second
        rate_dps: f64,
    },

    /// Turn both motors off.
    Stop,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveCmd {
    /// Determine if the command is valid (i.e. all values are finite).
    pub fn is_valid(&self) -> bool {
        match self {
            DriveCmd::Drive {
                speed_ips,
                rate_dps,
            } => speed_ips.is_finite() && rate_dps.is_finite(),
            DriveCmd::Stop => true,
        }
    }
}
