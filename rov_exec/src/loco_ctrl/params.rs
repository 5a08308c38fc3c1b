//! Parameters structure for LocoCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::LocoCtrlError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Locomotion control.
///
/// The defaults are fitted to the Qtruck tracks on carpet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    // ---- GEOMETRY ----
    /// Separation of the track centres.
    ///
    /// Units: inches
    pub track_sep_in: f64,

    /// Turning efficiency, the fraction of the ideal turn rate achieved
    /// because of track scrub.
    pub turn_eff: f64,

    // ---- MOTOR MODEL ----
    /// Motor command per unit of track speed.
    ///
    /// Units: command/(inches/second)
    pub cmd_per_ips: f64,

    /// Motor command at which a track starts to move (linear fit offset).
    pub min_cmd: f64,

    /// Largest motor command.
    pub full_cmd: f64,

    /// Motor commands below this are sent as zero since the motor doesn't
    /// move.
    pub deadband_cmd: f64,

    /// Fudge factor on the back computed speeds for timing lag.
    pub lag_factor: f64,

    // ---- SPEED CORRECTION ----
    /// Bound on the forward speed error accumulator.
    ///
    /// Units: inches/second
    pub max_speed_corr_ips: f64,

    /// Bound on the turn rate error accumulator.
    ///
    /// Units: degrees/second
    pub max_rate_corr_dps: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            track_sep_in: 4.80,
            turn_eff: 0.80,
            cmd_per_ips: 12.0,
            min_cmd: 35.0,
            full_cmd: 100.0,
            deadband_cmd: 50.0,
            lag_factor: 0.94,
            max_speed_corr_ips: 6.0,
            max_rate_corr_dps: 100.0,
        }
    }
}

impl Params {
    /// Check the parameters describe a drivable robot.
    pub fn validate(&self) -> Result<(), LocoCtrlError> {
        let positive = [
            ("track_sep_in", self.track_sep_in),
            ("turn_eff", self.turn_eff),
            ("cmd_per_ips", self.cmd_per_ips),
            ("full_cmd", self.full_cmd),
        ];
        for (name, v) in positive.iter() {
            if !(v.is_finite() && *v > 0.0) {
                return Err(LocoCtrlError::InvalidParams(format!(
                    "{} must be positive, got {}",
                    name, v
                )));
            }
        }

        let non_negative = [
            ("min_cmd", self.min_cmd),
            ("deadband_cmd", self.deadband_cmd),
            ("lag_factor", self.lag_factor),
            ("max_speed_corr_ips", self.max_speed_corr_ips),
            ("max_rate_corr_dps", self.max_rate_corr_dps),
        ];
        for (name, v) in non_negative.iter() {
            if !(v.is_finite() && *v >= 0.0) {
                return Err(LocoCtrlError::InvalidParams(format!(
                    "{} must not be negative, got {}",
                    name, v
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_valid() {
        assert!(Params::default().validate().is_ok());
    }

    #[test]
    fn test_invalid() {
        let p = Params {
            track_sep_in: 0.0,
            ..Default::default()
        };
        assert!(p.validate().is_err());

        let p = Params {
            max_rate_corr_dps: -1.0,
            ..Default::default()
        };
        assert!(p.validate().is_err());
    }
}
