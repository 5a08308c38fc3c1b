//! # Rover Executable Parameters
//!
//! This module provide parameters for the rover executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::{arm_ctrl, loco_ctrl};
use util::params::{self, LoadError};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ExecParamsError {
    #[error("Parameter {0} has invalid value {1}")]
    InvalidParam(&'static str, f64),
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RovExecParams {
    /// Target period of the control loop.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Directory holding the per-robot calibration files, relative to the
    /// working directory unless absolute.
    pub calib_dir: String,

    /// How long to wait for the robot to acknowledge the final stop command.
    ///
    /// Units: seconds
    pub stop_ack_timeout_s: f64,
}

/// Everything needed to start a link, loaded from the params directory.
#[derive(Debug, Clone, Default)]
pub struct LinkConfig {
    /// Executable parameters, from `rov_exec.toml`
    pub exec: RovExecParams,

    /// Arm control parameters, from `arm_ctrl.toml`
    pub arm_ctrl: arm_ctrl::Params,

    /// Locomotion control parameters, from `loco_ctrl.toml`
    pub loco_ctrl: loco_ctrl::Params,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for RovExecParams {
    fn default() -> Self {
        Self {
            cycle_period_s: 0.033,
            calib_dir: String::from("config"),
            stop_ack_timeout_s: 1.0,
        }
    }
}

impl RovExecParams {
    /// Check the timing parameters are usable.
    pub fn validate(&self) -> Result<(), ExecParamsError> {
        if !(self.cycle_period_s.is_finite() && self.cycle_period_s > 0.0 && self.cycle_period_s < 60.0) {
            return Err(ExecParamsError::InvalidParam("cycle_period_s", self.cycle_period_s));
        }
        if !(self.stop_ack_timeout_s.is_finite()
            && self.stop_ack_timeout_s >= 0.0
            && self.stop_ack_timeout_s < 60.0)
        {
            return Err(ExecParamsError::InvalidParam(
                "stop_ack_timeout_s",
                self.stop_ack_timeout_s,
            ));
        }

        Ok(())
    }

    /// Number of cycles in one second, at least 1.
    pub fn cycles_per_second(&self) -> u64 {
        if self.cycle_period_s > 0.0 {
            ((1.0 / self.cycle_period_s).round() as u64).max(1)
        }
        else {
            1
        }
    }
}

impl LinkConfig {
    /// Load all parameter files.
    pub fn load() -> Result<Self, LoadError> {
        Ok(Self {
            exec: params::load("rov_exec.toml")?,
            arm_ctrl: params::load("arm_ctrl.toml")?,
            loco_ctrl: params::load("loco_ctrl.toml")?,
        })
    }

    /// Load all parameter files from the given directory.
    pub fn load_from<P: AsRef<Path>>(params_dir: P) -> Result<Self, LoadError> {
        let dir = params_dir.as_ref();

        Ok(Self {
            exec: params::load_path(dir.join("rov_exec.toml"))?,
            arm_ctrl: params::load_path(dir.join("arm_ctrl.toml"))?,
            loco_ctrl: params::load_path(dir.join("loco_ctrl.toml"))?,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_file() {
        let p: RovExecParams = toml::from_str("calib_dir = \"/tmp/cal\"").unwrap();
        assert_eq!(p.calib_dir, "/tmp/cal");
        assert_eq!(p.cycle_period_s, 0.033);
        assert_eq!(p.stop_ack_timeout_s, 1.0);
    }

    #[test]
    fn test_validate() {
        assert!(RovExecParams::default().validate().is_ok());

        for bad in &[0.0, -0.1, f64::NAN, f64::INFINITY] {
            let p = RovExecParams {
                cycle_period_s: *bad,
                ..Default::default()
            };
            assert!(p.validate().is_err());

            let p = RovExecParams {
                stop_ack_timeout_s: *bad,
                ..Default::default()
            };
            assert_eq!(p.validate().is_err(), *bad != 0.0);
        }
    }

    #[test]
    fn test_load_from() {
        let dir = std::env::temp_dir().join(format!("qtruck_params_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("rov_exec.toml"), "cycle_period_s = 0.05\n").unwrap();
        std::fs::write(dir.join("arm_ctrl.toml"), "").unwrap();
        std::fs::write(dir.join("loco_ctrl.toml"), "turn_eff = 0.7\n").unwrap();

        let cfg = LinkConfig::load_from(&dir).unwrap();
        assert_eq!(cfg.exec.cycle_period_s, 0.05);
        assert_eq!(cfg.arm_ctrl.jaw_in, 1.93);
        assert_eq!(cfg.loco_ctrl.turn_eff, 0.7);

        // A missing file is an error
        std::fs::remove_file(dir.join("arm_ctrl.toml")).unwrap();
        assert!(matches!(
            LinkConfig::load_from(&dir),
            Err(LoadError::FileLoadError(_))
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_cycles_per_second() {
        assert_eq!(RovExecParams::default().cycles_per_second(), 30);

        let p = RovExecParams {
            cycle_period_s: 0.0,
            ..Default::default()
        };
        assert_eq!(p.cycles_per_second(), 1);
    }
}
