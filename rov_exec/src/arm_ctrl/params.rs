//! Parameters structure for ArmCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::ArmCtrlError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Arm control.
///
/// The defaults are the nominal Qtruck mechanics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    // ---- ARM GEOMETRY ----
    /// Distance of the base rotation axis in front of the body centre.
    ///
    /// Units: inches
    pub base_fwd_in: f64,

    /// Radial offset from the base axis to the shoulder.
    ///
    /// Units: inches
    pub shoulder_radial_in: f64,

    /// Height of the upper shoulder joint above the floor.
    ///
    /// Units: inches
    pub shoulder_height_in: f64,

    /// Length of the four bar lift linkage.
    ///
    /// Units: inches
    pub lift_link_in: f64,

    // ---- HAND GEOMETRY ----
    /// Distance of the finger servo out from the wrist.
    ///
    /// Units: inches
    pub finger_out_in: f64,

    /// Distance of the fingers below the upper pivot.
    ///
    /// Units: inches
    pub finger_down_in: f64,

    /// Separation of the two finger axes.
    ///
    /// Units: inches
    pub finger_sep_in: f64,

    /// Length from a finger axis to the inner grip surface.
    ///
    /// Units: inches
    pub jaw_in: f64,

    /// Forward extension of the fingertips past the finger axes.
    ///
    /// Units: inches
    pub finger_ext_in: f64,

    /// Grip angle of fully closed fingers.
    ///
    /// Units: degrees
    pub grip_closed_deg: f64,

    // ---- CAMERA GEOMETRY ----
    /// Camera offset along the lift link.
    ///
    /// Units: inches
    pub cam_along_in: f64,

    /// Camera offset orthogonal to the lift link.
    ///
    /// Units: inches
    pub cam_ortho_in: f64,

    // ---- CAPABILITIES ----
    /// Hard physical range of the base joint.
    ///
    /// Units: degrees
    pub base_limits_deg: [f64; 2],

    /// Hard physical range of the lift joint.
    ///
    /// Units: degrees
    pub lift_limits_deg: [f64; 2],

    /// Hard physical range of the grip joint.
    ///
    /// Units: degrees
    pub grip_limits_deg: [f64; 2],

    /// Slowest rate a joint is stepped at, below this the servo gears bind.
    ///
    /// Units: degrees/second
    pub min_ramp_rate_dps: f64,

    /// Base angle beyond which the arm can hit the corners of the body.
    ///
    /// Units: degrees
    pub collision_base_deg: f64,

    /// Lift angle which clears the corners of the body.
    ///
    /// Units: degrees
    pub collision_lift_clear_deg: f64,

    // ---- START POSE ----
    /// Base angle on startup, also the home pose.
    ///
    /// Units: degrees
    pub base_home_deg: f64,

    /// Lift angle on startup, also the home pose.
    ///
    /// Units: degrees
    pub lift_home_deg: f64,

    /// Grip angle on startup.
    ///
    /// Units: degrees
    pub grip_start_deg: f64,

    // ---- DEFAULT SPEEDS ----
    /// Default rate for gaze requests.
    ///
    /// Units: degrees/second
    pub gaze_rate_dps: f64,

    /// Default rate for home requests.
    ///
    /// Units: degrees/second
    pub home_rate_dps: f64,

    /// Default hand speed for reach requests.
    ///
    /// Units: inches/second
    pub reach_speed_ips: f64,

    /// Default fingertip speed for grip requests.
    ///
    /// Units: inches/second
    pub grip_speed_ips: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            base_fwd_in: 1.14,
            shoulder_radial_in: 0.35,
            shoulder_height_in: 3.15,
            lift_link_in: 2.36,
            finger_out_in: 1.30,
            finger_down_in: 1.46,
            finger_sep_in: 0.87,
            jaw_in: 1.93,
            finger_ext_in: 1.88,
            grip_closed_deg: 13.0,
            cam_along_in: 2.36,
            cam_ortho_in: 1.69,
            base_limits_deg: [-90.0, 90.0],
            lift_limits_deg: [-30.0, 40.0],
            grip_limits_deg: [-15.0, 55.0],
            min_ramp_rate_dps: 90.0,
            collision_base_deg: 36.0,
            collision_lift_clear_deg: 0.0,
            base_home_deg: 0.0,
            lift_home_deg: 25.0,
            grip_start_deg: 20.0,
            gaze_rate_dps: 90.0,
            home_rate_dps: 90.0,
            reach_speed_ips: 6.0,
            grip_speed_ips: 5.0,
        }
    }
}

impl Params {
    /// Check the parameters describe a buildable arm.
    pub fn validate(&self) -> Result<(), ArmCtrlError> {
        let lengths = [
            ("lift_link_in", self.lift_link_in),
            ("jaw_in", self.jaw_in),
            ("min_ramp_rate_dps", self.min_ramp_rate_dps),
        ];
        for (name, v) in lengths.iter() {
            if !(v.is_finite() && *v > 0.0) {
                return Err(ArmCtrlError::InvalidParams(format!(
                    "{} must be positive, got {}",
                    name, v
                )));
            }
        }

        let others = [
            ("base_fwd_in", self.base_fwd_in),
            ("shoulder_radial_in", self.shoulder_radial_in),
            ("shoulder_height_in", self.shoulder_height_in),
            ("finger_out_in", self.finger_out_in),
            ("finger_down_in", self.finger_down_in),
            ("finger_sep_in", self.finger_sep_in),
            ("finger_ext_in", self.finger_ext_in),
            ("grip_closed_deg", self.grip_closed_deg),
            ("cam_along_in", self.cam_along_in),
            ("cam_ortho_in", self.cam_ortho_in),
            ("collision_base_deg", self.collision_base_deg),
            ("collision_lift_clear_deg", self.collision_lift_clear_deg),
            ("gaze_rate_dps", self.gaze_rate_dps),
            ("home_rate_dps", self.home_rate_dps),
            ("reach_speed_ips", self.reach_speed_ips),
            ("grip_speed_ips", self.grip_speed_ips),
        ];
        for (name, v) in others.iter() {
            if !v.is_finite() {
                return Err(ArmCtrlError::InvalidParams(format!(
                    "{} must be finite, got {}",
                    name, v
                )));
            }
        }

        let limits = [
            ("base", self.base_limits_deg, self.base_home_deg),
            ("lift", self.lift_limits_deg, self.lift_home_deg),
            ("grip", self.grip_limits_deg, self.grip_start_deg),
        ];
        for (name, lim, start) in limits.iter() {
            if !(lim[0].is_finite() && lim[1].is_finite() && lim[0] < lim[1]) {
                return Err(ArmCtrlError::InvalidParams(format!(
                    "{} limits {:?} must be finite and increasing",
                    name, lim
                )));
            }
            if !(*start >= lim[0] && *start <= lim[1]) {
                return Err(ArmCtrlError::InvalidParams(format!(
                    "{} start angle {} outside limits {:?}",
                    name, start, lim
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
            lift_link_in: 0.0,
            ..Default::default()
        };
        assert!(p.validate().is_err());

        let p = Params {
            jaw_in: f64::NAN,
            ..Default::default()
        };
        assert!(p.validate().is_err());

        let p = Params {
            grip_limits_deg: [55.0, -15.0],
            ..Default::default()
        };
        assert!(p.validate().is_err());

        let p = Params {
            lift_home_deg: 60.0,
            ..Default::default()
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_partial_file() {
        let p: Params = toml::from_str("jaw_in = 2.0\nbase_limits_deg = [-80.0, 80.0]").unwrap();
        assert_eq!(p.jaw_in, 2.0);
        assert_eq!(p.base_limits_deg, [-80.0, 80.0]);
        assert_eq!(p.lift_link_in, 2.36);
    }
}
