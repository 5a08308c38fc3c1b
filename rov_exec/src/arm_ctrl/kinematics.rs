//! Arm forward and inverse kinematics
//!
//! The lift is a four bar linkage so the hand stays level and only moves on
//! a thin shell in front of the robot. Reaching aims the base so the hand
//! lies on the line from the shoulder to the target, then picks the lift
//! angle that gets the fingertips to the target height.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use nalgebra::Point3;
use serde::Serialize;
use util::maths::clamp;

// Internal imports
use super::{ArmCtrl, ArmCtrlError, CAM_TILT_OFFSET_DEG};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Hand errors below this are treated as already at the target.
///
/// Units: inches
const MIN_HAND_ERR_IN: f64 = 1e-6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A viewing or pointing direction.
///
/// Units: degrees
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Orient {
    /// Counterclockwise from forward
    pub pan_deg: f64,

    /// Up from horizontal
    pub tilt_deg: f64,

    /// Clockwise about the pointing direction
    pub roll_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ArmCtrl {
    /// Aim the camera in the given direction at the given joint rate.
    ///
    /// Pan is counterclockwise from forward and tilt is up from horizontal.
    /// The camera is on the lift link so this also moves it. Directions
    /// beyond the joint limits stop at the limits.
    pub fn gaze(&mut self, pan_deg: f64, tilt_deg: f64, rate_dps: f64) -> Result<(), ArmCtrlError> {
        check_finite("gaze", &[pan_deg, tilt_deg, rate_dps])?;

        let limited = self.base.set_target(pan_deg - self.calib.cam_pan_off_deg)
            | self.lift.set_target(tilt_deg + CAM_TILT_OFFSET_DEG - self.calib.cam_tilt_off_deg);
        self.arm_rate_dps = rate_dps;
        if limited {
            debug!("ArmCtrl gaze ({:.1}, {:.1}) limited by the joints", pan_deg, tilt_deg);
        }

        debug!(
            "ArmCtrl gaze -> base {:.1}, lift {:.1} at {:.1} dps",
            self.base.target_deg, self.lift.target_deg, rate_dps
        );

        Ok(())
    }

    /// Move the arm back to the high forward facing home pose.
    pub fn home(&mut self, rate_dps: f64) -> Result<(), ArmCtrlError> {
        check_finite("home", &[rate_dps])?;

        self.base.set_target(self.params.base_home_deg);
        self.lift.set_target(self.params.lift_home_deg);
        self.arm_rate_dps = rate_dps;

        Ok(())
    }

    /// Move the fingertips towards a point in the body frame with the given
    /// hand speed.
    ///
    /// Only points on the reachable shell can be met exactly, otherwise the
    /// hand ends up at the closest pose the joint limits allow.
    pub fn reach(&mut self, target: &Point3<f64>, speed_ips: f64) -> Result<(), ArmCtrlError> {
        check_finite("reach", &[target.x, target.y, target.z, speed_ips])?;
        let p = &self.params;

        // Aim so the grasp point is on the line from the shoulder to the target
        let base_deg = -target.x.atan2(target.y - p.base_fwd_in).to_degrees();
        let lift_deg = clamp(
            (target.z + p.finger_down_in - p.shoulder_height_in) / p.lift_link_in,
            -1.0,
            1.0,
        )
        .asin()
        .to_degrees();

        // Both targets must be reachable or the coordinated ramp never
        // finishes
        let limited = self.base.set_target(base_deg) | self.lift.set_target(lift_deg);

        // Joint rate from the hand speed, scaled by how far the worst joint
        // has to go compared to how far the hand has to go
        let max_dev_deg = self
            .base
            .dev_deg(self.base.target_deg)
            .max(self.lift.dev_deg(self.lift.target_deg));
        let err_in = self.hand_err(target);
        let rate_dps = if err_in > MIN_HAND_ERR_IN {
            speed_ips * max_dev_deg / err_in
        }
        else {
            speed_ips
        };

        self.arm_rate_dps = rate_dps;

        debug!(
            "ArmCtrl reach {:?} -> base {:.1}, lift {:.1} at {:.1} dps{}",
            target,
            self.base.target_deg,
            self.lift.target_deg,
            rate_dps,
            if limited { " (limited)" } else { "" }
        );

        Ok(())
    }

    /// Open or close the fingers to the given tip separation.
    ///
    /// The servo may stall before getting there if holding something.
    pub fn grip(&mut self, width_in: f64, speed_ips: f64) -> Result<(), ArmCtrlError> {
        check_finite("grip", &[width_in, speed_ips])?;
        let p = &self.params;

        let grip_deg = clamp((width_in - p.finger_sep_in) / (2.0 * p.jaw_in), -1.0, 1.0)
            .asin()
            .to_degrees();
        self.grip_rate_dps = 90.0 * speed_ips / (std::f64::consts::PI * p.jaw_in);
        self.grip.set_target(grip_deg);

        Ok(())
    }

    /// Get the location of the camera in the body frame.
    pub fn cam_loc(&self) -> Point3<f64> {
        let p = &self.params;
        let b = self.base.now_deg.to_radians();
        let s = self.lift.now_deg.to_radians();

        let r = p.shoulder_radial_in + p.cam_along_in * s.cos() - p.cam_ortho_in * s.sin();

        Point3::new(
            -r * b.sin(),
            r * b.cos() + p.base_fwd_in,
            p.shoulder_height_in + p.cam_along_in * s.sin() + p.cam_ortho_in * s.cos(),
        )
    }

    /// Get the viewing direction of the camera.
    pub fn cam_dir(&self) -> Orient {
        Orient {
            pan_deg: self.base.now_deg + self.calib.cam_pan_off_deg,
            tilt_deg: self.lift.now_deg - CAM_TILT_OFFSET_DEG + self.calib.cam_tilt_off_deg,
            roll_deg: self.calib.cam_roll_off_deg,
        }
    }

    /// Get the location of the fingertips in the body frame.
    pub fn hand_loc(&self) -> Point3<f64> {
        let p = &self.params;
        let b = self.base.now_deg.to_radians();
        let s = self.lift.now_deg.to_radians();

        let r = p.shoulder_radial_in + p.lift_link_in * s.cos() + p.finger_out_in + p.finger_ext_in;

        Point3::new(
            -r * b.sin(),
            r * b.cos() + p.base_fwd_in,
            p.shoulder_height_in + p.lift_link_in * s.sin() - p.finger_down_in,
        )
    }

    /// Get the pointing direction of the fingers. The hand is always level.
    pub fn hand_dir(&self) -> Orient {
        Orient {
            pan_deg: self.base.now_deg,
            tilt_deg: 0.0,
            roll_deg: 0.0,
        }
    }

    /// Get the distance from the fingertips to the given point.
    ///
    /// Units: inches
    pub fn hand_err(&self, target: &Point3<f64>) -> f64 {
        nalgebra::distance(&self.hand_loc(), target)
    }

    /// Get how far the worst of the base and lift joints is from the home
    /// pose.
    ///
    /// Units: degrees
    pub fn astray(&self) -> f64 {
        self.base
            .dev_deg(self.params.base_home_deg)
            .max(self.lift.dev_deg(self.params.lift_home_deg))
    }

    /// Get the nominal fingertip separation.
    ///
    /// Units: inches
    pub fn width(&self) -> f64 {
        self.params.finger_sep_in + 2.0 * self.params.jaw_in * self.grip.now_deg.to_radians().sin()
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn check_finite(request: &str, values: &[f64]) -> Result<(), ArmCtrlError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    }
    else {
        Err(ArmCtrlError::InvalidTarget(format!("{} {:?}", request, values)))
    }
}
