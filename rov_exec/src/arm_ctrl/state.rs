//! Implementations for the ArmCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};
use serde::Serialize;

// Internal
use super::{
    coord_steps, max_step_deg, ArmCtrlError, Joint, Params, BASE_SERVO_ZERO_DEG,
    GRIP_SERVO_ZERO_DEG, LIFT_SERVO_ZERO_DEG,
};
use crate::calib::Calib;
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Arm control module state
#[derive(Debug, Default)]
pub struct ArmCtrl {
    pub(crate) params: Params,

    pub(crate) calib: Calib,

    pub(crate) report: StatusReport,

    /// Base rotation joint
    pub(crate) base: Joint,

    /// Lift joint
    pub(crate) lift: Joint,

    /// Grip joint
    pub(crate) grip: Joint,

    /// Requested rate for the base/lift pair, no ramping unless positive.
    ///
    /// Units: degrees/second
    pub(crate) arm_rate_dps: f64,

    /// Requested rate for the grip, no ramping unless positive.
    ///
    /// Units: degrees/second
    pub(crate) grip_rate_dps: f64,
}

/// Initialisation data for Arm Control.
#[derive(Debug, Default, Clone)]
pub struct InitData {
    pub params: Params,
    pub calib: Calib,
}

/// Input data to Arm Control.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputData {
    /// Expected duration of the coming cycle.
    ///
    /// Units: seconds
    pub dt_s: f64,
}

/// Joint angles in servo space, before clipping to the servo ranges.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct ServoAngles {
    pub base_deg: f64,
    pub lift_deg: f64,
    pub grip_deg: f64,
}

/// Status report for ArmCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// Base, lift and grip commands clipped to the joint limits.
    pub abs_pos_limited: [bool; 3],

    /// Base held in place until the lift clears the body.
    pub base_held: bool,

    /// Lift target raised to clear the body.
    pub lift_raised: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for ArmCtrl {
    type InitData = InitData;
    type InitError = ArmCtrlError;

    type InputData = InputData;
    type OutputData = ServoAngles;
    type StatusReport = StatusReport;
    type ProcError = ArmCtrlError;

    /// Initialise the ArmCtrl module.
    ///
    /// The joints start at rest in the start pose with nothing to do.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        init_data.params.validate()?;

        self.params = init_data.params;
        self.calib = init_data.calib;

        self.base = Joint::new(self.params.base_home_deg, self.params.base_limits_deg);
        self.lift = Joint::new(self.params.lift_home_deg, self.params.lift_limits_deg);
        self.grip = Joint::new(self.params.grip_start_deg, self.params.grip_limits_deg);
        self.arm_rate_dps = 0.0;
        self.grip_rate_dps = 0.0;
        self.report = StatusReport::default();

        Ok(())
    }

    /// Ramp the joints towards their targets and get the servo angles.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        self.report = StatusReport::default();

        if !input_data.dt_s.is_finite() {
            return Err(ArmCtrlError::InvalidTarget(format!(
                "cycle duration {}",
                input_data.dt_s
            )));
        }

        self.ramp_arm(input_data.dt_s);
        self.ramp_grip(input_data.dt_s);

        trace!(
            "ArmCtrl cmd [{:.1} {:.1} {:.1}] deg",
            self.base.cmd_deg,
            self.lift.cmd_deg,
            self.grip.cmd_deg
        );

        Ok((self.servo_angles(), self.report))
    }
}

impl ArmCtrl {
    /// Function called when entering safe mode.
    ///
    /// The arm stops where it is.
    pub fn make_safe(&mut self) {
        for j in [&mut self.base, &mut self.lift, &mut self.grip].iter_mut() {
            j.target_deg = j.now_deg;
            j.cmd_deg = j.now_deg;
        }
        self.arm_rate_dps = 0.0;
        self.grip_rate_dps = 0.0;
    }

    /// Convert the commanded joint angles to servo space, applying the
    /// calibration offsets.
    pub fn servo_angles(&self) -> ServoAngles {
        ServoAngles {
            base_deg: self.base.cmd_deg + BASE_SERVO_ZERO_DEG + self.calib.base_off_deg,
            lift_deg: self.lift.cmd_deg + LIFT_SERVO_ZERO_DEG + self.calib.lift_off_deg,
            grip_deg: self.params.grip_closed_deg
                + self.grip.cmd_deg
                + GRIP_SERVO_ZERO_DEG
                + self.calib.grip_off_deg,
        }
    }

    /// Assume the servos reached the given (clipped) servo angles.
    ///
    /// The joint angles are recovered from servo space and clamped to the
    /// joint limits.
    pub fn assume_reached(&mut self, servo: &ServoAngles) {
        self.base
            .set_now(servo.base_deg - BASE_SERVO_ZERO_DEG - self.calib.base_off_deg);
        self.lift
            .set_now(servo.lift_deg - LIFT_SERVO_ZERO_DEG - self.calib.lift_off_deg);
        self.grip.set_now(
            servo.grip_deg
                - GRIP_SERVO_ZERO_DEG
                - self.params.grip_closed_deg
                - self.calib.grip_off_deg,
        );
    }

    /// Get the base joint.
    pub fn base(&self) -> &Joint {
        &self.base
    }

    /// Get the lift joint.
    pub fn lift(&self) -> &Joint {
        &self.lift
    }

    /// Get the grip joint.
    pub fn grip_joint(&self) -> &Joint {
        &self.grip
    }

    /// Get the parameters in use.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Step the base and lift together so they finish at the same time.
    fn ramp_arm(&mut self, dt_s: f64) {
        if self.arm_rate_dps <= 0.0 {
            return;
        }

        let mut base_target = self.base.target_deg;
        let mut lift_target = self.lift.target_deg;

        // Near the corners of the body the lift must clear before the base
        // swings any further
        let clear = self.params.collision_lift_clear_deg;
        if self.base.now_deg.abs() >= self.params.collision_base_deg {
            if self.lift.now_deg < clear {
                base_target = self.base.now_deg;
                self.report.base_held = true;
            }
            if lift_target < clear {
                lift_target = clear;
                self.report.lift_raised = true;
            }
        }

        let step = max_step_deg(self.arm_rate_dps, self.params.min_ramp_rate_dps, dt_s);
        let (base_step, lift_step) = coord_steps(
            step,
            self.base.dev_deg(base_target),
            self.lift.dev_deg(lift_target),
        );

        self.report.abs_pos_limited[0] = self.base.step_towards(base_target, base_step);
        self.report.abs_pos_limited[1] = self.lift.step_towards(lift_target, lift_step);

        if self.report.base_held || self.report.lift_raised {
            debug!(
                "ArmCtrl collision guard active (base {:.1}, lift {:.1})",
                self.base.now_deg, self.lift.now_deg
            );
        }
    }

    /// Step the grip on its own.
    fn ramp_grip(&mut self, dt_s: f64) {
        if self.grip_rate_dps <= 0.0 {
            return;
        }

        let step = max_step_deg(self.grip_rate_dps, self.params.min_ramp_rate_dps, dt_s);
        let target = self.grip.target_deg;
        self.report.abs_pos_limited[2] = self.grip.step_towards(target, step);
    }
}
