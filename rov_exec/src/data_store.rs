//! # Data Store
//!
//! All the state of one robot, owned by the control loop. Behaviours get
//! mutable access to it once per cycle and drive the robot through the
//! request methods (`gaze`, `reach`, `drive`, ...), which only record
//! targets. Nothing reaches the robot until [`DataStore::issue`] encodes the
//! next command string.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::{ActDems, SensData};
use log::{debug, warn};
use nalgebra::Point3;
use thiserror::Error;

use crate::{
    arm_ctrl::{self, ArmCtrl, ArmCtrlError, Orient, ServoAngles},
    calib::Calib,
    loc::{self, Loc, Pose},
    loco_ctrl::{self, DriveCmd, LocoCtrl, LocoCtrlError},
    params::LinkConfig,
};
use util::{maths::lin_map, module::State};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Battery voltage breakpoints and the charge percentage at each.
const BATT_CURVE: [(f64, f64); 4] = [(3.25, 0.0), (3.35, 10.0), (3.5, 20.0), (4.0, 100.0)];

/// Millimeters per inch, for the Cartesian summary.
const MM_PER_IN: f64 = 25.4;

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Errors which prevent the data store being created.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Could not initialise ArmCtrl: {0}")]
    ArmCtrlInitError(ArmCtrlError),

    #[error("Could not initialise LocoCtrl: {0}")]
    LocoCtrlInitError(LocoCtrlError),
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for one robot.
#[derive(Debug)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Number of cycles in one second
    cycles_per_second: u64,

    /// Duration of the last cycle
    ///
    /// Units: seconds
    dt_s: f64,

    // Identity
    calib: Calib,

    // Sensors
    sens: SensData,

    /// True once any sensor string has been decoded
    sens_valid: bool,

    // Localisation
    loc: Loc,
    pub loc_status_rpt: loc::StatusReport,

    // ArmCtrl
    arm_ctrl: ArmCtrl,
    pub arm_ctrl_status_rpt: arm_ctrl::StatusReport,

    // LocoCtrl
    loco_ctrl: LocoCtrl,
    pub loco_ctrl_status_rpt: loco_ctrl::StatusReport,

    // Indicators
    colour: u8,
    mouth: u8,

    // Output
    /// Demands sent with the last command, after clipping
    last_dems: ActDems,

    /// Last command string
    last_cmd: String,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Number of sensor strings rejected as malformed
    pub num_sens_rejected: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Create the data store with every module initialised.
    pub fn new(config: &LinkConfig, calib: Calib) -> Result<Self, SetupError> {
        let mut arm_ctrl = ArmCtrl::default();
        arm_ctrl
            .init(arm_ctrl::InitData {
                params: config.arm_ctrl.clone(),
                calib: calib.clone(),
            })
            .map_err(SetupError::ArmCtrlInitError)?;

        let mut loco_ctrl = LocoCtrl::default();
        loco_ctrl
            .init(config.loco_ctrl.clone())
            .map_err(SetupError::LocoCtrlInitError)?;

        let mut loc = Loc::default();
        match loc.init(Pose::default()) {
            Ok(()) => (),
            Err(e) => match e {},
        }

        let defaults = ActDems::default();

        let mut ds = Self {
            num_cycles: 0,
            is_1_hz_cycle: false,
            cycles_per_second: config.exec.cycles_per_second(),
            dt_s: 0.0,
            calib,
            sens: SensData::default(),
            sens_valid: false,
            loc,
            loc_status_rpt: loc::StatusReport::default(),
            arm_ctrl,
            arm_ctrl_status_rpt: arm_ctrl::StatusReport::default(),
            loco_ctrl,
            loco_ctrl_status_rpt: loco_ctrl::StatusReport::default(),
            colour: defaults.colour,
            mouth: defaults.mouth,
            last_dems: defaults,
            last_cmd: String::new(),
            num_consec_cycle_overruns: 0,
            num_sens_rejected: 0,
        };

        // The start pose encoded without moving anything
        ds.last_dems = ds.current_dems().clipped();
        ds.last_cmd = ds.last_dems.encode();

        Ok(ds)
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self) {
        self.is_1_hz_cycle = self.num_cycles % (self.cycles_per_second as u128) == 0;
    }

    /// Take in the latest sensor string (if any) and update the pose estimate
    /// for the last cycle.
    ///
    /// Returns `true` if a new valid sensor string was decoded. Malformed
    /// strings are dropped and the previous sensor values kept.
    pub fn update(&mut self, sens_str: Option<&str>, dt_s: f64) -> bool {
        self.dt_s = if dt_s.is_finite() { dt_s.max(0.0) } else { 0.0 };

        let mut fresh = false;
        if let Some(msg) = sens_str {
            match SensData::parse(msg) {
                Ok(d) => {
                    self.sens = d;
                    self.sens_valid = true;
                    fresh = true;
                }
                Err(e) => {
                    self.num_sens_rejected += 1;
                    debug!("Dropped sensor string {:?}: {}", msg, e);
                }
            }
        }

        let achieved = self.loco_ctrl.achieved();
        let input = loc::InputData {
            comp_deg: if self.sens_valid {
                Some(self.sens.comp_deg)
            }
            else {
                None
            },
            dt_s: self.dt_s,
            ips: achieved.speed_ips,
            dps: achieved.rate_dps,
        };
        match self.loc.proc(&input) {
            Ok((_, rpt)) => self.loc_status_rpt = rpt,
            Err(e) => match e {},
        }

        fresh
    }

    /// Ramp the arm, then build and return the next command string.
    ///
    /// The servos are assumed to reach whatever was sent, and the achievable
    /// track speeds are back computed from the motor commands sent.
    pub fn issue(&mut self) -> String {
        match self.arm_ctrl.proc(&arm_ctrl::InputData { dt_s: self.dt_s }) {
            Ok((_, rpt)) => self.arm_ctrl_status_rpt = rpt,
            Err(e) => {
                warn!("ArmCtrl error: {}, holding the arm", e);
                self.arm_ctrl.make_safe();
            }
        }

        let dems = self.current_dems().clipped();

        self.arm_ctrl.assume_reached(&ServoAngles {
            base_deg: dems.base_servo_deg,
            lift_deg: dems.lift_servo_deg,
            grip_deg: dems.grip_servo_deg,
        });
        self.loco_ctrl.calc_speeds(dems.left_mot, dems.right_mot);

        self.last_dems = dems;
        self.last_cmd = dems.encode();

        self.last_cmd.clone()
    }

    // ---- ARM REQUESTS ----

    /// Aim the camera, pan counterclockwise and tilt up in degrees.
    ///
    /// With no rate the default gaze rate is used.
    pub fn gaze(&mut self, pan_deg: f64, tilt_deg: f64, rate_dps: Option<f64>) -> Result<(), ArmCtrlError> {
        let rate = rate_dps.unwrap_or(self.arm_ctrl.params().gaze_rate_dps);
        self.arm_ctrl
            .gaze(pan_deg, tilt_deg, rate)
            .map_err(log_rejected)
    }

    /// Move the arm back to the home pose.
    pub fn home(&mut self, rate_dps: Option<f64>) -> Result<(), ArmCtrlError> {
        let rate = rate_dps.unwrap_or(self.arm_ctrl.params().home_rate_dps);
        self.arm_ctrl.home(rate).map_err(log_rejected)
    }

    /// Move the fingertips to a point in the body frame (inches).
    pub fn reach(&mut self, target: &Point3<f64>, speed_ips: Option<f64>) -> Result<(), ArmCtrlError> {
        let speed = speed_ips.unwrap_or(self.arm_ctrl.params().reach_speed_ips);
        self.arm_ctrl.reach(target, speed).map_err(log_rejected)
    }

    /// Set the fingertip separation (inches).
    pub fn grip(&mut self, width_in: f64, speed_ips: Option<f64>) -> Result<(), ArmCtrlError> {
        let speed = speed_ips.unwrap_or(self.arm_ctrl.params().grip_speed_ips);
        self.arm_ctrl.grip(width_in, speed).map_err(log_rejected)
    }

    // ---- DRIVE REQUESTS ----

    /// Drive at the given forward speed (inches/second) and counterclockwise
    /// turn rate (degrees/second).
    ///
    /// An invalid request stops the tracks.
    pub fn drive(&mut self, speed_ips: f64, rate_dps: f64) -> Result<(), LocoCtrlError> {
        let input = loco_ctrl::InputData {
            cmd: Some(DriveCmd::Drive {
                speed_ips,
                rate_dps,
            }),
        };
        let (_, rpt) = self.loco_ctrl.proc(&input)?;
        self.loco_ctrl_status_rpt = rpt;

        Ok(())
    }

    /// Turn both track motors off.
    pub fn stop(&mut self) {
        let input = loco_ctrl::InputData {
            cmd: Some(DriveCmd::Stop),
        };
        match self.loco_ctrl.proc(&input) {
            Ok((_, rpt)) => self.loco_ctrl_status_rpt = rpt,
            Err(e) => {
                warn!("LocoCtrl error on stop: {}", e);
                self.loco_ctrl.make_safe();
            }
        }
    }

    // ---- INDICATORS ----

    /// Set the breathing colour (0-9 = KROYGBPVMW).
    pub fn set_colour(&mut self, colour: u8) {
        self.colour = colour;
    }

    /// Set the mouth brightness (0-2 = off, dim, bright).
    pub fn set_mouth(&mut self, mouth: u8) {
        self.mouth = mouth;
    }

    // ---- ARM STATE ----

    /// Location of the camera in the body frame (inches).
    pub fn cam_loc(&self) -> Point3<f64> {
        self.arm_ctrl.cam_loc()
    }

    /// Viewing direction of the camera.
    pub fn cam_dir(&self) -> Orient {
        self.arm_ctrl.cam_dir()
    }

    /// Location of the fingertips in the body frame (inches).
    pub fn hand_loc(&self) -> Point3<f64> {
        self.arm_ctrl.hand_loc()
    }

    /// Pointing direction of the fingers.
    pub fn hand_dir(&self) -> Orient {
        self.arm_ctrl.hand_dir()
    }

    /// Distance from the fingertips to a point (inches).
    pub fn hand_err(&self, target: &Point3<f64>) -> f64 {
        self.arm_ctrl.hand_err(target)
    }

    /// Degrees the worst arm joint is away from home.
    pub fn astray(&self) -> f64 {
        self.arm_ctrl.astray()
    }

    /// Nominal fingertip separation (inches).
    pub fn width(&self) -> f64 {
        self.arm_ctrl.width()
    }

    // ---- ROBOT STATE ----

    /// Battery charge as a percentage, from the measured voltage.
    pub fn battery(&self) -> f64 {
        let v = self.sens.volt_v;

        if v >= BATT_CURVE[3].0 {
            return 100.0;
        }

        for pair in BATT_CURVE.windows(2).rev() {
            let (lo, hi) = (pair[0], pair[1]);
            if v >= lo.0 {
                return lin_map((lo.0, hi.0), (lo.1, hi.1), v);
            }
        }

        0.0
    }

    /// Smoothed compass heading, `None` before any sensor data.
    pub fn heading(&self) -> Option<f64> {
        self.loc.heading_deg()
    }

    /// Dead reckoned pose in the map frame.
    pub fn pose(&self) -> Pose {
        self.loc.pose()
    }

    /// Latest sensor values.
    pub fn sens(&self) -> &SensData {
        &self.sens
    }

    /// Name of the robot.
    pub fn name(&self) -> &str {
        &self.calib.name
    }

    /// Last command string.
    pub fn last_cmd(&self) -> &str {
        &self.last_cmd
    }

    /// Single line summary of the joints and the hand and camera positions.
    ///
    /// Positions and the grip width are in millimeters.
    pub fn show_xyz(&self) -> String {
        let arm = &self.arm_ctrl;
        let h = self.hand_loc() * MM_PER_IN;
        let c = self.cam_loc() * MM_PER_IN;

        format!(
            "[{:3.0} {:3.0} {:3.0}] --({:4.0})--> hand [{:3.0} {:3.0} {:3.0}] x {:3.0}, \
            cam [{:3.0} {:3.0} {:3.0}] up {:3.0}",
            arm.base().now_deg,
            arm.lift().now_deg,
            arm.grip_joint().now_deg,
            self.hand_dir().pan_deg,
            h.x,
            h.y,
            h.z,
            self.width() * MM_PER_IN,
            c.x,
            c.y,
            c.z,
            self.cam_dir().tilt_deg
        )
    }

    /// Arm control state.
    pub fn arm_ctrl(&self) -> &ArmCtrl {
        &self.arm_ctrl
    }

    /// Locomotion control state.
    pub fn loco_ctrl(&self) -> &LocoCtrl {
        &self.loco_ctrl
    }

    /// Single line summary of the sensors, joints and last command.
    pub fn show(&self) -> String {
        let head = match self.heading() {
            Some(h) => format!("{:5.1}", h),
            None => String::from("  ---"),
        };
        let line = self.sens.line;
        let arm = &self.arm_ctrl;

        format!(
            "head {}, tilt {:3.0}, roll {:3.0}, dist {:5.1}, line {}{}{}{}, bat {:4.2}, \
            servo[{:3.0} {:3.0} {:3.0}] -> cmd \"{}\"",
            head,
            self.sens.tilt_deg,
            self.sens.roll_deg,
            self.sens.dist_in,
            (line >> 3) & 1,
            (line >> 2) & 1,
            (line >> 1) & 1,
            line & 1,
            self.sens.volt_v,
            arm.base().now_deg,
            arm.lift().now_deg,
            arm.grip_joint().now_deg + arm.params().grip_closed_deg,
            self.last_cmd
        )
    }

    /// Assemble the demands from the current module outputs.
    fn current_dems(&self) -> ActDems {
        let servo = self.arm_ctrl.servo_angles();
        let mot = self.loco_ctrl.output();

        ActDems {
            left_mot: mot.left,
            right_mot: mot.right,
            base_servo_deg: servo.base_deg,
            lift_servo_deg: servo.lift_deg,
            grip_servo_deg: servo.grip_deg,
            colour: self.colour,
            mouth: self.mouth,
        }
    }
}

/// Log a rejected arm request on its way back to the caller.
fn log_rejected(e: ArmCtrlError) -> ArmCtrlError {
    warn!("Arm request rejected: {}", e);
    e
}
