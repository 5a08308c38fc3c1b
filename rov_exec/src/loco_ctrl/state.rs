//! Implementations for the LocoCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{trace, warn};
use serde::Serialize;

// Internal
use super::{DriveCmd, LocoCtrlError, Params};
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Locomotion control module state
#[derive(Debug, Default)]
pub struct LocoCtrl {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,

    pub(crate) output: MotorDems,

    /// Direction (-1, 0, +1) of the last requested forward speed
    pub(crate) speed_dir: i8,

    /// Direction (-1, 0, +1) of the last requested turn rate
    pub(crate) rate_dir: i8,

    /// Accumulated forward speed error
    ///
    /// Units: inches/second
    pub(crate) speed_corr_ips: f64,

    /// Accumulated turn rate error
    ///
    /// Units: degrees/second
    pub(crate) rate_corr_dps: f64,

    /// Speeds the last motor commands should achieve
    pub(crate) achieved: Speeds,
}

/// Input data to Locomotion Control.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputData {
    /// The drive command to be executed, or `None` if there is no new
    /// command on this cycle.
    pub cmd: Option<DriveCmd>,
}

/// Motor commands for the two tracks, -100 to 100.
#[derive(Clone, Copy, Serialize, Debug, Default, PartialEq)]
pub struct MotorDems {
    pub left: f64,
    pub right: f64,
}

/// Body speeds.
#[derive(Clone, Copy, Serialize, Debug, Default, PartialEq)]
pub struct Speeds {
    /// Forward speed
    ///
    /// Units: inches/second
    pub speed_ips: f64,

    /// Counterclockwise turn rate
    ///
    /// Units: degrees/second
    pub rate_dps: f64,
}

/// Status report for LocoCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// Speed correction was reset because the kind of motion changed
    pub corr_reset: bool,

    /// Turning was dropped because neither track reached full command
    pub turn_dropped: bool,

    /// Both commands were scaled down to fit the motor range
    pub saturated: bool,

    /// Left and right commands squelched by the deadband
    pub deadband: [bool; 2],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for LocoCtrl {
    type InitData = Params;
    type InitError = LocoCtrlError;

    type InputData = InputData;
    type OutputData = MotorDems;
    type StatusReport = StatusReport;
    type ProcError = LocoCtrlError;

    /// Initialise the LocoCtrl module with the tracks stopped.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        init_data.validate()?;

        *self = Self {
            params: init_data,
            ..Default::default()
        };

        Ok(())
    }

    /// Perform cyclic processing of Locomotion Control.
    ///
    /// With no new command the previous motor commands are kept.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        self.report = StatusReport::default();

        if let Some(cmd) = input_data.cmd {
            if !cmd.is_valid() {
                warn!("Invalid drive command {:?}, stopping", cmd);
                self.make_safe();
                return Err(LocoCtrlError::InvalidDriveCmd(cmd));
            }

            self.output = match cmd {
                DriveCmd::Drive {
                    speed_ips,
                    rate_dps,
                } => {
                    let (speed, rate) = self.servo_correct(speed_ips, rate_dps);
                    self.calc_skid_steer(speed, rate)
                }
                DriveCmd::Stop => MotorDems::default(),
            };
        }

        trace!("LocoCtrl output: {:?}", self.output);

        Ok((self.output, self.report))
    }
}

impl LocoCtrl {
    /// Function called when entering safe mode.
    ///
    /// Must result in no motion of the vehicle
    pub fn make_safe(&mut self) {
        self.output = MotorDems::default();
        self.speed_corr_ips = 0.0;
        self.rate_corr_dps = 0.0;
    }

    /// Get the current motor commands.
    pub fn output(&self) -> MotorDems {
        self.output
    }

    /// Get the speeds the last sent motor commands should achieve.
    pub fn achieved(&self) -> Speeds {
        self.achieved
    }

    /// Get the current speed correction terms.
    pub fn correction(&self) -> Speeds {
        Speeds {
            speed_ips: self.speed_corr_ips,
            rate_dps: self.rate_corr_dps,
        }
    }
}
