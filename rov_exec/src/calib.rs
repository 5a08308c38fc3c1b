//! # Per-robot calibration
//!
//! Each robot has a small text file `<device_id>_calib.cfg` holding its name
//! and the servo and camera offsets measured for that unit:
//!
//! ```text
//! Waldo
//! 1.5 -2 0
//! 0 3.5 -1
//! ```
//!
//! Line 2 is the base, lift and grip servo offsets, line 3 the camera pan,
//! tilt and roll offsets, all in degrees.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Name used when no calibration is available.
pub const DEFAULT_NAME: &str = "Waldo";

/// Suffix appended to the device identifier to get the file name.
const CALIB_FILE_SUFFIX: &str = "_calib.cfg";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Calibration values for one robot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Calib {
    /// Name of the robot
    pub name: String,

    /// Base servo offset, degrees
    pub base_off_deg: f64,

    /// Lift servo offset, degrees
    pub lift_off_deg: f64,

    /// Grip servo offset, degrees
    pub grip_off_deg: f64,

    /// Camera pan offset, degrees
    pub cam_pan_off_deg: f64,

    /// Camera tilt offset, degrees
    pub cam_tilt_off_deg: f64,

    /// Camera roll offset, degrees
    pub cam_roll_off_deg: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CalibError {
    #[error("Cannot read calibration file {0:?}: {1}")]
    FileLoadError(PathBuf, std::io::Error),

    #[error("Calibration file is missing line {0}")]
    MissingLine(usize),

    #[error("Line {0} of the calibration file must hold 3 numbers, found {1:?}")]
    InvalidTriple(usize, String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for Calib {
    fn default() -> Self {
        Self {
            name: String::from(DEFAULT_NAME),
            base_off_deg: 0.0,
            lift_off_deg: 0.0,
            grip_off_deg: 0.0,
            cam_pan_off_deg: 0.0,
            cam_tilt_off_deg: 0.0,
            cam_roll_off_deg: 0.0,
        }
    }
}

impl Calib {
    /// Get the path of the calibration file for the given device.
    pub fn file_path<P: AsRef<Path>>(calib_dir: P, device_id: &str) -> PathBuf {
        calib_dir
            .as_ref()
            .join(format!("{}{}", device_id, CALIB_FILE_SUFFIX))
    }

    /// Load the calibration for the given device.
    pub fn load<P: AsRef<Path>>(calib_dir: P, device_id: &str) -> Result<Self, CalibError> {
        let path = Self::file_path(calib_dir, device_id);

        let text = std::fs::read_to_string(&path)
            .map_err(|e| CalibError::FileLoadError(path.clone(), e))?;

        Self::parse(&text)
    }

    /// Load the calibration for the given device, falling back on the
    /// defaults (no offsets) if it can't be loaded.
    pub fn load_or_default<P: AsRef<Path>>(calib_dir: P, device_id: &str) -> Self {
        match Self::load(calib_dir, device_id) {
            Ok(c) => {
                info!("Loaded calibration for {} ({})", c.name, device_id);
                c
            }
            Err(e) => {
                warn!("{}, using default calibration", e);
                Self::default()
            }
        }
    }

    /// Parse the contents of a calibration file.
    pub fn parse(text: &str) -> Result<Self, CalibError> {
        let mut lines = text.lines();

        let name = lines
            .next()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(CalibError::MissingLine(1))?;

        let servo = parse_triple(lines.next(), 2)?;
        let cam = parse_triple(lines.next(), 3)?;

        Ok(Self {
            name: String::from(name),
            base_off_deg: servo[0],
            lift_off_deg: servo[1],
            grip_off_deg: servo[2],
            cam_pan_off_deg: cam[0],
            cam_tilt_off_deg: cam[1],
            cam_roll_off_deg: cam[2],
        })
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Parse a line of three whitespace separated finite numbers.
fn parse_triple(line: Option<&str>, line_num: usize) -> Result<[f64; 3], CalibError> {
    let line = line.ok_or(CalibError::MissingLine(line_num))?;
    let invalid = || CalibError::InvalidTriple(line_num, String::from(line));

    let mut vals = [0.0; 3];
    let mut tokens = line.split_whitespace();
    for v in vals.iter_mut() {
        *v = tokens
            .next()
            .and_then(|t| t.parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .ok_or_else(invalid)?;
    }

    if tokens.next().is_some() {
        return Err(invalid());
    }

    Ok(vals)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() {
        let c = Calib::parse("Bob\n1.5 -2 0\n0 3.5 -1\n").unwrap();
        assert_eq!(c.name, "Bob");
        assert_eq!(c.base_off_deg, 1.5);
        assert_eq!(c.lift_off_deg, -2.0);
        assert_eq!(c.grip_off_deg, 0.0);
        assert_eq!(c.cam_pan_off_deg, 0.0);
        assert_eq!(c.cam_tilt_off_deg, 3.5);
        assert_eq!(c.cam_roll_off_deg, -1.0);

        // Windows line endings and extra spacing
        let c = Calib::parse("  Bob \r\n 1  2   3\r\n4 5 6").unwrap();
        assert_eq!(c.name, "Bob");
        assert_eq!(c.grip_off_deg, 3.0);
        assert_eq!(c.cam_roll_off_deg, 6.0);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(Calib::parse(""), Err(CalibError::MissingLine(1))));
        assert!(matches!(Calib::parse("Bob\n"), Err(CalibError::MissingLine(2))));
        assert!(matches!(
            Calib::parse("Bob\n1 2\n0 0 0"),
            Err(CalibError::InvalidTriple(2, _))
        ));
        assert!(matches!(
            Calib::parse("Bob\n1 2 3\n0 x 0"),
            Err(CalibError::InvalidTriple(3, _))
        ));
        assert!(matches!(
            Calib::parse("Bob\n1 2 3 4\n0 0 0"),
            Err(CalibError::InvalidTriple(2, _))
        ));
        assert!(matches!(
            Calib::parse("Bob\n1 2 NaN\n0 0 0"),
            Err(CalibError::InvalidTriple(2, _))
        ));
    }

    #[test]
    fn test_load_or_default() {
        let dir = std::env::temp_dir().join(format!("qtruck_calib_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(Calib::file_path(&dir, "AB12"), "Eve\n1 2 3\n4 5 6\n").unwrap();

        let c = Calib::load_or_default(&dir, "AB12");
        assert_eq!(c.name, "Eve");
        assert_eq!(c.cam_pan_off_deg, 4.0);

        // Missing file falls back on the defaults
        let c = Calib::load_or_default(&dir, "nope");
        assert_eq!(c, Calib::default());
        assert_eq!(c.name, DEFAULT_NAME);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
