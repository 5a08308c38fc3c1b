//! # Sensor Data
//!
//! The robot reports its raw sensors as a 10 character hexadecimal string
//! (5 bytes):
//!
//! | Byte | Bits 7      | Bits 6-0           |
//! |------|-------------|--------------------|
//! | 0    | compass LSB (8 bits)             |
//! | 1    | compass MSB | tilt + 64          |
//! | 2    | dist MSB    | roll + 64          |
//! | 3    | dist LSB (8 bits)                |
//! | 4    | line mask (high nibble), battery code (low nibble) |

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of characters in a sensor string.
pub const SENS_STR_LEN: usize = 10;

/// Distance reported when the sonar reading is out of range.
///
/// Units: inches
pub const MAX_DIST_IN: f64 = 200.0;

/// Largest sonar reading treated as valid.
///
/// Units: centimeters
const MAX_VALID_DIST_CM: u16 = 400;

/// The compass is mounted facing the rear of the robot.
///
/// Units: degrees
const COMPASS_FRONT_OFFSET_DEG: f64 = 180.0;

/// Offset applied to the 7 bit tilt and roll fields.
const ANGLE_FIELD_OFFSET: i16 = 64;

/// Centimeters per inch.
const CM_PER_IN: f64 = 2.54;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Decoded robot sensor values.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SensData {
    /// Compass heading, counterclockwise from north, robot front.
    ///
    /// Units: degrees, range [0, 360)
    pub comp_deg: f64,

    /// Upwards body angle (front lifted is positive).
    ///
    /// Units: degrees, range -64 to 63
    pub tilt_deg: f64,

    /// Right side lifted up is positive.
    ///
    /// Units: degrees, range -64 to 63
    pub roll_deg: f64,

    /// Forward sonar distance, or [`MAX_DIST_IN`] if out of range.
    ///
    /// Units: inches
    pub dist_in: f64,

    /// 4 bit underneath reflectance, MSB is the leftmost sensor.
    pub line: u8,

    /// Measured battery voltage.
    ///
    /// Units: volts
    pub volt_v: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Reasons a sensor string can be rejected.
#[derive(Debug, Error, PartialEq)]
pub enum SensParseError {
    #[error("Sensor string has {0} characters (expected {})", SENS_STR_LEN)]
    WrongLength(usize),

    #[error("Invalid hex digit {0:?} in the sensor string")]
    InvalidDigit(char),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SensData {
    fn default() -> Self {
        Self {
            comp_deg: 0.0,
            tilt_deg: 0.0,
            roll_deg: 0.0,
            dist_in: 0.0,
            line: 0x0F,
            volt_v: 4.0,
        }
    }
}

impl SensData {
    /// Parse a sensor string.
    ///
    /// Trailing line terminators and whitespace are ignored, everything else
    /// must be exactly [`SENS_STR_LEN`] hex digits.
    pub fn parse(msg: &str) -> Result<Self, SensParseError> {
        let msg = msg.trim_end();

        let num_chars = msg.chars().count();
        if num_chars != SENS_STR_LEN {
            return Err(SensParseError::WrongLength(num_chars));
        }

        let mut bytes = [0u8; SENS_STR_LEN / 2];
        let mut nibbles = msg.chars().map(|c| match c.to_digit(16) {
            Some(d) => Ok(d as u8),
            None => Err(SensParseError::InvalidDigit(c)),
        });
        for byte in bytes.iter_mut() {
            let hi = nibbles.next().unwrap_or(Ok(0))?;
            let lo = nibbles.next().unwrap_or(Ok(0))?;
            *byte = (hi << 4) | lo;
        }

        Ok(Self::from_bytes(&bytes))
    }

    /// Update the data from a sensor string.
    ///
    /// Returns `true` if the string was valid and the data has been replaced.
    /// On an invalid string all values are left as they were.
    pub fn update(&mut self, msg: &str) -> bool {
        match Self::parse(msg) {
            Ok(d) => {
                *self = d;
                true
            }
            Err(_) => false,
        }
    }

    /// Unpack the fields from the raw bytes.
    fn from_bytes(bytes: &[u8; SENS_STR_LEN / 2]) -> Self {
        // Compass is 9 bits, MSB is the top bit of the tilt byte
        let comp_raw = (((bytes[1] & 0x80) as u16) << 1) | bytes[0] as u16;
        let mut comp_deg = comp_raw as f64 + COMPASS_FRONT_OFFSET_DEG;
        if comp_deg >= 360.0 {
            comp_deg -= 360.0;
        }

        let tilt_deg = ((bytes[1] & 0x7F) as i16 - ANGLE_FIELD_OFFSET) as f64;
        let roll_deg = ((bytes[2] & 0x7F) as i16 - ANGLE_FIELD_OFFSET) as f64;

        // Distance is also 9 bits, MSB is the top bit of the roll byte
        let dist_cm = (((bytes[2] & 0x80) as u16) << 1) | bytes[3] as u16;
        let dist_in = if dist_cm > MAX_VALID_DIST_CM || dist_cm == 0 {
            MAX_DIST_IN
        }
        else {
            dist_cm as f64 / CM_PER_IN
        };

        Self {
            comp_deg,
            tilt_deg,
            roll_deg,
            dist_in,
            line: (bytes[4] & 0xF0) >> 4,
            volt_v: 0.05 * (bytes[4] & 0x0F) as f64 + 3.25,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_example() {
        let d = SensData::parse("49090E5032").unwrap();

        assert_eq!(d.comp_deg, 253.0);
        assert_eq!(d.tilt_deg, -55.0);
        assert_eq!(d.roll_deg, -50.0);
        assert!((d.dist_in - 80.0 / 2.54).abs() < 1e-12);
        assert!((d.dist_in - 31.5).abs() < 0.01);
        assert_eq!(d.line, 0x3);
        assert!((d.volt_v - 3.35).abs() < 1e-12);
    }

    #[test]
    fn test_parse_high_bits() {
        // Compass 0x1FF = 511, +180 wrapped = 331. Tilt byte 0xFF -> 127 - 64
        let d = SensData::parse("FFFF8190F0").unwrap();
        assert_eq!(d.comp_deg, (511.0 + 180.0) - 360.0);
        assert_eq!(d.tilt_deg, 63.0);
        assert_eq!(d.roll_deg, -63.0);

        // 0x190 = 400 cm is the furthest valid reading
        assert!((d.dist_in - 400.0 / 2.54).abs() < 1e-12);
        assert_eq!(d.line, 0xF);
        assert!((d.volt_v - 3.25).abs() < 1e-12);

        // Lower case is accepted, 180 + 180 wraps onto 0
        let d = SensData::parse("b400400000").unwrap();
        assert_eq!(d.comp_deg, 0.0);
        assert_eq!(d.tilt_deg, -64.0);
    }

    #[test]
    fn test_parse_dist_sentinel() {
        // 401 cm
        let d = SensData::parse("0000809100").unwrap();
        assert_eq!(d.dist_in, MAX_DIST_IN);

        // 0 cm
        let d = SensData::parse("0000000000").unwrap();
        assert_eq!(d.dist_in, MAX_DIST_IN);
    }

    #[test]
    fn test_parse_trailing_newline() {
        assert!(SensData::parse("49090E5032\r\n").is_ok());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            SensData::parse("49090E503"),
            Err(SensParseError::WrongLength(9))
        );
        assert_eq!(
            SensData::parse("49090E50321"),
            Err(SensParseError::WrongLength(11))
        );
        assert_eq!(
            SensData::parse("49090G5032"),
            Err(SensParseError::InvalidDigit('G'))
        );
        assert_eq!(SensData::parse(""), Err(SensParseError::WrongLength(0)));
    }

    #[test]
    fn test_update_keeps_values_on_bad_input() {
        let mut d = SensData::default();
        assert!(d.update("49090E5032"));
        let before = d;

        for bad in &["", "49090E50", "49090E503Z", "zzzzzzzzzz", " 49090E503", "49090E5032FF"] {
            assert!(!d.update(bad));
            assert_eq!(d.comp_deg.to_bits(), before.comp_deg.to_bits());
            assert_eq!(d.tilt_deg.to_bits(), before.tilt_deg.to_bits());
            assert_eq!(d.roll_deg.to_bits(), before.roll_deg.to_bits());
            assert_eq!(d.dist_in.to_bits(), before.dist_in.to_bits());
            assert_eq!(d.volt_v.to_bits(), before.volt_v.to_bits());
            assert_eq!(d.line, before.line);
        }
    }
}
