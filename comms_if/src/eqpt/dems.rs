//! # Actuator Demands
//!
//! Demands are sent to the robot as a 13 character decimal string:
//!
//! ```text
//! LL RR BBB FF GG C M
//! ```
//!
//! - `LL`, `RR`: left/right track motor codes (0-99, 49 is stopped)
//! - `BBB`: base servo angle (0-180)
//! - `FF`: lift servo angle minus 25
//! - `GG`: grip servo angle minus 65
//! - `C`: breathing colour (0-9 = KROYGBPVMW)
//! - `M`: mouth LEDs (0-2 = off, dim, bright)

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use util::maths::clamp;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of characters in a command string.
pub const CMD_STR_LEN: usize = 13;

/// Range of the logical motor command.
pub const MOT_RANGE: (f64, f64) = (-100.0, 100.0);

/// Range of the base servo angle.
///
/// Units: degrees (servo space)
pub const BASE_SERVO_RANGE_DEG: (f64, f64) = (0.0, 180.0);

/// Range of the lift servo angle.
///
/// Units: degrees (servo space)
pub const LIFT_SERVO_RANGE_DEG: (f64, f64) = (30.0, 120.0);

/// Range of the grip servo angle.
///
/// Units: degrees (servo space)
pub const GRIP_SERVO_RANGE_DEG: (f64, f64) = (80.0, 145.0);

/// Largest colour code.
pub const MAX_COLOUR: u8 = 9;

/// Largest mouth code.
pub const MAX_MOUTH: u8 = 2;

/// Motor code sent for any command inside the motor deadband.
pub const MOT_DEADBAND_CODE: i64 = 49;

/// Offset subtracted from the lift servo angle before sending.
const LIFT_FIELD_OFFSET: i64 = 25;

/// Offset subtracted from the grip servo angle before sending.
const GRIP_FIELD_OFFSET: i64 = 65;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Demands for every actuator on the robot.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ActDems {
    /// Left track motor command, -100 to 100.
    pub left_mot: f64,

    /// Right track motor command, -100 to 100.
    pub right_mot: f64,

    /// Base servo angle.
    ///
    /// Units: degrees (servo space)
    pub base_servo_deg: f64,

    /// Lift servo angle.
    ///
    /// Units: degrees (servo space)
    pub lift_servo_deg: f64,

    /// Grip servo angle.
    ///
    /// Units: degrees (servo space)
    pub grip_servo_deg: f64,

    /// Breathing colour code.
    pub colour: u8,

    /// Mouth brightness code.
    pub mouth: u8,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl Default for ActDems {
    fn default() -> Self {
        Self {
            left_mot: 0.0,
            right_mot: 0.0,
            base_servo_deg: 90.0,
            lift_servo_deg: 100.0,
            grip_servo_deg: 123.0,
            colour: 7,
            mouth: 0,
        }
    }
}

impl ActDems {
    /// Return a copy of the demands with every field inside its valid range.
    ///
    /// Non-finite motor commands become stopped, non-finite servo angles
    /// become the centre of their range.
    pub fn clipped(&self) -> Self {
        Self {
            left_mot: clip(self.left_mot, MOT_RANGE, 0.0),
            right_mot: clip(self.right_mot, MOT_RANGE, 0.0),
            base_servo_deg: clip(self.base_servo_deg, BASE_SERVO_RANGE_DEG, mid(BASE_SERVO_RANGE_DEG)),
            lift_servo_deg: clip(self.lift_servo_deg, LIFT_SERVO_RANGE_DEG, mid(LIFT_SERVO_RANGE_DEG)),
            grip_servo_deg: clip(self.grip_servo_deg, GRIP_SERVO_RANGE_DEG, mid(GRIP_SERVO_RANGE_DEG)),
            colour: self.colour.min(MAX_COLOUR),
            mouth: self.mouth.min(MAX_MOUTH),
        }
    }

    /// Build the command string for these demands.
    ///
    /// The demands are clipped first, so the output is always
    /// [`CMD_STR_LEN`] characters with every field in range.
    pub fn encode(&self) -> String {
        let d = self.clipped();

        format!(
            "{:02}{:02}{:03}{:02}{:02}{}{}",
            mot_code(d.left_mot),
            mot_code(d.right_mot),
            round(d.base_servo_deg),
            round(d.lift_servo_deg) - LIFT_FIELD_OFFSET,
            round(d.grip_servo_deg) - GRIP_FIELD_OFFSET,
            d.colour,
            d.mouth
        )
    }
}

// -----------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Remap a motor command onto the 0-99 motor code.
///
/// -100 to -52 maps to 0-48, the deadband to 49, and 51 to 100 maps to 50-99.
fn mot_code(mot: f64) -> i64 {
    if mot >= 51.0 {
        round(mot - 1.0)
    }
    else if mot <= -52.0 {
        round(mot + 100.0)
    }
    else {
        MOT_DEADBAND_CODE
    }
}

/// Round half up to an integer.
fn round(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn mid(range: (f64, f64)) -> f64 {
    0.5 * (range.0 + range.1)
}

/// Clamp into the range, NaN becomes the neutral value.
fn clip(value: f64, range: (f64, f64), neutral: f64) -> f64 {
    if value.is_nan() {
        neutral
    }
    else {
        clamp(value, range.0, range.1)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Split a command string into its numeric fields.
    fn fields(cmd: &str) -> [i64; 7] {
        assert_eq!(cmd.len(), CMD_STR_LEN, "bad command {:?}", cmd);
        let f = |a: usize, b: usize| cmd[a..b].parse::<i64>().unwrap();
        [f(0, 2), f(2, 4), f(4, 7), f(7, 9), f(9, 11), f(11, 12), f(12, 13)]
    }

    #[test]
    fn test_encode_default() {
        assert_eq!(ActDems::default().encode(), "4949090755870");
    }

    #[test]
    fn test_mot_code() {
        assert_eq!(mot_code(100.0), 99);
        assert_eq!(mot_code(51.0), 50);
        assert_eq!(mot_code(50.0), 49);
        assert_eq!(mot_code(0.0), 49);
        assert_eq!(mot_code(-51.0), 49);
        assert_eq!(mot_code(-52.0), 48);
        assert_eq!(mot_code(-100.0), 0);
    }

    #[test]
    fn test_encode_fields() {
        let d = ActDems {
            left_mot: -100.0,
            right_mot: 75.4,
            base_servo_deg: 12.5,
            lift_servo_deg: 30.0,
            grip_servo_deg: 145.0,
            colour: 3,
            mouth: 2,
        };

        assert_eq!(fields(&d.encode()), [0, 74, 13, 5, 80, 3, 2]);
    }

    #[test]
    fn test_encode_range_invariant() {
        let wild = [
            -1e300, -1000.0, -100.5, -52.0, -51.9, -0.4, 0.0, 0.5, 49.5, 50.9, 51.0, 99.6, 100.4,
            179.5, 180.6, 1e9, f64::INFINITY, f64::NEG_INFINITY, f64::NAN,
        ];

        for (i, a) in wild.iter().enumerate() {
            for b in wild.iter() {
                let d = ActDems {
                    left_mot: *a,
                    right_mot: *b,
                    base_servo_deg: *b,
                    lift_servo_deg: *a,
                    grip_servo_deg: *b,
                    colour: (i * 37 % 256) as u8,
                    mouth: (i * 91 % 256) as u8,
                };

                let f = fields(&d.encode());
                assert!((0..=99).contains(&f[0]));
                assert!((0..=99).contains(&f[1]));
                assert!((0..=180).contains(&f[2]));
                assert!((5..=95).contains(&f[3]));
                assert!((15..=80).contains(&f[4]));
                assert!((0..=9).contains(&f[5]));
                assert!((0..=2).contains(&f[6]));
            }
        }
    }

    #[test]
    fn test_clipped_nan() {
        let d = ActDems {
            left_mot: f64::NAN,
            right_mot: f64::NAN,
            base_servo_deg: f64::NAN,
            lift_servo_deg: f64::NAN,
            grip_servo_deg: f64::NAN,
            colour: 200,
            mouth: 200,
        }
        .clipped();

        assert_eq!(d.left_mot, 0.0);
        assert_eq!(d.right_mot, 0.0);
        assert_eq!(d.base_servo_deg, 90.0);
        assert_eq!(d.lift_servo_deg, 75.0);
        assert_eq!(d.grip_servo_deg, 112.5);
        assert_eq!(d.colour, 9);
        assert_eq!(d.mouth, 2);
    }
}
