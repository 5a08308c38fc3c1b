//! Servo ramping
//!
//! The servos move as fast as they can to whatever angle they are given, so
//! the commanded angle is stepped towards the target a little each cycle
//! instead.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// State of a single arm joint.
///
/// Units: degrees (physical)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Joint {
    /// Angle sent to the servo on this cycle.
    pub cmd_deg: f64,

    /// Angle the servo is assumed to have reached.
    pub now_deg: f64,

    /// Angle being moved towards.
    pub target_deg: f64,

    /// Hard physical range `[min, max]`.
    pub limits_deg: [f64; 2],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Joint {
    /// Create a joint resting at the given angle.
    pub fn new(angle_deg: f64, limits_deg: [f64; 2]) -> Self {
        Self {
            cmd_deg: angle_deg,
            now_deg: angle_deg,
            target_deg: angle_deg,
            limits_deg,
        }
    }

    /// Absolute deviation of the current angle from the given target.
    pub fn dev_deg(&self, target_deg: f64) -> f64 {
        (self.now_deg - target_deg).abs()
    }

    /// Step the command from the current angle towards `target_deg` by at
    /// most `step_deg`, clipped to the joint limits.
    ///
    /// Returns `true` if the limits clipped the command.
    pub fn step_towards(&mut self, target_deg: f64, step_deg: f64) -> bool {
        let next = if step_deg >= self.dev_deg(target_deg) {
            target_deg
        }
        else if target_deg >= self.now_deg {
            self.now_deg + step_deg
        }
        else {
            self.now_deg - step_deg
        };

        self.cmd_deg = clamp(next, self.limits_deg[0], self.limits_deg[1]);

        self.cmd_deg != next
    }

    /// Set the angle to move towards, clamped to the joint limits.
    ///
    /// Returns `true` if the requested angle was outside the limits.
    pub fn set_target(&mut self, target_deg: f64) -> bool {
        self.target_deg = clamp(target_deg, self.limits_deg[0], self.limits_deg[1]);

        self.target_deg != target_deg
    }

    /// Set the angle the joint has reached, clamped to the joint limits.
    pub fn set_now(&mut self, angle_deg: f64) {
        self.now_deg = clamp(angle_deg, self.limits_deg[0], self.limits_deg[1]);
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the largest step a joint may take this cycle.
///
/// The requested rate is raised to `min_rate_dps` so slow moves don't bind
/// the servo gears.
pub fn max_step_deg(rate_dps: f64, min_rate_dps: f64, dt_s: f64) -> f64 {
    rate_dps.max(min_rate_dps) * dt_s.max(0.0)
}

/// Split a maximum step between two joints so they both arrive on the same
/// cycle.
///
/// The joint with the smaller deviation has its step scaled down by the
/// ratio of the deviations.
pub fn coord_steps(max_step_deg: f64, dev_a_deg: f64, dev_b_deg: f64) -> (f64, f64) {
    let mut step_a = max_step_deg;
    let mut step_b = max_step_deg;

    if dev_a_deg > dev_b_deg {
        step_b *= dev_b_deg / dev_a_deg;
    }
    else if dev_b_deg > 0.0 {
        step_a *= dev_a_deg / dev_b_deg;
    }

    (step_a, step_b)
}
