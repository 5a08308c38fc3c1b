//! Compass heading filter
//!
//! A scalar Kalman-style filter which cuts the compass jitter roughly in
//! half. The measurement variance is tracked by blending in the squared
//! innovation so the filter opens up when the robot actually turns.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use util::maths::{get_ang_dist_deg, wrap_360};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Blend factor for the variance estimate.
const VAR_BLEND: f64 = 0.1;

/// Compass measurement noise, about +/- 9 degrees.
///
/// Units: degrees^2
const MEAS_NOISE_DEG2: f64 = 81.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Smoothed heading state.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct HeadingFilter {
    /// Smoothed heading in [0, 360), or `None` before the first reading.
    ///
    /// Units: degrees
    head_deg: Option<f64>,

    /// Variance estimate of the smoothed heading.
    ///
    /// Units: degrees^2
    var_deg2: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HeadingFilter {
    /// Add a raw compass reading.
    ///
    /// Returns `true` if this reading initialised the filter, in which case
    /// there is no previous reference to measure rotation against.
    pub fn update(&mut self, raw_deg: f64) -> bool {
        let head = match self.head_deg {
            Some(h) => h,
            None => {
                self.head_deg = Some(wrap_360(raw_deg));
                self.var_deg2 = MEAS_NOISE_DEG2;
                return true;
            }
        };

        // Project from last step and estimate variance
        let diff = get_ang_dist_deg(head, raw_deg);
        let var = (1.0 - VAR_BLEND) * self.var_deg2 + VAR_BLEND * diff * diff;

        // Add in the new measurement
        let gain = var / (var + MEAS_NOISE_DEG2);
        self.head_deg = Some(wrap_360(head + gain * diff));
        self.var_deg2 = (1.0 - gain) * var;

        false
    }

    /// Get the smoothed heading, if any reading has been seen.
    pub fn heading_deg(&self) -> Option<f64> {
        self.head_deg
    }

    /// Get the current variance estimate.
    pub fn variance_deg2(&self) -> f64 {
        self.var_deg2
    }
}
