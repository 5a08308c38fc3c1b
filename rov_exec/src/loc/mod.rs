//! # Localisation module
//!
//! This module provides a dead reckoning estimate of the robot's pose in the
//! map frame, plus a smoothed compass heading.
//!
//! The pose is integrated from the *commanded* (back-computed achievable)
//! speeds rather than measured motion, so drift is expected and unbounded.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod heading_filter;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use heading_filter::*;
pub use state::*;

use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The current pose (position and heading in the map frame) of the robot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Pose {
    /// Position along the map X axis
    ///
    /// Units: inches
    pub x_in: f64,

    /// Position along the map Y axis
    ///
    /// Units: inches
    pub y_in: f64,

    /// Heading counterclockwise from the map X axis, always in [0, 360).
    ///
    /// Units: degrees
    pub heading_deg: f64,
}
