//! # Equipment Interface
//!
//! This module defines the strings sent to and received from the robot.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod dems;
pub mod sens;

// -----------------------------------------------------------------------------------------------
// REEXPORTS
// -----------------------------------------------------------------------------------------------

pub use dems::ActDems;
pub use sens::{SensData, SensParseError};
