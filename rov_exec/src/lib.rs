//! # Rover library.
//!
//! This library holds everything needed to run one Qtruck robot: the control
//! modules, the robot data store, the control loop and the link handle used
//! by carriers.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Arm control module - joint targets, kinematics and servo ramping
pub mod arm_ctrl;

/// Behaviours - the decision making plugged into the control loop
pub mod behaviour;

/// Per-robot calibration loading
pub mod calib;

/// Control loop - paces and runs the robot cycle on its own thread
pub mod ctrl_loop;

/// Data store - all state of one robot
pub mod data_store;

/// Link - the handle carriers use to exchange strings with a robot
pub mod link;

/// Localisation module - provides the rover with an idea of where it is in the world
pub mod loc;

/// Locomotion control module - converts drive requests into track motor commands
pub mod loco_ctrl;

/// Executable parameters
pub mod params;
