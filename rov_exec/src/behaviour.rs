//! # Behaviours
//!
//! A behaviour is the decision making plugged into the control loop. It is
//! handed the [`DataStore`] once before the loop starts, once per cycle, and
//! once after the loop ends.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use color_eyre::Report;
use log::{debug, info};

use crate::data_store::DataStore;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// What the control loop should do after a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Decision making for the robot.
pub trait Behaviour: Send {
    /// Called once before the control loop starts.
    ///
    /// An error aborts the link start.
    fn launch(&mut self, _ds: &mut DataStore) -> Result<(), Report> {
        Ok(())
    }

    /// Called every cycle after the sensors have been updated and before the
    /// command string is built.
    fn respond(&mut self, ds: &mut DataStore) -> Flow;

    /// Called once after the control loop ends, before the robot is stopped.
    fn cleanup(&mut self, _ds: &mut DataStore) {}
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Behaviour which leaves the robot alone and logs its state once a second.
#[derive(Debug, Default)]
pub struct Monitor;

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Behaviour for Monitor {
    fn launch(&mut self, ds: &mut DataStore) -> Result<(), Report> {
        info!("Monitoring {}", ds.name());
        Ok(())
    }

    fn respond(&mut self, ds: &mut DataStore) -> Flow {
        if ds.is_1_hz_cycle {
            info!("{}", ds.show());
            debug!("{}", ds.show_xyz());
        }

        Flow::Continue
    }

    fn cleanup(&mut self, ds: &mut DataStore) {
        info!("Final state: {}", ds.show());
    }
}
