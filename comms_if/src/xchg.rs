//! # Exchange Channel
//!
//! Latest-value exchange of sensor and command strings between the carrier
//! (whatever moves bytes to and from the robot) and the control loop.
//!
//! Only the most recent sensor string is kept, older unread ones are
//! dropped. The carrier always gets the currently published command string
//! back immediately. The single mutex is held for string copies only.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::{Mutex, MutexGuard};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Double buffer shared by the carrier and the control loop.
#[derive(Debug, Default)]
pub struct Exchange {
    bufs: Mutex<Buffers>,
}

#[derive(Debug, Default)]
struct Buffers {
    /// Most recent sensor string from the carrier
    sens: String,

    /// True if `sens` has not been taken by the loop yet
    fresh: bool,

    /// Most recently published command string
    cmd: String,

    /// Cooperative run flag for the control loop
    running: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Exchange {
    /// Create a new exchange in the running state with no data.
    pub fn new() -> Self {
        Self {
            bufs: Mutex::new(Buffers {
                running: true,
                ..Default::default()
            }),
        }
    }

    /// Carrier side: hand over a sensor string and get the current command
    /// string back.
    ///
    /// The returned string is empty if nothing has been published yet.
    pub fn swap(&self, sens: &str) -> String {
        let mut bufs = self.lock();
        bufs.sens.clear();
        bufs.sens.push_str(sens);
        bufs.fresh = true;
        bufs.cmd.clone()
    }

    /// Loop side: take a copy of the sensor string if a new one arrived since
    /// the last call.
    pub fn take_sens(&self) -> Option<String> {
        let mut bufs = self.lock();
        if bufs.fresh {
            bufs.fresh = false;
            Some(bufs.sens.clone())
        }
        else {
            None
        }
    }

    /// Loop side: publish a new command string.
    pub fn publish(&self, cmd: &str) {
        let mut bufs = self.lock();
        bufs.cmd.clear();
        bufs.cmd.push_str(cmd);
    }

    /// Get a copy of the currently published command string.
    pub fn current_cmd(&self) -> String {
        self.lock().cmd.clone()
    }

    /// True until [`Exchange::halt`] has been called.
    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    /// Clear the run flag, asking the control loop to finish.
    pub fn halt(&self) {
        self.lock().running = false;
    }

    /// Lock the buffers.
    ///
    /// A panic on the other side cannot leave the strings half written, so
    /// a poisoned lock is recovered rather than propagated.
    fn lock(&self) -> MutexGuard<'_, Buffers> {
        match self.bufs.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
