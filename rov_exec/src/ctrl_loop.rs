//! # Control Loop
//!
//! Runs one robot at a fixed cadence on its own thread:
//!
//! 1. Wait for the next tick
//! 2. Take the freshest sensor string from the exchange
//! 3. Update the sensors and pose estimate
//! 4. Let the behaviour respond
//! 5. Build and publish the command string

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::xchg::Exchange;
use log::{debug, info, trace, warn};
use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use crate::{
    behaviour::{Behaviour, Flow},
    data_store::DataStore,
    params::RovExecParams,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Poll interval while waiting for the stop command to be collected.
const STOP_ACK_POLL: Duration = Duration::from_millis(50);

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Paces a loop on an absolute schedule so timing errors don't accumulate.
#[derive(Debug)]
pub struct Pacer {
    period: Duration,

    /// Time of the next tick, `None` before the first
    next: Option<Instant>,
}

/// The control loop for one robot.
pub struct CtrlLoop<B: Behaviour> {
    ds: DataStore,
    behaviour: B,
    xchg: Arc<Exchange>,
    params: RovExecParams,
    pacer: Pacer,

    /// Time of the last odometry update
    last_update: Option<Instant>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Pacer {
    /// Create a new pacer with the given period.
    pub fn new(period: Duration) -> Self {
        Self { period, next: None }
    }

    /// Sleep until the next tick.
    ///
    /// If the loop has fallen more than one period behind the schedule is
    /// restarted from now rather than running a burst of catch-up ticks.
    /// Returns `true` in that case.
    pub fn pace(&mut self) -> bool {
        let now = Instant::now();
        let mut tick = self.next.unwrap_or(now);
        let mut overrun = false;

        if tick > now {
            thread::sleep(tick - now);
        }
        else if now - tick > self.period {
            warn!(
                "Control loop {:.06} s behind schedule, restarting schedule",
                (now - tick).as_secs_f64()
            );
            tick = now;
            overrun = true;
        }

        self.next = Some(tick + self.period);

        overrun
    }
}

impl<B: Behaviour> CtrlLoop<B> {
    /// Create a new control loop.
    ///
    /// The parameters must have been validated.
    pub fn new(ds: DataStore, behaviour: B, xchg: Arc<Exchange>, params: RovExecParams) -> Self {
        let pacer = Pacer::new(Duration::from_secs_f64(params.cycle_period_s));

        Self {
            ds,
            behaviour,
            xchg,
            params,
            pacer,
            last_update: None,
        }
    }

    /// Run cycles until the behaviour stops or the exchange is halted, then
    /// bring the robot to a stop.
    ///
    /// Returns the data store for inspection.
    pub fn run(mut self) -> (DataStore, B) {
        info!("Control loop started for {}", self.ds.name());

        while self.xchg.is_running() {
            if self.tick() == Flow::Stop {
                info!("Behaviour requested stop");
                break;
            }
        }

        self.xchg.halt();
        self.shutdown();

        info!(
            "Control loop finished after {} cycles",
            self.ds.num_cycles
        );

        (self.ds, self.behaviour)
    }

    /// Execute a single cycle.
    pub fn tick(&mut self) -> Flow {
        // ---- CYCLE MANAGEMENT ----
        if self.pacer.pace() {
            self.ds.num_consec_cycle_overruns += 1;
        }
        else {
            self.ds.num_consec_cycle_overruns = 0;
        }

        self.ds.cycle_start();

        // ---- SENSING ----
        let sens = self.xchg.take_sens();
        let dt_s = self.elapsed_s();
        self.ds.update(sens.as_deref(), dt_s);

        // ---- BEHAVIOUR ----
        let flow = self.behaviour.respond(&mut self.ds);

        // ---- OUTPUT ----
        let cmd = self.ds.issue();
        self.xchg.publish(&cmd);

        trace!("Cycle {}: {:?} -> {}", self.ds.num_cycles, sens, cmd);

        self.ds.num_cycles += 1;

        flow
    }

    /// Tidy up the behaviour, stop the tracks, and wait a while for the
    /// final command to be collected.
    fn shutdown(&mut self) {
        self.behaviour.cleanup(&mut self.ds);

        self.ds.stop();
        let cmd = self.ds.issue();
        self.xchg.publish(&cmd);
        debug!("Stop command published: {}", cmd);

        // Anything already waiting was sent before the stop command
        let sens = self.xchg.take_sens();
        let dt_s = self.elapsed_s();
        self.ds.update(sens.as_deref(), dt_s);

        let timeout = Duration::from_secs_f64(self.params.stop_ack_timeout_s);
        let start = Instant::now();
        loop {
            if let Some(sens) = self.xchg.take_sens() {
                let dt_s = self.elapsed_s();
                self.ds.update(Some(&sens), dt_s);
                info!("Stop command acknowledged");
                break;
            }

            let waited = start.elapsed();
            if waited >= timeout {
                warn!("Stop command not acknowledged after {:.02} s", waited.as_secs_f64());
                break;
            }

            thread::sleep(STOP_ACK_POLL.min(timeout - waited));
        }
    }

    /// Get the time since the last odometry update, zero the first time.
    fn elapsed_s(&mut self) -> f64 {
        let now = Instant::now();
        let dt_s = match self.last_update {
            Some(t) => (now - t).as_secs_f64(),
            None => 0.0,
        };
        self.last_update = Some(now);

        dt_s
    }
}
