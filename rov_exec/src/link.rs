//! # Link
//!
//! The handle an external carrier uses to talk to one robot. Starting a link
//! sets up the robot state and spawns its control loop thread, after which
//! the carrier just swaps sensor strings for command strings whenever bytes
//! arrive from the robot.
//!
//! ```no_run
//! use rov_lib::{behaviour::Monitor, link::Link, params::LinkConfig};
//!
//! let link = Link::start("A3F2", LinkConfig::default(), Monitor).unwrap();
//! let cmd = link.swap("49090E5032");
//! link.done().unwrap();
//! ```

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use color_eyre::Report;
use comms_if::xchg::Exchange;
use log::{error, info};
use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};
use thiserror::Error;

use crate::{
    behaviour::Behaviour,
    calib::Calib,
    ctrl_loop::CtrlLoop,
    data_store::{DataStore, SetupError},
    params::{ExecParamsError, LinkConfig},
};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Invalid executable parameters: {0}")]
    InvalidParams(#[from] ExecParamsError),

    #[error("Could not set up the robot: {0}")]
    SetupError(#[from] SetupError),

    #[error("Behaviour failed to launch: {0}")]
    LaunchFailed(Report),

    #[error("Could not spawn the control loop thread: {0}")]
    SpawnFailed(std::io::Error),

    #[error("The control loop thread panicked")]
    CtrlLoopPanicked,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Handle to a running robot control loop.
///
/// Dropping the link stops the loop and waits for it to finish.
pub struct Link {
    xchg: Arc<Exchange>,

    handle: Option<JoinHandle<()>>,

    name: String,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Link {
    /// Start the control loop for the given device.
    ///
    /// A missing calibration file is not an error, the robot runs with no
    /// offsets. Invalid parameters or a failed behaviour launch are, and no
    /// thread is started.
    pub fn start<B>(device_id: &str, config: LinkConfig, mut behaviour: B) -> Result<Self, LinkError>
    where
        B: Behaviour + 'static,
    {
        config.exec.validate()?;

        let calib = Calib::load_or_default(&config.exec.calib_dir, device_id);
        let mut ds = DataStore::new(&config, calib)?;

        behaviour.launch(&mut ds).map_err(LinkError::LaunchFailed)?;

        // Carrier gets a valid command even before the first cycle
        let xchg = Arc::new(Exchange::new());
        xchg.publish(ds.last_cmd());

        let name = String::from(ds.name());
        let ctrl_loop = CtrlLoop::new(ds, behaviour, xchg.clone(), config.exec);

        let handle = thread::Builder::new()
            .name(String::from("ctrl_loop"))
            .spawn(move || {
                ctrl_loop.run();
            })
            .map_err(LinkError::SpawnFailed)?;

        info!("Link to {} ({}) started", name, device_id);

        Ok(Self {
            xchg,
            handle: Some(handle),
            name,
        })
    }

    /// Hand over the latest sensor string and get the current command string
    /// back.
    pub fn swap(&self, sens: &str) -> String {
        self.xchg.swap(sens)
    }

    /// True until the loop has been asked to stop or has stopped itself.
    pub fn is_running(&self) -> bool {
        self.xchg.is_running()
    }

    /// Name of the robot from its calibration.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stop the control loop and wait for it to finish.
    pub fn done(mut self) -> Result<(), LinkError> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<(), LinkError> {
        self.xchg.halt();

        match self.handle.take() {
            Some(h) => {
                h.join().map_err(|_| LinkError::CtrlLoopPanicked)?;
                info!("Link to {} closed", self.name);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Drop for Link {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            error!("Error closing link: {}", e);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        behaviour::{Flow, Monitor},
        params::RovExecParams,
    };
    use color_eyre::eyre::eyre;
    use std::{
        sync::atomic::{AtomicBool, AtomicUsize, Ordering},
        time::{Duration, Instant},
    };

    fn config() -> LinkConfig {
        LinkConfig {
            exec: RovExecParams {
                cycle_period_s: 0.01,
                calib_dir: String::from("/nonexistent/qtruck/config"),
                stop_ack_timeout_s: 0.05,
            },
            ..Default::default()
        }
    }

    /// Swap until the command satisfies `pred` or a second has passed.
    fn wait_for<F: Fn(&str) -> bool>(link: &Link, sens: &str, pred: F) -> Option<String> {
        let start = Instant::now();
        while start.elapsed() < Duration::from_secs(1) {
            let cmd = link.swap(sens);
            if pred(&cmd) {
                return Some(cmd);
            }
            thread::sleep(Duration::from_millis(5));
        }
        None
    }

    struct Driver {
        ticks: Arc<AtomicUsize>,
        cleaned_up: Arc<AtomicBool>,
        stop_after: usize,
    }

    impl Behaviour for Driver {
        fn respond(&mut self, ds: &mut DataStore) -> Flow {
            let n = self.ticks.fetch_add(1, Ordering::SeqCst) + 1;
            ds.drive(4.0, 0.0).unwrap();
            if n >= self.stop_after {
                Flow::Stop
            }
            else {
                Flow::Continue
            }
        }

        fn cleanup(&mut self, _ds: &mut DataStore) {
            self.cleaned_up.store(true, Ordering::SeqCst);
        }
    }

    struct FailLaunch;

    impl Behaviour for FailLaunch {
        fn launch(&mut self, _ds: &mut DataStore) -> Result<(), Report> {
            Err(eyre!("no camera"))
        }

        fn respond(&mut self, _ds: &mut DataStore) -> Flow {
            Flow::Continue
        }
    }

    #[test]
    fn test_initial_command() {
        let link = Link::start("T001", config(), Monitor).unwrap();
        assert_eq!(link.name(), "Waldo");

        // Published before the loop runs
        assert_eq!(link.swap("49090E5032"), "4949090755870");
        assert!(link.is_running());

        link.done().unwrap();
    }

    #[test]
    fn test_drive_reaches_carrier() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let cleaned_up = Arc::new(AtomicBool::new(false));
        let link = Link::start(
            "T002",
            config(),
            Driver {
                ticks: ticks.clone(),
                cleaned_up: cleaned_up.clone(),
                stop_after: usize::MAX,
            },
        )
        .unwrap();

        let cmd = wait_for(&link, "49090E5032", |c| c.starts_with("8282"));
        assert!(cmd.is_some());
        assert!(ticks.load(Ordering::SeqCst) > 0);

        link.done().unwrap();
        assert!(cleaned_up.load(Ordering::SeqCst));
    }

    #[test]
    fn test_behaviour_stop() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let cleaned_up = Arc::new(AtomicBool::new(false));
        let link = Link::start(
            "T003",
            config(),
            Driver {
                ticks: ticks.clone(),
                cleaned_up: cleaned_up.clone(),
                stop_after: 3,
            },
        )
        .unwrap();

        // Loop stops itself and the tracks are stopped
        let start = Instant::now();
        while link.is_running() && start.elapsed() < Duration::from_secs(1) {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(!link.is_running());
        assert!(wait_for(&link, "49090E5032", |c| c.starts_with("4949")).is_some());

        link.done().unwrap();
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
        assert!(cleaned_up.load(Ordering::SeqCst));
    }

    #[test]
    fn test_drop_joins() {
        let cleaned_up = Arc::new(AtomicBool::new(false));
        {
            let _link = Link::start(
                "T004",
                config(),
                Driver {
                    ticks: Arc::new(AtomicUsize::new(0)),
                    cleaned_up: cleaned_up.clone(),
                    stop_after: usize::MAX,
                },
            )
            .unwrap();
            thread::sleep(Duration::from_millis(30));
        }
        assert!(cleaned_up.load(Ordering::SeqCst));
    }

    #[test]
    fn test_launch_failure() {
        assert!(matches!(
            Link::start("T005", config(), FailLaunch),
            Err(LinkError::LaunchFailed(_))
        ));
    }

    #[test]
    fn test_invalid_params() {
        let mut cfg = config();
        cfg.exec.cycle_period_s = 0.0;
        assert!(matches!(
            Link::start("T006", cfg, Monitor),
            Err(LinkError::InvalidParams(_))
        ));

        let mut cfg = config();
        cfg.arm_ctrl.jaw_in = 0.0;
        assert!(matches!(
            Link::start("T007", cfg, Monitor),
            Err(LinkError::SetupError(_))
        ));
    }

    #[test]
    fn test_calib_loaded() {
        let dir = std::env::temp_dir().join(format!("qtruck_link_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(Calib::file_path(&dir, "T008"), "Zed\n10 0 0\n0 0 0\n").unwrap();

        let mut cfg = config();
        cfg.exec.calib_dir = dir.to_string_lossy().into_owned();
        let link = Link::start("T008", cfg, Monitor).unwrap();
        assert_eq!(link.name(), "Zed");

        // Base servo offset shows up in the command
        assert_eq!(link.swap("49090E5032"), "4949100755870");

        link.done().unwrap();
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
