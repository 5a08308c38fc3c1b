//! Localisation state and dead reckoning

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;

// Internal
use super::{HeadingFilter, Pose};
use util::{maths::wrap_360, module::State};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Localisation module state.
#[derive(Debug, Default)]
pub struct Loc {
    filter: HeadingFilter,

    pose: Pose,
}

/// Input data to localisation.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputData {
    /// Latest compass reading, or `None` if no sensor string has ever been
    /// decoded.
    ///
    /// Units: degrees
    pub comp_deg: Option<f64>,

    /// Duration of the last cycle.
    ///
    /// Units: seconds
    pub dt_s: f64,

    /// Achievable forward speed back computed on the previous cycle.
    ///
    /// Units: inches/second
    pub ips: f64,

    /// Achievable turn rate back computed on the previous cycle.
    ///
    /// Units: degrees/second
    pub dps: f64,
}

/// Motion during the last cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct StatusReport {
    /// Distance moved.
    ///
    /// Units: inches
    pub dm_in: f64,

    /// Rotation.
    ///
    /// Units: degrees
    pub dr_deg: f64,

    /// True if the heading filter was initialised on this cycle.
    pub filter_init: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for Loc {
    type InitData = Pose;
    type InitError = std::convert::Infallible;

    type InputData = InputData;
    type OutputData = Pose;
    type StatusReport = StatusReport;
    type ProcError = std::convert::Infallible;

    /// Reset the module to the given starting pose.
    ///
    /// The heading filter restarts uninitialised.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        self.filter = HeadingFilter::default();
        self.pose = Pose {
            heading_deg: wrap_360(init_data.heading_deg),
            ..init_data
        };

        Ok(())
    }

    /// Integrate the commanded motion of the last cycle.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let mut report = StatusReport {
            dm_in: input_data.ips * input_data.dt_s,
            dr_deg: input_data.dps * input_data.dt_s,
            filter_init: false,
        };

        if let Some(comp_deg) = input_data.comp_deg {
            report.filter_init = self.filter.update(comp_deg);
        }

        // No rotation reference when the filter has just started
        if report.filter_init {
            report.dr_deg = 0.0;
        }

        // Midpoint heading for the translation
        let mid_rad = (self.pose.heading_deg + 0.5 * report.dr_deg).to_radians();
        self.pose.x_in += report.dm_in * mid_rad.cos();
        self.pose.y_in += report.dm_in * mid_rad.sin();
        self.pose.heading_deg = wrap_360(self.pose.heading_deg + report.dr_deg);

        trace!(
            "Loc: dm {:.3} in, dr {:.3} deg -> {:?}",
            report.dm_in,
            report.dr_deg,
            self.pose
        );

        Ok((self.pose, report))
    }
}

impl Loc {
    /// Get the current pose estimate.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Get the smoothed compass heading, `None` before any sensor data.
    pub fn heading_deg(&self) -> Option<f64> {
        self.filter.heading_deg()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn step(loc: &mut Loc, comp: Option<f64>, dt: f64, ips: f64, dps: f64) -> (Pose, StatusReport) {
        loc.proc(&InputData {
            comp_deg: comp,
            dt_s: dt,
            ips,
            dps,
        })
        .unwrap()
    }

    #[test]
    fn test_first_tick() {
        let mut loc = Loc::default();
        loc.init(Pose::default()).unwrap();

        // First tick has no elapsed time
        let (pose, rpt) = step(&mut loc, None, 0.0, 5.0, 30.0);
        assert_eq!(pose, Pose::default());
        assert_eq!(rpt.dm_in, 0.0);
        assert_eq!(loc.heading_deg(), None);
    }

    #[test]
    fn test_filter_init_tick_has_no_rotation() {
        let mut loc = Loc::default();
        loc.init(Pose::default()).unwrap();

        let (pose, rpt) = step(&mut loc, Some(253.0), 0.1, 0.0, 90.0);
        assert!(rpt.filter_init);
        assert_eq!(rpt.dr_deg, 0.0);
        assert_eq!(pose.heading_deg, 0.0);
        assert_eq!(loc.heading_deg(), Some(253.0));

        // Next tick rotates
        let (pose, rpt) = step(&mut loc, Some(253.0), 0.1, 0.0, 90.0);
        assert!(!rpt.filter_init);
        assert!((pose.heading_deg - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_straight_line() {
        let mut loc = Loc::default();
        loc.init(Pose::default()).unwrap();

        for _ in 0..10 {
            step(&mut loc, None, 0.1, 4.0, 0.0);
        }

        let pose = loc.pose();
        assert!((pose.x_in - 4.0).abs() < 1e-9);
        assert!(pose.y_in.abs() < 1e-9);
    }

    #[test]
    fn test_midpoint_heading() {
        let mut loc = Loc::default();
        loc.init(Pose::default()).unwrap();

        // 1 inch while turning 90 degrees, travels along the 45 degree line
        let (pose, _) = step(&mut loc, None, 1.0, 1.0, 90.0);
        let r = std::f64::consts::FRAC_1_SQRT_2;
        assert!((pose.x_in - r).abs() < 1e-9);
        assert!((pose.y_in - r).abs() < 1e-9);
        assert!((pose.heading_deg - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_heading_wraps() {
        let mut loc = Loc::default();
        loc.init(Pose {
            heading_deg: 350.0,
            ..Default::default()
        })
        .unwrap();

        let (pose, _) = step(&mut loc, None, 1.0, 0.0, 20.0);
        assert!((pose.heading_deg - 10.0).abs() < 1e-9);

        let (pose, _) = step(&mut loc, None, 1.0, 0.0, -30.0);
        assert!((pose.heading_deg - 340.0).abs() < 1e-9);

        for _ in 0..1000 {
            let (pose, _) = step(&mut loc, None, 0.033, 0.0, -97.3);
            assert!(pose.heading_deg >= 0.0 && pose.heading_deg < 360.0);
        }
    }
}
