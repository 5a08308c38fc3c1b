//! Skid steer calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use std::f64::consts::PI;
use util::maths::{clamp, direction};

// Internal imports
use super::{LocoCtrl, MotorDems, Speeds};

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LocoCtrl {
    /// Boost or diminish the requested speeds by the accumulated error
    /// between requested and achievable speeds.
    ///
    /// The accumulators restart whenever the direction of either speed
    /// changes.
    pub(crate) fn servo_correct(&mut self, speed_ips: f64, rate_dps: f64) -> (f64, f64) {
        let speed_dir = direction(speed_ips);
        let rate_dir = direction(rate_dps);

        if speed_dir != self.speed_dir || rate_dir != self.rate_dir {
            self.speed_corr_ips = 0.0;
            self.rate_corr_dps = 0.0;
            self.report.corr_reset = true;
        }
        else {
            let max_speed = self.params.max_speed_corr_ips;
            let max_rate = self.params.max_rate_corr_dps;

            self.speed_corr_ips = clamp(
                self.speed_corr_ips + speed_ips - self.achieved.speed_ips,
                -max_speed,
                max_speed,
            );
            self.rate_corr_dps = clamp(
                self.rate_corr_dps + rate_dps - self.achieved.rate_dps,
                -max_rate,
                max_rate,
            );
        }

        self.speed_dir = speed_dir;
        self.rate_dir = rate_dir;

        (speed_ips + self.speed_corr_ips, rate_dps + self.rate_corr_dps)
    }

    /// Mix forward speed and turn rate into track motor commands.
    pub(crate) fn calc_skid_steer(&mut self, speed_ips: f64, rate_dps: f64) -> MotorDems {
        let p = &self.params;

        // Difference between the tracks for the turn
        let diff_ips = rate_dps * (p.track_sep_in * PI) / (360.0 * p.turn_eff);
        let left_ips = speed_ips - diff_ips;
        let right_ips = speed_ips + diff_ips;

        let mut left = p.cmd_per_ips * left_ips.abs() + p.min_cmd;
        let mut right = p.cmd_per_ips * right_ips.abs() + p.min_cmd;

        // Turning is unreliable unless one track is at full power
        if left < p.full_cmd && right < p.full_cmd {
            left = p.cmd_per_ips * speed_ips.abs() + p.min_cmd;
            right = left;
            self.report.turn_dropped = rate_dps != 0.0;
        }

        // Keep the turn ratio when scaling down into range
        let over = left.max(right) / p.full_cmd;
        if over > 1.0 {
            left /= over;
            right /= over;
            self.report.saturated = true;
        }

        // Motors don't move for small commands
        if left < p.deadband_cmd {
            left = 0.0;
            self.report.deadband[0] = true;
        }
        if right < p.deadband_cmd {
            right = 0.0;
            self.report.deadband[1] = true;
        }

        if left_ips < 0.0 {
            left = -left;
        }
        if right_ips < 0.0 {
            right = -right;
        }

        MotorDems { left, right }
    }

    /// Back compute the speeds achievable with the given (clipped) motor
    /// commands.
    ///
    /// These are used for the next speed correction and for odometry.
    pub fn calc_speeds(&mut self, left: f64, right: f64) -> Speeds {
        let p = &self.params;

        let track_ips = |cmd: f64| {
            let sp = ((cmd.abs() - p.min_cmd) / p.cmd_per_ips).max(0.0);
            if cmd < 0.0 {
                -sp
            }
            else {
                sp
            }
        };

        let left_ips = track_ips(left);
        let right_ips = track_ips(right);

        self.achieved = Speeds {
            speed_ips: p.lag_factor * 0.5 * (left_ips + right_ips),
            rate_dps: p.lag_factor * p.turn_eff * 180.0 * (right_ips - left_ips)
                / (p.track_sep_in * PI),
        };

        self.achieved
    }
}

#[cfg(test)]
mod test {
    use super::super::{DriveCmd, InputData, Params};
    use super::*;
    use util::module::State;

    fn loco() -> LocoCtrl {
        let mut l = LocoCtrl::default();
        l.init(Params::default()).unwrap();
        l
    }

    fn drive(l: &mut LocoCtrl, speed_ips: f64, rate_dps: f64) -> MotorDems {
        l.proc(&InputData {
            cmd: Some(DriveCmd::Drive {
                speed_ips,
                rate_dps,
            }),
        })
        .unwrap()
        .0
    }

    #[test]
    fn test_drive_zero() {
        let mut l = loco();
        assert_eq!(drive(&mut l, 0.0, 0.0), MotorDems::default());
    }

    #[test]
    fn test_straight() {
        let mut l = loco();

        // 12 * 4 + 35 = 83 on both tracks
        let m = drive(&mut l, 4.0, 0.0);
        assert_eq!(m, MotorDems { left: 83.0, right: 83.0 });

        let m = drive(&mut l, -4.0, 0.0);
        assert_eq!(m, MotorDems { left: -83.0, right: -83.0 });
    }

    #[test]
    fn test_slow_turn_dropped() {
        let mut l = loco();

        // Neither track reaches full command so the turn is ignored
        let m = drive(&mut l, 3.0, 10.0);
        assert!(l.report.turn_dropped);
        assert_eq!(m.left, m.right);
        assert_eq!(m.left, 71.0);
    }

    #[test]
    fn test_saturation_keeps_ratio() {
        let mut l = loco();
        let m = drive(&mut l, 5.0, 90.0);

        let diff = 90.0 * (4.8 * PI) / (360.0 * 0.8);
        let left = 12.0 * (5.0 - diff) + 35.0;
        let right = 12.0 * (5.0 + diff) + 35.0;
        let over = right / 100.0;

        assert!(l.report.saturated);
        assert!((m.right - 100.0).abs() < 1e-9);

        // Left is below the deadband once scaled
        assert!(left / over < 50.0);
        assert_eq!(m.left, 0.0);
        assert!(l.report.deadband[0]);
    }

    #[test]
    fn test_spin_in_place() {
        let mut l = loco();
        let m = drive(&mut l, 0.0, 180.0);

        assert!(m.left < 0.0);
        assert!(m.right > 0.0);
        assert!((m.left + m.right).abs() < 1e-9);
        assert!(m.right <= 100.0);
    }

    #[test]
    fn test_no_cmd_holds() {
        let mut l = loco();
        let m = drive(&mut l, 4.0, 0.0);
        let (held, _) = l.proc(&InputData { cmd: None }).unwrap();
        assert_eq!(m, held);

        let (stopped, _) = l.proc(&InputData { cmd: Some(DriveCmd::Stop) }).unwrap();
        assert_eq!(stopped, MotorDems::default());
    }

    #[test]
    fn test_invalid_cmd_makes_safe() {
        let mut l = loco();
        drive(&mut l, 4.0, 0.0);
        l.speed_corr_ips = 2.0;

        let cmd = DriveCmd::Drive {
            speed_ips: f64::NAN,
            rate_dps: 0.0,
        };
        assert!(l.proc(&InputData { cmd: Some(cmd) }).is_err());
        assert_eq!(l.output(), MotorDems::default());
        assert_eq!(l.correction(), Speeds::default());
    }

    #[test]
    fn test_windup_reset_law() {
        let mut l = loco();

        // Robot achieves nothing, so errors accumulate up to the bounds
        l.servo_correct(3.0, 50.0);
        assert!(l.report.corr_reset);
        for _ in 0..10 {
            l.report.corr_reset = false;
            l.servo_correct(3.0, 50.0);
            assert!(!l.report.corr_reset);
        }
        assert_eq!(l.correction(), Speeds { speed_ips: 6.0, rate_dps: 100.0 });

        // Correction is added to the request
        let (speed, rate) = l.servo_correct(3.0, 50.0);
        assert_eq!((speed, rate), (9.0, 150.0));

        // Any direction change clears both accumulators
        let (speed, rate) = l.servo_correct(3.0, -50.0);
        assert!(l.report.corr_reset);
        assert_eq!(l.correction(), Speeds::default());
        assert_eq!((speed, rate), (3.0, -50.0));

        // Accumulation runs negative with an overspeeding robot
        l.achieved = Speeds { speed_ips: 10.0, rate_dps: 0.0 };
        l.report.corr_reset = false;
        for _ in 0..5 {
            l.servo_correct(3.0, -50.0);
        }
        assert!(!l.report.corr_reset);
        assert_eq!(l.correction().speed_ips, -6.0);
        assert_eq!(l.correction().rate_dps, -100.0);

        // Stopping is a direction change too
        l.servo_correct(0.0, -50.0);
        assert_eq!(l.correction(), Speeds::default());
    }

    #[test]
    fn test_calc_speeds() {
        let mut l = loco();

        // Below the offset nothing moves
        assert_eq!(l.calc_speeds(0.0, 30.0), Speeds::default());

        // 83 -> 4 ips on both tracks
        let s = l.calc_speeds(83.0, 83.0);
        assert!((s.speed_ips - 0.94 * 4.0).abs() < 1e-12);
        assert_eq!(s.rate_dps, 0.0);

        let s = l.calc_speeds(-83.0, 83.0);
        assert_eq!(s.speed_ips, 0.0);
        let expect = 0.94 * 0.8 * 180.0 * 8.0 / (4.8 * PI);
        assert!((s.rate_dps - expect).abs() < 1e-9);
        assert_eq!(l.achieved(), s);
    }
}
