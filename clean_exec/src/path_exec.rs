//! # Path execution
//!
//! Drives a [`GotoCtrl`] at a fixed rate: each cycle the latest pose is read from the tracker,
//! processed, and any resulting command is handed to a [`CmdSink`]. Execution stops when the path
//! is complete, when the controller fails, or when the shared run flag is cleared.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use log::{info, trace, warn};
use serde::Serialize;

use crate::{
    goals::GoalPoint,
    goto_ctrl::{GotoCtrl, GotoCtrlError},
    pose_tracker::PoseTracker,
};
use comms_if::eqpt::turtle::{Pose, VelCmd};
use util::{archive::Archived, module::State};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Something velocity commands can be sent to.
pub trait CmdSink {
    type Error: std::error::Error + Send + Sync + 'static;

    fn send_cmd(&mut self, cmd: VelCmd) -> Result<(), Self::Error>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Summary of a path execution, saved into the session at the end of a run.
#[derive(Debug, Clone, Serialize)]
pub struct PathSummary {
    pub goals: Vec<GoalPoint>,

    /// Number of cycles spent driving towards each goal that was reached
    pub ticks_per_goal: Vec<u64>,

    /// Last known pose when execution stopped
    pub final_pose: Pose,

    pub outcome: PathOutcome,

    /// Number of cycles executed
    pub num_cycles: u64,

    pub finished_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum PathOutcome {
    /// Every goal was reached
    Complete,

    /// The run flag was cleared before the path was complete
    Interrupted,
}

#[derive(Debug, thiserror::Error)]
pub enum PathExecError {
    #[error("GotoCtrl processing error: {0}")]
    GotoCtrlError(#[source] GotoCtrlError),

    #[error("No path is loaded")]
    NoPathLoaded,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute the path loaded into `ctrl` until it is complete or `running` is cleared.
///
/// The flag is checked at the start of every cycle and again immediately before a command is
/// emitted, so once it is cleared nothing further is sent. Sending is best effort, a command which
/// can't be sent is logged and the next cycle goes ahead. A zero `cycle_period` runs the cycles
/// back to back.
pub fn run_path<S: CmdSink>(
    ctrl: &mut GotoCtrl,
    tracker: &PoseTracker,
    sink: &mut S,
    running: &AtomicBool,
    cycle_period: Duration,
) -> Result<PathSummary, PathExecError> {
    if !ctrl.is_executing() && !ctrl.is_complete() {
        return Err(PathExecError::NoPathLoaded);
    }

    let mut num_cycles = 0u64;

    let outcome = loop {
        let cycle_start = Instant::now();

        if !running.load(Ordering::SeqCst) {
            ctrl.abort_path();
            break PathOutcome::Interrupted;
        }

        if ctrl.is_complete() {
            break PathOutcome::Complete;
        }

        num_cycles += 1;

        // ---- CONTROL ----

        let pose = tracker.current_pose();

        let cmd = match ctrl.proc(&pose) {
            Ok((cmd, _)) => cmd,
            Err(e) => {
                // Leave the turtle stationary
                if running.load(Ordering::SeqCst) {
                    if let Err(e) = sink.send_cmd(VelCmd::stop()) {
                        warn!("Could not send stop command: {}", e);
                    }
                }
                return Err(PathExecError::GotoCtrlError(e));
            }
        };

        // ---- EMISSION ----

        if let Some(cmd) = cmd {
            if !running.load(Ordering::SeqCst) {
                ctrl.abort_path();
                break PathOutcome::Interrupted;
            }

            trace!(
                "Cmd: linear {:.4} m/s, angular {:.4} rad/s",
                cmd.linear_ms,
                cmd.angular_rads
            );
            if let Err(e) = sink.send_cmd(cmd) {
                warn!("Could not send velocity command: {}", e);
            }
        }

        // ---- ARCHIVING ----

        if let Err(e) = ctrl.write() {
            warn!("Could not archive GotoCtrl status: {}", e);
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = cycle_start.elapsed();

        match cycle_period.checked_sub(cycle_dur) {
            Some(sleep_dur) => std::thread::sleep(sleep_dur),
            None => warn!(
                "Cycle overran by {:.06} s",
                (cycle_dur - cycle_period).as_secs_f64()
            ),
        }
    };

    let summary = PathSummary {
        goals: ctrl.goals().to_vec(),
        ticks_per_goal: ctrl.ticks_per_goal().to_vec(),
        final_pose: tracker.current_pose(),
        outcome,
        num_cycles,
        finished_at: Utc::now(),
    };

    info!(
        "Path execution finished: {:?} after {} cycles",
        summary.outcome, summary.num_cycles
    );

    Ok(summary)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::goto_ctrl::Params;

    /// Sink which records every command.
    #[derive(Default)]
    struct RecordingSink {
        cmds: Vec<VelCmd>,
    }

    impl CmdSink for RecordingSink {
        type Error = std::io::Error;

        fn send_cmd(&mut self, cmd: VelCmd) -> Result<(), Self::Error> {
            self.cmds.push(cmd);
            Ok(())
        }
    }

    /// Sink which clears the run flag after a number of commands.
    struct InterruptingSink<'a> {
        cmds: Vec<VelCmd>,
        limit: usize,
        running: &'a AtomicBool,
    }

    impl<'a> CmdSink for InterruptingSink<'a> {
        type Error = std::io::Error;

        fn send_cmd(&mut self, cmd: VelCmd) -> Result<(), Self::Error> {
            self.cmds.push(cmd);
            if self.cmds.len() >= self.limit {
                self.running.store(false, Ordering::SeqCst);
            }
            Ok(())
        }
    }

    /// Sink which fails every send.
    #[derive(Default)]
    struct FailingSink {
        num_attempts: usize,
    }

    impl CmdSink for FailingSink {
        type Error = std::io::Error;

        fn send_cmd(&mut self, _cmd: VelCmd) -> Result<(), Self::Error> {
            self.num_attempts += 1;
            Err(std::io::Error::new(std::io::ErrorKind::Other, "link down"))
        }
    }

    fn ctrl_with(params: Params, goals: &[(f64, f64)]) -> GotoCtrl {
        let mut ctrl = GotoCtrl::new(params).unwrap();
        ctrl.begin_path(goals.iter().map(|&(x, y)| GoalPoint::new(x, y)).collect())
            .unwrap();
        ctrl
    }

    #[test]
    fn test_no_path_loaded() {
        let mut ctrl = GotoCtrl::new(Params::default()).unwrap();
        let running = AtomicBool::new(true);

        let res = run_path(
            &mut ctrl,
            &PoseTracker::new(),
            &mut RecordingSink::default(),
            &running,
            Duration::from_secs(0),
        );

        assert!(matches!(res, Err(PathExecError::NoPathLoaded)));
    }

    #[test]
    fn test_already_at_goal_stops_once() {
        let mut ctrl = ctrl_with(Params::default(), &[(2.0, 2.0)]);
        let tracker = PoseTracker::new();
        tracker.on_pose_update(Pose::new(2.0, 2.0, 0.0));
        let running = AtomicBool::new(true);
        let mut sink = RecordingSink::default();

        let summary =
            run_path(&mut ctrl, &tracker, &mut sink, &running, Duration::from_secs(0)).unwrap();

        assert_eq!(sink.cmds, vec![VelCmd::stop()]);
        assert_eq!(summary.outcome, PathOutcome::Complete);
        assert_eq!(summary.num_cycles, 1);
        assert_eq!(summary.ticks_per_goal, vec![0]);
    }

    #[test]
    fn test_cleared_flag_emits_nothing() {
        let mut ctrl = ctrl_with(Params::default(), &[(9.0, 9.0)]);
        let running = AtomicBool::new(false);
        let mut sink = RecordingSink::default();

        let summary = run_path(
            &mut ctrl,
            &PoseTracker::new(),
            &mut sink,
            &running,
            Duration::from_secs(0),
        )
        .unwrap();

        assert!(sink.cmds.is_empty());
        assert_eq!(summary.outcome, PathOutcome::Interrupted);
        assert!(!ctrl.is_executing());
    }

    #[test]
    fn test_interrupt_stops_emission() {
        // Pose never updates so the goal is never reached
        let mut ctrl = ctrl_with(Params::default(), &[(9.0, 9.0)]);
        let running = AtomicBool::new(true);
        let mut sink = InterruptingSink {
            cmds: Vec::new(),
            limit: 5,
            running: &running,
        };

        let summary = run_path(
            &mut ctrl,
            &PoseTracker::new(),
            &mut sink,
            &running,
            Duration::from_secs(0),
        )
        .unwrap();

        assert_eq!(sink.cmds.len(), 5);
        assert_eq!(summary.outcome, PathOutcome::Interrupted);
    }

    #[test]
    fn test_unreachable_goal_sends_stop() {
        let params = Params {
            max_ticks_per_goal: Some(4),
            ..Params::default()
        };
        let mut ctrl = ctrl_with(params, &[(9.0, 9.0)]);
        let running = AtomicBool::new(true);
        let mut sink = RecordingSink::default();

        let res = run_path(
            &mut ctrl,
            &PoseTracker::new(),
            &mut sink,
            &running,
            Duration::from_secs(0),
        );

        assert!(matches!(
            res,
            Err(PathExecError::GotoCtrlError(
                GotoCtrlError::GoalUnreachable { .. }
            ))
        ));
        assert_eq!(sink.cmds.len(), 5);
        assert_eq!(sink.cmds.last(), Some(&VelCmd::stop()));
    }

    #[test]
    fn test_send_failure_does_not_end_path() {
        let params = Params {
            max_ticks_per_goal: Some(3),
            ..Params::default()
        };
        let mut ctrl = ctrl_with(params, &[(9.0, 9.0)]);
        let running = AtomicBool::new(true);
        let mut sink = FailingSink::default();

        // Every cycle is attempted until the tick limit ends the path, not the first failed send
        let res = run_path(
            &mut ctrl,
            &PoseTracker::new(),
            &mut sink,
            &running,
            Duration::from_secs(0),
        );

        assert!(matches!(
            res,
            Err(PathExecError::GotoCtrlError(
                GotoCtrlError::GoalUnreachable { ticks: 3, .. }
            ))
        ));
        assert_eq!(sink.num_attempts, 4);
    }

    #[test]
    fn test_send_failure_at_goal_still_completes() {
        let mut ctrl = ctrl_with(Params::default(), &[(2.0, 2.0)]);
        let tracker = PoseTracker::new();
        tracker.on_pose_update(Pose::new(2.0, 2.0, 0.0));
        let running = AtomicBool::new(true);
        let mut sink = FailingSink::default();

        let summary =
            run_path(&mut ctrl, &tracker, &mut sink, &running, Duration::from_secs(0)).unwrap();

        assert_eq!(summary.outcome, PathOutcome::Complete);
        assert_eq!(sink.num_attempts, 1);
    }
}
