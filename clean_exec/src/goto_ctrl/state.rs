//! Go-to-goal control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use serde::Serialize;

// Internal
use super::*;
use crate::goals::GoalPoint;
use comms_if::eqpt::turtle::{Pose, VelCmd};
use util::{
    archive::{Archived, Archiver},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Go-to-goal control module state
#[derive(Default)]
pub struct GotoCtrl {
    params: Params,

    /// Executing mode
    mode: GotoCtrlMode,

    /// The goals to visit, in order.
    goals: Vec<GoalPoint>,

    /// Index of the active goal.
    goal_index: usize,

    /// Number of non-stop commands issued towards the active goal.
    num_ticks_on_goal: u64,

    /// Number of non-stop commands issued towards each converged goal.
    ticks_per_goal: Vec<u64>,

    report: StatusReport,
    arch_report: Archiver,
}

/// The status report containing the errors and demands of the last cycle.
#[derive(Default, Copy, Clone, Debug, Serialize)]
pub struct StatusReport {
    /// Mode the module was left in at the end of the cycle
    pub mode: GotoCtrlMode,

    /// Index of the goal the cycle's command was aimed at
    pub goal_index: usize,

    pub goal_x_m: f64,
    pub goal_y_m: f64,

    /// Distance from the turtle to the goal
    pub distance_m: f64,

    /// Bearing of the goal from the turtle
    pub steering_angle_rad: f64,

    /// Heading error the angular gain was applied to
    pub heading_error_rad: f64,

    /// Forward speed demand issued
    pub linear_ms: f64,

    /// Turn rate demand issued
    pub angular_rads: f64,

    /// True if the forward speed demand was saturated
    pub linear_limited: bool,

    /// True if the turn rate demand was saturated
    pub angular_limited: bool,

    /// True if the goal was reached this cycle and a stop was issued
    pub converged: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Potential errors that can occur during processing of the module.
#[derive(Debug, thiserror::Error)]
pub enum GotoCtrlError {
    #[error("Invalid GotoCtrl parameters: {0}")]
    InvalidParams(String),

    /// A path is already loaded. This error occurs when attempting to start a new path before
    /// the current one has finished.
    #[error("Attempted to load a path while one is already loaded")]
    PathAlreadyLoaded,

    /// Attempted to load a path with no goals in it.
    #[error("Attempted to load an empty path")]
    AttemptEmptyPathLoad,

    /// The module is approaching but there is no goal at the current index.
    #[error("No goal at index {0}")]
    NoGoal(usize),

    /// The turtle did not reach the goal within the allowed number of cycles.
    #[error("Goal {index} ({x}, {y}) was not reached after {ticks} cycles")]
    GoalUnreachable {
        index: usize,
        x: f64,
        y: f64,
        ticks: u64,
    },
}

/// The possible modes of execution of GotoCtrl. Each mode is handled by a `mode_xyz` function.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum GotoCtrlMode {
    /// No path loaded
    Off,

    /// Driving towards the active goal
    Approaching,

    /// The active goal has been reached and stopped at, the next goal follows on the next cycle
    Converged,

    /// The last goal has been reached
    PathComplete,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for GotoCtrlMode {
    fn default() -> Self {
        GotoCtrlMode::Off
    }
}

impl State for GotoCtrl {
    type InitData = Params;
    type InitError = GotoCtrlError;

    type InputData = Pose;
    type OutputData = Option<VelCmd>;
    type StatusReport = StatusReport;
    type ProcError = GotoCtrlError;

    /// Initialise the GotoCtrl module.
    ///
    /// Expected init data is the loaded parameters. The status report archive is created in the
    /// session, archiving is best effort and is disabled if the archive cannot be created.
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        *self = Self::new(init_data)?;

        match Archiver::from_path(session, "goto_ctrl/status_report.csv") {
            Ok(a) => self.arch_report = a,
            Err(e) => warn!("Could not create GotoCtrl archive, archiving disabled: {}", e),
        }

        Ok(())
    }

    /// Process go-to-goal control for one cycle.
    ///
    /// Returns the command to emit this cycle, if any.
    fn proc(&mut self, pose: &Pose) -> Result<(Option<VelCmd>, StatusReport), GotoCtrlError> {
        // Setup cycle data
        self.report = StatusReport::default();

        // Mode execution. Each of the mode functions returns the command to emit.
        let output = match self.mode {
            GotoCtrlMode::Off => self.mode_off(),
            GotoCtrlMode::Approaching => self.mode_approaching(pose),
            GotoCtrlMode::Converged => self.mode_converged(pose),
            GotoCtrlMode::PathComplete => self.mode_path_complete(),
        }?;

        self.report.mode = self.mode;

        Ok((output, self.report))
    }
}

impl Archived for GotoCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.arch_report.serialise(self.report)
    }
}

impl GotoCtrl {
    /// Create a new instance with the given parameters and no archiving.
    pub fn new(params: Params) -> Result<Self, GotoCtrlError> {
        params.validate().map_err(GotoCtrlError::InvalidParams)?;

        Ok(Self {
            params,
            ..Default::default()
        })
    }

    /// Begin driving through a path of goals.
    ///
    /// Execution begins on the next call to `proc`, in `Approaching` mode towards the first goal.
    ///
    /// Loading a new path before the current one has been finished will result in an error. To
    /// stop a path whilst it's executing you must call `abort_path`.
    pub fn begin_path(&mut self, goals: Vec<GoalPoint>) -> Result<(), GotoCtrlError> {
        match self.mode {
            GotoCtrlMode::Approaching | GotoCtrlMode::Converged => {
                return Err(GotoCtrlError::PathAlreadyLoaded)
            }
            _ => (),
        }

        if goals.is_empty() {
            return Err(GotoCtrlError::AttemptEmptyPathLoad);
        }

        info!("Beginning path of {} goal(s)", goals.len());
        info!("Approaching goal 0 ({}, {})", goals[0].x, goals[0].y);

        self.goals = goals;
        self.goal_index = 0;
        self.num_ticks_on_goal = 0;
        self.ticks_per_goal = Vec::with_capacity(self.goals.len());
        self.mode = GotoCtrlMode::Approaching;

        Ok(())
    }

    /// Abandon the current path without issuing any further command.
    pub fn abort_path(&mut self) {
        if self.is_executing() {
            warn!(
                "Path aborted with goal {} of {} active",
                self.goal_index,
                self.goals.len()
            );
        }

        self.mode = GotoCtrlMode::Off;
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn mode(&self) -> GotoCtrlMode {
        self.mode
    }

    /// True while a path is loaded and not yet complete.
    pub fn is_executing(&self) -> bool {
        matches!(self.mode, GotoCtrlMode::Approaching | GotoCtrlMode::Converged)
    }

    /// True once every goal of the path has been reached.
    pub fn is_complete(&self) -> bool {
        self.mode == GotoCtrlMode::PathComplete
    }

    /// The goal currently being approached, if any.
    pub fn active_goal(&self) -> Option<(usize, GoalPoint)> {
        match self.mode {
            GotoCtrlMode::Approaching => self
                .goals
                .get(self.goal_index)
                .map(|g| (self.goal_index, *g)),
            _ => None,
        }
    }

    /// The loaded goals.
    pub fn goals(&self) -> &[GoalPoint] {
        &self.goals
    }

    /// Number of cycles spent driving to each goal reached so far.
    pub fn ticks_per_goal(&self) -> &[u64] {
        &self.ticks_per_goal
    }

    /// Mode off.
    ///
    /// No actions are taken in this mode. To move out of it the user must call `begin_path`.
    fn mode_off(&mut self) -> Result<Option<VelCmd>, GotoCtrlError> {
        Ok(None)
    }

    /// Mode approaching.
    ///
    /// Drive towards the active goal. If the goal is within tolerance a single stop command is
    /// issued instead and the mode moves on to `Converged`, or to `PathComplete` if this was the
    /// last goal.
    fn mode_approaching(&mut self, pose: &Pose) -> Result<Option<VelCmd>, GotoCtrlError> {
        let goal = *self
            .goals
            .get(self.goal_index)
            .ok_or(GotoCtrlError::NoGoal(self.goal_index))?;

        let distance_m = euclidean_distance(pose, &goal);

        self.report.goal_index = self.goal_index;
        self.report.goal_x_m = goal.x;
        self.report.goal_y_m = goal.y;
        self.report.distance_m = distance_m;
        self.report.steering_angle_rad = steering_angle(pose, &goal);

        // ---- CONVERGENCE ----

        if distance_m < self.params.distance_tolerance_m {
            self.report.converged = true;
            self.ticks_per_goal.push(self.num_ticks_on_goal);

            info!(
                "Reached goal {} ({}, {}) after {} cycles",
                self.goal_index, goal.x, goal.y, self.num_ticks_on_goal
            );
            info!("Current location: ({}, {})", pose.x, pose.y);

            if self.goal_index + 1 >= self.goals.len() {
                info!("Given spots are fully cleaned!");
                self.mode = GotoCtrlMode::PathComplete;
            } else {
                self.mode = GotoCtrlMode::Converged;
            }

            return Ok(Some(VelCmd::stop()));
        }

        // ---- TIMEOUT ----

        if let Some(max_ticks) = self.params.max_ticks_per_goal {
            if self.num_ticks_on_goal >= max_ticks {
                self.mode = GotoCtrlMode::Off;

                return Err(GotoCtrlError::GoalUnreachable {
                    index: self.goal_index,
                    x: goal.x,
                    y: goal.y,
                    ticks: self.num_ticks_on_goal,
                });
            }
        }

        // ---- COMMAND GENERATION ----

        let cmd = calc_vel_cmd(pose, &goal, &self.params, &mut self.report);
        self.num_ticks_on_goal += 1;

        debug!(
            "Goal {}: dist {:.4} m, head err {:.4} rad",
            self.goal_index, self.report.distance_m, self.report.heading_error_rad
        );

        Ok(Some(cmd))
    }

    /// Mode converged.
    ///
    /// The previous goal has been stopped at, so make the next goal active and approach it in
    /// this same cycle.
    fn mode_converged(&mut self, pose: &Pose) -> Result<Option<VelCmd>, GotoCtrlError> {
        self.goal_index += 1;
        self.num_ticks_on_goal = 0;
        self.mode = GotoCtrlMode::Approaching;

        if let Some(goal) = self.goals.get(self.goal_index) {
            info!("Approaching goal {} ({}, {})", self.goal_index, goal.x, goal.y);
        }

        self.mode_approaching(pose)
    }

    /// Mode path complete.
    ///
    /// The stop for the last goal has already been issued, nothing more is sent.
    fn mode_path_complete(&mut self) -> Result<Option<VelCmd>, GotoCtrlError> {
        Ok(None)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn ctrl_with(goals: &[(f64, f64)]) -> GotoCtrl {
        let mut ctrl = GotoCtrl::new(Params::default()).unwrap();
        ctrl.begin_path(goals.iter().map(|&(x, y)| GoalPoint::new(x, y)).collect())
            .unwrap();
        ctrl
    }

    #[test]
    fn test_off_emits_nothing() {
        let mut ctrl = GotoCtrl::new(Params::default()).unwrap();
        let (cmd, report) = ctrl.proc(&Pose::default()).unwrap();

        assert_eq!(cmd, None);
        assert_eq!(report.mode, GotoCtrlMode::Off);
    }

    #[test]
    fn test_command_towards_goal() {
        let mut ctrl = ctrl_with(&[(5.0, 0.0)]);
        let (cmd, report) = ctrl.proc(&Pose::new(0.0, 0.0, 0.0)).unwrap();

        assert_eq!(cmd, Some(VelCmd::new(7.5, 0.0)));
        assert_eq!(report.mode, GotoCtrlMode::Approaching);
        assert_eq!(report.distance_m, 5.0);
        assert_eq!(ctrl.active_goal(), Some((0, GoalPoint::new(5.0, 0.0))));
    }

    #[test]
    fn test_single_stop_then_next_goal() {
        let mut ctrl = ctrl_with(&[(1.0, 1.0), (9.0, 9.0)]);

        // Inside tolerance of the first goal: one stop
        let (cmd, report) = ctrl.proc(&Pose::new(1.2, 1.2, 0.0)).unwrap();
        assert_eq!(cmd, Some(VelCmd::stop()));
        assert!(report.converged);
        assert_eq!(report.goal_index, 0);
        assert_eq!(ctrl.mode(), GotoCtrlMode::Converged);

        // Same pose next cycle: the second goal is now driven towards, no repeated stop
        let (cmd, report) = ctrl.proc(&Pose::new(1.2, 1.2, 0.0)).unwrap();
        let cmd = cmd.unwrap();
        assert!(!cmd.is_stop());
        assert_eq!(report.goal_index, 1);
        assert!(!report.converged);
    }

    #[test]
    fn test_path_complete_after_last_goal() {
        let mut ctrl = ctrl_with(&[(3.0, 3.0)]);

        assert_eq!(ctrl.proc(&Pose::new(3.0, 3.1, 1.0)).unwrap().0, Some(VelCmd::stop()));
        assert!(ctrl.is_complete());
        assert_eq!(ctrl.ticks_per_goal(), &[0]);

        for _ in 0..3 {
            assert_eq!(ctrl.proc(&Pose::new(3.0, 3.1, 1.0)).unwrap().0, None);
        }
    }

    #[test]
    fn test_raw_heading_error_when_unwrapped() {
        // Goal just below the negative X axis, turtle facing just above it
        let pose = Pose::new(5.0, 5.0, PI - 0.1);
        let goal = GoalPoint::new(4.0, 4.9);

        let mut raw_ctrl = GotoCtrl::new(Params {
            wrap_heading_error: false,
            ..Params::default()
        })
        .unwrap();
        raw_ctrl.begin_path(vec![goal]).unwrap();
        let (raw_cmd, raw_report) = raw_ctrl.proc(&pose).unwrap();
        let raw_cmd = raw_cmd.unwrap();

        let raw_err = heading_error(&pose, &goal, false);
        assert!(raw_err < -PI);
        assert_relative_eq!(raw_report.heading_error_rad, raw_err);
        assert_relative_eq!(raw_cmd.angular_rads, 6.0 * raw_err);

        // Wrapped by default, turning the short way instead
        let mut ctrl = ctrl_with(&[(4.0, 4.9)]);
        let cmd = ctrl.proc(&pose).unwrap().0.unwrap();

        assert!(cmd.angular_rads > 0.0);
        assert_relative_eq!(cmd.angular_rads, raw_cmd.angular_rads + 12.0 * PI, epsilon = 1e-9);
        assert_relative_eq!(cmd.linear_ms, raw_cmd.linear_ms);
    }

    #[test]
    fn test_tolerance_is_strict() {
        let mut ctrl = ctrl_with(&[(5.5, 5.0)]);

        // Exactly at the tolerance is not converged
        let (cmd, _) = ctrl.proc(&Pose::new(5.0, 5.0, 0.0)).unwrap();
        assert!(!cmd.unwrap().is_stop());
    }

    #[test]
    fn test_goal_already_reached_still_stops() {
        // Consecutive duplicate goals each get their own stop
        let mut ctrl = ctrl_with(&[(2.0, 2.0), (2.0, 2.0)]);
        let pose = Pose::new(2.0, 2.0, 0.0);

        assert_eq!(ctrl.proc(&pose).unwrap().0, Some(VelCmd::stop()));
        assert_eq!(ctrl.proc(&pose).unwrap().0, Some(VelCmd::stop()));
        assert!(ctrl.is_complete());
    }

    #[test]
    fn test_begin_path_errors() {
        let mut ctrl = GotoCtrl::new(Params::default()).unwrap();
        assert!(matches!(
            ctrl.begin_path(vec![]),
            Err(GotoCtrlError::AttemptEmptyPathLoad)
        ));

        ctrl.begin_path(vec![GoalPoint::new(1.0, 1.0)]).unwrap();
        assert!(matches!(
            ctrl.begin_path(vec![GoalPoint::new(2.0, 2.0)]),
            Err(GotoCtrlError::PathAlreadyLoaded)
        ));

        // Once aborted a new path may be loaded
        ctrl.abort_path();
        assert_eq!(ctrl.proc(&Pose::default()).unwrap().0, None);
        ctrl.begin_path(vec![GoalPoint::new(2.0, 2.0)]).unwrap();
    }

    #[test]
    fn test_goal_unreachable() {
        let params = Params {
            max_ticks_per_goal: Some(3),
            ..Params::default()
        };
        let mut ctrl = GotoCtrl::new(params).unwrap();
        ctrl.begin_path(vec![GoalPoint::new(10.0, 10.0)]).unwrap();

        // Frozen feedback, the turtle never gets closer
        let pose = Pose::new(1.0, 1.0, 0.0);
        for _ in 0..3 {
            assert!(ctrl.proc(&pose).unwrap().0.is_some());
        }

        assert!(matches!(
            ctrl.proc(&pose),
            Err(GotoCtrlError::GoalUnreachable {
                index: 0,
                ticks: 3,
                ..
            })
        ));
        assert_eq!(ctrl.mode(), GotoCtrlMode::Off);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = Params {
            distance_tolerance_m: -1.0,
            ..Params::default()
        };
        assert!(matches!(
            GotoCtrl::new(params),
            Err(GotoCtrlError::InvalidParams(_))
        ));
    }
}
