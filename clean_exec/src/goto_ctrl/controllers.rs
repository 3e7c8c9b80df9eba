//! # Go-to-goal controllers
//!
//! Error calculations between the current pose and a goal, and the proportional control laws
//! which turn those errors into velocity demands. Everything here is a pure function of its
//! arguments.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;

// Internal
use super::{Params, StatusReport};
use crate::goals::GoalPoint;
use comms_if::eqpt::turtle::{Pose, VelCmd};
use util::maths::{saturate, wrap_pi};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Vector from the turtle's position to the goal.
fn goal_vector_m(pose: &Pose, goal: &GoalPoint) -> Vector2<f64> {
    goal.position_m() - Vector2::new(pose.x, pose.y)
}

/// Absolute bearing of the goal from the turtle's position, in (-pi, pi].
pub fn steering_angle(pose: &Pose, goal: &GoalPoint) -> f64 {
    let v = goal_vector_m(pose, goal);
    v.y.atan2(v.x)
}

/// Straight line distance from the turtle to the goal.
pub fn euclidean_distance(pose: &Pose, goal: &GoalPoint) -> f64 {
    goal_vector_m(pose, goal).norm()
}

/// Difference between the steering angle and the turtle's heading.
///
/// Without wrapping this is the raw difference, which lies anywhere in (-2pi, 2pi) for headings
/// in (-pi, pi] and can ask for the long way round.
pub fn heading_error(pose: &Pose, goal: &GoalPoint, wrap: bool) -> f64 {
    let error = steering_angle(pose, goal) - pose.theta;

    if wrap {
        wrap_pi(error)
    } else {
        error
    }
}

/// Proportional turn rate demand on the raw (unwrapped) heading error.
pub fn angular_velocity(pose: &Pose, goal: &GoalPoint, angular_gain: f64) -> f64 {
    angular_gain * heading_error(pose, goal, false)
}

/// Proportional forward speed demand on the distance error. Unbounded above.
pub fn linear_velocity(pose: &Pose, goal: &GoalPoint, linear_gain: f64) -> f64 {
    linear_gain * euclidean_distance(pose, goal)
}

/// Calculate the velocity command towards the goal using the full set of parameters.
///
/// This is the pair of control laws above, with the optional heading error wrapping and demand
/// saturation applied. The errors, demands and any limiting are written into the report.
pub fn calc_vel_cmd(
    pose: &Pose,
    goal: &GoalPoint,
    params: &Params,
    report: &mut StatusReport,
) -> VelCmd {
    let head_err_rad = heading_error(pose, goal, params.wrap_heading_error);

    let mut linear_ms = params.linear_gain * euclidean_distance(pose, goal);
    let mut angular_rads = params.angular_gain * head_err_rad;

    if let Some(max) = params.max_linear_vel_ms {
        let (v, limited) = saturate(linear_ms, max);
        linear_ms = v;
        report.linear_limited = limited;
    }

    if let Some(max) = params.max_angular_vel_rads {
        let (w, limited) = saturate(angular_rads, max);
        angular_rads = w;
        report.angular_limited = limited;
    }

    report.heading_error_rad = head_err_rad;
    report.linear_ms = linear_ms;
    report.angular_rads = angular_rads;

    VelCmd::new(linear_ms, angular_rads)
}
