//! # Turtle Equipment Communications Module
//!
//! Pose feedback published by the turtle and the velocity demands it accepts.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Topic on which pose feedback is published.
pub const POSE_TOPIC: &str = "pose";

/// Topic on which velocity commands are published.
pub const CMD_VEL_TOPIC: &str = "cmd_vel";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The pose (position and heading) of the turtle in the world frame.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position along the world X axis.
    ///
    /// Units: meters
    pub x: f64,

    /// Position along the world Y axis.
    ///
    /// Units: meters
    pub y: f64,

    /// Heading, anticlockwise from the world X axis.
    ///
    /// Units: radians
    pub theta: f64,
}

/// A planar velocity demand for a differentially steered turtle.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct VelCmd {
    /// Forward speed.
    ///
    /// Units: meters/second
    pub linear_ms: f64,

    /// Turn rate, positive anticlockwise.
    ///
    /// Units: radians/second
    pub angular_rads: f64,
}

/// A three component vector as carried in a [`Twist`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Full six degree of freedom velocity as sent over the command channel.
///
/// A turtle only moves in the plane, so only `linear.x` and `angular.z` are ever non-zero.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Twist {
    pub linear: Vector3,
    pub angular: Vector3,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Pose {
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta }
    }
}

impl VelCmd {
    pub fn new(linear_ms: f64, angular_rads: f64) -> Self {
        Self {
            linear_ms,
            angular_rads,
        }
    }

    /// A command bringing the turtle to a full stop.
    pub fn stop() -> Self {
        Self::default()
    }

    /// Returns true if this command demands no motion at all.
    pub fn is_stop(&self) -> bool {
        self.linear_ms == 0.0 && self.angular_rads == 0.0
    }
}

impl From<VelCmd> for Twist {
    fn from(cmd: VelCmd) -> Self {
        Self {
            linear: Vector3 {
                x: cmd.linear_ms,
                ..Default::default()
            },
            angular: Vector3 {
                z: cmd.angular_rads,
                ..Default::default()
            },
        }
    }
}

impl From<Twist> for VelCmd {
    /// Extract the planar components of a twist, discarding the rest.
    fn from(twist: Twist) -> Self {
        Self {
            linear_ms: twist.linear.x,
            angular_rads: twist.angular.z,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_twist_is_planar() {
        let twist = Twist::from(VelCmd::new(7.5, -1.25));

        assert_eq!(twist.linear.x, 7.5);
        assert_eq!(twist.angular.z, -1.25);
        assert_eq!(
            [twist.linear.y, twist.linear.z, twist.angular.x, twist.angular.y],
            [0.0; 4]
        );
    }

    #[test]
    fn test_stop() {
        assert!(VelCmd::stop().is_stop());
        assert!(!VelCmd::new(0.0, 0.1).is_stop());
    }
}
