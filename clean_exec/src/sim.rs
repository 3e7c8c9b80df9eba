//! # Turtle simulation
//!
//! A kinematic model of the turtle. Commands are held until they time out, the heading is
//! integrated first and the position then follows the new heading, and the turtle is kept inside
//! the walls of the world.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use comms_if::eqpt::turtle::{Pose, VelCmd};
use util::maths::{clamp, wrap_pi};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the turtle simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Pose the turtle starts in
    pub spawn_pose: Pose,

    /// Side length of the square world, the turtle can't leave `[0, world_size_m]`.
    ///
    /// Units: meters
    pub world_size_m: f64,

    /// A command is applied for this long after being received, after which the turtle stops.
    ///
    /// Units: seconds
    pub cmd_timeout_s: f64,

    /// Rate at which the simulation is stepped and the pose published.
    ///
    /// Units: Hertz
    pub pose_pub_rate_hz: f64,
}

pub struct TurtleSim {
    params: SimParams,
    pose: Pose,
    cmd: VelCmd,

    /// Time since the current command was received
    cmd_age_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SimParams {
    fn default() -> Self {
        Self {
            spawn_pose: Pose::new(5.544445, 5.544445, 0.0),
            world_size_m: 11.088889,
            cmd_timeout_s: 1.0,
            pose_pub_rate_hz: 62.5,
        }
    }
}

impl TurtleSim {
    pub fn new(params: SimParams) -> Self {
        Self {
            pose: params.spawn_pose,
            params,
            cmd: VelCmd::stop(),
            cmd_age_s: 0.0,
        }
    }

    /// Create a simulation starting in the given pose with default parameters.
    pub fn with_pose(pose: Pose) -> Self {
        Self::new(SimParams {
            spawn_pose: pose,
            ..Default::default()
        })
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    /// Replace the current command, restarting its timeout.
    pub fn set_cmd(&mut self, cmd: VelCmd) {
        self.cmd = cmd;
        self.cmd_age_s = 0.0;
    }

    /// Advance the simulation by `dt_s` seconds.
    pub fn step(&mut self, dt_s: f64) {
        if self.cmd_age_s > self.params.cmd_timeout_s {
            self.cmd = VelCmd::stop();
        }

        let theta = wrap_pi(self.pose.theta + self.cmd.angular_rads * dt_s);
        let x = self.pose.x + self.cmd.linear_ms * theta.cos() * dt_s;
        let y = self.pose.y + self.cmd.linear_ms * theta.sin() * dt_s;

        self.pose = Pose {
            x: clamp(x, 0.0, self.params.world_size_m),
            y: clamp(y, 0.0, self.params.world_size_m),
            theta,
        };

        self.cmd_age_s += dt_s;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_spawn() {
        let sim = TurtleSim::new(SimParams::default());
        assert_eq!(sim.pose(), Pose::new(5.544445, 5.544445, 0.0));
    }

    #[test]
    fn test_heading_then_position() {
        let mut sim = TurtleSim::with_pose(Pose::new(1.0, 1.0, 0.0));
        sim.set_cmd(VelCmd::new(1.0, PI / 2.0));
        sim.step(1.0);

        // Position follows the updated heading, so the turtle moves straight up
        let pose = sim.pose();
        assert_relative_eq!(pose.theta, PI / 2.0);
        assert_relative_eq!(pose.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(pose.y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_heading_wrapped() {
        let mut sim = TurtleSim::with_pose(Pose::new(5.0, 5.0, 3.0));
        sim.set_cmd(VelCmd::new(0.0, 1.0));
        sim.step(0.5);

        let theta = sim.pose().theta;
        assert!(theta > -PI && theta <= PI);
        assert_relative_eq!(theta, 3.5 - 2.0 * PI, epsilon = 1e-12);
    }

    #[test]
    fn test_walls() {
        let mut sim = TurtleSim::with_pose(Pose::new(10.0, 0.5, 0.0));
        sim.set_cmd(VelCmd::new(5.0, 0.0));
        sim.step(1.0);
        assert_eq!(sim.pose().x, 11.088889);

        sim.set_cmd(VelCmd::new(-5.0, 0.0));
        sim.step(1.0);
        sim.step(1.0);
        sim.step(1.0);
        assert_eq!(sim.pose().x, 0.0);
    }

    #[test]
    fn test_cmd_timeout() {
        let mut sim = TurtleSim::with_pose(Pose::new(1.0, 1.0, 0.0));
        sim.set_cmd(VelCmd::new(1.0, 0.0));

        // The command is still applied on the step which starts exactly at the timeout
        for _ in 0..5 {
            sim.step(0.25);
        }
        assert_relative_eq!(sim.pose().x, 2.25, epsilon = 1e-9);

        for _ in 0..4 {
            sim.step(0.25);
        }
        assert_relative_eq!(sim.pose().x, 2.25, epsilon = 1e-9);
    }
}
