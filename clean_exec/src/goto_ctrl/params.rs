//! Go-to-goal control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for go-to-goal control
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Params {
    /// Forward speed gain, applied to the distance error.
    ///
    /// Units: 1/seconds
    pub linear_gain: f64,

    /// Turn rate gain, applied to the heading error.
    ///
    /// Units: 1/seconds
    pub angular_gain: f64,

    /// A goal is reached once the distance to it is strictly less than this.
    ///
    /// Units: meters
    pub distance_tolerance_m: f64,

    /// Closed interval every goal coordinate must lie in, on both axes.
    ///
    /// Units: meters
    pub coord_bounds_m: [f64; 2],

    /// If true the heading error is wrapped into (-pi, pi] before the gain is applied, so the
    /// turtle always turns the short way round. If false the raw difference is used, which can
    /// leave the turtle circling a goal close to a wall.
    #[serde(default = "default_wrap_heading_error")]
    pub wrap_heading_error: bool,

    /// Optional limit on the magnitude of the forward speed demand.
    ///
    /// Units: meters/second
    #[serde(default)]
    pub max_linear_vel_ms: Option<f64>,

    /// Optional limit on the magnitude of the turn rate demand.
    ///
    /// Units: radians/second
    #[serde(default)]
    pub max_angular_vel_rads: Option<f64>,

    /// Optional limit on the number of commands issued towards a single goal. If exceeded the
    /// goal is declared unreachable and the path is abandoned.
    #[serde(default)]
    pub max_ticks_per_goal: Option<u64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            linear_gain: 1.5,
            angular_gain: 6.0,
            distance_tolerance_m: 0.5,
            coord_bounds_m: [0.0, 11.0],
            wrap_heading_error: default_wrap_heading_error(),
            max_linear_vel_ms: None,
            max_angular_vel_rads: None,
            max_ticks_per_goal: None,
        }
    }
}

impl Params {
    /// Check the parameters are usable, returning a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.linear_gain.is_finite() && self.angular_gain.is_finite()) {
            return Err("gains must be finite".into());
        }
        if !(self.distance_tolerance_m > 0.0) {
            return Err(format!(
                "distance_tolerance_m must be positive, got {}",
                self.distance_tolerance_m
            ));
        }
        if !(self.coord_bounds_m[0] <= self.coord_bounds_m[1]) {
            return Err(format!(
                "coord_bounds_m must be [min, max], got {:?}",
                self.coord_bounds_m
            ));
        }
        for (name, limit) in [
            ("max_linear_vel_ms", self.max_linear_vel_ms),
            ("max_angular_vel_rads", self.max_angular_vel_rads),
        ]
        .iter()
        {
            if let Some(l) = limit {
                if !(*l > 0.0) {
                    return Err(format!("{} must be positive, got {}", name, l));
                }
            }
        }
        if self.max_ticks_per_goal == Some(0) {
            return Err("max_ticks_per_goal must be at least 1".into());
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn default_wrap_heading_error() -> bool {
    true
}
