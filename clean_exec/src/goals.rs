//! # Goals
//!
//! The ordered list of points the turtle must visit, built once at startup from the flat
//! coordinate list given on the command line.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A target position in the world frame.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalPoint {
    /// Units: meters
    pub x: f64,

    /// Units: meters
    pub y: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Reasons a coordinate list cannot be turned into goals.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("No coordinates were given")]
    Empty,

    #[error(
        "Enter a set of coordinates, an even number of entries is required (got {0} entries)"
    )]
    OddCount(usize),

    #[error("Coordinate {index} ({value}) is not a finite number")]
    NonFinite { index: usize, value: f64 },

    #[error(
        "Coordinate {index} ({value}) is outside the operating bounds, the turtle moves between \
        {min} and {max} on both axes"
    )]
    OutOfBounds {
        index: usize,
        value: f64,
        min: f64,
        max: f64,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GoalPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Position of the goal as a vector.
    pub fn position_m(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Pair a flat list of coordinates into goals, e.g. `[1, 2, 3, 4]` becomes `[(1, 2), (3, 4)]`.
///
/// The count is checked before any value, so an odd list is always reported as such. Every value
/// must lie in the closed interval `bounds_m`.
pub fn goals_from_coords(
    coords: &[f64],
    bounds_m: [f64; 2],
) -> Result<Vec<GoalPoint>, ValidationError> {
    if coords.is_empty() {
        return Err(ValidationError::Empty);
    }

    if coords.len() % 2 != 0 {
        return Err(ValidationError::OddCount(coords.len()));
    }

    for (index, &value) in coords.iter().enumerate() {
        if !value.is_finite() {
            return Err(ValidationError::NonFinite { index, value });
        }

        if value < bounds_m[0] || value > bounds_m[1] {
            return Err(ValidationError::OutOfBounds {
                index,
                value,
                min: bounds_m[0],
                max: bounds_m[1],
            });
        }
    }

    Ok(coords
        .chunks_exact(2)
        .map(|pair| GoalPoint::new(pair[0], pair[1]))
        .collect())
}
