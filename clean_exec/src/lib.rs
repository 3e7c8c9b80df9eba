//! # Cleaner library.
//!
//! This library allows the executables and tests in the crate to access the go-to-goal controller
//! and its supporting items.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Command publisher - sends velocity commands to the turtle
pub mod cmd_publisher;

/// Goals - the ordered list of points to visit and its validation
pub mod goals;

/// Go-to-goal control module - drives the turtle to each goal in turn
pub mod goto_ctrl;

/// Cleaner executable parameters
pub mod params;

/// Path execution - runs go-to-goal control at a fixed rate
pub mod path_exec;

/// Pose client - receives pose feedback from the turtle
pub mod pose_client;

/// Pose tracker - holds the latest pose feedback
pub mod pose_tracker;

/// Turtle simulation - a kinematic stand-in for the turtle
pub mod sim;
