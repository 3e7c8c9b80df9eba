//! # Go-to-goal control module
//!
//! GotoCtrl drives the turtle through an ordered list of goal points. For the active goal it
//! computes two errors from the current pose:
//!
//! - the distance error, the straight line distance from the turtle to the goal, and
//! - the heading error, the difference between the bearing of the goal from the turtle (the
//!   steering angle) and the turtle's current heading.
//!
//! Each is mapped to a velocity demand by a pure proportional controller: forward speed is the
//! distance error times the linear gain, turn rate is the heading error times the angular gain.
//! Once the distance error drops below the tolerance a single stop command is issued and the
//! next goal becomes active. When the last goal converges the path is complete.
//!
//! The module is stepped once per control cycle through [`util::module::State::proc`], so the
//! caller owns the timing, cancellation and any timeout.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod controllers;
pub mod params;
pub mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use controllers::*;
pub use params::Params;
pub use state::*;
