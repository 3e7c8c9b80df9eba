//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the software.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Message definitions exchanged with equipment (the turtle itself or its simulation)
pub mod eqpt;

/// Network module
pub mod net;
