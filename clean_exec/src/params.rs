//! # Cleaner Executable Parameters
//!
//! This module provide parameters for the cleaner executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanExecParams {
    /// Rate at which the control cycle runs.
    ///
    /// Units: Hertz
    pub cycle_frequency_hz: f64,

    /// Minimum level of messages to log, one of `trace`, `debug` or `info`
    pub log_level: String,

    /// Maximum time to wait for the first pose before giving up.
    ///
    /// Units: seconds
    pub first_pose_timeout_s: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CleanExecParams {
    /// Check the parameters are usable, returning a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.cycle_frequency_hz.is_finite() && self.cycle_frequency_hz > 0.0) {
            return Err(format!(
                "cycle_frequency_hz must be positive, found {}",
                self.cycle_frequency_hz
            ));
        }

        if !(self.first_pose_timeout_s.is_finite() && self.first_pose_timeout_s >= 0.0) {
            return Err(format!(
                "first_pose_timeout_s must be non-negative, found {}",
                self.first_pose_timeout_s
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_validate() {
        let params: CleanExecParams = util::params::from_str(
            "cycle_frequency_hz = 10.0\nlog_level = \"info\"\nfirst_pose_timeout_s = 5.0\n",
        )
        .unwrap();
        assert!(params.validate().is_ok());

        let zero_rate = CleanExecParams {
            cycle_frequency_hz: 0.0,
            ..params.clone()
        };
        assert!(zero_rate.validate().is_err());

        let negative_timeout = CleanExecParams {
            first_pose_timeout_s: -1.0,
            ..params
        };
        assert!(negative_timeout.validate().is_err());
    }
}
