//! # Pose tracker
//!
//! A single slot cache of the latest pose received from the feedback channel. The feedback
//! handler writes it, the control loop reads it. There is no queue and no history: the most
//! recent completed update always wins.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use comms_if::eqpt::turtle::Pose;
use util::maths::round_dp;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of decimal places position is rounded to when stored.
pub const POSITION_DECIMAL_PLACES: i32 = 4;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Shared handle to the latest pose. Clones refer to the same slot.
#[derive(Debug, Clone, Default)]
pub struct PoseTracker {
    slot: Arc<Mutex<Slot>>,
}

#[derive(Debug, Default)]
struct Slot {
    pose: Pose,
    num_updates: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PoseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last known pose, or the zero pose if no feedback has arrived yet.
    pub fn current_pose(&self) -> Pose {
        self.lock().pose
    }

    /// Store a new pose reading.
    ///
    /// `x` and `y` are rounded to 4 decimal places, `theta` is kept as is. No range checks are
    /// made, out of bounds readings are stored like any other.
    pub fn on_pose_update(&self, new_pose: Pose) {
        let pose = Pose {
            x: round_dp(new_pose.x, POSITION_DECIMAL_PLACES),
            y: round_dp(new_pose.y, POSITION_DECIMAL_PLACES),
            theta: new_pose.theta,
        };

        let mut slot = self.lock();
        slot.pose = pose;
        slot.num_updates += 1;
    }

    /// Number of updates received so far.
    pub fn num_updates(&self) -> u64 {
        self.lock().num_updates
    }

    /// Whether any feedback has been received yet.
    pub fn has_feedback(&self) -> bool {
        self.num_updates() > 0
    }

    /// The slot only ever holds a fully written pose, so a writer panicking elsewhere cannot leave
    /// it torn and the poison flag can be ignored.
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::thread;

    #[test]
    fn test_initial_pose_is_zero() {
        let tracker = PoseTracker::new();
        assert_eq!(tracker.current_pose(), Pose::default());
        assert!(!tracker.has_feedback());
    }

    #[test]
    fn test_update_rounds_position_only() {
        let tracker = PoseTracker::new();
        tracker.on_pose_update(Pose::new(5.544445, 1.234567, 0.123456789));

        let pose = tracker.current_pose();
        assert_eq!(pose.x, 5.5444);
        assert_eq!(pose.y, 1.2346);
        assert_eq!(pose.theta, 0.123456789);
        assert_eq!(tracker.num_updates(), 1);
    }

    #[test]
    fn test_no_filtering() {
        let tracker = PoseTracker::new();
        tracker.on_pose_update(Pose::new(-3.0, 250.0, 42.0));
        assert_eq!(tracker.current_pose(), Pose::new(-3.0, 250.0, 42.0));
    }

    #[test]
    fn test_latest_wins_across_threads() {
        let tracker = PoseTracker::new();
        let writer = tracker.clone();

        thread::spawn(move || {
            for i in 0..100 {
                writer.on_pose_update(Pose::new(i as f64, i as f64, 0.0));
            }
        })
        .join()
        .unwrap();

        // x and y are always written together, and the last write is the one seen
        let pose = tracker.current_pose();
        assert_eq!(pose, Pose::new(99.0, 99.0, 0.0));
        assert_eq!(tracker.num_updates(), 100);
    }
}
