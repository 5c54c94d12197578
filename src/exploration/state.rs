//! Exploration state machine states and tick results.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::core::Pose2D;

use super::goal::Goal;

/// Exploration state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExplorationState {
    /// No map received yet
    WaitingForMap,

    /// Processing maps; `first_time` forces the first goal decision
    /// regardless of the replan gate
    Exploring { first_time: bool },

    /// Terminal: motion cancelled, loop stops
    Finished,
}

impl ExplorationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExplorationState::Finished)
    }

    /// State name for logging
    pub fn name(&self) -> &'static str {
        match self {
            ExplorationState::WaitingForMap => "WaitingForMap",
            ExplorationState::Exploring { .. } => "Exploring",
            ExplorationState::Finished => "Finished",
        }
    }
}

/// What one controller tick did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    /// No new map; nothing done
    Idle,
    /// Pose refresh failed; retried next tick
    PoseUnavailable,
    /// Pose fresh, no replan due
    Holding,
    /// A goal was commanded
    GoalIssued(Goal),
    /// No frontier yielded an acceptable goal
    NoAcceptableGoal,
    /// Exploration finished
    Finished,
}

/// Last goal commanded to the robot.
#[derive(Clone, Copy, Debug)]
pub struct IssuedGoal {
    pub goal: Goal,
    /// Robot pose when the goal was commanded
    pub origin: Pose2D,
    pub issued_at: Instant,
}

/// Counters reported at shutdown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExplorationStats {
    pub ticks: u64,
    pub maps_processed: u64,
    pub goals_issued: u64,
    pub pose_failures: u64,
    pub goal_failures: u64,
}

/// Request to end exploration, settable from mission logic.
///
/// Clones share one flag. The controller checks it on the next processed map.
#[derive(Clone, Debug, Default)]
pub struct FinishSignal(Arc<AtomicBool>);

impl FinishSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
