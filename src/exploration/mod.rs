//! Frontier exploration.
//!
//! The [`ExplorationController`] consumes frontier maps from a map service,
//! asks the [`ReplanGate`] whether a new goal is due, lets a [`GoalSelector`]
//! pick the first acceptable frontier and commands the robot toward it.

mod controller;
mod decision;
mod frontier;
mod goal;
mod replan;
mod selector;
mod state;

pub use controller::{ExplorationController, FRONTIER_TOPIC, GOAL_ARROW_SCALE, GOAL_TOPIC};
pub use decision::{Decision, FRONTIER_MARKER, GOAL_MARKER, decide_goal, select_goal};
pub use frontier::{Frontier, FrontierMap, FrontierSnapshot};
pub use goal::Goal;
pub use replan::{
    Always, CauseParams, DistanceTravelled, GoalReached, NotMoving, ReplanCause, ReplanCondition,
    ReplanContext, ReplanGate, Rotation, TimeElapsed,
};
pub use selector::{Centroid, GoalSelector, MidPoint, SelectorParams, SelectorRegistry};
pub use state::{ExplorationState, ExplorationStats, FinishSignal, IssuedGoal, TickOutcome};
