//! Anveshan - Frontier Exploration Controller for VacuumTiger
//!
//! Drives a robot toward the frontiers of a growing occupancy map until no
//! unexplored region is left.
//!
//! ## Architecture
//!
//! - **Map Service**: delivers ordered frontier maps and a consume-once
//!   "new map" flag
//! - **Exploration Controller** (fixed rate): on each new map, refreshes the
//!   robot pose, asks the replan gate whether a new goal is due and commands
//!   the first frontier accepted by the goal selector
//! - **Robot Motion**: fire-and-forget navigation goals, motion status
//! - **Marker Publisher**: visualization of the chosen frontier and goal
//!
//! The [`sim`] module provides in-process collaborators for running the loop
//! without a robot.

pub mod config;
pub mod core;
pub mod error;
pub mod exploration;
pub mod services;
pub mod sim;
pub mod testing;

pub use config::AnveshanConfig;
pub use error::{ExploreError, Result};
pub use exploration::{
    ExplorationController, ExplorationState, ExplorationStats, FinishSignal, Goal, GoalSelector,
    ReplanGate, SelectorRegistry, TickOutcome,
};
