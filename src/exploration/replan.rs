//! Replan gate: named causes that decide whether the current goal should be
//! recomputed.
//!
//! Each cause is registered by name with optional string parameters and
//! evaluates to a boolean against a [`ReplanContext`]. The gate replans when
//! at least one cause fires; with no causes it never does.

use std::collections::BTreeMap;
use std::f32::consts::FRAC_PI_2;
use std::fmt;
use std::time::Duration;

use crate::config::ReplanningConfig;
use crate::core::Pose2D;
use crate::error::{ExploreError, Result};

use super::goal::Goal;

/// String parameters of a replanning cause.
pub type CauseParams = BTreeMap<String, String>;

/// Snapshot of the robot and goal state a cause is evaluated against.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReplanContext {
    /// Freshly refreshed robot pose
    pub pose: Pose2D,
    /// Robot motion reports an active navigation
    pub moving: bool,
    /// Last commanded goal
    pub goal: Option<Goal>,
    /// Robot pose when that goal was commanded
    pub goal_origin: Option<Pose2D>,
    /// Time since that goal was commanded
    pub since_goal: Option<Duration>,
    /// Number of frontiers in the current map
    pub frontier_count: usize,
}

/// A replanning predicate. Evaluation must not have side effects.
pub trait ReplanCondition: Send + fmt::Debug {
    fn evaluate(&self, ctx: &ReplanContext) -> bool;
}

/// Replan whenever the robot is idle (goal reached or aborted).
#[derive(Clone, Copy, Debug)]
pub struct NotMoving;

impl ReplanCondition for NotMoving {
    fn evaluate(&self, ctx: &ReplanContext) -> bool {
        !ctx.moving
    }
}

/// Replan after travelling `threshold` meters since the goal was issued.
#[derive(Clone, Copy, Debug)]
pub struct DistanceTravelled {
    pub threshold: f32,
}

impl ReplanCondition for DistanceTravelled {
    fn evaluate(&self, ctx: &ReplanContext) -> bool {
        ctx.goal_origin
            .is_some_and(|origin| origin.distance_to(ctx.pose) >= self.threshold)
    }
}

/// Replan after turning `threshold` radians since the goal was issued.
#[derive(Clone, Copy, Debug)]
pub struct Rotation {
    pub threshold: f32,
}

impl ReplanCondition for Rotation {
    fn evaluate(&self, ctx: &ReplanContext) -> bool {
        ctx.goal_origin
            .is_some_and(|origin| origin.heading_change(ctx.pose) >= self.threshold)
    }
}

/// Replan once the robot is within `threshold` meters of the goal.
#[derive(Clone, Copy, Debug)]
pub struct GoalReached {
    pub threshold: f32,
}

impl ReplanCondition for GoalReached {
    fn evaluate(&self, ctx: &ReplanContext) -> bool {
        ctx.goal
            .is_some_and(|goal| goal.position().distance(&ctx.pose.position()) <= self.threshold)
    }
}

/// Replan when the goal has been active for `limit`.
#[derive(Clone, Copy, Debug)]
pub struct TimeElapsed {
    pub limit: Duration,
}

impl ReplanCondition for TimeElapsed {
    fn evaluate(&self, ctx: &ReplanContext) -> bool {
        ctx.since_goal.is_some_and(|elapsed| elapsed >= self.limit)
    }
}

/// Replan on every processed map.
#[derive(Clone, Copy, Debug)]
pub struct Always;

impl ReplanCondition for Always {
    fn evaluate(&self, _ctx: &ReplanContext) -> bool {
        true
    }
}

/// One registered cause.
#[derive(Debug)]
pub struct ReplanCause {
    name: String,
    params: CauseParams,
    condition: Box<dyn ReplanCondition>,
}

impl ReplanCause {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameters the cause was registered with (empty for defaults).
    pub fn params(&self) -> &CauseParams {
        &self.params
    }

    pub fn is_default(&self) -> bool {
        self.params.is_empty()
    }

    pub fn evaluate(&self, ctx: &ReplanContext) -> bool {
        self.condition.evaluate(ctx)
    }
}

/// Ordered collection of replanning causes.
#[derive(Debug, Default)]
pub struct ReplanGate {
    causes: Vec<ReplanCause>,
}

impl ReplanGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the gate from `replaning.conditions` and the per-cause tables.
    ///
    /// Causes without a parameter table are registered with defaults.
    pub fn from_config(config: &ReplanningConfig) -> Result<Self> {
        let mut gate = Self::new();

        let Some(conditions) = config.conditions.as_ref() else {
            tracing::warn!(
                "replaning.conditions not configured; only the first goal will be computed"
            );
            return Ok(gate);
        };

        for name in conditions {
            tracing::info!("processing {}", name);
            match config.cause_params(name) {
                Some(params) => gate.add_cause_with(name, params)?,
                None => {
                    tracing::info!("No parameters found for replaning cause {}", name);
                    gate.add_cause(name)?;
                }
            }
        }

        Ok(gate)
    }

    /// Register a built-in cause with default parameters.
    pub fn add_cause(&mut self, name: &str) -> Result<()> {
        self.add_cause_with(name, CauseParams::new())
    }

    /// Register a built-in cause with explicit parameters.
    pub fn add_cause_with(&mut self, name: &str, params: CauseParams) -> Result<()> {
        let condition = build_condition(name, &params)?;
        self.causes.push(ReplanCause {
            name: name.to_string(),
            params,
            condition,
        });
        Ok(())
    }

    /// Register a caller supplied condition under `name`.
    pub fn add_condition(&mut self, name: &str, condition: Box<dyn ReplanCondition>) {
        self.causes.push(ReplanCause {
            name: name.to_string(),
            params: CauseParams::new(),
            condition,
        });
    }

    /// True iff at least one registered cause fires.
    pub fn replan(&self, ctx: &ReplanContext) -> bool {
        match self.causes.iter().find(|cause| cause.evaluate(ctx)) {
            Some(cause) => {
                tracing::debug!("Replanning: cause {} fired", cause.name);
                true
            }
            None => false,
        }
    }

    pub fn causes(&self) -> &[ReplanCause] {
        &self.causes
    }

    pub fn len(&self) -> usize {
        self.causes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.causes.is_empty()
    }
}

fn build_condition(name: &str, params: &CauseParams) -> Result<Box<dyn ReplanCondition>> {
    let condition: Box<dyn ReplanCondition> = match name {
        "not_moving" => {
            warn_unused(name, params, &[]);
            Box::new(NotMoving)
        }
        "distance" => {
            warn_unused(name, params, &["threshold"]);
            Box::new(DistanceTravelled {
                threshold: param_f32(name, params, "threshold", 1.0)?,
            })
        }
        "rotation" => {
            warn_unused(name, params, &["threshold"]);
            Box::new(Rotation {
                threshold: param_f32(name, params, "threshold", FRAC_PI_2)?,
            })
        }
        "goal_reached" => {
            warn_unused(name, params, &["threshold"]);
            Box::new(GoalReached {
                threshold: param_f32(name, params, "threshold", 0.3)?,
            })
        }
        "time" => {
            warn_unused(name, params, &["seconds"]);
            let seconds = param_f32(name, params, "seconds", 10.0)?;
            let limit = Duration::try_from_secs_f32(seconds).map_err(|_| {
                ExploreError::InvalidCauseParameter {
                    cause: name.to_string(),
                    key: "seconds".to_string(),
                    value: params
                        .get("seconds")
                        .cloned()
                        .unwrap_or_else(|| seconds.to_string()),
                }
            })?;
            Box::new(TimeElapsed { limit })
        }
        "always" => {
            warn_unused(name, params, &[]);
            Box::new(Always)
        }
        other => return Err(ExploreError::UnknownReplanCause(other.to_string())),
    };
    Ok(condition)
}

/// Non-negative float parameter, `default` when absent.
fn param_f32(cause: &str, params: &CauseParams, key: &str, default: f32) -> Result<f32> {
    let Some(raw) = params.get(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<f32>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(ExploreError::InvalidCauseParameter {
            cause: cause.to_string(),
            key: key.to_string(),
            value: raw.clone(),
        }),
    }
}

fn warn_unused(cause: &str, params: &CauseParams, known: &[&str]) {
    for key in params.keys().filter(|k| !known.contains(&k.as_str())) {
        tracing::warn!("Replanning cause {}: ignoring unknown parameter {}", cause, key);
    }
}
