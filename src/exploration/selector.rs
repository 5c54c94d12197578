//! Goal selector strategies.
//!
//! A [`GoalSelector`] looks at one frontier and either rejects it or turns it
//! into a navigation [`Goal`]. Strategies are created by name through a
//! [`SelectorRegistry`], driven by `goal_selector.type` in the config.

use std::collections::BTreeMap;
use std::f32::consts::FRAC_PI_2;
use std::fmt;

use crate::config::GoalSelectorConfig;
use crate::error::{ExploreError, Result};

use super::frontier::Frontier;
use super::goal::Goal;

/// String parameters passed to a strategy factory.
pub type SelectorParams = BTreeMap<String, String>;

/// Strategy deciding whether a frontier yields an acceptable goal.
pub trait GoalSelector: Send {
    /// Name of this strategy for logging.
    fn name(&self) -> &'static str;

    /// Goal for `frontier`, or `None` to reject it.
    fn decide_goal(&self, frontier: &Frontier) -> Option<Goal>;
}

/// Accepts any non-empty frontier and targets the middle of its boundary.
///
/// The goal heading is perpendicular to the chord from the first to the last
/// boundary point, or 0 when the chord is degenerate.
#[derive(Clone, Copy, Debug, Default)]
pub struct MidPoint;

impl GoalSelector for MidPoint {
    fn name(&self) -> &'static str {
        "mid_point"
    }

    fn decide_goal(&self, frontier: &Frontier) -> Option<Goal> {
        let mid = frontier.midpoint()?;
        let first = frontier.points.first()?;
        let last = frontier.points.last()?;

        let heading = if first.distance_squared(last) > f32::EPSILON {
            first.angle_to(last) + FRAC_PI_2
        } else {
            0.0
        };

        Some(Goal::at(mid, heading))
    }
}

/// Targets the frontier centroid, skipping frontiers below `min_size` cells.
#[derive(Clone, Copy, Debug)]
pub struct Centroid {
    pub min_size: usize,
}

impl Default for Centroid {
    fn default() -> Self {
        Self { min_size: 1 }
    }
}

impl Centroid {
    fn from_params(params: &SelectorParams) -> Result<Self> {
        let mut selector = Self::default();
        if let Some(raw) = params.get("min_size") {
            selector.min_size = raw.trim().parse().map_err(|_| {
                ExploreError::Config(format!("goal_selector.min_size: invalid value {:?}", raw))
            })?;
        }
        Ok(selector)
    }
}

impl GoalSelector for Centroid {
    fn name(&self) -> &'static str {
        "centroid"
    }

    fn decide_goal(&self, frontier: &Frontier) -> Option<Goal> {
        if frontier.size < self.min_size {
            return None;
        }
        frontier.centroid_or_mean().map(|c| Goal::at(c, 0.0))
    }
}

type SelectorFactory = Box<dyn Fn(&SelectorParams) -> Result<Box<dyn GoalSelector>> + Send + Sync>;

/// Name → factory table for goal selector strategies.
pub struct SelectorRegistry {
    factories: BTreeMap<String, SelectorFactory>,
}

impl SelectorRegistry {
    /// Empty registry.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry with the built-in `mid_point` and `centroid` strategies.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("mid_point", |_| Ok(Box::new(MidPoint) as Box<dyn GoalSelector>));
        registry.register("centroid", |params| {
            Ok(Box::new(Centroid::from_params(params)?) as Box<dyn GoalSelector>)
        });
        registry
    }

    /// Register (or replace) a strategy under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&SelectorParams) -> Result<Box<dyn GoalSelector>> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Registered strategy names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Build the strategy registered under `name`.
    pub fn create(&self, name: &str, params: &SelectorParams) -> Result<Box<dyn GoalSelector>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ExploreError::UnknownGoalSelector(name.to_string()))?;
        factory(params)
    }

    /// Build the strategy named by `goal_selector.type`.
    pub fn from_config(&self, config: &GoalSelectorConfig) -> Result<Box<dyn GoalSelector>> {
        let name = config
            .kind
            .as_deref()
            .ok_or(ExploreError::MissingGoalSelector)?;
        let selector = self.create(name, &config.params())?;
        tracing::info!("Goal selector: {}", selector.name());
        Ok(selector)
    }
}

impl Default for SelectorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for SelectorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectorRegistry")
            .field("names", &self.names())
            .finish()
    }
}
