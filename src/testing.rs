//! Scripted collaborators for exercising the controller without a robot.
//!
//! Each mock records what the controller asked of it so tests can assert on
//! commands, cancellations and published markers.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::core::{Pose2D, WorldPoint};
use crate::error::{ExploreError, Result};
use crate::exploration::{FrontierMap, Goal};
use crate::services::{MapCallback, MapFeed, MapService, MarkerPublisher, MarkerShape, RobotMotion, Scale3};

/// Robot whose pose lookups and motion status are set by the test.
#[derive(Debug, Default)]
pub struct ScriptedRobot {
    pose: Pose2D,
    refreshed: Option<Pose2D>,
    pose_failures: u32,
    moving: bool,
    /// Start moving when a goal is commanded
    pub move_on_goal: bool,
    goals: Vec<Goal>,
    cancels: u32,
}

impl ScriptedRobot {
    pub fn new(pose: Pose2D) -> Self {
        Self {
            pose,
            ..Default::default()
        }
    }

    /// Make the next `n` pose refreshes fail.
    pub fn fail_pose(&mut self, n: u32) {
        self.pose_failures = n;
    }

    pub fn set_pose(&mut self, pose: Pose2D) {
        self.pose = pose;
    }

    pub fn set_moving(&mut self, moving: bool) {
        self.moving = moving;
    }

    /// Goals commanded so far, oldest first.
    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn cancels(&self) -> u32 {
        self.cancels
    }
}

impl RobotMotion for ScriptedRobot {
    fn refresh_pose(&mut self) -> Result<Pose2D> {
        if self.pose_failures > 0 {
            self.pose_failures -= 1;
            return Err(ExploreError::PoseUnavailable(
                "transform map -> base_link unavailable".to_string(),
            ));
        }
        self.refreshed = Some(self.pose);
        Ok(self.pose)
    }

    fn pose(&self) -> Option<Pose2D> {
        self.refreshed
    }

    fn is_moving(&self) -> bool {
        self.moving
    }

    fn go_to(&mut self, goal: Goal) {
        self.goals.push(goal);
        if self.move_on_goal {
            self.moving = true;
        }
    }

    fn cancel_goal(&mut self) {
        self.cancels += 1;
        self.moving = false;
    }
}

/// Map service fed by the test through a shared [`MapFeed`].
///
/// Maps queued with [`ScriptedMaps::queue`] are delivered one per
/// `spin_once`; [`ScriptedMaps::feed`] allows delivering directly.
#[derive(Debug, Default)]
pub struct ScriptedMaps {
    feed: Arc<MapFeed>,
    queued: VecDeque<FrontierMap>,
    costmap: Option<String>,
}

impl ScriptedMaps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivery handle usable while the controller borrows the service.
    pub fn feed(&self) -> Arc<MapFeed> {
        Arc::clone(&self.feed)
    }

    pub fn queue(&mut self, map: FrontierMap) {
        self.queued.push_back(map);
    }

    pub fn costmap_topic(&self) -> Option<&str> {
        self.costmap.as_deref()
    }
}

impl MapService for ScriptedMaps {
    fn subscribe_map(&mut self, topic: &str, on_map: MapCallback) -> Result<()> {
        self.feed.subscribe(topic, on_map)
    }

    fn subscribe_costmap(&mut self, topic: &str) -> Result<()> {
        self.costmap = Some(topic.to_string());
        Ok(())
    }

    fn has_new_map(&self) -> bool {
        self.feed.has_new_map()
    }

    fn mark_consumed(&mut self) {
        self.feed.mark_consumed();
    }

    fn spin_once(&mut self) {
        if let Some(map) = self.queued.pop_front() {
            self.feed.deliver(map);
        }
    }
}

/// One published marker.
#[derive(Clone, Debug, PartialEq)]
pub enum Published {
    Points(String, Vec<WorldPoint>),
    Pose(String, Pose2D),
}

/// Marker publisher that keeps every call.
#[derive(Debug, Default)]
pub struct RecordingMarkers {
    /// name -> (topic, shape, scale)
    pub channels: HashMap<String, (String, MarkerShape, Scale3)>,
    pub published: Vec<Published>,
}

impl RecordingMarkers {
    /// Last pose published on `name`.
    pub fn last_pose(&self, name: &str) -> Option<Pose2D> {
        self.published.iter().rev().find_map(|p| match p {
            Published::Pose(n, pose) if n == name => Some(*pose),
            _ => None,
        })
    }
}

impl MarkerPublisher for RecordingMarkers {
    fn add(&mut self, name: &str, topic: &str) {
        self.channels.insert(
            name.to_string(),
            (topic.to_string(), MarkerShape::default(), Scale3::default()),
        );
    }

    fn set_scale(&mut self, name: &str, scale: Scale3) {
        if let Some(channel) = self.channels.get_mut(name) {
            channel.2 = scale;
        }
    }

    fn set_shape(&mut self, name: &str, shape: MarkerShape) {
        if let Some(channel) = self.channels.get_mut(name) {
            channel.1 = shape;
        }
    }

    fn publish_points(&mut self, name: &str, points: &[WorldPoint]) {
        self.published
            .push(Published::Points(name.to_string(), points.to_vec()));
    }

    fn publish_pose(&mut self, name: &str, pose: &Pose2D) {
        self.published.push(Published::Pose(name.to_string(), *pose));
    }
}
