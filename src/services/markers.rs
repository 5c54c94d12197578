//! Marker publisher contract and a log-backed implementation.

use std::collections::HashMap;

use crate::core::{Pose2D, WorldPoint};

/// Marker primitive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MarkerShape {
    Arrow,
    #[default]
    Points,
    LineStrip,
    Sphere,
}

/// Marker scale along x, y, z.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scale3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Scale3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl Default for Scale3 {
    fn default() -> Self {
        Self::new(0.05, 0.05, 0.05)
    }
}

/// Visualization sink for operator debugging. Not read by control logic.
pub trait MarkerPublisher {
    /// Declare channel `name`, published on `topic`.
    fn add(&mut self, name: &str, topic: &str);

    fn set_scale(&mut self, name: &str, scale: Scale3);

    fn set_shape(&mut self, name: &str, shape: MarkerShape);

    fn publish_points(&mut self, name: &str, points: &[WorldPoint]);

    fn publish_pose(&mut self, name: &str, pose: &Pose2D);
}

#[derive(Clone, Debug)]
struct Channel {
    topic: String,
    shape: MarkerShape,
    scale: Scale3,
    published: u64,
}

/// Writes markers to the log at debug level.
#[derive(Debug, Default)]
pub struct TracingMarkerPublisher {
    channels: HashMap<String, Channel>,
}

impl TracingMarkerPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of markers published on `name`.
    pub fn published(&self, name: &str) -> u64 {
        self.channels.get(name).map_or(0, |c| c.published)
    }

    pub fn shape(&self, name: &str) -> Option<MarkerShape> {
        self.channels.get(name).map(|c| c.shape)
    }

    pub fn scale(&self, name: &str) -> Option<Scale3> {
        self.channels.get(name).map(|c| c.scale)
    }

    fn channel_mut(&mut self, name: &str) -> Option<&mut Channel> {
        let channel = self.channels.get_mut(name);
        if channel.is_none() {
            tracing::warn!("Marker channel {} was never added", name);
        }
        channel
    }
}

impl MarkerPublisher for TracingMarkerPublisher {
    fn add(&mut self, name: &str, topic: &str) {
        self.channels.insert(
            name.to_string(),
            Channel {
                topic: topic.to_string(),
                shape: MarkerShape::default(),
                scale: Scale3::default(),
                published: 0,
            },
        );
    }

    fn set_scale(&mut self, name: &str, scale: Scale3) {
        if let Some(channel) = self.channel_mut(name) {
            channel.scale = scale;
        }
    }

    fn set_shape(&mut self, name: &str, shape: MarkerShape) {
        if let Some(channel) = self.channel_mut(name) {
            channel.shape = shape;
        }
    }

    fn publish_points(&mut self, name: &str, points: &[WorldPoint]) {
        if let Some(channel) = self.channel_mut(name) {
            channel.published += 1;
            tracing::debug!(
                "[{}] {:?} marker: {} points, first={:?}",
                channel.topic,
                channel.shape,
                points.len(),
                points.first()
            );
        }
    }

    fn publish_pose(&mut self, name: &str, pose: &Pose2D) {
        if let Some(channel) = self.channel_mut(name) {
            channel.published += 1;
            tracing::debug!(
                "[{}] {:?} marker at ({:.2}, {:.2}, {:.1}°)",
                channel.topic,
                channel.shape,
                pose.x,
                pose.y,
                pose.theta.to_degrees()
            );
        }
    }
}
