//! Navigation goal type.

use serde::{Deserialize, Serialize};

use crate::core::{Pose2D, WorldPoint};

/// Target pose commanded to the robot's navigation stack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub pose: Pose2D,
}

impl Goal {
    pub fn new(pose: Pose2D) -> Self {
        Self { pose }
    }

    /// Goal at `position` facing `heading` (radians).
    pub fn at(position: WorldPoint, heading: f32) -> Self {
        Self {
            pose: Pose2D::from_position_angle(position, heading),
        }
    }

    #[inline]
    pub fn position(&self) -> WorldPoint {
        self.pose.position()
    }
}

impl From<Pose2D> for Goal {
    fn from(pose: Pose2D) -> Self {
        Self::new(pose)
    }
}
