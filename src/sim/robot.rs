//! Simulated robot motion.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::Pose2D;
use crate::error::{ExploreError, Result};
use crate::exploration::Goal;
use crate::services::RobotMotion;

use super::world::SharedWorld;

/// Drives the robot of a [`SimWorld`](super::SimWorld).
///
/// Motion itself advances when the map service steps the world.
#[derive(Debug)]
pub struct SimRobot {
    world: SharedWorld,
    last_pose: Option<Pose2D>,
    pose_dropout: f32,
    rng: StdRng,
}

impl SimRobot {
    pub fn new(world: SharedWorld, seed: u64) -> Self {
        Self {
            world,
            last_pose: None,
            pose_dropout: 0.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Fail pose refreshes with probability `p`.
    pub fn with_pose_dropout(mut self, p: f32) -> Self {
        self.pose_dropout = p.clamp(0.0, 1.0);
        self
    }
}

impl RobotMotion for SimRobot {
    fn init(&mut self) -> Result<()> {
        let world = self.world.lock();
        tracing::info!(
            "Simulated robot ready, {} sites to explore",
            world.site_count()
        );
        Ok(())
    }

    fn refresh_pose(&mut self) -> Result<Pose2D> {
        if self.pose_dropout > 0.0 && self.rng.gen_range(0.0f32..1.0) < self.pose_dropout {
            return Err(ExploreError::PoseUnavailable(
                "simulated localization dropout".to_string(),
            ));
        }
        let pose = self.world.lock().robot();
        self.last_pose = Some(pose);
        Ok(pose)
    }

    fn pose(&self) -> Option<Pose2D> {
        self.last_pose
    }

    fn is_moving(&self) -> bool {
        self.world.lock().goal().is_some()
    }

    fn go_to(&mut self, goal: Goal) {
        self.world.lock().set_goal(Some(goal));
    }

    fn cancel_goal(&mut self) {
        self.world.lock().set_goal(None);
    }
}
