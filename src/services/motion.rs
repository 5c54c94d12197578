//! Robot motion contract.

use crate::core::Pose2D;
use crate::error::Result;
use crate::exploration::Goal;

/// Navigation stack of the robot.
///
/// Commands are fire-and-forget: `go_to` returns immediately and a new goal
/// preempts the previous one. The controller polls pose and status on later
/// ticks.
pub trait RobotMotion {
    /// Connect to the navigation stack.
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// Look up the current pose. Fails when localization is unavailable.
    fn refresh_pose(&mut self) -> Result<Pose2D>;

    /// Pose from the last successful refresh.
    fn pose(&self) -> Option<Pose2D>;

    /// A navigation goal is active.
    fn is_moving(&self) -> bool;

    /// Start navigating to `goal`.
    fn go_to(&mut self, goal: Goal);

    /// Abort the active goal, if any.
    fn cancel_goal(&mut self);

    /// Log a one-line status. Diagnostic only.
    fn print_status(&self) {
        match self.pose() {
            Some(pose) => tracing::info!(
                "Robot at ({:.2}, {:.2}, {:.1}°), moving={}",
                pose.x,
                pose.y,
                pose.theta.to_degrees(),
                self.is_moving()
            ),
            None => tracing::info!("Robot pose unknown, moving={}", self.is_moving()),
        }
    }
}
