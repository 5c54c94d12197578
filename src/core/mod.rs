//! Core geometric types shared by the exploration loop and its collaborators:
//! - [`WorldPoint`]: 2D position in meters
//! - [`Pose2D`]: robot pose (position + heading)

mod math;
mod point;
mod pose;

pub use math::{TWO_PI, angle_diff, normalize_angle};
pub use point::WorldPoint;
pub use pose::Pose2D;
