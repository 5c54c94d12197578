//! Collaborator interfaces consumed by the exploration controller.
//!
//! - [`MapService`]: delivers frontier maps and the "new map" signal
//! - [`RobotMotion`]: pose, navigation commands, motion status
//! - [`MarkerPublisher`]: visualization of the chosen frontier and goal

mod map;
mod markers;
mod motion;

pub use map::{MapCallback, MapFeed, MapService};
pub use markers::{MarkerPublisher, MarkerShape, Scale3, TracingMarkerPublisher};
pub use motion::RobotMotion;
