//! In-process simulation used by the `anveshan` binary.
//!
//! A [`SimWorld`] holds the robot and the unexplored sites. [`SimRobot`] and
//! [`SimMapService`] share it behind a mutex.

mod map_service;
mod robot;
mod world;

pub use map_service::SimMapService;
pub use robot::SimRobot;
pub use world::{SharedWorld, SimWorld};

use crate::config::SimulationConfig;

/// Simulated collaborators over one shared world.
#[derive(Debug)]
pub struct Simulation {
    pub world: SharedWorld,
    pub robot: SimRobot,
    pub maps: SimMapService,
}

impl Simulation {
    pub fn new(config: &SimulationConfig) -> Self {
        let world = SimWorld::generate(config).into_shared();
        let robot = SimRobot::new(world.clone(), config.seed.wrapping_add(1))
            .with_pose_dropout(config.pose_dropout);
        let maps = SimMapService::new(world.clone(), config.map_period);
        Self { world, robot, maps }
    }
}
