//! Simulated arena with unexplored sites.

use std::f32::consts::FRAC_PI_3;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SimulationConfig;
use crate::core::{Pose2D, WorldPoint};
use crate::exploration::{Frontier, FrontierMap, Goal};

/// World state shared by the simulated robot and map service.
pub type SharedWorld = Arc<Mutex<SimWorld>>;

/// Points per frontier arc
const ARC_POINTS: usize = 5;

#[derive(Clone, Copy, Debug)]
struct Site {
    position: WorldPoint,
    seen: bool,
}

/// Arena with a robot and a set of sites that become explored once the robot
/// passes within `reveal_radius`.
#[derive(Clone, Debug)]
pub struct SimWorld {
    sites: Vec<Site>,
    reveal_radius: f32,
    speed: f32,
    robot: Pose2D,
    goal: Option<Goal>,
}

impl SimWorld {
    /// World with the given sites, robot at the origin.
    pub fn new(sites: Vec<WorldPoint>, reveal_radius: f32, speed: f32) -> Self {
        Self {
            sites: sites
                .into_iter()
                .map(|position| Site {
                    position,
                    seen: false,
                })
                .collect(),
            reveal_radius,
            speed,
            robot: Pose2D::identity(),
            goal: None,
        }
    }

    /// Scatter `config.sites` sites uniformly over the arena.
    pub fn generate(config: &SimulationConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let half = config.arena_half_size;
        let mut coord = || {
            if half > 0.0 {
                rng.gen_range(-half..half)
            } else {
                0.0
            }
        };
        let sites = (0..config.sites)
            .map(|_| WorldPoint::new(coord(), coord()))
            .collect();
        Self::new(sites, config.reveal_radius, config.speed)
    }

    pub fn into_shared(self) -> SharedWorld {
        Arc::new(Mutex::new(self))
    }

    pub fn robot(&self) -> Pose2D {
        self.robot
    }

    pub fn goal(&self) -> Option<Goal> {
        self.goal
    }

    pub fn set_goal(&mut self, goal: Option<Goal>) {
        self.goal = goal;
    }

    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    /// Sites not explored yet.
    pub fn remaining(&self) -> usize {
        self.sites.iter().filter(|site| !site.seen).count()
    }

    /// Mark sites within reveal radius of the robot as explored.
    ///
    /// Returns the number of newly explored sites.
    pub fn reveal(&mut self) -> usize {
        let robot = self.robot.position();
        let radius = self.reveal_radius;
        let mut revealed = 0;
        for site in self.sites.iter_mut().filter(|site| !site.seen) {
            if site.position.distance(&robot) <= radius {
                site.seen = true;
                revealed += 1;
            }
        }
        if revealed > 0 {
            tracing::debug!("Revealed {} sites, {} remaining", revealed, self.remaining());
        }
        revealed
    }

    /// Advance the robot one step toward its goal.
    ///
    /// The goal clears on arrival, which ends the motion.
    pub fn step(&mut self) {
        if let Some(goal) = self.goal {
            let here = self.robot.position();
            let target = goal.position();
            let remaining = here.distance(&target);

            if remaining <= self.speed {
                self.robot = goal.pose;
                self.goal = None;
            } else {
                let heading = here.angle_to(&target);
                self.robot = Pose2D::from_position_angle(here.point_at(heading, self.speed), heading);
            }
        }
        self.reveal();
    }

    /// One arc-shaped frontier per unexplored site, nearest first.
    ///
    /// The arc bulges from the site toward the robot so its middle point lies
    /// inside the reveal radius.
    pub fn frontier_map(&self) -> FrontierMap {
        let robot = self.robot.position();
        let radius = self.reveal_radius * 0.5;

        let mut unseen: Vec<&Site> = self.sites.iter().filter(|site| !site.seen).collect();
        unseen.sort_by(|a, b| {
            a.position
                .distance_squared(&robot)
                .total_cmp(&b.position.distance_squared(&robot))
        });

        unseen
            .into_iter()
            .map(|site| {
                let facing = site.position.angle_to(&robot);
                let step = 2.0 * FRAC_PI_3 / (ARC_POINTS - 1) as f32;
                let points = (0..ARC_POINTS)
                    .map(|i| site.position.point_at(facing - FRAC_PI_3 + step * i as f32, radius))
                    .collect();
                Frontier::new(points)
                    .with_centroid(site.position)
                    .with_size(ARC_POINTS)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_generate_is_deterministic() {
        let config = SimulationConfig::default();
        let a = SimWorld::generate(&config);
        let b = SimWorld::generate(&config);
        assert_eq!(a.site_count(), config.sites);
        assert_eq!(a.frontier_map(), b.frontier_map());
    }

    #[test]
    fn test_frontiers_nearest_first() {
        let world = SimWorld::new(
            vec![WorldPoint::new(4.0, 0.0), WorldPoint::new(0.0, 2.0)],
            0.5,
            0.4,
        );
        let map = world.frontier_map();
        assert_eq!(map.len(), 2);
        let first = map.get(0).unwrap();
        assert_eq!(first.centroid, Some(WorldPoint::new(0.0, 2.0)));
        // Middle of the arc faces the robot
        let mid = first.midpoint().unwrap();
        assert_relative_eq!(mid.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(mid.y, 1.75, epsilon = 1e-5);
    }

    #[test]
    fn test_step_moves_at_speed_then_arrives() {
        let mut world = SimWorld::new(vec![WorldPoint::new(1.0, 0.0)], 0.3, 0.4);
        world.set_goal(Some(Goal::at(WorldPoint::new(1.0, 0.0), 0.0)));

        world.step();
        assert_relative_eq!(world.robot().x, 0.4, epsilon = 1e-5);
        assert!(world.goal().is_some());
        assert_eq!(world.remaining(), 1);

        world.step();
        world.step();
        assert!(world.goal().is_none());
        assert_relative_eq!(world.robot().x, 1.0);
        assert_eq!(world.remaining(), 0);
        assert!(world.frontier_map().is_empty());
    }
}
