//! Simulated map service.

use std::sync::Arc;

use crate::error::Result;
use crate::services::{MapCallback, MapFeed, MapService};

use super::world::SharedWorld;

/// Steps the world on every `spin_once` and publishes its frontiers every
/// `period` spins.
#[derive(Debug)]
pub struct SimMapService {
    world: SharedWorld,
    feed: Arc<MapFeed>,
    period: u32,
    spins: u64,
    costmap: Option<String>,
}

impl SimMapService {
    pub fn new(world: SharedWorld, period: u32) -> Self {
        Self {
            world,
            feed: Arc::new(MapFeed::new()),
            period: period.max(1),
            spins: 0,
            costmap: None,
        }
    }

    pub fn costmap_topic(&self) -> Option<&str> {
        self.costmap.as_deref()
    }
}

impl MapService for SimMapService {
    fn subscribe_map(&mut self, topic: &str, on_map: MapCallback) -> Result<()> {
        self.feed.subscribe(topic, on_map)
    }

    fn subscribe_costmap(&mut self, topic: &str) -> Result<()> {
        tracing::info!("Simulated costmap on {}", topic);
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
        self.spins += 1;
        let map = {
            let mut world = self.world.lock();
            world.step();
            if self.spins % u64::from(self.period) != 0 {
                return;
            }
            world.frontier_map()
        };
        self.feed.deliver(map);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WorldPoint;
    use crate::exploration::FrontierSnapshot;
    use crate::sim::SimWorld;

    #[test]
    fn test_delivers_every_period() {
        let world = SimWorld::new(vec![WorldPoint::new(3.0, 0.0)], 0.5, 0.4).into_shared();
        let mut maps = SimMapService::new(world, 2);
        let snapshot = Arc::new(FrontierSnapshot::new());
        let sink = Arc::clone(&snapshot);
        maps.subscribe_map("/map", Box::new(move |map| sink.store(map)))
            .unwrap();

        maps.spin_once();
        assert!(!maps.has_new_map());
        maps.spin_once();
        assert!(maps.has_new_map());
        assert_eq!(snapshot.load().len(), 1);

        maps.mark_consumed();
        assert!(!maps.has_new_map());
    }
}
