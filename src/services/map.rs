//! Map service contract.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::error::{ExploreError, Result};
use crate::exploration::FrontierMap;

/// Receives each frontier map delivered on the subscribed topic.
pub type MapCallback = Box<dyn FnMut(FrontierMap) + Send>;

/// Source of frontier maps.
///
/// Deliveries may happen during [`MapService::spin_once`] (cooperative
/// dispatch between ticks) or from a service-owned thread. Either way the
/// callback hands over a complete map, and `has_new_map` turns true only
/// after that hand-over.
pub trait MapService {
    /// Register `on_map` for frontier maps published on `topic`.
    fn subscribe_map(&mut self, topic: &str, on_map: MapCallback) -> Result<()>;

    /// Subscribe to the navigation costmap used to filter frontiers.
    fn subscribe_costmap(&mut self, topic: &str) -> Result<()>;

    /// A map arrived that has not been consumed yet.
    fn has_new_map(&self) -> bool;

    /// Clear the new-map flag. It stays false until the next delivery.
    fn mark_consumed(&mut self);

    /// Dispatch pending deliveries.
    fn spin_once(&mut self) {}
}

/// Delivery side of a map subscription.
///
/// Holds the subscriber callback and the consume-once flag, so a map service
/// only has to call [`MapFeed::deliver`]. Safe to share with a producer
/// thread.
#[derive(Default)]
pub struct MapFeed {
    topic: Mutex<Option<String>>,
    callback: Mutex<Option<MapCallback>>,
    fresh: AtomicBool,
}

impl MapFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the subscriber. Only one subscriber is supported.
    pub fn subscribe(&self, topic: &str, on_map: MapCallback) -> Result<()> {
        let mut callback = self.callback.lock();
        if callback.is_some() {
            return Err(ExploreError::Subscription(format!(
                "{} already has a subscriber",
                topic
            )));
        }
        *callback = Some(on_map);
        *self.topic.lock() = Some(topic.to_string());
        tracing::info!("Subscribed to frontier maps on {}", topic);
        Ok(())
    }

    pub fn topic(&self) -> Option<String> {
        self.topic.lock().clone()
    }

    pub fn is_subscribed(&self) -> bool {
        self.callback.lock().is_some()
    }

    /// Hand `map` to the subscriber and raise the new-map flag.
    ///
    /// Returns false (and drops the map) when nobody subscribed.
    pub fn deliver(&self, map: FrontierMap) -> bool {
        let mut callback = self.callback.lock();
        match callback.as_mut() {
            Some(on_map) => {
                on_map(map);
                self.fresh.store(true, Ordering::Release);
                true
            }
            None => false,
        }
    }

    pub fn has_new_map(&self) -> bool {
        self.fresh.load(Ordering::Acquire)
    }

    pub fn mark_consumed(&self) {
        self.fresh.store(false, Ordering::Release);
    }
}

impl std::fmt::Debug for MapFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapFeed")
            .field("topic", &self.topic())
            .field("subscribed", &self.is_subscribed())
            .field("fresh", &self.has_new_map())
            .finish()
    }
}
