//! Frontier value types delivered by the map service.
//!
//! A [`FrontierMap`] is produced whole by the map service and never edited
//! afterwards. The controller reads it through a [`FrontierSnapshot`], which
//! swaps the entire map on write so a reader always holds one complete map.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::WorldPoint;

/// A frontier region: connected boundary cells between known-free and unknown
/// space, described by its boundary points in world coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frontier {
    /// Boundary points in the order the map service traced them
    pub points: Vec<WorldPoint>,
    /// Centroid reported by the map service, if any
    pub centroid: Option<WorldPoint>,
    /// Size in cells (defaults to the number of boundary points)
    pub size: usize,
}

impl Frontier {
    /// Create a frontier from its boundary points.
    pub fn new(points: Vec<WorldPoint>) -> Self {
        let size = points.len();
        Self {
            points,
            centroid: None,
            size,
        }
    }

    pub fn with_centroid(mut self, centroid: WorldPoint) -> Self {
        self.centroid = Some(centroid);
        self
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Boundary point halfway along the traced boundary.
    pub fn midpoint(&self) -> Option<WorldPoint> {
        self.points.get(self.points.len() / 2).copied()
    }

    /// Reported centroid, or the mean of the boundary points.
    pub fn centroid_or_mean(&self) -> Option<WorldPoint> {
        self.centroid.or_else(|| WorldPoint::mean(&self.points))
    }
}

/// Ordered collection of frontiers forming one map snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrontierMap {
    frontiers: Vec<Frontier>,
}

impl FrontierMap {
    pub fn new(frontiers: Vec<Frontier>) -> Self {
        Self { frontiers }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frontiers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frontiers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Frontier> {
        self.frontiers.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frontier> {
        self.frontiers.iter()
    }
}

impl FromIterator<Frontier> for FrontierMap {
    fn from_iter<I: IntoIterator<Item = Frontier>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FrontierMap {
    type Item = &'a Frontier;
    type IntoIter = std::slice::Iter<'a, Frontier>;

    fn into_iter(self) -> Self::IntoIter {
        self.frontiers.iter()
    }
}

/// Current frontier map, replaced atomically.
///
/// Writers build a complete [`FrontierMap`] and swap it in; readers clone the
/// `Arc` once and keep working on that map for the rest of the tick.
#[derive(Debug, Default)]
pub struct FrontierSnapshot {
    current: RwLock<Arc<FrontierMap>>,
}

impl FrontierSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole map.
    pub fn store(&self, map: FrontierMap) {
        let map = Arc::new(map);
        *self.current.write() = map;
    }

    /// Current map. The returned handle is unaffected by later stores.
    pub fn load(&self) -> Arc<FrontierMap> {
        Arc::clone(&self.current.read())
    }
}
