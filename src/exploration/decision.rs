//! Goal decision over an ordered frontier map.

use crate::error::{ExploreError, Result};
use crate::services::MarkerPublisher;

use super::frontier::{Frontier, FrontierMap};
use super::goal::Goal;
use super::selector::GoalSelector;

/// Marker channel showing the boundary of the chosen frontier.
pub const FRONTIER_MARKER: &str = "f_goal";

/// Marker channel showing the chosen goal pose.
pub const GOAL_MARKER: &str = "goal";

/// Frontier accepted by the selector and the goal it produced.
#[derive(Clone, Copy, Debug)]
pub struct Decision<'m> {
    /// Position of the frontier in the map
    pub index: usize,
    pub frontier: &'m Frontier,
    pub goal: Goal,
}

/// First frontier, in map order, that `selector` accepts.
///
/// Fails with [`ExploreError::NoAcceptableGoal`] when every frontier is
/// rejected, including the empty map.
pub fn select_goal<'m, S>(map: &'m FrontierMap, selector: &S) -> Result<Decision<'m>>
where
    S: GoalSelector + ?Sized,
{
    map.iter()
        .enumerate()
        .find_map(|(index, frontier)| {
            selector.decide_goal(frontier).map(|goal| Decision {
                index,
                frontier,
                goal,
            })
        })
        .ok_or(ExploreError::NoAcceptableGoal {
            frontiers: map.len(),
        })
}

/// [`select_goal`], then publish the chosen frontier and goal as markers.
pub fn decide_goal<'m, S, P>(
    map: &'m FrontierMap,
    selector: &S,
    markers: &mut P,
) -> Result<Decision<'m>>
where
    S: GoalSelector + ?Sized,
    P: MarkerPublisher + ?Sized,
{
    let decision = select_goal(map, selector)?;
    markers.publish_points(FRONTIER_MARKER, &decision.frontier.points);
    markers.publish_pose(GOAL_MARKER, &decision.goal.pose);
    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WorldPoint;
    use crate::exploration::MidPoint;
    use crate::testing::{Published, RecordingMarkers};

    /// Accepts frontiers whose size is in the list.
    struct AcceptSizes(Vec<usize>);

    impl GoalSelector for AcceptSizes {
        fn name(&self) -> &'static str {
            "accept_sizes"
        }

        fn decide_goal(&self, frontier: &Frontier) -> Option<Goal> {
            self.0
                .contains(&frontier.size)
                .then(|| Goal::at(WorldPoint::new(frontier.size as f32, 0.0), 0.0))
        }
    }

    fn sized(size: usize) -> Frontier {
        Frontier::new(vec![WorldPoint::new(size as f32, 1.0)]).with_size(size)
    }

    #[test]
    fn test_empty_map_has_no_goal() {
        let err = select_goal(&FrontierMap::default(), &MidPoint).unwrap_err();
        assert!(matches!(err, ExploreError::NoAcceptableGoal { frontiers: 0 }));
    }

    #[test]
    fn test_all_rejected() {
        let map: FrontierMap = (1..=4).map(sized).collect();
        let err = select_goal(&map, &AcceptSizes(vec![9])).unwrap_err();
        assert!(matches!(err, ExploreError::NoAcceptableGoal { frontiers: 4 }));
    }

    #[test]
    fn test_first_accepted_wins() {
        // Every acceptance pattern over a 5-frontier map
        let map: FrontierMap = (0..5).map(sized).collect();
        for mask in 0u32..32 {
            let accepted: Vec<usize> = (0..5).filter(|i| mask & (1 << i) != 0).collect();
            let result = select_goal(&map, &AcceptSizes(accepted.clone()));
            match accepted.first() {
                Some(&first) => {
                    let decision = result.unwrap();
                    assert_eq!(decision.index, first);
                    assert_eq!(decision.frontier.size, first);
                }
                None => assert!(result.is_err()),
            }
        }
    }

    #[test]
    fn test_markers_show_chosen_frontier() {
        let f1 = sized(1);
        let f2 = Frontier::new(vec![
            WorldPoint::new(0.0, 2.0),
            WorldPoint::new(1.0, 2.0),
            WorldPoint::new(2.0, 2.0),
        ]);
        let map = FrontierMap::new(vec![f1, f2.clone()]);
        let mut markers = RecordingMarkers::default();

        let decision = decide_goal(&map, &AcceptSizes(vec![3]), &mut markers).unwrap();
        assert_eq!(decision.index, 1);
        assert_eq!(
            markers.published,
            vec![
                Published::Points(FRONTIER_MARKER.to_string(), f2.points.clone()),
                Published::Pose(GOAL_MARKER.to_string(), decision.goal.pose),
            ]
        );
    }

    #[test]
    fn test_no_markers_without_goal() {
        let mut markers = RecordingMarkers::default();
        let map: FrontierMap = (1..=2).map(sized).collect();
        assert!(decide_goal(&map, &AcceptSizes(vec![]), &mut markers).is_err());
        assert!(markers.published.is_empty());
    }
}
