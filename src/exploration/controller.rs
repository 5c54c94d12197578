//! Exploration controller: the fixed-rate state machine that turns frontier
//! maps into navigation goals.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::{AnveshanConfig, TopicConfig};
use crate::core::Pose2D;
use crate::error::Result;
use crate::services::{MapService, MarkerPublisher, MarkerShape, RobotMotion, Scale3};

use super::decision::{FRONTIER_MARKER, GOAL_MARKER, decide_goal};
use super::frontier::{FrontierMap, FrontierSnapshot};
use super::replan::{ReplanContext, ReplanGate};
use super::selector::{GoalSelector, SelectorRegistry};
use super::state::{ExplorationState, ExplorationStats, FinishSignal, IssuedGoal, TickOutcome};

/// Marker topic for the chosen frontier boundary.
pub const FRONTIER_TOPIC: &str = "goal_frontier";

/// Marker topic for the goal arrow.
pub const GOAL_TOPIC: &str = "goal_marker";

/// Goal arrow scale.
pub const GOAL_ARROW_SCALE: Scale3 = Scale3::new(0.5, 0.2, 0.1);

/// Exploration controller
///
/// Owns the goal selector, the replan gate and the latest frontier snapshot.
/// Collaborators are borrowed for the lifetime of the controller.
pub struct ExplorationController<'a, R, M, P>
where
    R: RobotMotion,
    M: MapService,
    P: MarkerPublisher,
{
    robot: &'a mut R,
    maps: &'a mut M,
    markers: &'a mut P,
    /// Written by the map subscription, read once per processed map
    frontiers: Arc<FrontierSnapshot>,
    gate: ReplanGate,
    selector: Box<dyn GoalSelector>,
    state: ExplorationState,
    finish: FinishSignal,
    /// 0 disables the empty-map policy
    finish_after_empty_maps: u32,
    /// Consecutive processed maps without frontiers
    empty_maps: u32,
    issued: Option<IssuedGoal>,
    stats: ExplorationStats,
    announced_waiting: bool,
}

impl<'a, R, M, P> ExplorationController<'a, R, M, P>
where
    R: RobotMotion,
    M: MapService,
    P: MarkerPublisher,
{
    /// Subscribe to maps and register the marker channels.
    pub fn new(
        robot: &'a mut R,
        maps: &'a mut M,
        markers: &'a mut P,
        selector: Box<dyn GoalSelector>,
        gate: ReplanGate,
        topics: &TopicConfig,
    ) -> Result<Self> {
        let frontiers = Arc::new(FrontierSnapshot::new());
        let sink = Arc::clone(&frontiers);
        maps.subscribe_map(&topics.map, Box::new(move |map| sink.store(map)))?;
        maps.subscribe_costmap(&topics.costmap)?;

        markers.add(FRONTIER_MARKER, FRONTIER_TOPIC);
        markers.add(GOAL_MARKER, GOAL_TOPIC);
        markers.set_shape(GOAL_MARKER, MarkerShape::Arrow);
        markers.set_scale(GOAL_MARKER, GOAL_ARROW_SCALE);

        Ok(Self {
            robot,
            maps,
            markers,
            frontiers,
            gate,
            selector,
            state: ExplorationState::WaitingForMap,
            finish: FinishSignal::new(),
            finish_after_empty_maps: 0,
            empty_maps: 0,
            issued: None,
            stats: ExplorationStats::default(),
            announced_waiting: false,
        })
    }

    /// Build selector, gate and controller from configuration.
    ///
    /// The selector is resolved first, so an unknown strategy fails before
    /// anything subscribes.
    pub fn from_config(
        config: &AnveshanConfig,
        registry: &SelectorRegistry,
        robot: &'a mut R,
        maps: &'a mut M,
        markers: &'a mut P,
    ) -> Result<Self> {
        let selector = registry.from_config(&config.goal_selector)?;
        let gate = ReplanGate::from_config(&config.replaning)?;
        let controller = Self::new(robot, maps, markers, selector, gate, &config.topics)?;
        Ok(controller.with_finish_after_empty_maps(config.control.finish_after_empty_maps))
    }

    /// Finish after `n` consecutive maps without frontiers (0 disables).
    pub fn with_finish_after_empty_maps(mut self, n: u32) -> Self {
        self.finish_after_empty_maps = n;
        self
    }

    pub fn state(&self) -> ExplorationState {
        self.state
    }

    pub fn stats(&self) -> ExplorationStats {
        self.stats
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    /// Handle for requesting termination from outside the loop.
    pub fn finish_signal(&self) -> FinishSignal {
        self.finish.clone()
    }

    pub fn gate(&self) -> &ReplanGate {
        &self.gate
    }

    pub fn selector_name(&self) -> &'static str {
        self.selector.name()
    }

    /// Latest frontier map delivered by the map service.
    pub fn frontiers(&self) -> Arc<FrontierMap> {
        self.frontiers.load()
    }

    pub fn last_goal(&self) -> Option<IssuedGoal> {
        self.issued
    }

    pub fn robot(&self) -> &R {
        &*self.robot
    }

    pub fn robot_mut(&mut self) -> &mut R {
        &mut *self.robot
    }

    pub fn map_service(&self) -> &M {
        &*self.maps
    }

    pub fn markers(&self) -> &P {
        &*self.markers
    }

    /// Run one control step.
    pub fn tick(&mut self) -> TickOutcome {
        self.stats.ticks += 1;

        let first_time = match self.state {
            ExplorationState::Finished => return TickOutcome::Finished,
            ExplorationState::WaitingForMap => true,
            ExplorationState::Exploring { first_time } => first_time,
        };

        if !self.maps.has_new_map() {
            if self.state == ExplorationState::WaitingForMap && !self.announced_waiting {
                info!("Waiting for first map");
                self.announced_waiting = true;
            }
            return TickOutcome::Idle;
        }
        self.maps.mark_consumed();

        if self.state == ExplorationState::WaitingForMap {
            info!("First map received!");
            self.state = ExplorationState::Exploring { first_time: true };
        }

        let map = self.frontiers.load();
        self.stats.maps_processed += 1;
        debug!("Processing map with {} frontiers", map.len());

        if self.exploration_complete(&map) {
            self.finish();
            return TickOutcome::Finished;
        }

        let pose = match self.robot.refresh_pose() {
            Ok(pose) => pose,
            Err(e) => {
                warn!("{}", e);
                self.stats.pose_failures += 1;
                return TickOutcome::PoseUnavailable;
            }
        };

        let ctx = self.replan_context(pose, map.len());
        if !first_time && !self.gate.replan(&ctx) {
            return TickOutcome::Holding;
        }

        self.robot.print_status();

        match decide_goal(&map, &*self.selector, &mut *self.markers) {
            Ok(decision) => {
                let goal = decision.goal;
                info!(
                    "Frontier {}/{} selected, goal ({:.2}, {:.2}, {:.1}°)",
                    decision.index + 1,
                    map.len(),
                    goal.pose.x,
                    goal.pose.y,
                    goal.pose.theta.to_degrees()
                );
                self.robot.go_to(goal);
                self.issued = Some(IssuedGoal {
                    goal,
                    origin: pose,
                    issued_at: Instant::now(),
                });
                self.stats.goals_issued += 1;
                self.state = ExplorationState::Exploring { first_time: false };
                TickOutcome::GoalIssued(goal)
            }
            Err(e) => {
                warn!("{}", e);
                self.stats.goal_failures += 1;
                TickOutcome::NoAcceptableGoal
            }
        }
    }

    /// Stop exploring. Cancels the active goal if the robot is moving.
    ///
    /// Only the first call has an effect.
    pub fn finish(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.state = ExplorationState::Finished;

        if self.robot.is_moving() {
            info!("Cancelling active goal");
            self.robot.cancel_goal();
        }

        info!(
            "Exploration finished: {} maps, {} goals, {} pose failures",
            self.stats.maps_processed, self.stats.goals_issued, self.stats.pose_failures
        );
    }

    /// Tick at `period` until finished, or until `max_ticks` ticks (0 =
    /// unbounded). Pending map deliveries are dispatched between ticks.
    pub fn run(&mut self, period: Duration, max_ticks: u64) -> ExplorationStats {
        info!(
            "Exploration loop: period {:?}, selector {}, {} replan causes",
            period,
            self.selector.name(),
            self.gate.len()
        );

        loop {
            let started = Instant::now();

            if self.tick() == TickOutcome::Finished {
                break;
            }
            if max_ticks > 0 && self.stats.ticks >= max_ticks {
                warn!("Tick limit {} reached before exploration finished", max_ticks);
                break;
            }

            self.maps.spin_once();

            if let Some(remaining) = period.checked_sub(started.elapsed()) {
                std::thread::sleep(remaining);
            }
        }

        self.stats
    }

    fn exploration_complete(&mut self, map: &FrontierMap) -> bool {
        if map.is_empty() {
            self.empty_maps += 1;
        } else {
            self.empty_maps = 0;
        }

        if self.finish.is_requested() {
            info!("Exploration finish requested");
            return true;
        }
        if self.finish_after_empty_maps > 0 && self.empty_maps >= self.finish_after_empty_maps {
            info!("No frontiers left after {} maps", self.empty_maps);
            return true;
        }
        false
    }

    fn replan_context(&self, pose: Pose2D, frontier_count: usize) -> ReplanContext {
        ReplanContext {
            pose,
            moving: self.robot.is_moving(),
            goal: self.issued.map(|issued| issued.goal),
            goal_origin: self.issued.map(|issued| issued.origin),
            since_goal: self.issued.map(|issued| issued.issued_at.elapsed()),
            frontier_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WorldPoint;
    use crate::exploration::{Frontier, MidPoint};
    use crate::testing::{RecordingMarkers, ScriptedMaps, ScriptedRobot};

    fn line_map(y: f32) -> FrontierMap {
        FrontierMap::new(vec![Frontier::new(vec![
            WorldPoint::new(0.0, y),
            WorldPoint::new(1.0, y),
            WorldPoint::new(2.0, y),
        ])])
    }

    #[test]
    fn test_setup_registers_markers_and_subscriptions() {
        let mut robot = ScriptedRobot::default();
        let mut maps = ScriptedMaps::new();
        let feed = maps.feed();
        let mut markers = RecordingMarkers::default();
        let topics = TopicConfig::default();

        let controller = ExplorationController::new(
            &mut robot,
            &mut maps,
            &mut markers,
            Box::new(MidPoint),
            ReplanGate::new(),
            &topics,
        )
        .unwrap();
        assert_eq!(controller.state(), ExplorationState::WaitingForMap);
        assert_eq!(controller.selector_name(), "mid_point");
        drop(controller);

        assert_eq!(feed.topic().as_deref(), Some("/2Dgrid_map"));
        assert_eq!(
            maps.costmap_topic(),
            Some("/move_base/global_costmap/costmap")
        );
        let (topic, shape, scale) = &markers.channels[GOAL_MARKER];
        assert_eq!(topic, GOAL_TOPIC);
        assert_eq!(*shape, MarkerShape::Arrow);
        assert_eq!(*scale, GOAL_ARROW_SCALE);
        assert_eq!(markers.channels[FRONTIER_MARKER].0, FRONTIER_TOPIC);
    }

    #[test]
    fn test_idle_until_first_map() {
        let mut robot = ScriptedRobot::default();
        let mut maps = ScriptedMaps::new();
        let feed = maps.feed();
        let mut markers = RecordingMarkers::default();
        let mut controller = ExplorationController::new(
            &mut robot,
            &mut maps,
            &mut markers,
            Box::new(MidPoint),
            ReplanGate::new(),
            &TopicConfig::default(),
        )
        .unwrap();

        assert_eq!(controller.tick(), TickOutcome::Idle);
        assert_eq!(controller.tick(), TickOutcome::Idle);
        assert_eq!(controller.state(), ExplorationState::WaitingForMap);

        feed.deliver(line_map(1.0));
        assert!(matches!(controller.tick(), TickOutcome::GoalIssued(_)));
        assert_eq!(
            controller.state(),
            ExplorationState::Exploring { first_time: false }
        );
        assert_eq!(controller.stats().maps_processed, 1);
        assert_eq!(controller.robot().goals().len(), 1);
    }

    #[test]
    fn test_zero_causes_only_first_goal() {
        let mut robot = ScriptedRobot::default();
        let mut maps = ScriptedMaps::new();
        let feed = maps.feed();
        let mut markers = RecordingMarkers::default();
        let mut controller = ExplorationController::new(
            &mut robot,
            &mut maps,
            &mut markers,
            Box::new(MidPoint),
            ReplanGate::new(),
            &TopicConfig::default(),
        )
        .unwrap();

        for y in [1.0, 2.0, 3.0] {
            feed.deliver(line_map(y));
            controller.tick();
        }
        assert_eq!(controller.robot().goals().len(), 1);
        assert_eq!(controller.stats().maps_processed, 3);
    }

    #[test]
    fn test_always_cause_replans_each_map() {
        let mut robot = ScriptedRobot::default();
        let mut maps = ScriptedMaps::new();
        let feed = maps.feed();
        let mut markers = RecordingMarkers::default();
        let mut gate = ReplanGate::new();
        gate.add_cause("always").unwrap();
        let mut controller = ExplorationController::new(
            &mut robot,
            &mut maps,
            &mut markers,
            Box::new(MidPoint),
            gate,
            &TopicConfig::default(),
        )
        .unwrap();

        for y in [1.0, 2.0] {
            feed.deliver(line_map(y));
            assert!(matches!(controller.tick(), TickOutcome::GoalIssued(_)));
        }
        let goals = controller.robot().goals();
        assert_eq!(goals.len(), 2);
        assert_eq!(goals[1].pose.y, 2.0);
    }

    #[test]
    fn test_no_acceptable_goal_keeps_first_time() {
        let mut robot = ScriptedRobot::default();
        let mut maps = ScriptedMaps::new();
        let feed = maps.feed();
        let mut markers = RecordingMarkers::default();
        let mut controller = ExplorationController::new(
            &mut robot,
            &mut maps,
            &mut markers,
            Box::new(MidPoint),
            ReplanGate::new(),
            &TopicConfig::default(),
        )
        .unwrap();

        // Only empty frontiers: mid_point rejects them all
        feed.deliver(FrontierMap::new(vec![Frontier::default()]));
        assert_eq!(controller.tick(), TickOutcome::NoAcceptableGoal);
        assert_eq!(
            controller.state(),
            ExplorationState::Exploring { first_time: true }
        );

        feed.deliver(line_map(1.0));
        assert!(matches!(controller.tick(), TickOutcome::GoalIssued(_)));
        assert_eq!(controller.stats().goal_failures, 1);
    }

    #[test]
    fn test_finish_cancels_only_when_moving() {
        let mut robot = ScriptedRobot::default();
        let mut maps = ScriptedMaps::new();
        let mut markers = RecordingMarkers::default();
        let mut controller = ExplorationController::new(
            &mut robot,
            &mut maps,
            &mut markers,
            Box::new(MidPoint),
            ReplanGate::new(),
            &TopicConfig::default(),
        )
        .unwrap();

        controller.finish();
        assert!(controller.is_finished());
        assert_eq!(controller.robot().cancels(), 0);
        assert_eq!(controller.tick(), TickOutcome::Finished);
    }

    #[test]
    fn test_finish_is_idempotent() {
        let mut robot = ScriptedRobot::default();
        robot.set_moving(true);
        let mut maps = ScriptedMaps::new();
        let mut markers = RecordingMarkers::default();
        let mut controller = ExplorationController::new(
            &mut robot,
            &mut maps,
            &mut markers,
            Box::new(MidPoint),
            ReplanGate::new(),
            &TopicConfig::default(),
        )
        .unwrap();

        controller.finish();
        controller.robot_mut().set_moving(true);
        controller.finish();
        assert_eq!(controller.robot().cancels(), 1);
    }

    #[test]
    fn test_finish_signal_checked_on_next_map() {
        let mut robot = ScriptedRobot::default();
        robot.move_on_goal = true;
        let mut maps = ScriptedMaps::new();
        let feed = maps.feed();
        let mut markers = RecordingMarkers::default();
        let mut controller = ExplorationController::new(
            &mut robot,
            &mut maps,
            &mut markers,
            Box::new(MidPoint),
            ReplanGate::new(),
            &TopicConfig::default(),
        )
        .unwrap();

        feed.deliver(line_map(1.0));
        controller.tick();

        let signal = controller.finish_signal();
        signal.request();
        assert_eq!(controller.tick(), TickOutcome::Idle);

        feed.deliver(line_map(1.0));
        assert_eq!(controller.tick(), TickOutcome::Finished);
        assert_eq!(controller.robot().cancels(), 1);
    }

    #[test]
    fn test_finish_after_empty_maps() {
        let mut robot = ScriptedRobot::default();
        let mut maps = ScriptedMaps::new();
        let feed = maps.feed();
        let mut markers = RecordingMarkers::default();
        let mut controller = ExplorationController::new(
            &mut robot,
            &mut maps,
            &mut markers,
            Box::new(MidPoint),
            ReplanGate::new(),
            &TopicConfig::default(),
        )
        .unwrap()
        .with_finish_after_empty_maps(2);

        feed.deliver(FrontierMap::default());
        assert_eq!(controller.tick(), TickOutcome::NoAcceptableGoal);
        // A map with frontiers resets the count
        feed.deliver(line_map(1.0));
        assert!(matches!(controller.tick(), TickOutcome::GoalIssued(_)));
        feed.deliver(FrontierMap::default());
        assert_eq!(controller.tick(), TickOutcome::Holding);
        feed.deliver(FrontierMap::default());
        assert_eq!(controller.tick(), TickOutcome::Finished);
    }

    #[test]
    fn test_run_dispatches_queued_maps() {
        let mut robot = ScriptedRobot::default();
        let mut maps = ScriptedMaps::new();
        maps.queue(line_map(1.0));
        maps.queue(FrontierMap::default());
        let mut markers = RecordingMarkers::default();
        let mut controller = ExplorationController::new(
            &mut robot,
            &mut maps,
            &mut markers,
            Box::new(MidPoint),
            ReplanGate::new(),
            &TopicConfig::default(),
        )
        .unwrap()
        .with_finish_after_empty_maps(1);

        let stats = controller.run(Duration::ZERO, 50);
        assert!(controller.is_finished());
        assert_eq!(stats.maps_processed, 2);
        assert_eq!(stats.goals_issued, 1);
        // Nothing delivered before the first spin
        assert_eq!(stats.ticks, 3);
    }

    #[test]
    fn test_run_stops_at_tick_limit() {
        let mut robot = ScriptedRobot::default();
        let mut maps = ScriptedMaps::new();
        let mut markers = RecordingMarkers::default();
        let mut controller = ExplorationController::new(
            &mut robot,
            &mut maps,
            &mut markers,
            Box::new(MidPoint),
            ReplanGate::new(),
            &TopicConfig::default(),
        )
        .unwrap();

        let stats = controller.run(Duration::ZERO, 5);
        assert_eq!(stats.ticks, 5);
        assert!(!controller.is_finished());
    }
}
