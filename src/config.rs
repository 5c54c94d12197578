//! Configuration loading for Anveshan
//!
//! The file layout mirrors the parameter names the exploration node has
//! always used (`goal_selector/type`, `replaning/conditions`,
//! `replaning/<cause_name>`), expressed as TOML tables.

use crate::error::{ExploreError, Result};
use crate::exploration::CauseParams;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AnveshanConfig {
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub topics: TopicConfig,
    #[serde(default)]
    pub goal_selector: GoalSelectorConfig,
    #[serde(default)]
    pub replaning: ReplanningConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Control loop settings
#[derive(Clone, Debug, Deserialize)]
pub struct ControlConfig {
    /// Tick rate of the exploration loop in Hz (default: 1.0)
    #[serde(default = "default_rate_hz")]
    pub rate_hz: f32,

    /// Consecutive frontier-free maps before exploration is finished
    /// (default: 3, 0 disables)
    #[serde(default = "default_finish_after_empty_maps")]
    pub finish_after_empty_maps: u32,

    /// Stop after this many ticks (default: 0 = unbounded)
    #[serde(default)]
    pub max_ticks: u64,
}

/// Map and costmap channel names, forwarded untouched to the map service
#[derive(Clone, Debug, Deserialize)]
pub struct TopicConfig {
    #[serde(default = "default_map_topic")]
    pub map: String,

    #[serde(default = "default_costmap_topic")]
    pub costmap: String,
}

/// Goal selector strategy selection (`goal_selector/type`)
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GoalSelectorConfig {
    /// Registered strategy name, e.g. "mid_point"
    #[serde(rename = "type")]
    pub kind: Option<String>,

    /// Strategy specific parameters
    #[serde(flatten)]
    pub params: BTreeMap<String, toml::Value>,
}

/// Replanning causes (`replaning/conditions` and `replaning/<cause_name>`)
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ReplanningConfig {
    /// Ordered cause names to register
    pub conditions: Option<Vec<String>>,

    /// Per-cause parameter tables keyed by cause name
    #[serde(flatten)]
    pub causes: BTreeMap<String, BTreeMap<String, toml::Value>>,
}

/// In-process simulation used by the binary
#[derive(Clone, Debug, Deserialize)]
pub struct SimulationConfig {
    /// Number of unexplored sites scattered in the arena
    #[serde(default = "default_sites")]
    pub sites: usize,

    /// RNG seed for site placement
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Half extent of the square arena (meters)
    #[serde(default = "default_arena_half_size")]
    pub arena_half_size: f32,

    /// Distance at which a site counts as explored (meters)
    #[serde(default = "default_reveal_radius")]
    pub reveal_radius: f32,

    /// Robot travel per tick (meters)
    #[serde(default = "default_speed")]
    pub speed: f32,

    /// Ticks between map deliveries
    #[serde(default = "default_map_period")]
    pub map_period: u32,

    /// Probability that a pose refresh fails
    #[serde(default)]
    pub pose_dropout: f32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            rate_hz: default_rate_hz(),
            finish_after_empty_maps: default_finish_after_empty_maps(),
            max_ticks: 0,
        }
    }
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            map: default_map_topic(),
            costmap: default_costmap_topic(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sites: default_sites(),
            seed: default_seed(),
            arena_half_size: default_arena_half_size(),
            reveal_radius: default_reveal_radius(),
            speed: default_speed(),
            map_period: default_map_period(),
            pose_dropout: 0.0,
        }
    }
}

// Default value functions
fn default_rate_hz() -> f32 {
    1.0
}
fn default_finish_after_empty_maps() -> u32 {
    3
}
fn default_map_topic() -> String {
    "/2Dgrid_map".to_string()
}
fn default_costmap_topic() -> String {
    "/move_base/global_costmap/costmap".to_string()
}
fn default_sites() -> usize {
    8
}
fn default_seed() -> u64 {
    7
}
fn default_arena_half_size() -> f32 {
    5.0
}
fn default_reveal_radius() -> f32 {
    0.5
}
fn default_speed() -> f32 {
    0.4
}
fn default_map_period() -> u32 {
    1
}

impl AnveshanConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ExploreError::Config(format!("Failed to read config file: {}", e)))?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: AnveshanConfig = toml::from_str(content)?;
        config.tick_period()?;
        Ok(config)
    }

    /// Configuration used when no file is given: mid-point goals,
    /// replanning whenever the robot stops.
    pub fn demo() -> Self {
        Self {
            goal_selector: GoalSelectorConfig {
                kind: Some("mid_point".to_string()),
                params: BTreeMap::new(),
            },
            replaning: ReplanningConfig {
                conditions: Some(vec!["not_moving".to_string()]),
                causes: BTreeMap::new(),
            },
            ..Default::default()
        }
    }

    /// Period of one control tick. Fails unless `control.rate_hz` is
    /// positive and its period fits in a `Duration`.
    pub fn tick_period(&self) -> Result<Duration> {
        let rate = self.control.rate_hz;
        if rate.is_nan() || rate <= 0.0 {
            return Err(ExploreError::Config(format!(
                "control.rate_hz must be positive, got {}",
                rate
            )));
        }
        Duration::try_from_secs_f32(1.0 / rate).map_err(|_| {
            ExploreError::Config(format!("control.rate_hz {} is too low", rate))
        })
    }
}

impl GoalSelectorConfig {
    /// Strategy parameters as strings
    pub fn params(&self) -> CauseParams {
        stringify_table(&self.params)
    }
}

impl ReplanningConfig {
    /// Parameters configured for a cause, `None` when the table is absent.
    pub fn cause_params(&self, name: &str) -> Option<CauseParams> {
        self.causes.get(name).map(stringify_table)
    }
}

fn stringify_table(table: &BTreeMap<String, toml::Value>) -> CauseParams {
    table
        .iter()
        .map(|(key, value)| {
            let value = match value {
                toml::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
[control]
rate_hz = 2.0

[goal_selector]
type = "mid_point"

[replaning]
conditions = ["distance", "rotation"]

[replaning.distance]
threshold = "1.0"
"#;

    #[test]
    fn test_parse_sample() {
        let config = AnveshanConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.goal_selector.kind.as_deref(), Some("mid_point"));
        assert_eq!(
            config.replaning.conditions,
            Some(vec!["distance".to_string(), "rotation".to_string()])
        );
        let distance = config.replaning.cause_params("distance").unwrap();
        assert_eq!(distance.get("threshold").map(String::as_str), Some("1.0"));
        assert!(config.replaning.cause_params("rotation").is_none());
        assert_eq!(config.tick_period().unwrap(), Duration::from_millis(500));
        assert_eq!(config.topics.map, "/2Dgrid_map");
    }

    #[test]
    fn test_scalar_params_are_stringified() {
        let config = AnveshanConfig::parse(
            r#"
[replaning.time]
seconds = 4
[replaning.distance]
threshold = 0.75
"#,
        )
        .unwrap();
        let time = config.replaning.cause_params("time").unwrap();
        assert_eq!(time["seconds"], "4");
        let distance = config.replaning.cause_params("distance").unwrap();
        assert_eq!(distance["threshold"], "0.75");
        assert!(config.replaning.conditions.is_none());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = AnveshanConfig::parse("").unwrap();
        assert!(config.goal_selector.kind.is_none());
        assert_eq!(config.control.finish_after_empty_maps, 3);
        assert_eq!(config.simulation.sites, 8);
    }

    #[test]
    fn test_rejects_non_positive_rate() {
        let err = AnveshanConfig::parse("[control]\nrate_hz = 0.0\n").unwrap_err();
        assert!(matches!(err, ExploreError::Config(_)));
    }

    #[test]
    fn test_rejects_rate_with_unrepresentable_period() {
        let err = AnveshanConfig::parse("[control]\nrate_hz = 1e-30\n").unwrap_err();
        assert!(err.to_string().contains("too low"));

        let mut config = AnveshanConfig::demo();
        config.control.rate_hz = 1e-30;
        assert!(config.tick_period().is_err());
        config.control.rate_hz = 4.0;
        assert_eq!(config.tick_period().unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = AnveshanConfig::load(file.path()).unwrap();
        assert_eq!(config.control.rate_hz, 2.0);
    }

    #[test]
    fn test_load_missing_file() {
        let err = AnveshanConfig::load(Path::new("/nonexistent/anveshan.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
