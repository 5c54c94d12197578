//! Error types for Anveshan

use thiserror::Error;

/// Anveshan error type
#[derive(Error, Debug)]
pub enum ExploreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parameter goal_selector has not been configured")]
    MissingGoalSelector,

    #[error("String {0} does not name a valid goal selector")]
    UnknownGoalSelector(String),

    #[error("Unknown replanning cause: {0}")]
    UnknownReplanCause(String),

    #[error("Invalid value {value:?} for parameter {key} of replanning cause {cause}")]
    InvalidCauseParameter {
        cause: String,
        key: String,
        value: String,
    },

    #[error("No acceptable goal among {frontiers} frontiers")]
    NoAcceptableGoal { frontiers: usize },

    #[error("Couldn't get robot position: {0}")]
    PoseUnavailable(String),

    #[error("Map subscription failed: {0}")]
    Subscription(String),
}

impl From<toml::de::Error> for ExploreError {
    fn from(e: toml::de::Error) -> Self {
        ExploreError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExploreError>;
