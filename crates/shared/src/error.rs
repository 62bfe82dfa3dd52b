use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    MalformedPersistedState,
    InvalidIndex,
    PersistenceWriteFailure,
    InvalidConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PunchCardError {
    /// Stored value did not decode to exactly `total` booleans.
    #[error("malformed persisted punch card state: {reason}")]
    MalformedPersistedState { reason: String },
    #[error("cup index {index} is out of range for a card of {total} punches")]
    InvalidIndex { index: usize, total: usize },
    #[error("failed to persist punch card state: {reason}")]
    PersistenceWriteFailure { reason: String },
    #[error("invalid punch card configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl PunchCardError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedPersistedState {
            reason: reason.into(),
        }
    }

    pub fn write_failure(reason: impl Into<String>) -> Self {
        Self::PersistenceWriteFailure {
            reason: reason.into(),
        }
    }

    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MalformedPersistedState { .. } => ErrorCode::MalformedPersistedState,
            Self::InvalidIndex { .. } => ErrorCode::InvalidIndex,
            Self::PersistenceWriteFailure { .. } => ErrorCode::PersistenceWriteFailure,
            Self::InvalidConfig { .. } => ErrorCode::InvalidConfig,
        }
    }
}
