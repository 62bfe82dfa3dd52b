use serde::{Deserialize, Serialize};

use crate::error::PunchCardError;

pub const DEFAULT_TOTAL_PUNCHES: usize = 20;
pub const DEFAULT_REWARD_EVERY: usize = 10;
pub const DEFAULT_STORAGE_KEY: &str = "coffeePunchesV1";

pub const REWARD_UNLOCKED_MESSAGE: &str = "Free drink unlocked! 🎉";

/// Only constructed through [`CardConfig::new`] or `Default`, so the bounds
/// always hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardConfig {
    total_punches: usize,
    reward_every: usize,
    storage_key: String,
}

impl CardConfig {
    pub fn new(
        total_punches: usize,
        reward_every: usize,
        storage_key: impl Into<String>,
    ) -> Result<Self, PunchCardError> {
        let storage_key = storage_key.into();
        if total_punches == 0 {
            return Err(PunchCardError::invalid_config(
                "total_punches must be at least 1",
            ));
        }
        if reward_every == 0 {
            return Err(PunchCardError::invalid_config(
                "reward_every must be at least 1",
            ));
        }
        if reward_every > total_punches {
            return Err(PunchCardError::invalid_config(format!(
                "reward_every ({reward_every}) must not exceed total_punches ({total_punches})"
            )));
        }
        if storage_key.trim().is_empty() {
            return Err(PunchCardError::invalid_config(
                "storage_key must not be empty",
            ));
        }

        Ok(Self {
            total_punches,
            reward_every,
            storage_key,
        })
    }

    pub fn total_punches(&self) -> usize {
        self.total_punches
    }

    pub fn reward_every(&self) -> usize {
        self.reward_every
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            total_punches: DEFAULT_TOTAL_PUNCHES,
            reward_every: DEFAULT_REWARD_EVERY,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CupState {
    Empty,
    Stamped,
}

impl CupState {
    pub fn from_flag(stamped: bool) -> Self {
        if stamped {
            Self::Stamped
        } else {
            Self::Empty
        }
    }

    pub fn is_stamped(self) -> bool {
        self == Self::Stamped
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RewardState {
    None,
    Unlocked,
    Progress { remaining: usize },
}

impl RewardState {
    pub fn for_count(stamped_count: usize, reward_every: usize) -> Self {
        if stamped_count == 0 {
            return Self::None;
        }
        match stamped_count % reward_every {
            0 => Self::Unlocked,
            partial => Self::Progress {
                remaining: reward_every - partial,
            },
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::Unlocked => REWARD_UNLOCKED_MESSAGE.to_string(),
            Self::Progress { remaining } => {
                format!("{remaining} more to your next free drink.")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardStatus {
    pub stamped_count: usize,
    pub total: usize,
    pub reward: RewardState,
}

impl CardStatus {
    pub fn compute(punches: &[bool], config: &CardConfig) -> Self {
        let stamped_count = punches.iter().filter(|stamped| **stamped).count();
        Self {
            stamped_count,
            total: config.total_punches(),
            reward: RewardState::for_count(stamped_count, config.reward_every()),
        }
    }

    pub fn status_text(&self) -> String {
        format!("{} / {} punches", self.stamped_count, self.total)
    }

    pub fn reward_message(&self) -> String {
        self.reward.message()
    }
}
