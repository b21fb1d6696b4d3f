use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::HumorError;

/// A vote value. Only +1 and -1 exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum VoteValue {
    Up,
    Down,
}

impl VoteValue {
    pub fn as_i64(self) -> i64 {
        match self {
            VoteValue::Up => 1,
            VoteValue::Down => -1,
        }
    }
}

impl From<VoteValue> for i64 {
    fn from(value: VoteValue) -> Self {
        value.as_i64()
    }
}

impl TryFrom<i64> for VoteValue {
    type Error = HumorError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(VoteValue::Up),
            -1 => Ok(VoteValue::Down),
            other => Err(HumorError::internal(format!(
                "Vote value must be +1 or -1, got {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for VoteValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteValue::Up => write!(f, "+1"),
            VoteValue::Down => write!(f, "-1"),
        }
    }
}

/// One cast vote. Write-once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub vote_value: VoteValue,
    /// The voting session's user identifier
    pub profile_id: String,
    pub caption_id: String,
    pub created_at: DateTime<Utc>,
}

impl VoteRecord {
    pub fn new(vote_value: VoteValue, profile_id: impl Into<String>, caption_id: impl Into<String>) -> Self {
        Self {
            vote_value,
            profile_id: profile_id.into(),
            caption_id: caption_id.into(),
            created_at: Utc::now(),
        }
    }
}

/// Votes cast within one working set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub up: usize,
    pub down: usize,
}

impl VoteTally {
    pub fn record(&mut self, value: VoteValue) {
        match value {
            VoteValue::Up => self.up += 1,
            VoteValue::Down => self.down += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.up + self.down
    }
}
