//! Ledger records.
//!
//! Each record is owned by exactly one ledger in `fitledger-core`. Other
//! ledgers only ever see cloned snapshots of them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{GymName, MaxAccess, Metadata, Principal, Tick};

/// Membership tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Basic,
    Premium,
    Elite,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown membership tier '{0}' (expected basic, premium or elite)")]
pub struct TierError(pub String);

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Basic, Tier::Premium, Tier::Elite];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Tier::Basic => "basic",
            Tier::Premium => "premium",
            Tier::Elite => "elite",
        }
    }

    /// Parses the exact lowercase tier name.
    pub fn parse(value: &str) -> Result<Self, TierError> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str() == value)
            .ok_or_else(|| TierError(value.to_owned()))
    }
}

impl FromStr for Tier {
    type Err = TierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A minted membership.
///
/// `validity_period` starts within `1..=365` days and is afterwards only
/// rewritten by payment settlement, which may push it past a year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub owner: Principal,
    pub tier: Tier,
    pub validity_period: u64,
    pub mint_timestamp: Tick,
    pub metadata: Metadata,
    pub is_active: bool,
}

impl Membership {
    /// `mint_timestamp + cycle * validity_period`, saturating.
    #[must_use]
    pub fn cycle_end(&self, cycle: u64) -> Tick {
        self.mint_timestamp
            .saturating_offset(cycle, self.validity_period)
    }

    /// Validity after settling `cycle`: `validity_period + cycle * validity_period`.
    #[must_use]
    pub fn validity_after_cycle(&self, cycle: u64) -> u64 {
        self.validity_period
            .saturating_add(cycle.saturating_mul(self.validity_period))
    }
}

/// A registered gym.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gym {
    pub name: GymName,
    pub is_active: bool,
    pub max_access: MaxAccess,
}

/// Visit history for one (membership, gym) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessLog {
    /// Tick of the most recent successful visit.
    pub timestamp: Tick,
    pub user: Principal,
    pub access_count: u32,
}

/// Settled payment for one (membership, cycle) pair. Write-once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Total charged, including any late penalty.
    pub amount: u64,
    pub timestamp: Tick,
    pub user: Principal,
}

/// Reward balance of one membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPoints {
    pub points: u64,
    pub last_claimed: Tick,
}
