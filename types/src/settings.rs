//! Resolved ledger settings shared across crates.
//!
//! These types represent fully-validated configuration state. The raw TOML
//! structs in `fitledger-config` keep every field optional and are resolved
//! into these types at the parse boundary.

use std::num::{NonZeroU32, NonZeroU64};

use serde::Serialize;

use crate::{MaxAccess, PenaltyRate, RewardRate};

/// Membership registry parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MembershipSettings {
    /// Fee charged to the minter and paid to the registry authority.
    pub mint_fee: u64,
    /// Upper bound on the number of memberships ever minted.
    pub max_memberships: NonZeroU64,
}

impl MembershipSettings {
    pub const DEFAULT_MINT_FEE: u64 = 500;
    pub const DEFAULT_MAX_MEMBERSHIPS: NonZeroU64 = NonZeroU64::new(10_000).unwrap();
}

impl Default for MembershipSettings {
    fn default() -> Self {
        Self {
            mint_fee: Self::DEFAULT_MINT_FEE,
            max_memberships: Self::DEFAULT_MAX_MEMBERSHIPS,
        }
    }
}

/// Access gateway parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccessSettings {
    pub max_access_per_membership: MaxAccess,
}

impl AccessSettings {
    pub const DEFAULT_MAX_ACCESS_PER_MEMBERSHIP: MaxAccess =
        MaxAccess::from_non_zero(NonZeroU32::new(30).unwrap());
}

impl Default for AccessSettings {
    fn default() -> Self {
        Self {
            max_access_per_membership: Self::DEFAULT_MAX_ACCESS_PER_MEMBERSHIP,
        }
    }
}

/// Payment processor parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaymentSettings {
    /// Minimum accepted cycle payment. Can only ever be raised.
    pub base_fee: u64,
    pub penalty_rate: PenaltyRate,
}

impl PaymentSettings {
    pub const DEFAULT_BASE_FEE: u64 = 500;
    pub const DEFAULT_PENALTY_RATE: PenaltyRate = PenaltyRate::new_unchecked(10);
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            base_fee: Self::DEFAULT_BASE_FEE,
            penalty_rate: Self::DEFAULT_PENALTY_RATE,
        }
    }
}

/// Rewards ledger parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RewardsSettings {
    pub reward_rate: RewardRate,
    pub min_points_to_redeem: NonZeroU64,
}

impl RewardsSettings {
    pub const DEFAULT_REWARD_RATE: RewardRate = RewardRate::new_unchecked(10);
    pub const DEFAULT_MIN_POINTS_TO_REDEEM: NonZeroU64 = NonZeroU64::new(100).unwrap();
}

impl Default for RewardsSettings {
    fn default() -> Self {
        Self {
            reward_rate: Self::DEFAULT_REWARD_RATE,
            min_points_to_redeem: Self::DEFAULT_MIN_POINTS_TO_REDEEM,
        }
    }
}

/// Settings for all four ledgers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LedgerSettings {
    pub membership: MembershipSettings,
    pub access: AccessSettings,
    pub payment: PaymentSettings,
    pub rewards: RewardsSettings,
}
