//! Rewards ledger: one visit-backed award per membership, redeemable for value.

use std::collections::BTreeMap;

use fitledger_types::{
    GymId, MembershipId, Principal, RewardPoints, RewardRate, RewardRateError, RewardsSettings,
};
use thiserror::Error;

use crate::access::AccessLogReader;
use crate::authority::{AuthorityError, AuthorityRegistry};
use crate::external::{CallContext, TransferError, ValueTransfer};
use crate::membership::MembershipReader;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewardsError {
    #[error("caller is not the rewards authority")]
    NotAuthorized,
    #[error("membership {0} not found")]
    MembershipNotFound(MembershipId),
    #[error("membership {0} has never been awarded points")]
    RewardsNotInitialized(MembershipId),
    #[error("minimum redeemable points must be positive")]
    InvalidRewardAmount,
    #[error(transparent)]
    InvalidRewardRate(RewardRateError),
    #[error("membership {0} is not held by this user")]
    InvalidMembership(MembershipId),
    #[error("authority candidate is the reserved null identifier or an authority is already set")]
    InvalidAuthority,
    #[error("no authority has been set for rewards")]
    AuthorityUnset,
    #[error("membership {0} has already been awarded points")]
    RewardAlreadyClaimed(MembershipId),
    #[error("balance of {available} points cannot cover {requested} (minimum {minimum})")]
    InsufficientPoints {
        available: u64,
        requested: u64,
        minimum: u64,
    },
    #[error("no visit by this user on membership {membership} at gym {gym}")]
    InvalidAccessId { membership: MembershipId, gym: GymId },
    #[error("redemption transfer failed: {0}")]
    Transfer(#[from] TransferError),
}

impl RewardsError {
    /// Stable numeric code reported by the rewards ledger.
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            RewardsError::NotAuthorized => 100,
            RewardsError::MembershipNotFound(_) | RewardsError::RewardsNotInitialized(_) => 101,
            RewardsError::InvalidRewardAmount => 102,
            RewardsError::InvalidRewardRate(_) => 103,
            RewardsError::InvalidMembership(_) => 104,
            RewardsError::InvalidAuthority | RewardsError::AuthorityUnset => 105,
            RewardsError::RewardAlreadyClaimed(_) => 106,
            RewardsError::InsufficientPoints { .. } => 107,
            RewardsError::InvalidAccessId { .. } => 108,
            RewardsError::Transfer(err) => err.code(),
        }
    }
}

impl From<AuthorityError> for RewardsError {
    fn from(err: AuthorityError) -> Self {
        match err {
            AuthorityError::InvalidAuthority => RewardsError::InvalidAuthority,
            AuthorityError::AuthorityUnset => RewardsError::AuthorityUnset,
            AuthorityError::NotAuthorized => RewardsError::NotAuthorized,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RewardsLedger {
    initial: RewardsSettings,
    authority: AuthorityRegistry,
    reward_rate: RewardRate,
    min_points_to_redeem: u64,
    points: BTreeMap<MembershipId, RewardPoints>,
}

impl Default for RewardsLedger {
    fn default() -> Self {
        Self::new(RewardsSettings::default())
    }
}

impl RewardsLedger {
    #[must_use]
    pub fn new(settings: RewardsSettings) -> Self {
        Self {
            initial: settings,
            authority: AuthorityRegistry::new(),
            reward_rate: settings.reward_rate,
            min_points_to_redeem: settings.min_points_to_redeem.get(),
            points: BTreeMap::new(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.initial);
    }

    pub fn set_authority(&mut self, candidate: Principal) -> Result<(), RewardsError> {
        Ok(self.authority.set_authority(candidate)?)
    }

    /// Grant the current reward rate for a recorded visit. Each membership is awarded once.
    pub fn award_points(
        &mut self,
        ctx: &CallContext,
        members: &impl MembershipReader,
        logs: &impl AccessLogReader,
        membership: MembershipId,
        gym: GymId,
        user: &Principal,
    ) -> Result<u64, RewardsError> {
        let record = members
            .membership(membership)
            .ok_or(RewardsError::MembershipNotFound(membership))?;
        if &record.owner != user {
            return Err(RewardsError::InvalidMembership(membership));
        }
        let visited = logs
            .access_log(membership, gym)
            .is_some_and(|log| &log.user == user);
        if !visited {
            return Err(RewardsError::InvalidAccessId { membership, gym });
        }
        if self.points.contains_key(&membership) {
            return Err(RewardsError::RewardAlreadyClaimed(membership));
        }

        let points = self.reward_rate.points();
        self.points.insert(
            membership,
            RewardPoints {
                points,
                last_claimed: ctx.tick(),
            },
        );
        tracing::info!(membership = %membership, gym = %gym, %user, points, "Reward points awarded");
        Ok(points)
    }

    /// Spend `amount` points, paying the same amount from the caller to the authority.
    pub fn redeem_rewards(
        &mut self,
        ctx: &CallContext,
        transfer: &mut impl ValueTransfer,
        members: &impl MembershipReader,
        membership: MembershipId,
        amount: u64,
    ) -> Result<u64, RewardsError> {
        let record = members
            .membership(membership)
            .ok_or(RewardsError::MembershipNotFound(membership))?;
        if &record.owner != ctx.caller() {
            return Err(RewardsError::InvalidMembership(membership));
        }
        let balance = self
            .points
            .get(&membership)
            .ok_or(RewardsError::RewardsNotInitialized(membership))?;
        if balance.points < self.min_points_to_redeem || balance.points < amount {
            return Err(RewardsError::InsufficientPoints {
                available: balance.points,
                requested: amount,
                minimum: self.min_points_to_redeem,
            });
        }
        let remaining = balance.points - amount;
        let authority = self.authority.require_set()?;

        if let Err(err) = transfer.transfer(amount, ctx.caller(), authority) {
            tracing::warn!(membership = %membership, amount, %err, "Reward redemption transfer failed");
            return Err(err.into());
        }
        self.points.insert(
            membership,
            RewardPoints {
                points: remaining,
                last_claimed: ctx.tick(),
            },
        );
        tracing::info!(membership = %membership, amount, remaining, "Reward points redeemed");
        Ok(remaining)
    }

    pub fn set_reward_rate(&mut self, ctx: &CallContext, new_rate: u64) -> Result<(), RewardsError> {
        self.authority.require_admin(ctx.caller())?;
        let rate = RewardRate::new(new_rate).map_err(RewardsError::InvalidRewardRate)?;
        tracing::info!(old = self.reward_rate.points(), new = rate.points(), "Reward rate updated");
        self.reward_rate = rate;
        Ok(())
    }

    pub fn set_min_points_to_redeem(&mut self, ctx: &CallContext, new_min: u64) -> Result<(), RewardsError> {
        self.authority.require_admin(ctx.caller())?;
        if new_min == 0 {
            return Err(RewardsError::InvalidRewardAmount);
        }
        tracing::info!(old = self.min_points_to_redeem, new = new_min, "Minimum redeemable points updated");
        self.min_points_to_redeem = new_min;
        Ok(())
    }

    #[must_use]
    pub fn get_reward_points(&self, membership: MembershipId) -> Option<RewardPoints> {
        self.points.get(&membership).copied()
    }

    #[must_use]
    pub fn reward_rate(&self) -> RewardRate {
        self.reward_rate
    }

    #[must_use]
    pub fn min_points_to_redeem(&self) -> u64 {
        self.min_points_to_redeem
    }

    #[must_use]
    pub fn authority(&self) -> Option<&Principal> {
        self.authority.authority()
    }
}
