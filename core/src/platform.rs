//! The four ledgers wired over one transfer backend and one clock.
//!
//! Every method reads the clock exactly once, binds it to the caller in a
//! [`CallContext`], and runs a single ledger operation with references to the
//! ledgers beneath it.

use std::fmt;

use fitledger_types::{
    AccessLog, Cycle, Gym, GymId, LedgerSettings, Membership, MembershipId, PaymentRecord,
    Principal, RewardPoints,
};

use crate::access::{AccessError, AccessGateway};
use crate::external::{CallContext, Clock, ValueTransfer};
use crate::membership::{MembershipError, MembershipRegistry};
use crate::payment::{PaymentError, PaymentProcessor};
use crate::rewards::{RewardsError, RewardsLedger};

#[derive(Debug)]
pub struct FitnessPlatform<T, C> {
    membership: MembershipRegistry,
    access: AccessGateway,
    payment: PaymentProcessor,
    rewards: RewardsLedger,
    transfer: T,
    clock: C,
}

fn logged<V, E: fmt::Display>(operation: &'static str, ctx: &CallContext, result: Result<V, E>) -> Result<V, E> {
    if let Err(err) = &result {
        tracing::debug!(operation, caller = %ctx.caller(), tick = %ctx.tick(), %err, "Operation rejected");
    }
    result
}

impl<T: ValueTransfer, C: Clock> FitnessPlatform<T, C> {
    #[must_use]
    pub fn new(transfer: T, clock: C) -> Self {
        Self::from_settings(LedgerSettings::default(), transfer, clock)
    }

    #[must_use]
    pub fn from_settings(settings: LedgerSettings, transfer: T, clock: C) -> Self {
        Self {
            membership: MembershipRegistry::new(settings.membership),
            access: AccessGateway::new(settings.access),
            payment: PaymentProcessor::new(settings.payment),
            rewards: RewardsLedger::new(settings.rewards),
            transfer,
            clock,
        }
    }

    /// Clear all four ledgers, authorities included. The transfer backend and clock are untouched.
    pub fn reset(&mut self) {
        self.membership.reset();
        self.access.reset();
        self.payment.reset();
        self.rewards.reset();
        tracing::info!("Ledgers reset");
    }

    fn context(&self, caller: &Principal) -> CallContext {
        CallContext::now(caller.clone(), &self.clock)
    }

    // ── Membership ───────────────────────────────────────────────

    pub fn set_membership_authority(&mut self, candidate: Principal) -> Result<(), MembershipError> {
        self.membership.set_authority(candidate)
    }

    pub fn set_mint_fee(&mut self, caller: &Principal, new_fee: u64) -> Result<(), MembershipError> {
        let ctx = self.context(caller);
        logged("set_mint_fee", &ctx, self.membership.set_mint_fee(&ctx, new_fee))
    }

    pub fn mint(
        &mut self,
        caller: &Principal,
        recipient: Principal,
        tier: &str,
        validity_period: u32,
        metadata: &str,
    ) -> Result<MembershipId, MembershipError> {
        let ctx = self.context(caller);
        let result = self.membership.mint(
            &ctx,
            &mut self.transfer,
            recipient,
            tier,
            validity_period,
            metadata,
        );
        logged("mint", &ctx, result)
    }

    pub fn transfer_membership(
        &mut self,
        caller: &Principal,
        id: MembershipId,
        recipient: Principal,
    ) -> Result<(), MembershipError> {
        let ctx = self.context(caller);
        logged("transfer_membership", &ctx, self.membership.transfer(&ctx, id, recipient))
    }

    pub fn deactivate(&mut self, caller: &Principal, id: MembershipId) -> Result<(), MembershipError> {
        let ctx = self.context(caller);
        logged("deactivate", &ctx, self.membership.deactivate(&ctx, id))
    }

    #[must_use]
    pub fn get_membership(&self, id: MembershipId) -> Option<&Membership> {
        self.membership.get(id)
    }

    #[must_use]
    pub fn list_by_owner(&self, owner: &Principal) -> &[MembershipId] {
        self.membership.list_by_owner(owner)
    }

    // ── Access ───────────────────────────────────────────────────

    pub fn set_access_authority(&mut self, candidate: Principal) -> Result<(), AccessError> {
        self.access.set_authority(candidate)
    }

    pub fn register_gym(
        &mut self,
        caller: &Principal,
        gym_id: GymId,
        name: &str,
        max_access: u32,
    ) -> Result<(), AccessError> {
        let ctx = self.context(caller);
        logged("register_gym", &ctx, self.access.register_gym(&ctx, gym_id, name, max_access))
    }

    pub fn toggle_gym_status(
        &mut self,
        caller: &Principal,
        gym_id: GymId,
        is_active: bool,
    ) -> Result<(), AccessError> {
        let ctx = self.context(caller);
        logged("toggle_gym_status", &ctx, self.access.toggle_gym_status(&ctx, gym_id, is_active))
    }

    pub fn set_max_access_limit(&mut self, caller: &Principal, new_limit: u32) -> Result<(), AccessError> {
        let ctx = self.context(caller);
        logged("set_max_access_limit", &ctx, self.access.set_max_access_limit(&ctx, new_limit))
    }

    pub fn verify_and_log_access(
        &mut self,
        caller: &Principal,
        membership: MembershipId,
        gym_id: GymId,
        user: &Principal,
    ) -> Result<u32, AccessError> {
        let ctx = self.context(caller);
        let result = self
            .access
            .verify_and_log_access(&ctx, &self.membership, membership, gym_id, user);
        logged("verify_and_log_access", &ctx, result)
    }

    #[must_use]
    pub fn get_gym(&self, gym_id: GymId) -> Option<&Gym> {
        self.access.get_gym(gym_id)
    }

    #[must_use]
    pub fn get_access_log(&self, membership: MembershipId, gym_id: GymId) -> Option<&AccessLog> {
        self.access.get_access_log(membership, gym_id)
    }

    // ── Payment ──────────────────────────────────────────────────

    pub fn set_payment_authority(&mut self, candidate: Principal) -> Result<(), PaymentError> {
        self.payment.set_authority(candidate)
    }

    /// Returns the total charged.
    pub fn pay_on_time(
        &mut self,
        caller: &Principal,
        membership: MembershipId,
        cycle: Cycle,
        amount: u64,
    ) -> Result<u64, PaymentError> {
        let ctx = self.context(caller);
        let result = self.payment.pay_on_time(
            &ctx,
            &mut self.transfer,
            &mut self.membership,
            membership,
            cycle,
            amount,
        );
        logged("pay_on_time", &ctx, result)
    }

    /// Returns the total charged, penalty included.
    pub fn pay_late(
        &mut self,
        caller: &Principal,
        membership: MembershipId,
        cycle: Cycle,
        amount: u64,
    ) -> Result<u64, PaymentError> {
        let ctx = self.context(caller);
        let result = self.payment.pay_late(
            &ctx,
            &mut self.transfer,
            &mut self.membership,
            membership,
            cycle,
            amount,
        );
        logged("pay_late", &ctx, result)
    }

    pub fn set_base_fee(&mut self, caller: &Principal, new_fee: u64) -> Result<(), PaymentError> {
        let ctx = self.context(caller);
        logged("set_base_fee", &ctx, self.payment.set_base_fee(&ctx, new_fee))
    }

    pub fn set_penalty_rate(&mut self, caller: &Principal, new_rate: u64) -> Result<(), PaymentError> {
        let ctx = self.context(caller);
        logged("set_penalty_rate", &ctx, self.payment.set_penalty_rate(&ctx, new_rate))
    }

    #[must_use]
    pub fn get_payment_record(&self, membership: MembershipId, cycle: Cycle) -> Option<&PaymentRecord> {
        self.payment.get_payment_record(membership, cycle)
    }

    // ── Rewards ──────────────────────────────────────────────────

    pub fn set_rewards_authority(&mut self, candidate: Principal) -> Result<(), RewardsError> {
        self.rewards.set_authority(candidate)
    }

    pub fn award_points(
        &mut self,
        caller: &Principal,
        membership: MembershipId,
        gym_id: GymId,
        user: &Principal,
    ) -> Result<u64, RewardsError> {
        let ctx = self.context(caller);
        let result = self
            .rewards
            .award_points(&ctx, &self.membership, &self.access, membership, gym_id, user);
        logged("award_points", &ctx, result)
    }

    /// Returns the points left after redemption.
    pub fn redeem_rewards(
        &mut self,
        caller: &Principal,
        membership: MembershipId,
        amount: u64,
    ) -> Result<u64, RewardsError> {
        let ctx = self.context(caller);
        let result = self.rewards.redeem_rewards(
            &ctx,
            &mut self.transfer,
            &self.membership,
            membership,
            amount,
        );
        logged("redeem_rewards", &ctx, result)
    }

    pub fn set_reward_rate(&mut self, caller: &Principal, new_rate: u64) -> Result<(), RewardsError> {
        let ctx = self.context(caller);
        logged("set_reward_rate", &ctx, self.rewards.set_reward_rate(&ctx, new_rate))
    }

    pub fn set_min_points_to_redeem(&mut self, caller: &Principal, new_min: u64) -> Result<(), RewardsError> {
        let ctx = self.context(caller);
        logged(
            "set_min_points_to_redeem",
            &ctx,
            self.rewards.set_min_points_to_redeem(&ctx, new_min),
        )
    }

    #[must_use]
    pub fn get_reward_points(&self, membership: MembershipId) -> Option<RewardPoints> {
        self.rewards.get_reward_points(membership)
    }

    // ── Collaborators and ledgers ────────────────────────────────

    #[must_use]
    pub fn membership_registry(&self) -> &MembershipRegistry {
        &self.membership
    }

    #[must_use]
    pub fn access_gateway(&self) -> &AccessGateway {
        &self.access
    }

    #[must_use]
    pub fn payment_processor(&self) -> &PaymentProcessor {
        &self.payment
    }

    #[must_use]
    pub fn rewards_ledger(&self) -> &RewardsLedger {
        &self.rewards
    }

    #[must_use]
    pub fn transfer_backend(&self) -> &T {
        &self.transfer
    }

    pub fn transfer_backend_mut(&mut self) -> &mut T {
        &mut self.transfer
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}
