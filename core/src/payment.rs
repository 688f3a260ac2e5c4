//! Payment cycle processor.
//!
//! Each renewal cycle of a membership is settled at most once. An on-time
//! payment is accepted once the cycle end has been reached; a late payment
//! only strictly after it, and carries a penalty. Settling a cycle extends
//! the membership's validity through [`MembershipWriter`].

use std::collections::BTreeMap;

use fitledger_types::{
    Cycle, MembershipId, PaymentRecord, PaymentSettings, PenaltyRate, PenaltyRateError, Principal,
    Tick,
};
use thiserror::Error;

use crate::authority::{AuthorityError, AuthorityRegistry};
use crate::external::{CallContext, TransferError, ValueTransfer};
use crate::membership::{MembershipWriter, ValidityGrant};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("caller is not the payment authority")]
    NotAuthorized,
    #[error("membership {0} not found")]
    MembershipNotFound(MembershipId),
    #[error("amount {amount} is below the required {minimum}")]
    InvalidAmount { amount: u64, minimum: u64 },
    #[error(transparent)]
    InvalidPenaltyRate(PenaltyRateError),
    #[error("membership {0} is inactive or not held by the caller")]
    InvalidMembership(MembershipId),
    #[error("authority candidate is the reserved null identifier or an authority is already set")]
    InvalidAuthority,
    #[error("no authority has been set for payments")]
    AuthorityUnset,
    #[error("cycle {cycle} of membership {membership} is already paid")]
    PaymentAlreadyProcessed {
        membership: MembershipId,
        cycle: Cycle,
    },
    #[error("cycle {cycle} ends at tick {cycle_end}; a late payment needs a later tick than {now}")]
    InvalidTimestamp { cycle: Cycle, cycle_end: Tick, now: Tick },
    #[error("cycle {cycle} ends at tick {cycle_end}, after the current tick {now}")]
    RenewalExpired { cycle: Cycle, cycle_end: Tick, now: Tick },
    #[error("payment transfer failed: {0}")]
    Transfer(#[from] TransferError),
}

impl PaymentError {
    /// Stable numeric code reported by the payment processor.
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            PaymentError::NotAuthorized => 100,
            PaymentError::MembershipNotFound(_) => 101,
            PaymentError::InvalidAmount { .. } => 102,
            PaymentError::InvalidPenaltyRate(_) => 103,
            PaymentError::InvalidMembership(_) => 104,
            PaymentError::InvalidAuthority | PaymentError::AuthorityUnset => 105,
            PaymentError::PaymentAlreadyProcessed { .. } => 106,
            PaymentError::InvalidTimestamp { .. } => 107,
            PaymentError::RenewalExpired { .. } => 108,
            PaymentError::Transfer(err) => err.code(),
        }
    }
}

impl From<AuthorityError> for PaymentError {
    fn from(err: AuthorityError) -> Self {
        match err {
            AuthorityError::InvalidAuthority => PaymentError::InvalidAuthority,
            AuthorityError::AuthorityUnset => PaymentError::AuthorityUnset,
            AuthorityError::NotAuthorized => PaymentError::NotAuthorized,
        }
    }
}

/// When a cycle is being settled relative to its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Window {
    /// `now >= cycle_end`, charged `amount`.
    OnTime,
    /// `now > cycle_end`, charged `amount` plus the penalty.
    Late,
}

#[derive(Debug, Clone, Copy)]
struct Installment {
    membership: MembershipId,
    cycle: Cycle,
    amount: u64,
}

#[derive(Debug, Clone)]
pub struct PaymentProcessor {
    initial: PaymentSettings,
    authority: AuthorityRegistry,
    base_fee: u64,
    penalty_rate: PenaltyRate,
    records: BTreeMap<(MembershipId, Cycle), PaymentRecord>,
}

impl Default for PaymentProcessor {
    fn default() -> Self {
        Self::new(PaymentSettings::default())
    }
}

impl PaymentProcessor {
    #[must_use]
    pub fn new(settings: PaymentSettings) -> Self {
        Self {
            initial: settings,
            authority: AuthorityRegistry::new(),
            base_fee: settings.base_fee,
            penalty_rate: settings.penalty_rate,
            records: BTreeMap::new(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.initial);
    }

    pub fn set_authority(&mut self, candidate: Principal) -> Result<(), PaymentError> {
        Ok(self.authority.set_authority(candidate)?)
    }

    /// Settle `cycle` from its end onward.
    pub fn pay_on_time(
        &mut self,
        ctx: &CallContext,
        transfer: &mut impl ValueTransfer,
        members: &mut impl MembershipWriter,
        membership: MembershipId,
        cycle: Cycle,
        amount: u64,
    ) -> Result<u64, PaymentError> {
        let installment = Installment {
            membership,
            cycle,
            amount,
        };
        self.settle(ctx, transfer, members, installment, Window::OnTime)
    }

    /// Settle `cycle` strictly after its end, adding the late penalty.
    pub fn pay_late(
        &mut self,
        ctx: &CallContext,
        transfer: &mut impl ValueTransfer,
        members: &mut impl MembershipWriter,
        membership: MembershipId,
        cycle: Cycle,
        amount: u64,
    ) -> Result<u64, PaymentError> {
        let installment = Installment {
            membership,
            cycle,
            amount,
        };
        self.settle(ctx, transfer, members, installment, Window::Late)
    }

    /// Returns the total charged.
    fn settle(
        &mut self,
        ctx: &CallContext,
        transfer: &mut impl ValueTransfer,
        members: &mut impl MembershipWriter,
        installment: Installment,
        window: Window,
    ) -> Result<u64, PaymentError> {
        let Installment {
            membership: id,
            cycle,
            amount,
        } = installment;
        let membership = members
            .membership(id)
            .ok_or(PaymentError::MembershipNotFound(id))?;
        if &membership.owner != ctx.caller() || !membership.is_active {
            return Err(PaymentError::InvalidMembership(id));
        }
        if amount < self.base_fee {
            return Err(PaymentError::InvalidAmount {
                amount,
                minimum: self.base_fee,
            });
        }
        let cycle_end = membership.cycle_end(cycle.value());
        let now = ctx.tick();
        let total = match window {
            Window::OnTime if cycle_end > now => {
                return Err(PaymentError::RenewalExpired {
                    cycle,
                    cycle_end,
                    now,
                });
            }
            Window::Late if now <= cycle_end => {
                return Err(PaymentError::InvalidTimestamp {
                    cycle,
                    cycle_end,
                    now,
                });
            }
            Window::OnTime => amount,
            Window::Late => self.penalty_rate.total_with_penalty(amount),
        };
        let key = (id, cycle);
        if self.records.contains_key(&key) {
            return Err(PaymentError::PaymentAlreadyProcessed {
                membership: id,
                cycle,
            });
        }
        let authority = self.authority.require_set()?;

        if let Err(err) = transfer.transfer(total, ctx.caller(), authority) {
            tracing::warn!(membership = %id, %cycle, total, %err, "Payment transfer failed");
            return Err(err.into());
        }
        self.records.insert(
            key,
            PaymentRecord {
                amount: total,
                timestamp: now,
                user: ctx.caller().clone(),
            },
        );
        members.extend_validity(
            ValidityGrant::payment_processor(),
            id,
            membership.validity_after_cycle(cycle.value()),
        );
        tracing::info!(
            membership = %id,
            %cycle,
            total,
            late = window == Window::Late,
            "Payment recorded"
        );
        Ok(total)
    }

    /// Raise the minimum payment. Lowering it is rejected.
    pub fn set_base_fee(&mut self, ctx: &CallContext, new_fee: u64) -> Result<(), PaymentError> {
        self.authority.require_admin(ctx.caller())?;
        if new_fee < self.base_fee {
            return Err(PaymentError::InvalidAmount {
                amount: new_fee,
                minimum: self.base_fee,
            });
        }
        tracing::info!(old = self.base_fee, new = new_fee, "Base fee updated");
        self.base_fee = new_fee;
        Ok(())
    }

    pub fn set_penalty_rate(&mut self, ctx: &CallContext, new_rate: u64) -> Result<(), PaymentError> {
        self.authority.require_admin(ctx.caller())?;
        let rate = PenaltyRate::new(new_rate).map_err(PaymentError::InvalidPenaltyRate)?;
        tracing::info!(
            old = self.penalty_rate.percent(),
            new = rate.percent(),
            "Penalty rate updated"
        );
        self.penalty_rate = rate;
        Ok(())
    }

    #[must_use]
    pub fn get_payment_record(&self, membership: MembershipId, cycle: Cycle) -> Option<&PaymentRecord> {
        self.records.get(&(membership, cycle))
    }

    #[must_use]
    pub fn base_fee(&self) -> u64 {
        self.base_fee
    }

    #[must_use]
    pub fn penalty_rate(&self) -> PenaltyRate {
        self.penalty_rate
    }

    #[must_use]
    pub fn authority(&self) -> Option<&Principal> {
        self.authority.authority()
    }
}
