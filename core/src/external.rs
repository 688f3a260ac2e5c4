//! External collaborators: value transfer and the ambient clock.
//!
//! The ledgers never move value or read time themselves. They are handed a
//! [`ValueTransfer`] backend and a [`CallContext`] whose tick was read from a
//! [`Clock`] exactly once for the whole operation.

use std::collections::HashMap;

use fitledger_types::{Principal, Tick};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("{from} holds {available} but the transfer needs {needed}")]
    InsufficientBalance {
        from: Principal,
        needed: u64,
        available: u64,
    },
    #[error("sender and recipient are both {0}")]
    SelfTransfer(Principal),
    #[error("transfer amount must be positive")]
    ZeroAmount,
}

impl TransferError {
    /// Code reported by the native transfer primitive.
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            TransferError::InsufficientBalance { .. } => 1,
            TransferError::SelfTransfer(_) => 2,
            TransferError::ZeroAmount => 3,
        }
    }
}

/// Opaque value-movement primitive. A failure must leave no trace.
pub trait ValueTransfer {
    fn transfer(
        &mut self,
        amount: u64,
        from: &Principal,
        to: &Principal,
    ) -> Result<(), TransferError>;
}

/// Monotonically non-decreasing time source.
pub trait Clock {
    fn current_tick(&self) -> Tick;
}

/// Who is calling and at which tick. Built once per operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    caller: Principal,
    tick: Tick,
}

impl CallContext {
    #[must_use]
    pub fn new(caller: Principal, tick: Tick) -> Self {
        Self { caller, tick }
    }

    /// Read `clock` once and bind the result to `caller`.
    #[must_use]
    pub fn now(caller: Principal, clock: &impl Clock) -> Self {
        Self::new(caller, clock.current_tick())
    }

    #[must_use]
    pub fn caller(&self) -> &Principal {
        &self.caller
    }

    #[must_use]
    pub fn tick(&self) -> Tick {
        self.tick
    }
}

/// Clock advanced explicitly by its owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualClock {
    tick: Tick,
}

impl ManualClock {
    #[must_use]
    pub const fn new(start: Tick) -> Self {
        Self { tick: start }
    }

    pub fn advance(&mut self, ticks: u64) {
        self.tick = self.tick.saturating_add(ticks);
    }

    /// Move to `tick`. Earlier ticks are ignored; the clock never runs backwards.
    pub fn advance_to(&mut self, tick: Tick) {
        self.tick = self.tick.max(tick);
    }
}

impl Clock for ManualClock {
    fn current_tick(&self) -> Tick {
        self.tick
    }
}

/// A transfer that went through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub amount: u64,
    pub from: Principal,
    pub to: Principal,
}

/// In-memory balances with a journal of settled transfers.
#[derive(Debug, Clone, Default)]
pub struct Treasury {
    balances: HashMap<Principal, u64>,
    journal: Vec<TransferRecord>,
}

impl Treasury {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` to `principal` out of thin air.
    pub fn fund(&mut self, principal: &Principal, amount: u64) {
        let balance = self.balances.entry(principal.clone()).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    #[must_use]
    pub fn balance_of(&self, principal: &Principal) -> u64 {
        self.balances.get(principal).copied().unwrap_or(0)
    }

    /// Settled transfers in execution order.
    #[must_use]
    pub fn transfers(&self) -> &[TransferRecord] {
        &self.journal
    }

    pub fn clear(&mut self) {
        self.balances.clear();
        self.journal.clear();
    }
}

impl ValueTransfer for Treasury {
    fn transfer(
        &mut self,
        amount: u64,
        from: &Principal,
        to: &Principal,
    ) -> Result<(), TransferError> {
        if amount == 0 {
            return Err(TransferError::ZeroAmount);
        }
        if from == to {
            return Err(TransferError::SelfTransfer(from.clone()));
        }
        let available = self.balance_of(from);
        if available < amount {
            return Err(TransferError::InsufficientBalance {
                from: from.clone(),
                needed: amount,
                available,
            });
        }

        self.balances.insert(from.clone(), available - amount);
        self.fund(to, amount);
        self.journal.push(TransferRecord {
            amount,
            from: from.clone(),
            to: to.clone(),
        });
        Ok(())
    }
}
