//! Per-ledger administrative authority.
//!
//! Every ledger owns one [`AuthorityRegistry`]. The authority is settable
//! exactly once and then gates every administrative operation of that ledger.

use fitledger_types::Principal;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthorityError {
    #[error("authority candidate is the reserved null identifier or an authority is already set")]
    InvalidAuthority,
    #[error("no authority has been set for this ledger")]
    AuthorityUnset,
    #[error("caller is not the ledger authority")]
    NotAuthorized,
}

/// Write-once administrative identity of a single ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorityRegistry {
    authority: Option<Principal>,
}

impl AuthorityRegistry {
    #[must_use]
    pub const fn new() -> Self {
        Self { authority: None }
    }

    /// Store `candidate` permanently. Any caller may claim an unset authority.
    pub fn set_authority(&mut self, candidate: Principal) -> Result<(), AuthorityError> {
        if candidate.is_reserved_null() || self.authority.is_some() {
            return Err(AuthorityError::InvalidAuthority);
        }
        tracing::info!(authority = %candidate, "Ledger authority set");
        self.authority = Some(candidate);
        Ok(())
    }

    #[must_use]
    pub fn authority(&self) -> Option<&Principal> {
        self.authority.as_ref()
    }

    /// The configured authority, for operations that pay it but are not gated on it.
    pub fn require_set(&self) -> Result<&Principal, AuthorityError> {
        self.authority.as_ref().ok_or(AuthorityError::AuthorityUnset)
    }

    /// Gate for administrative operations: authority set, then caller matches.
    pub fn require_admin(&self, caller: &Principal) -> Result<&Principal, AuthorityError> {
        let authority = self.require_set()?;
        if authority != caller {
            return Err(AuthorityError::NotAuthorized);
        }
        Ok(authority)
    }
}
