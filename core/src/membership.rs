//! Membership registry.
//!
//! Owns every [`Membership`] record and the owner index. Other ledgers read
//! memberships through [`MembershipReader`]; the payment processor is the only
//! writer, through [`MembershipWriter`] and a [`ValidityGrant`] that code
//! outside this crate cannot construct.

use std::collections::{BTreeMap, HashMap};

use fitledger_types::{
    Membership, MembershipId, MembershipSettings, Metadata, MetadataError, Principal, Tier,
    TierError, ValidityPeriod, ValidityPeriodError,
};
use thiserror::Error;

use crate::authority::{AuthorityError, AuthorityRegistry};
use crate::external::{CallContext, TransferError, ValueTransfer};

/// Most membership ids a single owner may hold at once.
pub const MAX_MEMBERSHIPS_PER_OWNER: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MembershipError {
    #[error("caller is not authorized for this membership operation")]
    NotAuthorized,
    #[error(transparent)]
    InvalidValidityPeriod(ValidityPeriodError),
    #[error("membership {0} not found")]
    MembershipNotFound(MembershipId),
    #[error("membership {0} is inactive")]
    TransferNotAllowed(MembershipId),
    #[error("recipient is the reserved null identifier")]
    InvalidRecipient,
    #[error(transparent)]
    InvalidMetadata(MetadataError),
    #[error("membership capacity exceeded")]
    MaxMembershipsExceeded,
    #[error("authority candidate is the reserved null identifier or an authority is already set")]
    InvalidAuthority,
    #[error("no authority has been set for the membership registry")]
    AuthorityUnset,
    #[error(transparent)]
    InvalidTier(TierError),
    #[error("mint fee transfer failed: {0}")]
    Transfer(#[from] TransferError),
}

impl MembershipError {
    /// Stable numeric code reported by the membership registry. Code 102 is
    /// reserved: any `u64` is an acceptable mint fee.
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            MembershipError::NotAuthorized => 100,
            MembershipError::InvalidValidityPeriod(_) => 103,
            MembershipError::MembershipNotFound(_) => 104,
            MembershipError::TransferNotAllowed(_) => 106,
            MembershipError::InvalidRecipient => 107,
            MembershipError::InvalidMetadata(_) => 108,
            MembershipError::MaxMembershipsExceeded => 109,
            MembershipError::InvalidAuthority | MembershipError::AuthorityUnset => 110,
            MembershipError::InvalidTier(_) => 111,
            MembershipError::Transfer(err) => err.code(),
        }
    }
}

impl From<AuthorityError> for MembershipError {
    fn from(err: AuthorityError) -> Self {
        match err {
            AuthorityError::InvalidAuthority => MembershipError::InvalidAuthority,
            AuthorityError::AuthorityUnset => MembershipError::AuthorityUnset,
            AuthorityError::NotAuthorized => MembershipError::NotAuthorized,
        }
    }
}

/// Point-in-time membership lookups. Snapshots are returned by value.
pub trait MembershipReader {
    fn membership(&self, id: MembershipId) -> Option<Membership>;
}

/// The sanctioned write path from the payment processor into the registry.
///
/// Called after the payment has moved funds and been recorded, so it cannot
/// fail. Unknown or inactive ids are left untouched.
pub trait MembershipWriter: MembershipReader {
    fn extend_validity(&mut self, grant: ValidityGrant, id: MembershipId, validity_period: u64);
}

/// Proof that the caller is the payment processor linkage.
///
/// Only this crate can construct one, so validity can never be rewritten by
/// a general caller.
///
/// ```compile_fail
/// let grant = fitledger_core::ValidityGrant::payment_processor();
/// ```
#[derive(Debug)]
pub struct ValidityGrant {
    _sealed: (),
}

impl ValidityGrant {
    pub(crate) const fn payment_processor() -> Self {
        Self { _sealed: () }
    }
}

#[derive(Debug, Clone)]
pub struct MembershipRegistry {
    initial: MembershipSettings,
    authority: AuthorityRegistry,
    mint_fee: u64,
    max_memberships: u64,
    next_id: u64,
    memberships: BTreeMap<MembershipId, Membership>,
    owners: HashMap<Principal, Vec<MembershipId>>,
}

impl Default for MembershipRegistry {
    fn default() -> Self {
        Self::new(MembershipSettings::default())
    }
}

impl MembershipRegistry {
    #[must_use]
    pub fn new(settings: MembershipSettings) -> Self {
        Self {
            initial: settings,
            authority: AuthorityRegistry::new(),
            mint_fee: settings.mint_fee,
            max_memberships: settings.max_memberships.get(),
            next_id: 0,
            memberships: BTreeMap::new(),
            owners: HashMap::new(),
        }
    }

    /// Drop all state, including the authority, and return to the construction settings.
    pub fn reset(&mut self) {
        *self = Self::new(self.initial);
    }

    pub fn set_authority(&mut self, candidate: Principal) -> Result<(), MembershipError> {
        Ok(self.authority.set_authority(candidate)?)
    }

    pub fn set_mint_fee(&mut self, ctx: &CallContext, new_fee: u64) -> Result<(), MembershipError> {
        self.authority.require_admin(ctx.caller())?;
        tracing::info!(old = self.mint_fee, new = new_fee, "Mint fee updated");
        self.mint_fee = new_fee;
        Ok(())
    }

    /// Mint a membership for `recipient`, charging the mint fee to the caller.
    pub fn mint(
        &mut self,
        ctx: &CallContext,
        transfer: &mut impl ValueTransfer,
        recipient: Principal,
        tier: &str,
        validity_period: u32,
        metadata: &str,
    ) -> Result<MembershipId, MembershipError> {
        if self.next_id >= self.max_memberships {
            return Err(MembershipError::MaxMembershipsExceeded);
        }
        let tier = Tier::parse(tier).map_err(MembershipError::InvalidTier)?;
        let validity_period =
            ValidityPeriod::new(validity_period).map_err(MembershipError::InvalidValidityPeriod)?;
        if recipient.is_reserved_null() {
            return Err(MembershipError::InvalidRecipient);
        }
        let metadata = Metadata::new(metadata).map_err(MembershipError::InvalidMetadata)?;
        let authority = self.authority.require_set()?.clone();
        if self.held_by(&recipient) >= MAX_MEMBERSHIPS_PER_OWNER {
            return Err(MembershipError::MaxMembershipsExceeded);
        }

        if let Err(err) = transfer.transfer(self.mint_fee, ctx.caller(), &authority) {
            tracing::warn!(caller = %ctx.caller(), fee = self.mint_fee, %err, "Mint fee transfer failed");
            return Err(err.into());
        }

        let id = MembershipId::new(self.next_id);
        self.next_id += 1;
        self.memberships.insert(
            id,
            Membership {
                owner: recipient.clone(),
                tier,
                validity_period: u64::from(validity_period.days()),
                mint_timestamp: ctx.tick(),
                metadata,
                is_active: true,
            },
        );
        tracing::info!(
            membership = %id,
            owner = %recipient,
            %tier,
            validity_days = validity_period.days(),
            "Membership minted"
        );
        self.owners.entry(recipient).or_default().push(id);
        Ok(id)
    }

    /// Hand an active membership owned by the caller to `recipient`.
    pub fn transfer(
        &mut self,
        ctx: &CallContext,
        id: MembershipId,
        recipient: Principal,
    ) -> Result<(), MembershipError> {
        let membership = self.owned_active(ctx, id)?;
        if recipient.is_reserved_null() {
            return Err(MembershipError::InvalidRecipient);
        }
        let previous_owner = membership.owner.clone();
        let mut held = self.held_by(&recipient);
        if recipient == previous_owner {
            held = held.saturating_sub(1);
        }
        if held >= MAX_MEMBERSHIPS_PER_OWNER {
            return Err(MembershipError::MaxMembershipsExceeded);
        }

        if let Some(ids) = self.owners.get_mut(&previous_owner) {
            ids.retain(|held_id| *held_id != id);
        }
        self.owners.entry(recipient.clone()).or_default().push(id);
        if let Some(membership) = self.memberships.get_mut(&id) {
            membership.owner = recipient.clone();
        }
        tracing::info!(membership = %id, from = %previous_owner, to = %recipient, "Membership transferred");
        Ok(())
    }

    /// Permanently deactivate a membership owned by the caller.
    pub fn deactivate(&mut self, ctx: &CallContext, id: MembershipId) -> Result<(), MembershipError> {
        self.owned_active(ctx, id)?;
        if let Some(membership) = self.memberships.get_mut(&id) {
            membership.is_active = false;
        }
        tracing::info!(membership = %id, owner = %ctx.caller(), "Membership deactivated");
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: MembershipId) -> Option<&Membership> {
        self.memberships.get(&id)
    }

    /// Ids held by `owner`, in the order they were received.
    #[must_use]
    pub fn list_by_owner(&self, owner: &Principal) -> &[MembershipId] {
        self.owners.get(owner).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn authority(&self) -> Option<&Principal> {
        self.authority.authority()
    }

    #[must_use]
    pub fn mint_fee(&self) -> u64 {
        self.mint_fee
    }

    #[must_use]
    pub fn max_memberships(&self) -> u64 {
        self.max_memberships
    }

    /// Number of memberships minted so far; also the next id to be assigned.
    #[must_use]
    pub fn minted(&self) -> u64 {
        self.next_id
    }

    fn held_by(&self, owner: &Principal) -> usize {
        self.owners.get(owner).map_or(0, Vec::len)
    }

    /// Shared precondition chain of `transfer` and `deactivate`.
    fn owned_active(&self, ctx: &CallContext, id: MembershipId) -> Result<&Membership, MembershipError> {
        let membership = self
            .memberships
            .get(&id)
            .ok_or(MembershipError::MembershipNotFound(id))?;
        if &membership.owner != ctx.caller() {
            return Err(MembershipError::NotAuthorized);
        }
        if !membership.is_active {
            return Err(MembershipError::TransferNotAllowed(id));
        }
        Ok(membership)
    }
}

impl MembershipReader for MembershipRegistry {
    fn membership(&self, id: MembershipId) -> Option<Membership> {
        self.memberships.get(&id).cloned()
    }
}

impl MembershipWriter for MembershipRegistry {
    fn extend_validity(&mut self, _grant: ValidityGrant, id: MembershipId, validity_period: u64) {
        let Some(membership) = self.memberships.get_mut(&id).filter(|m| m.is_active) else {
            tracing::warn!(membership = %id, "Validity extension skipped for missing or inactive membership");
            return;
        };
        tracing::info!(
            membership = %id,
            old_days = membership.validity_period,
            new_days = validity_period,
            "Membership validity extended"
        );
        membership.validity_period = validity_period;
    }
}
