//! Access control gateway: gym registry and per-(membership, gym) visit logs.

use std::collections::{BTreeMap, HashMap};

use fitledger_types::{
    AccessLog, AccessSettings, Gym, GymId, GymName, MaxAccess, MembershipId, Principal,
};
use thiserror::Error;

use crate::authority::{AuthorityError, AuthorityRegistry};
use crate::external::CallContext;
use crate::membership::MembershipReader;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("caller is not the access control authority")]
    NotAuthorized,
    #[error("membership {0} not found")]
    MembershipNotFound(MembershipId),
    #[error("gym name must not be empty")]
    InvalidGymId,
    #[error("membership {0} is inactive or not held by the visiting user")]
    InvalidMembership(MembershipId),
    #[error("gym {0} is not registered or inactive")]
    GymNotRegistered(GymId),
    #[error("gym {0} is already registered")]
    GymAlreadyRegistered(GymId),
    #[error("authority candidate is the reserved null identifier or an authority is already set")]
    InvalidAuthority,
    #[error("no authority has been set for access control")]
    AuthorityUnset,
    #[error("membership {membership} reached the limit of {limit} visits at gym {gym}")]
    MaxAccessLimitReached {
        membership: MembershipId,
        gym: GymId,
        limit: u32,
    },
    #[error("access limit must be positive")]
    InvalidMaxAccess,
}

impl AccessError {
    /// Stable numeric code reported by the access control gateway.
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            AccessError::NotAuthorized => 100,
            AccessError::MembershipNotFound(_) => 101,
            AccessError::InvalidGymId => 102,
            AccessError::InvalidMembership(_) => 103,
            AccessError::GymNotRegistered(_) | AccessError::GymAlreadyRegistered(_) => 105,
            AccessError::InvalidAuthority | AccessError::AuthorityUnset => 106,
            AccessError::MaxAccessLimitReached { .. } => 109,
            AccessError::InvalidMaxAccess => 110,
        }
    }
}

impl From<AuthorityError> for AccessError {
    fn from(err: AuthorityError) -> Self {
        match err {
            AuthorityError::InvalidAuthority => AccessError::InvalidAuthority,
            AuthorityError::AuthorityUnset => AccessError::AuthorityUnset,
            AuthorityError::NotAuthorized => AccessError::NotAuthorized,
        }
    }
}

/// Point-in-time visit history lookups. Snapshots are returned by value.
pub trait AccessLogReader {
    fn access_log(&self, membership: MembershipId, gym: GymId) -> Option<AccessLog>;
}

#[derive(Debug, Clone)]
pub struct AccessGateway {
    initial: AccessSettings,
    authority: AuthorityRegistry,
    max_access_per_membership: MaxAccess,
    gyms: BTreeMap<GymId, Gym>,
    logs: HashMap<(MembershipId, GymId), AccessLog>,
}

impl Default for AccessGateway {
    fn default() -> Self {
        Self::new(AccessSettings::default())
    }
}

impl AccessGateway {
    #[must_use]
    pub fn new(settings: AccessSettings) -> Self {
        Self {
            initial: settings,
            authority: AuthorityRegistry::new(),
            max_access_per_membership: settings.max_access_per_membership,
            gyms: BTreeMap::new(),
            logs: HashMap::new(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.initial);
    }

    pub fn set_authority(&mut self, candidate: Principal) -> Result<(), AccessError> {
        Ok(self.authority.set_authority(candidate)?)
    }

    pub fn register_gym(
        &mut self,
        ctx: &CallContext,
        gym_id: GymId,
        name: &str,
        max_access: u32,
    ) -> Result<(), AccessError> {
        self.authority.require_admin(ctx.caller())?;
        let name = GymName::new(name).map_err(|_| AccessError::InvalidGymId)?;
        if self.gyms.contains_key(&gym_id) {
            return Err(AccessError::GymAlreadyRegistered(gym_id));
        }
        let max_access = MaxAccess::new(max_access).map_err(|_| AccessError::InvalidMaxAccess)?;

        tracing::info!(gym = %gym_id, %name, max_access = max_access.get(), "Gym registered");
        self.gyms.insert(
            gym_id,
            Gym {
                name,
                is_active: true,
                max_access,
            },
        );
        Ok(())
    }

    pub fn toggle_gym_status(
        &mut self,
        ctx: &CallContext,
        gym_id: GymId,
        is_active: bool,
    ) -> Result<(), AccessError> {
        self.authority.require_admin(ctx.caller())?;
        let gym = self
            .gyms
            .get_mut(&gym_id)
            .ok_or(AccessError::GymNotRegistered(gym_id))?;
        gym.is_active = is_active;
        tracing::info!(gym = %gym_id, is_active, "Gym status changed");
        Ok(())
    }

    /// Store the advisory per-membership ceiling. Visits are bounded by each gym's own limit.
    pub fn set_max_access_limit(&mut self, ctx: &CallContext, new_limit: u32) -> Result<(), AccessError> {
        self.authority.require_admin(ctx.caller())?;
        let limit = MaxAccess::new(new_limit).map_err(|_| AccessError::InvalidMaxAccess)?;
        tracing::info!(
            old = self.max_access_per_membership.get(),
            new = limit.get(),
            "Max access limit updated"
        );
        self.max_access_per_membership = limit;
        Ok(())
    }

    /// Admit `user` into `gym_id` on `membership_id`, returning the pair's new visit count.
    pub fn verify_and_log_access(
        &mut self,
        ctx: &CallContext,
        members: &impl MembershipReader,
        membership_id: MembershipId,
        gym_id: GymId,
        user: &Principal,
    ) -> Result<u32, AccessError> {
        let gym = self
            .gyms
            .get(&gym_id)
            .filter(|gym| gym.is_active)
            .ok_or(AccessError::GymNotRegistered(gym_id))?;
        let membership = members
            .membership(membership_id)
            .ok_or(AccessError::MembershipNotFound(membership_id))?;
        if &membership.owner != user || !membership.is_active {
            return Err(AccessError::InvalidMembership(membership_id));
        }
        let key = (membership_id, gym_id);
        let visits = self.logs.get(&key).map_or(0, |log| log.access_count);
        let limit = gym.max_access.get();
        if visits >= limit {
            return Err(AccessError::MaxAccessLimitReached {
                membership: membership_id,
                gym: gym_id,
                limit,
            });
        }

        let access_count = visits + 1;
        self.logs.insert(
            key,
            AccessLog {
                timestamp: ctx.tick(),
                user: user.clone(),
                access_count,
            },
        );
        tracing::info!(
            membership = %membership_id,
            gym = %gym_id,
            %user,
            access_count,
            "Gym access logged"
        );
        Ok(access_count)
    }

    #[must_use]
    pub fn get_gym(&self, gym_id: GymId) -> Option<&Gym> {
        self.gyms.get(&gym_id)
    }

    #[must_use]
    pub fn get_access_log(&self, membership: MembershipId, gym: GymId) -> Option<&AccessLog> {
        self.logs.get(&(membership, gym))
    }

    #[must_use]
    pub fn max_access_per_membership(&self) -> MaxAccess {
        self.max_access_per_membership
    }

    #[must_use]
    pub fn authority(&self) -> Option<&Principal> {
        self.authority.authority()
    }
}

impl AccessLogReader for AccessGateway {
    fn access_log(&self, membership: MembershipId, gym: GymId) -> Option<AccessLog> {
        self.get_access_log(membership, gym).cloned()
    }
}
