//! Core domain types for fitledger.
//!
//! This crate contains pure domain types with no IO and no async: identifiers,
//! principals, validated ledger inputs, ledger records and resolved settings.
//! Everything here can be used from any layer of the workspace.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod ids;
mod principal;
mod proofs;
mod records;
pub mod settings;

pub use ids::{Cycle, GymId, MembershipId, Tick};
pub use principal::{Principal, RESERVED_NULL_PRINCIPAL};
pub use proofs::{
    EmptyGymNameError, GymName, MaxAccess, MaxAccessError, Metadata, MetadataError, PenaltyRate,
    PenaltyRateError, RewardRate, RewardRateError, ValidityPeriod, ValidityPeriodError,
};
pub use records::{AccessLog, Gym, Membership, PaymentRecord, RewardPoints, Tier, TierError};
pub use settings::{
    AccessSettings, LedgerSettings, MembershipSettings, PaymentSettings, RewardsSettings,
};
