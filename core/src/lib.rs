//! Ledger logic for fitledger.
//!
//! Four ledgers, each owning its own state and its own write-once authority:
//!
//! - [`MembershipRegistry`]: mint, transfer and deactivate memberships.
//! - [`AccessGateway`]: gym registry and per-(membership, gym) visit logs.
//! - [`PaymentProcessor`]: per-cycle renewal payments that extend validity.
//! - [`RewardsLedger`]: visit-backed reward points and their redemption.
//!
//! Ledgers only read each other through [`MembershipReader`] and
//! [`AccessLogReader`]; the one cross-ledger write is
//! [`MembershipWriter::extend_validity`]. Value movement and time are
//! injected through [`ValueTransfer`] and [`Clock`]. [`FitnessPlatform`] wires
//! everything together for one shared state.

pub mod access;
pub mod authority;
pub mod external;
pub mod membership;
pub mod payment;
mod platform;
pub mod rewards;

pub use access::{AccessError, AccessGateway, AccessLogReader};
pub use authority::{AuthorityError, AuthorityRegistry};
pub use external::{
    CallContext, Clock, ManualClock, TransferError, TransferRecord, Treasury, ValueTransfer,
};
pub use membership::{
    MAX_MEMBERSHIPS_PER_OWNER, MembershipError, MembershipReader, MembershipRegistry,
    MembershipWriter, ValidityGrant,
};
pub use payment::{PaymentError, PaymentProcessor};
pub use platform::FitnessPlatform;
pub use rewards::{RewardsError, RewardsLedger};
