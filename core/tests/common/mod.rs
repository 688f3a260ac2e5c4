//! Shared test utilities and fixtures
//!
//! A fully wired platform over an in-memory treasury and a manual clock.

#![allow(dead_code)]

use fitledger_core::{FitnessPlatform, ManualClock, Treasury};
use fitledger_types::{LedgerSettings, MembershipId, Principal, Tick};
use tracing_subscriber::EnvFilter;

pub type Platform = FitnessPlatform<Treasury, ManualClock>;

pub const AUTHORITY: &str = "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG";
pub const MEMBER: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";
pub const VISITOR: &str = "ST3AM1A56AK2C1XAFJ4115ZSV26EB49BVQ10MGCS0";

/// Starting balance of every funded test principal.
pub const FUNDS: u64 = 1_000_000;

/// Route ledger events to the test writer. Set `RUST_LOG` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn principal(value: &str) -> Principal {
    Principal::new(value)
}

pub fn authority() -> Principal {
    principal(AUTHORITY)
}

pub fn member() -> Principal {
    principal(MEMBER)
}

pub fn visitor() -> Principal {
    principal(VISITOR)
}

/// Platform with every authority set to [`AUTHORITY`] and members funded.
pub fn platform_with(settings: LedgerSettings) -> Platform {
    init_tracing();
    let mut treasury = Treasury::new();
    treasury.fund(&member(), FUNDS);
    treasury.fund(&visitor(), FUNDS);
    let mut platform = FitnessPlatform::from_settings(settings, treasury, ManualClock::new(Tick::ZERO));
    platform.set_membership_authority(authority()).unwrap();
    platform.set_access_authority(authority()).unwrap();
    platform.set_payment_authority(authority()).unwrap();
    platform.set_rewards_authority(authority()).unwrap();
    platform
}

pub fn platform() -> Platform {
    platform_with(LedgerSettings::default())
}

/// Mint a 30-day premium membership paid by and held by [`MEMBER`].
pub fn mint_for_member(platform: &mut Platform) -> MembershipId {
    platform
        .mint(&member(), member(), "premium", 30, "Membership for premium access")
        .unwrap()
}

pub fn advance_to(platform: &mut Platform, tick: u64) {
    platform.clock_mut().advance_to(Tick::new(tick));
}
