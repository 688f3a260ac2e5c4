//! Mint, transfer and deactivation through the platform

use fitledger_core::{MAX_MEMBERSHIPS_PER_OWNER, MembershipError, TransferError};
use fitledger_types::{MembershipId, Principal, Tick, Tier};

use crate::common::{self, FUNDS, authority, member, mint_for_member, visitor};

#[test]
fn mint_charges_fee_and_indexes_owner() {
    let mut platform = common::platform();
    common::advance_to(&mut platform, 12);

    let id = mint_for_member(&mut platform);

    let membership = platform.get_membership(id).unwrap();
    assert_eq!(membership.owner, member());
    assert_eq!(membership.tier, Tier::Premium);
    assert_eq!(membership.mint_timestamp, Tick::new(12));
    assert!(membership.is_active);
    assert_eq!(platform.list_by_owner(&member()), &[id]);
    assert_eq!(platform.transfer_backend().balance_of(&member()), FUNDS - 500);
    assert_eq!(platform.transfer_backend().balance_of(&authority()), 500);
}

#[test]
fn mint_validity_boundary() {
    let mut platform = common::platform();
    let err = platform
        .mint(&member(), member(), "basic", 366, "")
        .unwrap_err();
    assert!(matches!(err, MembershipError::InvalidValidityPeriod(_)));
    assert!(platform.mint(&member(), member(), "basic", 365, "").is_ok());
}

#[test]
fn mint_fee_follows_admin_updates() {
    let mut platform = common::platform();
    assert_eq!(
        platform.set_mint_fee(&member(), 1),
        Err(MembershipError::NotAuthorized)
    );
    platform.set_mint_fee(&authority(), 2_000).unwrap();

    mint_for_member(&mut platform);

    assert_eq!(platform.transfer_backend().balance_of(&authority()), 2_000);
}

#[test]
fn unfunded_minter_leaves_no_membership() {
    let mut platform = common::platform();
    let broke = Principal::new("ST3BROKE");

    let err = platform
        .mint(&broke, broke.clone(), "elite", 90, "")
        .unwrap_err();

    assert_eq!(
        err,
        MembershipError::Transfer(TransferError::InsufficientBalance {
            from: broke.clone(),
            needed: 500,
            available: 0,
        })
    );
    assert!(platform.get_membership(MembershipId::new(0)).is_none());
    assert!(platform.list_by_owner(&broke).is_empty());
    assert!(platform.transfer_backend().transfers().is_empty());
}

#[test]
fn fee_to_self_is_rejected_by_backend() {
    let mut platform = common::platform();
    let err = platform
        .mint(&authority(), member(), "basic", 30, "")
        .unwrap_err();
    assert_eq!(err.code(), 2);
    assert_eq!(platform.membership_registry().minted(), 0);
}

#[test]
fn transfer_and_deactivate() {
    let mut platform = common::platform();
    let id = mint_for_member(&mut platform);

    assert_eq!(
        platform.transfer_membership(&visitor(), id, visitor()),
        Err(MembershipError::NotAuthorized)
    );
    platform.transfer_membership(&member(), id, visitor()).unwrap();
    assert_eq!(platform.get_membership(id).unwrap().owner, visitor());
    assert!(platform.list_by_owner(&member()).is_empty());
    assert_eq!(platform.list_by_owner(&visitor()), &[id]);

    platform.deactivate(&visitor(), id).unwrap();
    assert!(!platform.get_membership(id).unwrap().is_active);
    assert_eq!(
        platform.transfer_membership(&visitor(), id, member()),
        Err(MembershipError::TransferNotAllowed(id))
    );
    assert_eq!(
        platform.deactivate(&visitor(), id),
        Err(MembershipError::TransferNotAllowed(id))
    );
    assert!(!platform.get_membership(id).unwrap().is_active);
}

#[test]
fn owner_index_caps_at_one_hundred() {
    let mut platform = common::platform();
    for _ in 0..MAX_MEMBERSHIPS_PER_OWNER {
        mint_for_member(&mut platform);
    }
    let spent = platform.transfer_backend().balance_of(&member());

    let err = platform
        .mint(&member(), member(), "basic", 30, "")
        .unwrap_err();

    assert_eq!(err, MembershipError::MaxMembershipsExceeded);
    assert_eq!(err.code(), 109);
    assert_eq!(platform.transfer_backend().balance_of(&member()), spent);
    assert_eq!(platform.list_by_owner(&member()).len(), MAX_MEMBERSHIPS_PER_OWNER);
}

#[test]
fn reset_clears_every_ledger() {
    let mut platform = common::platform();
    mint_for_member(&mut platform);

    platform.reset();

    assert!(platform.get_membership(MembershipId::new(0)).is_none());
    assert!(platform.membership_registry().authority().is_none());
    assert!(platform.access_gateway().authority().is_none());
    assert!(platform.payment_processor().authority().is_none());
    assert!(platform.rewards_ledger().authority().is_none());
    platform.set_membership_authority(visitor()).unwrap();
    assert_eq!(platform.membership_registry().authority(), Some(&visitor()));
}
