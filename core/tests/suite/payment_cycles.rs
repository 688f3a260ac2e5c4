//! Renewal payments and the validity they extend

use fitledger_core::PaymentError;
use fitledger_types::{Cycle, Tick};

use crate::common::{self, FUNDS, authority, member, mint_for_member, visitor};

#[test]
fn on_time_payment_extends_validity() {
    let mut platform = common::platform();
    let id = mint_for_member(&mut platform);
    common::advance_to(&mut platform, 30);

    let total = platform.pay_on_time(&member(), id, Cycle::new(1), 500).unwrap();

    assert_eq!(total, 500);
    assert_eq!(platform.get_membership(id).unwrap().validity_period, 60);
    let record = platform.get_payment_record(id, Cycle::new(1)).unwrap();
    assert_eq!(record.amount, 500);
    assert_eq!(record.timestamp, Tick::new(30));
    assert_eq!(record.user, member());
    assert_eq!(platform.transfer_backend().balance_of(&authority()), 1_000);
}

#[test]
fn cycle_end_boundary() {
    let mut platform = common::platform();
    let id = mint_for_member(&mut platform);
    common::advance_to(&mut platform, 30);

    let err = platform.pay_late(&member(), id, Cycle::new(1), 500).unwrap_err();
    assert!(matches!(err, PaymentError::InvalidTimestamp { .. }));
    assert!(platform.pay_on_time(&member(), id, Cycle::new(1), 500).is_ok());
}

#[test]
fn late_payment_charges_penalty() {
    let mut platform = common::platform();
    let id = mint_for_member(&mut platform);
    common::advance_to(&mut platform, 31);

    let total = platform.pay_late(&member(), id, Cycle::new(1), 500).unwrap();

    assert_eq!(total, 550);
    assert_eq!(platform.get_payment_record(id, Cycle::new(1)).unwrap().amount, 550);
    assert_eq!(
        platform.transfer_backend().balance_of(&member()),
        FUNDS - 500 - 550
    );
}

#[test]
fn each_cycle_settles_once() {
    let mut platform = common::platform();
    let id = mint_for_member(&mut platform);
    common::advance_to(&mut platform, 40);
    platform.pay_late(&member(), id, Cycle::new(1), 500).unwrap();
    let balance = platform.transfer_backend().balance_of(&member());
    common::advance_to(&mut platform, 1_000);

    let late_again = platform.pay_late(&member(), id, Cycle::new(1), 800);
    let on_time_again = platform.pay_on_time(&member(), id, Cycle::new(1), 800);

    for attempt in [late_again, on_time_again] {
        assert_eq!(
            attempt,
            Err(PaymentError::PaymentAlreadyProcessed {
                membership: id,
                cycle: Cycle::new(1),
            })
        );
    }
    assert_eq!(platform.transfer_backend().balance_of(&member()), balance);
    assert_eq!(platform.get_payment_record(id, Cycle::new(1)).unwrap().amount, 550);
}

#[test]
fn cycle_zero_ends_at_mint() {
    let mut platform = common::platform();
    let id = mint_for_member(&mut platform);

    assert!(matches!(
        platform.pay_late(&member(), id, Cycle::new(0), 500),
        Err(PaymentError::InvalidTimestamp { .. })
    ));
    assert_eq!(platform.pay_on_time(&member(), id, Cycle::new(0), 500), Ok(500));
    assert_eq!(
        platform.pay_on_time(&member(), id, Cycle::new(0), 500).unwrap_err().code(),
        106
    );
    assert_eq!(platform.get_membership(id).unwrap().validity_period, 30);
}

#[test]
fn successive_cycles_use_extended_validity() {
    let mut platform = common::platform();
    let id = mint_for_member(&mut platform);
    common::advance_to(&mut platform, 30);
    platform.pay_on_time(&member(), id, Cycle::new(1), 500).unwrap();

    // Validity is now 60, so cycle 2 ends at tick 120.
    common::advance_to(&mut platform, 119);
    assert!(matches!(
        platform.pay_on_time(&member(), id, Cycle::new(2), 500),
        Err(PaymentError::RenewalExpired { .. })
    ));
    common::advance_to(&mut platform, 120);
    platform.pay_on_time(&member(), id, Cycle::new(2), 500).unwrap();
    assert_eq!(platform.get_membership(id).unwrap().validity_period, 180);
}

#[test]
fn only_owner_of_active_membership_pays() {
    let mut platform = common::platform();
    let id = mint_for_member(&mut platform);
    common::advance_to(&mut platform, 30);

    assert_eq!(
        platform.pay_on_time(&visitor(), id, Cycle::new(1), 500),
        Err(PaymentError::InvalidMembership(id))
    );
    platform.deactivate(&member(), id).unwrap();
    assert_eq!(
        platform.pay_on_time(&member(), id, Cycle::new(1), 500),
        Err(PaymentError::InvalidMembership(id))
    );
    assert_eq!(platform.get_membership(id).unwrap().validity_period, 30);
}

#[test]
fn admin_updates_shape_later_payments() {
    let mut platform = common::platform();
    let id = mint_for_member(&mut platform);
    platform.set_base_fee(&authority(), 700).unwrap();
    platform.set_penalty_rate(&authority(), 50).unwrap();
    assert!(matches!(
        platform.set_base_fee(&authority(), 600),
        Err(PaymentError::InvalidAmount { .. })
    ));
    common::advance_to(&mut platform, 31);

    assert_eq!(
        platform.pay_late(&member(), id, Cycle::new(1), 600),
        Err(PaymentError::InvalidAmount {
            amount: 600,
            minimum: 700,
        })
    );
    assert_eq!(platform.pay_late(&member(), id, Cycle::new(1), 701), Ok(1_051));
}

#[test]
fn on_time_stays_open_after_cycle_end() {
    let mut platform = common::platform();
    let prompt = mint_for_member(&mut platform);
    let tardy = mint_for_member(&mut platform);
    common::advance_to(&mut platform, 45);

    assert_eq!(platform.pay_on_time(&member(), prompt, Cycle::new(1), 500), Ok(500));
    assert_eq!(platform.pay_late(&member(), tardy, Cycle::new(1), 500), Ok(550));
}
