//! Visit-backed reward awards and redemption

use fitledger_core::RewardsError;
use fitledger_types::{GymId, MembershipId, RewardPoints, Tick};

use crate::common::{self, authority, member, mint_for_member, visitor};

const GYM: GymId = GymId::new(3);

fn platform_with_visit() -> (common::Platform, MembershipId) {
    let mut platform = common::platform();
    let id = mint_for_member(&mut platform);
    platform.register_gym(&authority(), GYM, "Harbor", 30).unwrap();
    common::advance_to(&mut platform, 8);
    platform
        .verify_and_log_access(&member(), id, GYM, &member())
        .unwrap();
    (platform, id)
}

#[test]
fn award_needs_a_visit_by_the_owner() {
    let mut platform = common::platform();
    let id = mint_for_member(&mut platform);
    platform.register_gym(&authority(), GYM, "Harbor", 30).unwrap();

    assert_eq!(
        platform.award_points(&member(), id, GYM, &member()),
        Err(RewardsError::InvalidAccessId { membership: id, gym: GYM })
    );
    assert_eq!(
        platform.award_points(&member(), id, GYM, &visitor()),
        Err(RewardsError::InvalidMembership(id))
    );
}

#[test]
fn award_happens_once() {
    let (mut platform, id) = platform_with_visit();
    common::advance_to(&mut platform, 11);

    assert_eq!(platform.award_points(&member(), id, GYM, &member()), Ok(10));
    assert_eq!(
        platform.get_reward_points(id),
        Some(RewardPoints {
            points: 10,
            last_claimed: Tick::new(11),
        })
    );

    platform
        .verify_and_log_access(&member(), id, GYM, &member())
        .unwrap();
    let err = platform
        .award_points(&member(), id, GYM, &member())
        .unwrap_err();
    assert_eq!(err, RewardsError::RewardAlreadyClaimed(id));
    assert_eq!(platform.get_reward_points(id).unwrap().points, 10);
}

#[test]
fn visit_by_previous_owner_does_not_count() {
    let (mut platform, id) = platform_with_visit();
    platform.transfer_membership(&member(), id, visitor()).unwrap();

    let err = platform
        .award_points(&visitor(), id, GYM, &visitor())
        .unwrap_err();

    assert_eq!(err.code(), 108);
}

#[test]
fn redeem_below_minimum_fails() {
    let (mut platform, id) = platform_with_visit();
    platform.award_points(&member(), id, GYM, &member()).unwrap();

    let err = platform.redeem_rewards(&member(), id, 5).unwrap_err();

    assert!(matches!(err, RewardsError::InsufficientPoints { .. }));
    assert_eq!(platform.get_reward_points(id).unwrap().points, 10);
}

#[test]
fn redeem_with_lowered_minimum() {
    let (mut platform, id) = platform_with_visit();
    platform.set_reward_rate(&authority(), 40).unwrap();
    platform.award_points(&member(), id, GYM, &member()).unwrap();
    platform.set_min_points_to_redeem(&authority(), 20).unwrap();
    let before = platform.transfer_backend().balance_of(&authority());
    common::advance_to(&mut platform, 50);

    assert_eq!(platform.redeem_rewards(&member(), id, 15), Ok(25));
    assert_eq!(
        platform.get_reward_points(id),
        Some(RewardPoints {
            points: 25,
            last_claimed: Tick::new(50),
        })
    );
    assert_eq!(platform.transfer_backend().balance_of(&authority()), before + 15);
    assert_eq!(
        platform.redeem_rewards(&visitor(), id, 1),
        Err(RewardsError::InvalidMembership(id))
    );
}

#[test]
fn redeem_before_any_award() {
    let (mut platform, id) = platform_with_visit();
    assert_eq!(
        platform.redeem_rewards(&member(), id, 1),
        Err(RewardsError::RewardsNotInitialized(id))
    );
}
