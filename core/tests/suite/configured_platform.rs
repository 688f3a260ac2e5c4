//! Platforms built from on-disk configuration

use std::fs;

use fitledger_config::{ConfigError, LedgerConfig, load_settings_from};
use fitledger_core::{FitnessPlatform, ManualClock, MembershipError, Treasury};
use fitledger_types::{Cycle, LedgerSettings, Tick};
use tempfile::TempDir;

use crate::common::{self, authority, member};

#[test]
fn configured_fees_and_rates_apply() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "[membership]\nmint_fee = 250\nmax_memberships = 1\n\n[payment]\nbase_fee = 100\npenalty_rate = 20\n",
    )
    .unwrap();
    let settings = load_settings_from(&path).unwrap();
    let mut platform = common::platform_with(settings);

    let id = common::mint_for_member(&mut platform);
    assert_eq!(platform.transfer_backend().balance_of(&authority()), 250);
    assert_eq!(
        platform.mint(&member(), member(), "basic", 30, ""),
        Err(MembershipError::MaxMembershipsExceeded)
    );

    common::advance_to(&mut platform, 31);
    assert_eq!(platform.pay_late(&member(), id, Cycle::new(1), 100), Ok(120));
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let settings = LedgerConfig::parse("[rewards]\nreward_rate = 25\n")
        .unwrap()
        .resolve()
        .unwrap();
    let defaults = LedgerSettings::default();

    assert_eq!(settings.rewards.reward_rate.points(), 25);
    assert_eq!(settings.membership, defaults.membership);
    assert_eq!(settings.payment, defaults.payment);

    let platform = FitnessPlatform::from_settings(settings, Treasury::new(), ManualClock::new(Tick::ZERO));
    assert_eq!(platform.rewards_ledger().reward_rate().points(), 25);
    assert_eq!(platform.access_gateway().max_access_per_membership().get(), 30);
}

#[test]
fn invalid_config_is_reported_with_its_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[payment]\npenalty_rate = 150\n").unwrap();

    let err = load_settings_from(&path).unwrap_err();

    assert!(matches!(err, ConfigError::Invalid { .. }));
    assert_eq!(err.path(), path.as_path());
}

#[test]
fn resolved_settings_serialize_to_plain_numbers() {
    let json = serde_json::to_value(LedgerSettings::default()).unwrap();
    assert_eq!(json["membership"]["mint_fee"], 500);
    assert_eq!(json["payment"]["penalty_rate"], 10);
    assert_eq!(json["rewards"]["min_points_to_redeem"], 100);
}
