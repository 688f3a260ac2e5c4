//! Configuration loading for fitledger.
//!
//! The on-disk format is TOML with one optional table per ledger:
//!
//! ```toml
//! [membership]
//! mint_fee = 500
//! max_memberships = 10000
//!
//! [access]
//! max_access_per_membership = 30
//!
//! [payment]
//! base_fee = 500
//! penalty_rate = 10
//!
//! [rewards]
//! reward_rate = 10
//! min_points_to_redeem = 100
//! ```
//!
//! Raw structs keep every field optional. [`LedgerConfig::resolve`] fills
//! the gaps with defaults and validates the result into
//! [`fitledger_types::LedgerSettings`].

use std::env;
use std::ffi::OsString;
use std::io;
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};

use fitledger_types::{
    AccessSettings, LedgerSettings, MaxAccess, MaxAccessError, MembershipSettings,
    PaymentSettings, PenaltyRate, PenaltyRateError, RewardRate, RewardRateError,
    RewardsSettings,
};
use serde::Deserialize;
use thiserror::Error;

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "FITLEDGER_CONFIG";

#[derive(Debug, Default, Deserialize)]
pub struct LedgerConfig {
    pub membership: Option<MembershipConfig>,
    pub access: Option<AccessConfig>,
    pub payment: Option<PaymentConfig>,
    pub rewards: Option<RewardsConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MembershipConfig {
    pub mint_fee: Option<u64>,
    pub max_memberships: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AccessConfig {
    pub max_access_per_membership: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaymentConfig {
    pub base_fee: Option<u64>,
    /// Whole percent, `0..=100`.
    pub penalty_rate: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RewardsConfig {
    /// Points per award, `0..=50`.
    pub reward_rate: Option<u64>,
    pub min_points_to_redeem: Option<u64>,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("membership.max_memberships must be positive")]
    ZeroMaxMemberships,
    #[error("access.max_access_per_membership: {0}")]
    MaxAccess(#[from] MaxAccessError),
    #[error("payment.penalty_rate: {0}")]
    PenaltyRate(#[from] PenaltyRateError),
    #[error("rewards.reward_rate: {0}")]
    RewardRate(#[from] RewardRateError),
    #[error("rewards.min_points_to_redeem must be positive")]
    ZeroMinPointsToRedeem,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config at {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        source: SettingsError,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path,
        }
    }
}

impl LedgerConfig {
    /// Load the config from [`config_path`]. A missing file is `Ok(None)`.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_if_present(&path),
            None => Ok(None),
        }
    }

    /// Like [`LedgerConfig::load_from`], but a missing file is `Ok(None)`.
    pub fn load_if_present(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No ledger config file, using defaults");
            return Ok(None);
        }
        Self::load_from(path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match Self::parse(&content) {
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Resolve into validated settings, filling absent fields with defaults.
    pub fn resolve(&self) -> Result<LedgerSettings, SettingsError> {
        Ok(LedgerSettings {
            membership: resolve_membership(self.membership.as_ref())?,
            access: resolve_access(self.access.as_ref())?,
            payment: resolve_payment(self.payment.as_ref())?,
            rewards: resolve_rewards(self.rewards.as_ref())?,
        })
    }
}

fn resolve_membership(raw: Option<&MembershipConfig>) -> Result<MembershipSettings, SettingsError> {
    let defaults = MembershipSettings::default();
    let Some(raw) = raw else {
        return Ok(defaults);
    };
    let max_memberships = match raw.max_memberships {
        Some(max) => NonZeroU64::new(max).ok_or(SettingsError::ZeroMaxMemberships)?,
        None => defaults.max_memberships,
    };
    Ok(MembershipSettings {
        mint_fee: raw.mint_fee.unwrap_or(defaults.mint_fee),
        max_memberships,
    })
}

fn resolve_access(raw: Option<&AccessConfig>) -> Result<AccessSettings, SettingsError> {
    let defaults = AccessSettings::default();
    let max_access_per_membership = match raw.and_then(|raw| raw.max_access_per_membership) {
        Some(limit) => MaxAccess::new(limit)?,
        None => defaults.max_access_per_membership,
    };
    Ok(AccessSettings {
        max_access_per_membership,
    })
}

fn resolve_payment(raw: Option<&PaymentConfig>) -> Result<PaymentSettings, SettingsError> {
    let defaults = PaymentSettings::default();
    let Some(raw) = raw else {
        return Ok(defaults);
    };
    let penalty_rate = match raw.penalty_rate {
        Some(rate) => PenaltyRate::new(rate)?,
        None => defaults.penalty_rate,
    };
    Ok(PaymentSettings {
        base_fee: raw.base_fee.unwrap_or(defaults.base_fee),
        penalty_rate,
    })
}

fn resolve_rewards(raw: Option<&RewardsConfig>) -> Result<RewardsSettings, SettingsError> {
    let defaults = RewardsSettings::default();
    let Some(raw) = raw else {
        return Ok(defaults);
    };
    let reward_rate = match raw.reward_rate {
        Some(rate) => RewardRate::new(rate)?,
        None => defaults.reward_rate,
    };
    let min_points_to_redeem = match raw.min_points_to_redeem {
        Some(min) => NonZeroU64::new(min).ok_or(SettingsError::ZeroMinPointsToRedeem)?,
        None => defaults.min_points_to_redeem,
    };
    Ok(RewardsSettings {
        reward_rate,
        min_points_to_redeem,
    })
}

/// Load and resolve settings from `path`.
pub fn load_settings_from(path: &Path) -> Result<LedgerSettings, ConfigError> {
    let config = LedgerConfig::load_from(path)?;
    config.resolve().map_err(|source| {
        tracing::warn!("Invalid ledger config at {:?}: {}", path, source);
        ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Load and resolve settings from [`config_path`], or defaults when no file exists.
pub fn load_settings() -> Result<LedgerSettings, ConfigError> {
    match config_path() {
        Some(path) => load_settings_or_default(&path),
        None => Ok(LedgerSettings::default()),
    }
}

/// Load and resolve settings from `path`, or defaults when it does not exist.
pub fn load_settings_or_default(path: &Path) -> Result<LedgerSettings, ConfigError> {
    if path.exists() {
        load_settings_from(path)
    } else {
        tracing::debug!(path = %path.display(), "No ledger config file, using defaults");
        Ok(LedgerSettings::default())
    }
}

/// `$FITLEDGER_CONFIG` if set, otherwise `~/.fitledger/config.toml`.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    resolve_config_path(env::var_os(CONFIG_PATH_ENV), dirs::home_dir())
}

/// A non-empty override wins; otherwise the default location under `home`.
fn resolve_config_path(override_path: Option<OsString>, home: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = override_path.filter(|value| !value.is_empty()) {
        return Some(PathBuf::from(path));
    }
    home.map(|home| home.join(".fitledger").join("config.toml"))
}
