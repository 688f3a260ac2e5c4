//! Validated ledger inputs.
//!
//! These types enforce their bounds at construction time. Once a ledger holds
//! a value, it knows the value is in range and never re-checks it.

use std::fmt;
use std::num::{NonZeroU16, NonZeroU32};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Validity period ──────────────────────────────────────────

/// Membership validity period in days, as accepted at mint: `1..=365`.
///
/// Later validity extensions are plain day counts and are not bounded by
/// this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ValidityPeriod(NonZeroU16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("validity period must be between 1 and {max} days, got {days}", max = ValidityPeriod::MAX_DAYS)]
pub struct ValidityPeriodError {
    pub days: u32,
}

impl ValidityPeriod {
    pub const MAX_DAYS: u32 = 365;

    pub fn new(days: u32) -> Result<Self, ValidityPeriodError> {
        if days > Self::MAX_DAYS {
            return Err(ValidityPeriodError { days });
        }
        u16::try_from(days)
            .ok()
            .and_then(NonZeroU16::new)
            .map(Self)
            .ok_or(ValidityPeriodError { days })
    }

    #[must_use]
    pub const fn days(self) -> u32 {
        self.0.get() as u32
    }
}

impl TryFrom<u32> for ValidityPeriod {
    type Error = ValidityPeriodError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ValidityPeriod> for u32 {
    fn from(value: ValidityPeriod) -> Self {
        value.days()
    }
}

// ── Metadata ─────────────────────────────────────────────────

/// Free-form membership metadata of at most 256 characters.
///
/// Length is counted in Unicode scalar values, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Metadata(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("metadata must be at most {max} characters, got {len}", max = Metadata::MAX_CHARS)]
pub struct MetadataError {
    pub len: usize,
}

impl Metadata {
    pub const MAX_CHARS: usize = 256;

    pub fn new(value: impl Into<String>) -> Result<Self, MetadataError> {
        let value = value.into();
        let len = value.chars().count();
        if len > Self::MAX_CHARS {
            return Err(MetadataError { len });
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Metadata {
    type Error = MetadataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Metadata> for String {
    fn from(value: Metadata) -> Self {
        value.0
    }
}

impl AsRef<str> for Metadata {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

// ── Gym registry inputs ──────────────────────────────────────

/// Display name of a registered gym. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GymName(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("gym name must not be empty")]
pub struct EmptyGymNameError;

impl GymName {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyGymNameError> {
        let value = value.into();
        if value.is_empty() {
            Err(EmptyGymNameError)
        } else {
            Ok(Self(value))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for GymName {
    type Error = EmptyGymNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GymName> for String {
    fn from(value: GymName) -> Self {
        value.0
    }
}

impl fmt::Display for GymName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifetime visit ceiling per (membership, gym) pair. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct MaxAccess(NonZeroU32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("access limit must be positive")]
pub struct MaxAccessError;

impl MaxAccess {
    pub fn new(limit: u32) -> Result<Self, MaxAccessError> {
        NonZeroU32::new(limit).map(Self).ok_or(MaxAccessError)
    }

    #[must_use]
    pub const fn from_non_zero(limit: NonZeroU32) -> Self {
        Self(limit)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl TryFrom<u32> for MaxAccess {
    type Error = MaxAccessError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MaxAccess> for u32 {
    fn from(value: MaxAccess) -> Self {
        value.get()
    }
}

// ── Rates ────────────────────────────────────────────────────

/// Late-payment penalty as a whole percentage, `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct PenaltyRate(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("penalty rate must be at most 100 percent, got {rate}")]
pub struct PenaltyRateError {
    pub rate: u64,
}

impl PenaltyRate {
    pub const MAX_PERCENT: u8 = 100;

    pub fn new(rate: u64) -> Result<Self, PenaltyRateError> {
        u8::try_from(rate)
            .ok()
            .filter(|percent| *percent <= Self::MAX_PERCENT)
            .map(Self)
            .ok_or(PenaltyRateError { rate })
    }

    pub(crate) const fn new_unchecked(percent: u8) -> Self {
        assert!(percent <= Self::MAX_PERCENT, "penalty rate out of range");
        Self(percent)
    }

    #[must_use]
    pub const fn percent(self) -> u8 {
        self.0
    }

    /// `floor(amount * rate / 100)`.
    #[must_use]
    pub fn penalty_on(self, amount: u64) -> u64 {
        let penalty = u128::from(amount) * u128::from(self.0) / 100;
        // rate <= 100, so the penalty never exceeds `amount`.
        u64::try_from(penalty).unwrap_or(amount)
    }

    /// `amount` plus its penalty, saturating at `u64::MAX`.
    #[must_use]
    pub fn total_with_penalty(self, amount: u64) -> u64 {
        amount.saturating_add(self.penalty_on(amount))
    }
}

impl TryFrom<u64> for PenaltyRate {
    type Error = PenaltyRateError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PenaltyRate> for u64 {
    fn from(value: PenaltyRate) -> Self {
        u64::from(value.0)
    }
}

/// Points granted by a reward award, `0..=50`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct RewardRate(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("reward rate must be at most {max}, got {rate}", max = RewardRate::MAX)]
pub struct RewardRateError {
    pub rate: u64,
}

impl RewardRate {
    pub const MAX: u64 = 50;

    pub fn new(rate: u64) -> Result<Self, RewardRateError> {
        if rate > Self::MAX {
            Err(RewardRateError { rate })
        } else {
            Ok(Self(rate))
        }
    }

    pub(crate) const fn new_unchecked(rate: u64) -> Self {
        assert!(rate <= Self::MAX, "reward rate out of range");
        Self(rate)
    }

    #[must_use]
    pub const fn points(self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for RewardRate {
    type Error = RewardRateError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RewardRate> for u64 {
    fn from(value: RewardRate) -> Self {
        value.0
    }
}
