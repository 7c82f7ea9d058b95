//! Analysis configuration: filtering thresholds and bucket boundaries.
//!
//! Two named threshold profiles exist, live trading and position analysis
//! (the stricter "smart money" variant), selected per request by the
//! resolved mode. Values load from the environment once at startup with
//! documented defaults and are validated fail-fast; nothing here mutates at
//! runtime.

use crate::types::AnalysisMode;
use anyhow::{bail, Result};
use std::env;

/// Numeric thresholds applied conjunctively by the classifier.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterProfile {
    /// Minimum volume / open-interest ratio
    pub min_volume_oi_ratio: f64,
    /// Minimum contracts traded in the session
    pub min_volume: u64,
    /// Minimum outstanding contracts
    pub min_open_interest: u64,
    /// Minimum dollars spent (last price x volume x 100)
    pub min_premium_spent: f64,
    /// Expiration window, in whole days from the analysis date
    pub min_dte: i64,
    pub max_dte: i64,
    /// Result list cap after sorting
    pub max_results: usize,
}

/// Bucket boundaries for the derived classification metrics.
///
/// All bucket comparisons use inclusive lower bounds: a ratio exactly at a
/// breakpoint lands in the higher bucket.
#[derive(Clone, Debug, PartialEq)]
pub struct BucketThresholds {
    /// Strike within this fraction of the underlying counts as ATM
    pub atm_threshold: f64,
    /// Beyond this fraction out of the money counts as Deep-OTM
    pub deep_otm_threshold: f64,
    /// Volume/OI ratio at or above this is HIGH unusuality
    pub high_unusual_ratio: f64,
    /// Volume/OI ratio at or above this is EXTREME unusuality
    pub extreme_unusual_ratio: f64,
    /// Open interest at or above this is a MEDIUM position
    pub medium_position_oi: u64,
    /// Open interest at or above this is a LARGE position
    pub large_position_oi: u64,
}

/// Immutable analysis configuration, loaded once at process start.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisConfig {
    pub live: FilterProfile,
    pub position: FilterProfile,
    pub buckets: BucketThresholds,
}

impl Default for FilterProfile {
    fn default() -> Self {
        Self {
            min_volume_oi_ratio: 1.0,
            min_volume: 50,
            min_open_interest: 10,
            min_premium_spent: 1_000.0,
            min_dte: 1,
            max_dte: 45,
            max_results: 100,
        }
    }
}

impl FilterProfile {
    /// The stricter smart-money variant used for position analysis: higher
    /// ratio and premium floors, shared volume/OI/DTE thresholds.
    pub fn smart_money() -> Self {
        Self {
            min_volume_oi_ratio: 2.5,
            min_premium_spent: 25_000.0,
            ..Self::default()
        }
    }
}

impl Default for BucketThresholds {
    fn default() -> Self {
        Self {
            atm_threshold: 0.02,
            deep_otm_threshold: 0.10,
            high_unusual_ratio: 5.0,
            extreme_unusual_ratio: 8.0,
            medium_position_oi: 1_000,
            large_position_oi: 10_000,
        }
    }
}

impl AnalysisConfig {
    /// Load from environment variables, falling back to the documented
    /// defaults, then validate. Call once at startup and fail fast.
    pub fn load() -> Result<Self> {
        let config = Self::from_env();
        config.validate()?;
        Ok(config)
    }

    fn from_env() -> Self {
        let live = FilterProfile {
            min_volume_oi_ratio: env::var("MIN_VOLUME_OI_RATIO")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1.0),
            min_volume: env::var("MIN_VOLUME")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(50),
            min_open_interest: env::var("MIN_OPEN_INTEREST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            min_premium_spent: env::var("MIN_PREMIUM_SPENT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1_000.0),
            min_dte: env::var("MIN_DTE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            max_dte: env::var("MAX_DTE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(45),
            max_results: env::var("MAX_RESULTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
        };

        // Position analysis shares the volume/OI/DTE floors but raises the
        // ratio and premium bar to smart-money levels.
        let position = FilterProfile {
            min_volume_oi_ratio: env::var("SMART_MONEY_MIN_RATIO")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2.5),
            min_premium_spent: env::var("SMART_MONEY_MIN_PREMIUM")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(25_000.0),
            ..live.clone()
        };

        let buckets = BucketThresholds {
            atm_threshold: env::var("ATM_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.02),
            deep_otm_threshold: env::var("DEEP_OTM_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.10),
            high_unusual_ratio: env::var("HIGH_UNUSUAL_RATIO")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5.0),
            extreme_unusual_ratio: env::var("EXTREME_UNUSUAL_RATIO")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8.0),
            medium_position_oi: env::var("MEDIUM_POSITION_OI")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1_000),
            large_position_oi: env::var("LARGE_POSITION_OI")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
        };

        Self {
            live,
            position,
            buckets,
        }
    }

    /// Threshold profile for the resolved analysis mode
    pub fn profile(&self, mode: AnalysisMode) -> &FilterProfile {
        match mode {
            AnalysisMode::LiveTrading => &self.live,
            AnalysisMode::PositionAnalysis => &self.position,
        }
    }

    /// Reject inconsistent configuration at load time, not per-request.
    pub fn validate(&self) -> Result<()> {
        for (name, profile) in [("live", &self.live), ("position", &self.position)] {
            if profile.min_volume_oi_ratio < 0.0 || !profile.min_volume_oi_ratio.is_finite() {
                bail!("{name}: min_volume_oi_ratio must be a non-negative number");
            }
            if profile.min_premium_spent < 0.0 || !profile.min_premium_spent.is_finite() {
                bail!("{name}: min_premium_spent must be a non-negative number");
            }
            if profile.min_volume == 0 {
                bail!("{name}: min_volume must be positive");
            }
            if profile.min_open_interest == 0 {
                bail!("{name}: min_open_interest must be positive");
            }
            if profile.min_dte < 0 {
                bail!("{name}: min_dte must be non-negative");
            }
            if profile.min_dte > profile.max_dte {
                bail!(
                    "{name}: min_dte ({}) must not exceed max_dte ({})",
                    profile.min_dte,
                    profile.max_dte
                );
            }
            if profile.max_results == 0 {
                bail!("{name}: max_results must be at least 1");
            }
        }

        let b = &self.buckets;
        if b.atm_threshold <= 0.0 || b.deep_otm_threshold <= 0.0 {
            bail!("moneyness thresholds must be positive");
        }
        if b.atm_threshold >= b.deep_otm_threshold {
            bail!(
                "atm_threshold ({}) must be below deep_otm_threshold ({})",
                b.atm_threshold,
                b.deep_otm_threshold
            );
        }
        if b.high_unusual_ratio >= b.extreme_unusual_ratio {
            bail!(
                "high_unusual_ratio ({}) must be below extreme_unusual_ratio ({})",
                b.high_unusual_ratio,
                b.extreme_unusual_ratio
            );
        }
        if b.medium_position_oi >= b.large_position_oi {
            bail!(
                "medium_position_oi ({}) must be below large_position_oi ({})",
                b.medium_position_oi,
                b.large_position_oi
            );
        }

        Ok(())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            live: FilterProfile::default(),
            position: FilterProfile::smart_money(),
            buckets: BucketThresholds::default(),
        }
    }
}
