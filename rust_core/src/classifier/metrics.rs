//! Per-contract derived metrics: moneyness, unusuality, sizing and time
//! decay buckets.
//!
//! Every function here is a pure mapping from raw contract fields to a
//! bucket; bucket boundaries come from configuration, and all comparisons
//! use inclusive lower bounds (a value exactly at a breakpoint lands in the
//! higher bucket).

use crate::config::BucketThresholds;
use crate::types::{Moneyness, OptionType, PositionSize, TimeDecayRisk, UnusualityLevel};
use chrono::NaiveDate;

/// Standard equity option multiplier: one contract controls 100 shares.
pub const OPTION_MULTIPLIER: f64 = 100.0;

/// DTE at or below this is HIGH time-decay risk
const HIGH_DECAY_MAX_DTE: i64 = 7;
/// DTE at or below this is MEDIUM time-decay risk
const MEDIUM_DECAY_MAX_DTE: i64 = 21;

/// Total dollars spent on a contract's session volume.
pub fn premium_spent(last_price: f64, volume: u64) -> f64 {
    last_price * volume as f64 * OPTION_MULTIPLIER
}

/// Whole days between the analysis date and expiration. Negative when the
/// contract has already expired; the validity filter excludes those.
pub fn days_to_expiration(expiration: NaiveDate, analysis_date: NaiveDate) -> i64 {
    (expiration - analysis_date).num_days()
}

/// Moneyness bucket plus the signed strike distance in percent.
///
/// The ATM band is symmetric around the underlying. Outside it, the
/// in-the-money side depends on the contract type: a call is ITM below the
/// underlying, a put above it. The out-of-the-money side splits at the
/// deep-OTM distance threshold.
pub fn moneyness(
    strike: f64,
    underlying_price: f64,
    option_type: OptionType,
    buckets: &BucketThresholds,
) -> (Moneyness, f64) {
    let distance = (strike - underlying_price) / underlying_price;
    let abs_distance = distance.abs();

    let bucket = if abs_distance <= buckets.atm_threshold {
        Moneyness::AtTheMoney
    } else {
        match option_type {
            OptionType::Call => {
                if distance < 0.0 {
                    Moneyness::InTheMoney
                } else if distance > buckets.deep_otm_threshold {
                    Moneyness::DeepOutOfTheMoney
                } else {
                    Moneyness::OutOfTheMoney
                }
            }
            OptionType::Put => {
                if distance > 0.0 {
                    Moneyness::InTheMoney
                } else if abs_distance > buckets.deep_otm_threshold {
                    Moneyness::DeepOutOfTheMoney
                } else {
                    Moneyness::OutOfTheMoney
                }
            }
        }
    };

    (bucket, distance * 100.0)
}

/// Volume/OI unusuality bucket. Anything that survived the ratio filter is
/// at least MODERATE; the configured breakpoints promote to HIGH/EXTREME.
pub fn unusuality_level(ratio: f64, buckets: &BucketThresholds) -> UnusualityLevel {
    if ratio >= buckets.extreme_unusual_ratio {
        UnusualityLevel::Extreme
    } else if ratio >= buckets.high_unusual_ratio {
        UnusualityLevel::High
    } else {
        UnusualityLevel::Moderate
    }
}

/// Open-interest sizing bucket used in position-analysis mode.
pub fn position_size(open_interest: u64, buckets: &BucketThresholds) -> PositionSize {
    if open_interest >= buckets.large_position_oi {
        PositionSize::Large
    } else if open_interest >= buckets.medium_position_oi {
        PositionSize::Medium
    } else {
        PositionSize::Small
    }
}

/// Theta exposure bucket from days to expiration.
pub fn time_decay_risk(dte: i64) -> TimeDecayRisk {
    if dte <= HIGH_DECAY_MAX_DTE {
        TimeDecayRisk::High
    } else if dte <= MEDIUM_DECAY_MAX_DTE {
        TimeDecayRisk::Medium
    } else {
        TimeDecayRisk::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buckets() -> BucketThresholds {
        BucketThresholds::default()
    }

    #[test]
    fn test_premium_spent_multiplier() {
        // 1000 contracts at $5.50 move $550k of premium
        assert_eq!(premium_spent(5.50, 1000), 550_000.0);
        assert_eq!(premium_spent(0.0, 500), 0.0);
    }

    #[test]
    fn test_days_to_expiration() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let in_20 = NaiveDate::from_ymd_opt(2025, 6, 22).unwrap();
        let yesterday = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(days_to_expiration(in_20, today), 20);
        assert_eq!(days_to_expiration(today, today), 0);
        assert_eq!(days_to_expiration(yesterday, today), -1);
    }

    #[test]
    fn test_moneyness_atm_band() {
        // Within +-2% of a $100 underlying
        let (m, d) = moneyness(101.0, 100.0, OptionType::Call, &buckets());
        assert_eq!(m, Moneyness::AtTheMoney);
        assert!((d - 1.0).abs() < 1e-9);

        // Exactly at the band edge stays ATM (inclusive)
        let (m, _) = moneyness(102.0, 100.0, OptionType::Put, &buckets());
        assert_eq!(m, Moneyness::AtTheMoney);
    }

    #[test]
    fn test_moneyness_call_sides() {
        let (m, _) = moneyness(90.0, 100.0, OptionType::Call, &buckets());
        assert_eq!(m, Moneyness::InTheMoney);
        let (m, _) = moneyness(108.0, 100.0, OptionType::Call, &buckets());
        assert_eq!(m, Moneyness::OutOfTheMoney);
        let (m, _) = moneyness(115.0, 100.0, OptionType::Call, &buckets());
        assert_eq!(m, Moneyness::DeepOutOfTheMoney);
    }

    #[test]
    fn test_moneyness_put_sides() {
        // Put ITM/OTM mirror the call orientation
        let (m, _) = moneyness(110.0, 100.0, OptionType::Put, &buckets());
        assert_eq!(m, Moneyness::InTheMoney);
        let (m, _) = moneyness(93.0, 100.0, OptionType::Put, &buckets());
        assert_eq!(m, Moneyness::OutOfTheMoney);
        let (m, d) = moneyness(85.0, 100.0, OptionType::Put, &buckets());
        assert_eq!(m, Moneyness::DeepOutOfTheMoney);
        assert!(d < 0.0);
    }

    #[test]
    fn test_unusuality_breakpoints_inclusive() {
        let b = buckets();
        assert_eq!(unusuality_level(2.0, &b), UnusualityLevel::Moderate);
        assert_eq!(unusuality_level(4.99, &b), UnusualityLevel::Moderate);
        assert_eq!(unusuality_level(5.0, &b), UnusualityLevel::High);
        assert_eq!(unusuality_level(7.99, &b), UnusualityLevel::High);
        assert_eq!(unusuality_level(8.0, &b), UnusualityLevel::Extreme);
        assert_eq!(unusuality_level(50.0, &b), UnusualityLevel::Extreme);
    }

    #[test]
    fn test_unusuality_is_monotonic_in_ratio() {
        let b = buckets();
        let mut previous = unusuality_level(0.0, &b);
        for step in 1..200 {
            let level = unusuality_level(step as f64 * 0.1, &b);
            assert!(level >= previous, "bucket regressed at ratio {}", step as f64 * 0.1);
            previous = level;
        }
    }

    #[test]
    fn test_position_size_buckets() {
        let b = buckets();
        assert_eq!(position_size(999, &b), PositionSize::Small);
        assert_eq!(position_size(1_000, &b), PositionSize::Medium);
        assert_eq!(position_size(9_999, &b), PositionSize::Medium);
        assert_eq!(position_size(10_000, &b), PositionSize::Large);
    }

    #[test]
    fn test_time_decay_buckets() {
        assert_eq!(time_decay_risk(1), TimeDecayRisk::High);
        assert_eq!(time_decay_risk(7), TimeDecayRisk::High);
        assert_eq!(time_decay_risk(8), TimeDecayRisk::Medium);
        assert_eq!(time_decay_risk(21), TimeDecayRisk::Medium);
        assert_eq!(time_decay_risk(22), TimeDecayRisk::Low);
        assert_eq!(time_decay_risk(45), TimeDecayRisk::Low);
    }
}
