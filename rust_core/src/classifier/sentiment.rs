//! Aggregate sentiment and human-readable insight strings.
//!
//! Sentiment is always computed over the truncated, filtered unusual set
//! (the contracts the caller actually sees), not the full scanned universe.

use crate::classifier::signals::SMART_MONEY_PREMIUM;
use crate::config::BucketThresholds;
use crate::types::{MarketSentiment, Moneyness, NetSentiment, UnusualContract};

/// A filtered contract with at least this volume/OI ratio counts as a
/// directional signal for sentiment purposes.
const SENTIMENT_SIGNAL_RATIO: f64 = 3.0;

/// Call-count must exceed put-count by this factor (and vice versa) before
/// the net read leaves NEUTRAL.
const SENTIMENT_DOMINANCE_FACTOR: usize = 2;

/// Call/put volume ratio beyond these bounds is worth calling out
const STRONG_BULLISH_RATIO: f64 = 2.0;
const STRONG_BEARISH_RATIO: f64 = 0.5;

const MAX_TOP_SIGNALS: usize = 5;
const MAX_RISK_WARNINGS: usize = 3;

/// Compute market sentiment over the filtered set.
pub fn market_sentiment(contracts: &[UnusualContract]) -> MarketSentiment {
    if contracts.is_empty() {
        return MarketSentiment::neutral();
    }

    let mut total_call_volume = 0u64;
    let mut total_put_volume = 0u64;
    let mut call_count = 0usize;
    let mut put_count = 0usize;
    let mut bullish_signals = 0usize;
    let mut bearish_signals = 0usize;

    for contract in contracts {
        let strong = contract.volume_to_oi_ratio >= SENTIMENT_SIGNAL_RATIO;
        if contract.option_type.is_call() {
            total_call_volume += contract.volume;
            call_count += 1;
            if strong {
                bullish_signals += 1;
            }
        } else {
            total_put_volume += contract.volume;
            put_count += 1;
            if strong {
                bearish_signals += 1;
            }
        }
    }

    // Put volume of zero leaves the ratio undefined: reported as "all calls"
    // via None rather than an infinity the wire format cannot carry.
    let call_put_ratio = if total_put_volume > 0 {
        Some(total_call_volume as f64 / total_put_volume as f64)
    } else {
        None
    };

    let net_sentiment = if call_count > SENTIMENT_DOMINANCE_FACTOR * put_count {
        NetSentiment::Bullish
    } else if put_count > SENTIMENT_DOMINANCE_FACTOR * call_count {
        NetSentiment::Bearish
    } else {
        NetSentiment::Neutral
    };

    MarketSentiment {
        total_call_volume,
        total_put_volume,
        call_put_ratio,
        bullish_signals,
        bearish_signals,
        net_sentiment,
    }
}

/// Build the top-signal and risk-warning strings for the response.
///
/// Returns at most five insights and three warnings, most important first.
pub fn expert_insights(
    contracts: &[UnusualContract],
    sentiment: &MarketSentiment,
    buckets: &BucketThresholds,
) -> (Vec<String>, Vec<String>) {
    if contracts.is_empty() {
        return (
            vec!["No unusual options activity detected".to_string()],
            Vec::new(),
        );
    }

    let mut insights = Vec::new();
    let mut warnings = Vec::new();

    match sentiment.call_put_ratio {
        Some(ratio) if ratio > STRONG_BULLISH_RATIO => {
            insights.push(format!(
                "Strong bullish sentiment: {ratio:.1}x more call volume"
            ));
        }
        Some(ratio) if ratio < STRONG_BEARISH_RATIO => {
            insights.push(format!(
                "Strong bearish sentiment: {ratio:.1} call/put ratio"
            ));
        }
        None if sentiment.total_call_volume > 0 => {
            insights.push("One-sided flow: all unusual volume is in calls".to_string());
        }
        _ => {}
    }

    let extreme_flows = contracts
        .iter()
        .filter(|c| c.volume_to_oi_ratio >= buckets.extreme_unusual_ratio)
        .count();
    if extreme_flows > 0 {
        insights.push(format!(
            "{extreme_flows} EXTREME flows detected ({:.0}x+ volume/OI)",
            buckets.extreme_unusual_ratio
        ));
    }

    let high_conviction = contracts
        .iter()
        .filter(|c| c.premium_spent >= SMART_MONEY_PREMIUM)
        .count();
    if high_conviction > 0 {
        insights.push(format!(
            "{high_conviction} high-conviction trades (>${:.0}K premium)",
            SMART_MONEY_PREMIUM / 1_000.0
        ));
    }

    if insights.is_empty() {
        insights.push(format!("Found {} unusual contracts", contracts.len()));
    }

    let short_dte = contracts
        .iter()
        .filter(|c| c.days_to_expiration <= 7)
        .count();
    if short_dte > 0 {
        warnings.push(format!(
            "{short_dte} contracts expire within 7 days (HIGH time decay)"
        ));
    }

    let deep_otm = contracts
        .iter()
        .filter(|c| c.moneyness == Moneyness::DeepOutOfTheMoney)
        .count();
    if deep_otm > 0 {
        warnings.push(format!(
            "{deep_otm} deep OTM positions detected (lottery ticket plays)"
        ));
    }

    insights.truncate(MAX_TOP_SIGNALS);
    warnings.truncate(MAX_RISK_WARNINGS);
    (insights, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OptionType, TimeDecayRisk};
    use chrono::NaiveDate;

    fn contract(option_type: OptionType, volume: u64, ratio: f64) -> UnusualContract {
        UnusualContract {
            contract_symbol: format!("TEST-{option_type}-{volume}-{ratio}"),
            strike: 100.0,
            option_type,
            expiration_date: NaiveDate::from_ymd_opt(2025, 7, 18).unwrap(),
            last_price: 1.0,
            volume,
            open_interest: 100,
            underlying_price: 100.0,
            volume_to_oi_ratio: ratio,
            premium_spent: volume as f64 * 100.0,
            days_to_expiration: 20,
            moneyness: Moneyness::OutOfTheMoney,
            distance_from_strike: 5.0,
            unusuality_level: None,
            position_size: None,
            time_decay_risk: TimeDecayRisk::Medium,
            strategic_signal: "CALL FLOW".to_string(),
        }
    }

    #[test]
    fn test_empty_set_is_neutral() {
        let s = market_sentiment(&[]);
        assert_eq!(s.net_sentiment, NetSentiment::Neutral);
        assert_eq!(s.total_call_volume, 0);
        assert_eq!(s.call_put_ratio, None);
    }

    #[test]
    fn test_bullish_iff_calls_dominate_two_to_one() {
        // 3 calls vs 1 put: 3 > 2*1, bullish
        let set = vec![
            contract(OptionType::Call, 100, 1.5),
            contract(OptionType::Call, 100, 1.5),
            contract(OptionType::Call, 100, 1.5),
            contract(OptionType::Put, 100, 1.5),
        ];
        assert_eq!(market_sentiment(&set).net_sentiment, NetSentiment::Bullish);

        // 2 calls vs 1 put: 2 == 2*1 is not strictly greater, neutral
        let set = vec![
            contract(OptionType::Call, 100, 1.5),
            contract(OptionType::Call, 100, 1.5),
            contract(OptionType::Put, 100, 1.5),
        ];
        assert_eq!(market_sentiment(&set).net_sentiment, NetSentiment::Neutral);
    }

    #[test]
    fn test_bearish_symmetry() {
        let set = vec![
            contract(OptionType::Put, 100, 1.5),
            contract(OptionType::Put, 100, 1.5),
            contract(OptionType::Put, 100, 1.5),
            contract(OptionType::Call, 100, 1.5),
        ];
        assert_eq!(market_sentiment(&set).net_sentiment, NetSentiment::Bearish);
    }

    #[test]
    fn test_signal_counts_partition_by_type() {
        let set = vec![
            contract(OptionType::Call, 100, 3.0),
            contract(OptionType::Call, 100, 2.9),
            contract(OptionType::Put, 100, 4.0),
        ];
        let s = market_sentiment(&set);
        // Ratio >= 3.0 inclusive
        assert_eq!(s.bullish_signals, 1);
        assert_eq!(s.bearish_signals, 1);
    }

    #[test]
    fn test_volume_sums_and_ratio() {
        let set = vec![
            contract(OptionType::Call, 300, 1.5),
            contract(OptionType::Put, 100, 1.5),
        ];
        let s = market_sentiment(&set);
        assert_eq!(s.total_call_volume, 300);
        assert_eq!(s.total_put_volume, 100);
        assert_eq!(s.call_put_ratio, Some(3.0));
    }

    #[test]
    fn test_all_calls_ratio_policy() {
        let set = vec![contract(OptionType::Call, 100, 1.5)];
        let s = market_sentiment(&set);
        assert_eq!(s.call_put_ratio, None);
    }

    #[test]
    fn test_empty_insights_message() {
        let (signals, warnings) =
            expert_insights(&[], &MarketSentiment::neutral(), &BucketThresholds::default());
        assert_eq!(signals, vec!["No unusual options activity detected"]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_extreme_flow_insight_and_decay_warning() {
        let mut c = contract(OptionType::Call, 100, 9.0);
        c.days_to_expiration = 5;
        let set = vec![c];
        let s = market_sentiment(&set);
        let (signals, warnings) = expert_insights(&set, &s, &BucketThresholds::default());
        assert!(signals.iter().any(|m| m.contains("EXTREME flows")));
        assert!(warnings.iter().any(|m| m.contains("expire within 7 days")));
    }

    #[test]
    fn test_insight_and_warning_caps() {
        let mut set = Vec::new();
        for i in 0..10 {
            let mut c = contract(
                if i % 2 == 0 { OptionType::Call } else { OptionType::Put },
                200_000,
                9.0,
            );
            c.days_to_expiration = 3;
            c.moneyness = Moneyness::DeepOutOfTheMoney;
            c.premium_spent = 200_000.0;
            set.push(c);
        }
        let s = market_sentiment(&set);
        let (signals, warnings) = expert_insights(&set, &s, &BucketThresholds::default());
        assert!(signals.len() <= 5);
        assert!(warnings.len() <= 3);
    }
}
