//! Unusual-activity classification pipeline.
//!
//! `analyze` is a pure, synchronous transformation over an in-memory
//! contract list: sanity check, validity filter, conjunctive threshold
//! filter, derived metrics, deterministic sort, truncation, aggregation.
//! It performs no I/O, holds no state across calls, and is trivially
//! parallelizable across independent requests.

pub mod metrics;
pub mod sentiment;
pub mod signals;

use crate::config::AnalysisConfig;
use crate::errors::AnalysisError;
use crate::types::{AnalysisMode, MarketSentiment, OptionContract, UnusualContract};
use chrono::NaiveDate;
use log::{debug, warn};

use metrics::{days_to_expiration, moneyness, position_size, premium_spent, time_decay_risk, unusuality_level};
use signals::{strategic_signal, SignalContext};

/// Output of one classifier run. The service layer wraps this into the
/// wire-facing response.
#[derive(Clone, Debug)]
pub struct Analysis {
    /// Contracts that survived validity filtering (the scanned universe)
    pub total_contracts: usize,
    /// Filtered, derived, sorted and truncated unusual set
    pub unusual_contracts: Vec<UnusualContract>,
    pub market_sentiment: MarketSentiment,
    pub top_signals: Vec<String>,
    pub risk_warnings: Vec<String>,
}

/// Run the full classification pipeline for one ticker snapshot.
///
/// Empty input, or input where every contract is filtered away, is a valid
/// zero-result analysis: absence of unusual activity is a normal outcome,
/// distinct from a gateway failure. Only a payload that is wholesale
/// garbage (unusable underlying price, or every row failing sanity) is an
/// error.
pub fn analyze(
    contracts: &[OptionContract],
    underlying_price: f64,
    config: &AnalysisConfig,
    mode: AnalysisMode,
    analysis_date: NaiveDate,
) -> Result<Analysis, AnalysisError> {
    if !underlying_price.is_finite() || underlying_price <= 0.0 {
        return Err(AnalysisError::CorruptPayload {
            reason: format!("non-positive underlying price {underlying_price}"),
        });
    }

    let profile = config.profile(mode);

    // Row sanity: individually bad rows are dropped and logged; a non-empty
    // payload where every row is bad is a data-quality failure.
    let mut dropped = 0usize;
    let sane: Vec<&OptionContract> = contracts
        .iter()
        .filter(|c| {
            let ok = row_is_sane(c);
            if !ok {
                dropped += 1;
            }
            ok
        })
        .collect();
    if !contracts.is_empty() && sane.is_empty() {
        return Err(AnalysisError::CorruptPayload {
            reason: format!("all {} contract rows failed sanity checks", contracts.len()),
        });
    }
    if dropped > 0 {
        warn!("dropped {dropped} contract rows failing sanity checks");
    }

    // Validity filter: a zero-OI contract has an undefined ratio, zero-volume
    // rows carry no flow, and anything outside the DTE window (including
    // already-expired contracts) is out of scope.
    let universe: Vec<(&OptionContract, i64)> = sane
        .into_iter()
        .filter_map(|c| {
            if c.open_interest == 0 || c.volume == 0 {
                return None;
            }
            let dte = days_to_expiration(c.expiration, analysis_date);
            if dte < profile.min_dte || dte > profile.max_dte {
                return None;
            }
            Some((c, dte))
        })
        .collect();
    let total_contracts = universe.len();

    // Conjunctive threshold filter, then derived metrics for survivors.
    let mut unusual: Vec<UnusualContract> = universe
        .into_iter()
        .filter_map(|(c, dte)| {
            let ratio = c.volume as f64 / c.open_interest as f64;
            let premium = premium_spent(c.last_price, c.volume);
            if ratio < profile.min_volume_oi_ratio
                || c.volume < profile.min_volume
                || c.open_interest < profile.min_open_interest
                || premium < profile.min_premium_spent
            {
                return None;
            }
            Some(derive_contract(c, underlying_price, ratio, premium, dte, config, mode))
        })
        .collect();

    debug!(
        "classifier: {} scanned, {} unusual before truncation",
        total_contracts,
        unusual.len()
    );

    // Total order: ratio desc, premium desc, expiration asc, symbol asc.
    // The symbol tiebreak guarantees identical inputs produce identical
    // output ordering.
    unusual.sort_by(|a, b| {
        b.volume_to_oi_ratio
            .total_cmp(&a.volume_to_oi_ratio)
            .then_with(|| b.premium_spent.total_cmp(&a.premium_spent))
            .then_with(|| a.expiration_date.cmp(&b.expiration_date))
            .then_with(|| a.contract_symbol.cmp(&b.contract_symbol))
    });
    unusual.truncate(profile.max_results);

    // Aggregates run over the truncated set only.
    let market_sentiment = sentiment::market_sentiment(&unusual);
    let (top_signals, risk_warnings) =
        sentiment::expert_insights(&unusual, &market_sentiment, &config.buckets);

    Ok(Analysis {
        total_contracts,
        unusual_contracts: unusual,
        market_sentiment,
        top_signals,
        risk_warnings,
    })
}

fn row_is_sane(c: &OptionContract) -> bool {
    c.strike.is_finite() && c.strike > 0.0 && c.last_price.is_finite() && c.last_price >= 0.0
}

fn derive_contract(
    c: &OptionContract,
    underlying_price: f64,
    ratio: f64,
    premium: f64,
    dte: i64,
    config: &AnalysisConfig,
    mode: AnalysisMode,
) -> UnusualContract {
    let (money, distance) = moneyness(c.strike, underlying_price, c.option_type, &config.buckets);

    // Live trading rates unusuality from the volume/OI ratio; position
    // analysis substitutes open-interest sizing buckets.
    let (unusuality, sizing) = match mode {
        AnalysisMode::LiveTrading => (Some(unusuality_level(ratio, &config.buckets)), None),
        AnalysisMode::PositionAnalysis => (None, Some(position_size(c.open_interest, &config.buckets))),
    };

    let signal = strategic_signal(&SignalContext {
        option_type: c.option_type,
        moneyness: money,
        volume_to_oi_ratio: ratio,
        days_to_expiration: dte,
        premium_spent: premium,
    });

    UnusualContract {
        contract_symbol: c.contract_symbol.clone(),
        strike: c.strike,
        option_type: c.option_type,
        expiration_date: c.expiration,
        last_price: c.last_price,
        volume: c.volume,
        open_interest: c.open_interest,
        underlying_price,
        volume_to_oi_ratio: ratio,
        premium_spent: premium,
        days_to_expiration: dte,
        moneyness: money,
        distance_from_strike: distance,
        unusuality_level: unusuality,
        position_size: sizing,
        time_decay_risk: time_decay_risk(dte),
        strategic_signal: signal,
    }
}
