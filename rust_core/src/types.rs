//! Core data shapes for unusual options activity analysis.
//!
//! Everything here is constructed fresh per analysis request and discarded
//! after the response is produced. There is no persistence layer and no
//! cross-request cache.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Option contract side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    pub fn is_call(&self) -> bool {
        matches!(self, OptionType::Call)
    }

    /// Flow label used when no strategic rule fires
    pub fn flow_label(&self) -> &'static str {
        match self {
            OptionType::Call => "CALL FLOW",
            OptionType::Put => "PUT FLOW",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "call"),
            OptionType::Put => write!(f, "put"),
        }
    }
}

/// One option contract row as fetched from the market data gateway.
///
/// Rows with missing volume/open-interest/last-price never make it this far;
/// the gateway drops them at parse time (row-granularity tolerance).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionContract {
    pub contract_symbol: String,
    pub strike: f64,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub expiration: NaiveDate,
    pub last_price: f64,
    pub volume: u64,
    pub open_interest: u64,
}

/// Full options chain for one ticker as returned by the gateway.
#[derive(Clone, Debug)]
pub struct OptionsChain {
    /// Snapshot price of the underlying at fetch time
    pub underlying_price: f64,
    pub contracts: Vec<OptionContract>,
    /// Number of expiration dates actually fetched (bounded upstream)
    pub expirations_scanned: usize,
}

/// Caller-facing mode selector for an analysis request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Auto,
    Live,
    Position,
}

impl Mode {
    /// Resolve `auto` against market state. Whether the market is open is an
    /// external fact supplied by the caller, never computed here.
    pub fn resolve(self, market_open: bool) -> AnalysisMode {
        match self {
            Mode::Live => AnalysisMode::LiveTrading,
            Mode::Position => AnalysisMode::PositionAnalysis,
            Mode::Auto => {
                if market_open {
                    AnalysisMode::LiveTrading
                } else {
                    AnalysisMode::PositionAnalysis
                }
            }
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Mode::Auto),
            "live" => Ok(Mode::Live),
            "position" => Ok(Mode::Position),
            other => Err(format!(
                "unknown mode '{other}': expected 'auto', 'live' or 'position'"
            )),
        }
    }
}

/// Concrete analysis profile after `auto` resolution.
///
/// Live trading uses volume-based filtering and volume/OI unusuality buckets;
/// position analysis uses the stricter smart-money thresholds and
/// open-interest sizing buckets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisMode {
    #[serde(rename = "live")]
    LiveTrading,
    #[serde(rename = "position")]
    PositionAnalysis,
}

impl AnalysisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::LiveTrading => "live",
            AnalysisMode::PositionAnalysis => "position",
        }
    }
}

/// Strike position relative to the underlying price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Moneyness {
    #[serde(rename = "ITM")]
    InTheMoney,
    #[serde(rename = "ATM")]
    AtTheMoney,
    #[serde(rename = "OTM")]
    OutOfTheMoney,
    #[serde(rename = "Deep-OTM")]
    DeepOutOfTheMoney,
}

/// Volume/OI-ratio bucket, live-trading mode only.
///
/// Ordered so that a higher ratio never maps to a lower bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UnusualityLevel {
    Moderate,
    High,
    Extreme,
}

/// Open-interest sizing bucket, position-analysis mode only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSize {
    Small,
    Medium,
    Large,
}

/// Time decay (theta) exposure bucket from days to expiration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeDecayRisk {
    Low,
    Medium,
    High,
}

/// A contract that survived filtering, annotated with derived metrics.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnusualContract {
    pub contract_symbol: String,
    pub strike: f64,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub expiration_date: NaiveDate,
    pub last_price: f64,
    pub volume: u64,
    pub open_interest: u64,
    pub underlying_price: f64,

    // Derived metrics, recomputed each analysis
    pub volume_to_oi_ratio: f64,
    pub premium_spent: f64,
    pub days_to_expiration: i64,
    pub moneyness: Moneyness,
    /// Signed distance of strike from underlying, in percent
    pub distance_from_strike: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unusuality_level: Option<UnusualityLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_size: Option<PositionSize>,
    pub time_decay_risk: TimeDecayRisk,
    pub strategic_signal: String,
}

/// Aggregate read of the filtered flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NetSentiment {
    Bullish,
    Bearish,
    Neutral,
}

/// Market sentiment computed over the truncated, filtered unusual set only,
/// never over the full unfiltered universe.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSentiment {
    pub total_call_volume: u64,
    pub total_put_volume: u64,
    /// Call volume over put volume. `None` means put volume was zero
    /// (all-calls flow), which JSON renders as an omitted field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_put_ratio: Option<f64>,
    pub bullish_signals: usize,
    pub bearish_signals: usize,
    pub net_sentiment: NetSentiment,
}

impl MarketSentiment {
    /// Neutral zero sentiment for an empty result set
    pub fn neutral() -> Self {
        Self {
            total_call_volume: 0,
            total_put_volume: 0,
            call_put_ratio: None,
            bullish_signals: 0,
            bearish_signals: 0,
            net_sentiment: NetSentiment::Neutral,
        }
    }
}

/// Response payload for one analysis request.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UoaResponse {
    pub ticker: String,
    pub analysis_date: DateTime<Utc>,
    pub underlying_price: f64,
    pub mode: AnalysisMode,
    /// Contracts scanned after validity filtering, before thresholds
    pub total_contracts: usize,
    pub unusual_contracts: Vec<UnusualContract>,
    pub market_sentiment: MarketSentiment,
    pub top_signals: Vec<String>,
    pub risk_warnings: Vec<String>,
}
