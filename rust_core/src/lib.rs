//! UOA Core - unusual options activity detection and shared logic.
//!
//! This crate provides:
//! - The unusual-activity classifier: validity/threshold filtering, derived
//!   metrics (moneyness, unusuality, time decay, strategic signals), a
//!   deterministic total-order sort and result truncation
//! - Market sentiment aggregation over the filtered flow
//! - Mode-aware threshold profiles (live trading vs position analysis)
//! - The market data gateway trait and the Yahoo Finance client
//! - Ticker validation and a best-effort market-hours check
//!
//! Every analysis is a stateless pure transformation: one request, one
//! invocation, nothing shared and nothing cached across requests.

mod types;

pub mod classifier;
pub mod clients;
pub mod config;
pub mod errors;
pub mod utils;

pub use classifier::{analyze, Analysis};
pub use config::{AnalysisConfig, BucketThresholds, FilterProfile};
pub use errors::{AnalysisError, GatewayError};
pub use types::*;
