//! Yahoo Finance options chain client.
//!
//! Read-only, unauthenticated access to the public
//! `v7/finance/options/{symbol}` endpoint. One request without a date
//! parameter yields the quote price and the list of expiration dates;
//! per-expiration requests yield the call/put rows. Fetching is bounded to
//! the first eight expirations inside the caller's DTE window.
//!
//! Malformed rows are dropped individually and logged; a payload whose rows
//! are all unusable is reported as a malformed-payload error so callers can
//! treat it as a provider outage rather than a quiet market.

use crate::clients::OptionsGateway;
use crate::errors::GatewayError;
use crate::types::{OptionContract, OptionType, OptionsChain};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use futures_util::future::join_all;
use log::{debug, info, warn};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::env;
use std::time::Duration;

const YAHOO_OPTIONS_URL: &str = "https://query2.finance.yahoo.com/v7/finance/options";

/// Client-side request timeout. A hung provider must not hold an analysis
/// request longer than this.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Cap on expiration dates fetched per analysis, for predictable latency
const MAX_EXPIRATIONS: usize = 8;

/// Yahoo rejects requests without a browser-like user agent
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

#[derive(Clone)]
pub struct YahooOptionsClient {
    client: Client,
    base_url: String,
    max_expirations: usize,
}

impl std::fmt::Debug for YahooOptionsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooOptionsClient")
            .field("base_url", &self.base_url)
            .field("max_expirations", &self.max_expirations)
            .finish()
    }
}

// ==========================================================================
// Wire format
// ==========================================================================

#[derive(Debug, Deserialize)]
struct OptionsEnvelope {
    #[serde(rename = "optionChain")]
    option_chain: OptionChainNode,
}

#[derive(Debug, Deserialize)]
struct OptionChainNode {
    #[serde(default)]
    result: Option<Vec<ChainSlice>>,
}

#[derive(Debug, Deserialize)]
struct ChainSlice {
    #[serde(rename = "expirationDates", default)]
    expiration_dates: Vec<i64>,
    quote: Option<Quote>,
    #[serde(default)]
    options: Vec<OptionsBlock>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OptionsBlock {
    #[serde(default)]
    calls: Vec<RawContract>,
    #[serde(default)]
    puts: Vec<RawContract>,
}

#[derive(Debug, Deserialize)]
struct RawContract {
    #[serde(rename = "contractSymbol")]
    contract_symbol: Option<String>,
    strike: Option<f64>,
    #[serde(rename = "lastPrice")]
    last_price: Option<f64>,
    volume: Option<u64>,
    #[serde(rename = "openInterest")]
    open_interest: Option<u64>,
    expiration: Option<i64>,
}

// ==========================================================================
// Client
// ==========================================================================

impl YahooOptionsClient {
    /// Create a client with the default endpoint (overridable through
    /// `YAHOO_BASE_URL`) and the bounded request timeout.
    pub fn new() -> Result<Self> {
        let base_url =
            env::var("YAHOO_BASE_URL").unwrap_or_else(|_| YAHOO_OPTIONS_URL.to_string());

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client for Yahoo Finance")?;

        Ok(Self {
            client,
            base_url,
            max_expirations: MAX_EXPIRATIONS,
        })
    }

    /// Fetch one chain slice; `date: None` returns the quote and the full
    /// expiration-date list alongside the nearest expiration's rows.
    async fn fetch_slice(
        &self,
        ticker: &str,
        date: Option<i64>,
    ) -> Result<ChainSlice, GatewayError> {
        let url = format!("{}/{}", self.base_url, ticker);
        let mut request = self.client.get(&url);
        if let Some(epoch) = date {
            request = request.query(&[("date", epoch.to_string())]);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout {
                    ticker: ticker.to_string(),
                    timeout_secs: REQUEST_TIMEOUT_SECS,
                }
            } else {
                GatewayError::Unavailable {
                    ticker: ticker.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound {
                ticker: ticker.to_string(),
            });
        }
        if !status.is_success() {
            return Err(GatewayError::Unavailable {
                ticker: ticker.to_string(),
                reason: format!("HTTP {status}"),
            });
        }

        let envelope: OptionsEnvelope =
            response.json().await.map_err(|e| GatewayError::Malformed {
                ticker: ticker.to_string(),
                reason: format!("invalid response body: {e}"),
            })?;

        // An empty result set is Yahoo's "unknown symbol" answer
        first_slice(envelope).ok_or_else(|| GatewayError::NotFound {
            ticker: ticker.to_string(),
        })
    }
}

#[async_trait]
impl OptionsGateway for YahooOptionsClient {
    async fn fetch_chain(
        &self,
        ticker: &str,
        min_dte: i64,
        max_dte: i64,
    ) -> Result<OptionsChain, GatewayError> {
        let root = self.fetch_slice(ticker, None).await?;

        let underlying_price = root
            .quote
            .as_ref()
            .and_then(|q| q.regular_market_price)
            .ok_or_else(|| GatewayError::Malformed {
                ticker: ticker.to_string(),
                reason: "quote has no regular market price".to_string(),
            })?;

        if root.expiration_dates.is_empty() {
            // Symbol resolves but lists no option expirations at all
            return Err(GatewayError::NotFound {
                ticker: ticker.to_string(),
            });
        }

        let today = Utc::now().date_naive();
        let selected: Vec<i64> = root
            .expiration_dates
            .iter()
            .copied()
            .filter(|&epoch| match epoch_to_date(epoch) {
                Some(date) => {
                    let dte = (date - today).num_days();
                    dte >= min_dte && dte <= max_dte
                }
                None => false,
            })
            .take(self.max_expirations)
            .collect();

        info!(
            "{ticker}: {} of {} expiration dates inside {min_dte}-{max_dte} DTE window",
            selected.len(),
            root.expiration_dates.len()
        );

        // Expiration slices fetch concurrently. A single failed slice is
        // logged and skipped rather than failing the whole analysis; the
        // root request above already proved the provider is reachable.
        let slices = join_all(
            selected
                .iter()
                .map(|&epoch| self.fetch_slice(ticker, Some(epoch))),
        )
        .await;

        let mut contracts = Vec::new();
        let mut raw_rows = 0usize;
        for (epoch, slice) in selected.iter().zip(slices) {
            let slice = match slice {
                Ok(slice) => slice,
                Err(e) => {
                    warn!("{ticker}: skipping expiration {epoch}: {e}");
                    continue;
                }
            };
            for block in slice.options {
                let (mut rows, total) = normalize_rows(block.calls, OptionType::Call);
                raw_rows += total;
                contracts.append(&mut rows);
                let (mut rows, total) = normalize_rows(block.puts, OptionType::Put);
                raw_rows += total;
                contracts.append(&mut rows);
            }
            debug!("{ticker}: expiration {epoch} processed, {} rows so far", contracts.len());
        }

        let dropped = raw_rows - contracts.len();
        if dropped > 0 {
            warn!("{ticker}: dropped {dropped} of {raw_rows} malformed contract rows");
        }
        if raw_rows > 0 && contracts.is_empty() {
            return Err(GatewayError::Malformed {
                ticker: ticker.to_string(),
                reason: format!("all {raw_rows} contract rows were malformed"),
            });
        }

        Ok(OptionsChain {
            underlying_price,
            contracts,
            expirations_scanned: selected.len(),
        })
    }
}

// ==========================================================================
// Row normalization
// ==========================================================================

fn first_slice(envelope: OptionsEnvelope) -> Option<ChainSlice> {
    let mut result = envelope.option_chain.result?;
    if result.is_empty() {
        None
    } else {
        Some(result.remove(0))
    }
}

fn epoch_to_date(epoch: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp(epoch, 0).map(|dt| dt.date_naive())
}

/// Keep structurally complete rows, drop the rest. Missing volume or open
/// interest means "none recorded" and normalizes to zero; the classifier's
/// validity filter excludes zero rows without treating the payload as
/// broken.
fn normalize_rows(rows: Vec<RawContract>, option_type: OptionType) -> (Vec<OptionContract>, usize) {
    let total = rows.len();
    let contracts = rows
        .into_iter()
        .filter_map(|row| normalize_row(row, option_type))
        .collect();
    (contracts, total)
}

fn normalize_row(row: RawContract, option_type: OptionType) -> Option<OptionContract> {
    Some(OptionContract {
        contract_symbol: row.contract_symbol?,
        strike: row.strike?,
        option_type,
        expiration: epoch_to_date(row.expiration?)?,
        last_price: row.last_price?,
        volume: row.volume.unwrap_or(0),
        open_interest: row.open_interest.unwrap_or(0),
    })
}
