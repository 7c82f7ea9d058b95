//! Typed error taxonomy for analysis requests.
//!
//! Gateway failures and analysis failures are kept distinct so callers can
//! tell "ticker has no data" apart from "provider is down" apart from "the
//! payload itself is garbage". Internal plumbing uses `anyhow`; these enums
//! are the boundary types that reach the HTTP layer.

use thiserror::Error;

/// Failures talking to the market data gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Ticker does not exist or has no tradable options. Not retryable.
    #[error("no options data available for ticker '{ticker}'")]
    NotFound { ticker: String },

    /// The provider did not answer within the client timeout. The caller may
    /// retry manually; nothing here retries automatically.
    #[error("market data request for '{ticker}' timed out after {timeout_secs}s")]
    Timeout { ticker: String, timeout_secs: u64 },

    /// Transport or upstream failure (network, rate limit, 5xx).
    #[error("market data provider unavailable for '{ticker}': {reason}")]
    Unavailable { ticker: String, reason: String },

    /// The payload parsed but carried no usable rows. Treated like
    /// `Unavailable` by callers since the provider is effectively broken.
    #[error("malformed market data payload for '{ticker}': {reason}")]
    Malformed { ticker: String, reason: String },
}

impl GatewayError {
    pub fn ticker(&self) -> &str {
        match self {
            GatewayError::NotFound { ticker }
            | GatewayError::Timeout { ticker, .. }
            | GatewayError::Unavailable { ticker, .. }
            | GatewayError::Malformed { ticker, .. } => ticker,
        }
    }

    /// True for failures a caller could reasonably retry by hand
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GatewayError::Timeout { .. }
                | GatewayError::Unavailable { .. }
                | GatewayError::Malformed { .. }
        )
    }
}

/// Failures inside the classifier or request validation.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Rejected before any gateway call is made.
    #[error("invalid ticker '{0}': expected 1-10 alphabetic characters")]
    InvalidTicker(String),

    /// Every contract row in a non-empty payload failed basic sanity
    /// (non-positive strike, negative price) or the underlying price itself
    /// is unusable. Distinct from a legitimate zero-result analysis.
    #[error("corrupt options payload: {reason}")]
    CorruptPayload { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_ticker_context() {
        let err = GatewayError::NotFound {
            ticker: "ZZZZ".to_string(),
        };
        assert_eq!(err.ticker(), "ZZZZ");
        assert!(err.to_string().contains("ZZZZ"));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_transient_classification() {
        let timeout = GatewayError::Timeout {
            ticker: "AAPL".to_string(),
            timeout_secs: 30,
        };
        assert!(timeout.is_transient());

        let unavailable = GatewayError::Unavailable {
            ticker: "AAPL".to_string(),
            reason: "HTTP 503".to_string(),
        };
        assert!(unavailable.is_transient());
    }

    #[test]
    fn test_not_found_distinct_from_unavailable() {
        // The two failure kinds must stay distinguishable for callers
        let not_found = GatewayError::NotFound {
            ticker: "ZZZZ".to_string(),
        };
        let unavailable = GatewayError::Unavailable {
            ticker: "ZZZZ".to_string(),
            reason: "connection reset".to_string(),
        };
        assert!(matches!(not_found, GatewayError::NotFound { .. }));
        assert!(!matches!(unavailable, GatewayError::NotFound { .. }));
    }
}
