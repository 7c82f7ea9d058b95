//! HTTP error mapping for the analysis API.
//!
//! The typed core errors fold into four HTTP outcomes while preserving the
//! distinctions the client needs: a bad request is fixable by the caller, a
//! not-found ticker is not retryable, a transient gateway failure is worth a
//! manual retry, and anything else is on us. Bodies carry the
//! `{ detail, ticker }` shape the frontend expects.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use uoa_rust_core::{AnalysisError, GatewayError};

/// Offered to the caller when a ticker has no data
const SUGGESTED_TICKERS: &[&str] = &["AAPL", "MSFT", "TSLA", "AMZN", "NVDA", "META", "GOOGL"];

#[derive(Debug)]
pub enum ApiError {
    BadRequest { detail: String },
    NotFound { detail: String, ticker: String },
    Unavailable { detail: String, ticker: String },
    Internal { detail: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail, ticker) = match self {
            ApiError::BadRequest { detail } => (StatusCode::BAD_REQUEST, detail, None),
            ApiError::NotFound { detail, ticker } => (StatusCode::NOT_FOUND, detail, Some(ticker)),
            ApiError::Unavailable { detail, ticker } => {
                (StatusCode::SERVICE_UNAVAILABLE, detail, Some(ticker))
            }
            ApiError::Internal { detail } => (StatusCode::INTERNAL_SERVER_ERROR, detail, None),
        };

        let body = json!({ "detail": detail, "ticker": ticker });
        (status, Json(body)).into_response()
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        let ticker = err.ticker().to_string();
        match &err {
            GatewayError::NotFound { .. } => ApiError::NotFound {
                detail: format!(
                    "Could not fetch options data for ticker '{ticker}'. \
                     Try these popular tickers instead: {}",
                    suggestions(&ticker)
                ),
                ticker,
            },
            // Timeout keeps its own message through Display so the caller
            // can tell it from a provider outage, but both are retryable.
            GatewayError::Timeout { .. }
            | GatewayError::Unavailable { .. }
            | GatewayError::Malformed { .. } => ApiError::Unavailable {
                detail: err.to_string(),
                ticker,
            },
        }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match &err {
            AnalysisError::InvalidTicker(_) => ApiError::BadRequest {
                detail: err.to_string(),
            },
            // A snapshot that defeats every sanity check is an upstream
            // data-quality problem we cannot serve, not a caller mistake.
            AnalysisError::CorruptPayload { .. } => ApiError::Internal {
                detail: err.to_string(),
            },
        }
    }
}

fn suggestions(exclude: &str) -> String {
    SUGGESTED_TICKERS
        .iter()
        .filter(|t| !t.eq_ignore_ascii_case(exclude))
        .take(5)
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_distinctly_from_transient() {
        let not_found: ApiError = GatewayError::NotFound {
            ticker: "ZZZZ".to_string(),
        }
        .into();
        assert!(matches!(not_found, ApiError::NotFound { .. }));

        let outage: ApiError = GatewayError::Unavailable {
            ticker: "ZZZZ".to_string(),
            reason: "HTTP 502".to_string(),
        }
        .into();
        assert!(matches!(outage, ApiError::Unavailable { .. }));
    }

    #[test]
    fn test_not_found_offers_suggestions() {
        let err: ApiError = GatewayError::NotFound {
            ticker: "TSLA".to_string(),
        }
        .into();
        let ApiError::NotFound { detail, ticker } = err else {
            panic!("expected NotFound");
        };
        assert_eq!(ticker, "TSLA");
        assert!(detail.contains("AAPL"));
        // The failing ticker is never suggested back
        assert!(!suggestions("TSLA").contains("TSLA"));
        assert_eq!(suggestions("TSLA").split(", ").count(), 5);
    }

    #[test]
    fn test_timeout_is_unavailable_with_timeout_detail() {
        let err: ApiError = GatewayError::Timeout {
            ticker: "AAPL".to_string(),
            timeout_secs: 30,
        }
        .into();
        let ApiError::Unavailable { detail, .. } = err else {
            panic!("expected Unavailable");
        };
        assert!(detail.contains("timed out"));
    }

    #[test]
    fn test_invalid_ticker_is_bad_request() {
        let err: ApiError = AnalysisError::InvalidTicker("123!".to_string()).into();
        assert!(matches!(err, ApiError::BadRequest { .. }));
    }
}
