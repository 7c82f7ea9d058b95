//! Ticker symbol validation and normalization.
//!
//! Tickers are validated before any gateway call is made: 1-10 alphabetic
//! characters, case-insensitive on input, normalized to uppercase.

use crate::errors::AnalysisError;

const MAX_TICKER_LEN: usize = 10;

/// Validate a raw ticker string and return its canonical uppercase form.
pub fn normalize(raw: &str) -> Result<String, AnalysisError> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.len() > MAX_TICKER_LEN
        || !trimmed.chars().all(|c| c.is_ascii_alphabetic())
    {
        return Err(AnalysisError::InvalidTicker(raw.to_string()));
    }
    Ok(trimmed.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_and_uppercases() {
        assert_eq!(normalize("aapl").unwrap(), "AAPL");
        assert_eq!(normalize("TSLA").unwrap(), "TSLA");
        assert_eq!(normalize(" msft ").unwrap(), "MSFT");
        assert_eq!(normalize("a").unwrap(), "A");
        assert_eq!(normalize("ABCDEFGHIJ").unwrap(), "ABCDEFGHIJ");
    }

    #[test]
    fn test_rejects_bad_symbols() {
        for bad in ["", "   ", "ABCDEFGHIJK", "BRK.B", "SP-500", "A1", "$SPY", "TS LA"] {
            assert!(
                matches!(normalize(bad), Err(AnalysisError::InvalidTicker(_))),
                "expected rejection for {bad:?}"
            );
        }
    }
}
