//! Market data gateway clients.
//!
//! The classifier never talks to a provider directly; it consumes an
//! `OptionsChain` produced by an `OptionsGateway` implementation. The trait
//! keeps the service testable against a stub and the provider swappable.

pub mod yahoo;

use crate::errors::GatewayError;
use crate::types::OptionsChain;
use async_trait::async_trait;

/// A source of option chain snapshots for a ticker.
///
/// Implementations may pre-filter expirations to the given DTE window as a
/// fetch optimization; the classifier re-checks the window regardless.
/// Implementations must not retry automatically: a failed fetch surfaces as
/// a typed error and the caller decides.
#[async_trait]
pub trait OptionsGateway: Send + Sync {
    async fn fetch_chain(
        &self,
        ticker: &str,
        min_dte: i64,
        max_dte: i64,
    ) -> Result<OptionsChain, GatewayError>;
}

// Re-export the production client
pub use yahoo::YahooOptionsClient;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OptionContract, OptionType};
    use chrono::NaiveDate;
    use std::sync::Arc;

    struct StubGateway {
        chain: OptionsChain,
    }

    #[async_trait]
    impl OptionsGateway for StubGateway {
        async fn fetch_chain(
            &self,
            ticker: &str,
            _min_dte: i64,
            _max_dte: i64,
        ) -> Result<OptionsChain, GatewayError> {
            if ticker == "ZZZZ" {
                return Err(GatewayError::NotFound {
                    ticker: ticker.to_string(),
                });
            }
            Ok(self.chain.clone())
        }
    }

    #[tokio::test]
    async fn test_gateway_usable_as_trait_object() {
        let gateway: Arc<dyn OptionsGateway> = Arc::new(StubGateway {
            chain: OptionsChain {
                underlying_price: 100.0,
                contracts: vec![OptionContract {
                    contract_symbol: "X".to_string(),
                    strike: 100.0,
                    option_type: OptionType::Call,
                    expiration: NaiveDate::from_ymd_opt(2026, 1, 16).unwrap(),
                    last_price: 1.0,
                    volume: 100,
                    open_interest: 50,
                }],
                expirations_scanned: 1,
            },
        });

        let chain = gateway.fetch_chain("AAPL", 1, 45).await.unwrap();
        assert_eq!(chain.contracts.len(), 1);

        // Unknown symbols surface as the typed NotFound, nothing generic
        let err = gateway.fetch_chain("ZZZZ", 1, 45).await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { .. }));
    }
}
