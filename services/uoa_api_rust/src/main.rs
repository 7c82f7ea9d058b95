//! UOA API Service (Rust)
//!
//! Responsibilities:
//! - Validate inbound ticker and mode parameters
//! - Resolve `auto` mode against a best-effort market-session check
//! - Fetch the options chain from the market data gateway (bounded timeout)
//! - Run the unusual-activity classifier and serve the annotated result
//!
//! One analysis per request; requests are independent and share no mutable
//! state, so a failure analyzing one ticker never affects another.

mod error;

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use dotenv::dotenv;
use error::ApiError;
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::{json, Value};
use std::env;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use uoa_rust_core::clients::{OptionsGateway, YahooOptionsClient};
use uoa_rust_core::utils::{market_hours, ticker};
use uoa_rust_core::{analyze, AnalysisConfig, Mode, UoaResponse};

struct AppState {
    config: AnalysisConfig,
    gateway: YahooOptionsClient,
}

#[derive(Debug, Deserialize)]
struct AnalyzeParams {
    mode: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Unusual Options Activity API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "analyze": "/api/analyze/{ticker}",
            "health": "/health"
        }
    }))
}

async fn health() -> &'static str {
    "ok"
}

async fn analyze_ticker(
    State(state): State<Arc<AppState>>,
    Path(raw_ticker): Path<String>,
    Query(params): Query<AnalyzeParams>,
) -> Result<Json<UoaResponse>, ApiError> {
    // Reject bad input before any gateway call
    let ticker = ticker::normalize(&raw_ticker).map_err(ApiError::from)?;
    let mode = match params.mode.as_deref() {
        None => Mode::default(),
        Some(raw) => raw
            .parse::<Mode>()
            .map_err(|detail| ApiError::BadRequest { detail })?,
    };

    let market_open = market_hours::is_regular_session(Utc::now());
    let resolved = mode.resolve(market_open);
    info!(
        "Analyzing unusual options activity for {ticker} (mode={}, market_open={market_open})",
        resolved.as_str()
    );

    let profile = state.config.profile(resolved);
    let chain = state
        .gateway
        .fetch_chain(&ticker, profile.min_dte, profile.max_dte)
        .await
        .map_err(|e| {
            if e.is_transient() {
                warn!("Transient gateway failure for {ticker}: {e}");
            } else {
                info!("No data for {ticker}: {e}");
            }
            ApiError::from(e)
        })?;

    info!(
        "{ticker}: {} contracts across {} expirations at underlying ${:.2}",
        chain.contracts.len(),
        chain.expirations_scanned,
        chain.underlying_price
    );

    let now = Utc::now();
    let analysis = analyze(
        &chain.contracts,
        chain.underlying_price,
        &state.config,
        resolved,
        now.date_naive(),
    )
    .map_err(|e| {
        error!("Analysis failure for {ticker}: {e}");
        ApiError::from(e)
    })?;

    info!(
        "Analysis complete for {ticker}: {} unusual contracts, {:?} sentiment",
        analysis.unusual_contracts.len(),
        analysis.market_sentiment.net_sentiment
    );

    Ok(Json(UoaResponse {
        ticker,
        analysis_date: now,
        underlying_price: chain.underlying_price,
        mode: resolved,
        total_contracts: analysis.total_contracts,
        unusual_contracts: analysis.unusual_contracts,
        market_sentiment: analysis.market_sentiment,
        top_signals: analysis.top_signals,
        risk_warnings: analysis.risk_warnings,
    }))
}

// ============================================================================
// Startup
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    // Threshold misconfiguration aborts startup, never a request
    let config = AnalysisConfig::load().context("Invalid analysis configuration")?;
    let gateway = YahooOptionsClient::new().context("Failed to create market data client")?;

    let host = env::var("UOA_API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("UOA_API_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8000);

    info!(
        "Filtering config: live ratio>={} vol>={} oi>={} premium>=${}, position ratio>={} premium>=${}",
        config.live.min_volume_oi_ratio,
        config.live.min_volume,
        config.live.min_open_interest,
        config.live.min_premium_spent,
        config.position.min_volume_oi_ratio,
        config.position.min_premium_spent,
    );

    let state = Arc::new(AppState { config, gateway });

    // The presentation layer is a separate origin; stay permissive
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/analyze/{ticker}", get(analyze_ticker))
        .layer(cors)
        .with_state(state);

    let addr = format!("{host}:{port}");
    info!("UOA API server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
