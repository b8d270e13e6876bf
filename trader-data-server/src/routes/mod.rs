use axum::{Json, Router, routing::get};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::state::{AppState, CAPABILITIES};

/// Fear & greed, sentiment, whale, funding and indicator endpoints.
pub mod market;

/// Core candle resolution endpoint.
pub mod ohlcv;

/// Prediction score endpoint.
pub mod predict;

/// Market scanner endpoint.
pub mod scan;

/// Successful response envelope: `{ "success": true, "data": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Health {
    pub success: bool,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
    pub servers: [&'static str; 5],
}

/// Assemble the API router.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/health", get(health))
        .merge(ohlcv::routes())
        .merge(market::routes())
        .merge(predict::routes())
        .merge(scan::routes())
}

pub async fn health() -> Json<Health> {
    Json(Health {
        success: true,
        message: "Trader data API is running",
        timestamp: Utc::now(),
        servers: CAPABILITIES,
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Arc;
    use trader_data::{
        candle::Timeframe,
        config::ProviderConfig,
        error::DataError,
        normalise::{RawCandles, TupleRow},
        prediction::Predictor,
        provider::{CandleProvider, ProviderDescriptor, bybit, coingecko, cryptocompare},
        resolver::CandleResolver,
        scanner::MarketScanner,
        source::{
            WhaleSource,
            fear_greed::SimulatedFearGreed,
            funding::SimulatedFunding,
            indicator::SimulatedIndicators,
            sentiment::SimulatedSentiment,
            whale::{Blockchain, WhaleReport, WhaleSide, WhaleTransaction},
        },
        symbol::MarketSymbol,
    };

    use crate::state::AppState;

    pub struct FixedProvider {
        pub descriptor: ProviderDescriptor,
        pub rows: Option<Vec<TupleRow>>,
    }

    #[async_trait]
    impl CandleProvider for FixedProvider {
        fn descriptor(&self) -> &ProviderDescriptor {
            &self.descriptor
        }

        fn native_symbol(&self, symbol: &MarketSymbol) -> String {
            symbol.base.clone()
        }

        async fn fetch(&self, _: &str, _: Timeframe, _: usize) -> Result<RawCandles, DataError> {
            self.rows
                .clone()
                .map(RawCandles::Tuples)
                .ok_or_else(|| DataError::unavailable(self.descriptor.id, "HTTP error: 503"))
        }
    }

    pub struct FixedWhales;

    #[async_trait]
    impl WhaleSource for FixedWhales {
        async fn recent_transactions(
            &self,
            blockchain: Option<Blockchain>,
            _: f64,
        ) -> Result<WhaleReport, DataError> {
            let transactions = (0..6)
                .map(|index| WhaleTransaction {
                    id: format!("tx_{index}"),
                    blockchain: blockchain.unwrap_or(Blockchain::Bitcoin),
                    amount_usd: 1_000_000.0,
                    timestamp: Utc::now(),
                    side: WhaleSide::Buy,
                    confidence: Some("simulated".to_string()),
                })
                .collect();

            Ok(WhaleReport::new(transactions))
        }
    }

    pub fn row(time_ms: i64, open: f64, close: f64) -> TupleRow {
        TupleRow {
            time_ms,
            open,
            high: open.max(close) + 1.0,
            low: open.min(close) - 1.0,
            close,
            volume: None,
        }
    }

    /// State whose secondary provider serves `secondary` rows and whose other providers fail.
    pub fn state(secondary: Option<Vec<TupleRow>>) -> Arc<AppState> {
        let resolver = CandleResolver::with_providers(
            Box::new(FixedProvider {
                descriptor: bybit::DESCRIPTOR,
                rows: None,
            }),
            Box::new(FixedProvider {
                descriptor: cryptocompare::DESCRIPTOR,
                rows: secondary,
            }),
            Box::new(FixedProvider {
                descriptor: coingecko::DESCRIPTOR,
                rows: None,
            }),
            ProviderConfig::default(),
        );

        Arc::new(AppState {
            resolver,
            indicators: Arc::new(SimulatedIndicators),
            sentiment: Arc::new(SimulatedSentiment),
            fear_greed: Arc::new(SimulatedFearGreed),
            whales: Arc::new(FixedWhales),
            funding: Arc::new(SimulatedFunding),
            predictor: Predictor::new(
                Arc::new(SimulatedIndicators),
                Arc::new(SimulatedSentiment),
                Arc::new(SimulatedFearGreed),
            ),
            scanner: MarketScanner::new(Arc::new(SimulatedIndicators)),
        })
    }
}
