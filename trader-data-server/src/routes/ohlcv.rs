use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use trader_data::{
    candle::{CandleSeries, Timeframe, VolumeBar},
    provider::ProviderId,
    symbol::MarketSymbol,
};

use crate::{error::ApiError, state::AppState};

pub const DEFAULT_LIMIT: usize = 100;

pub const MAX_LIMIT: usize = 1000;

#[derive(Debug, Clone, Deserialize)]
pub struct OhlcvRequest {
    pub symbol: String,
    #[serde(default)]
    pub timeframe: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl OhlcvRequest {
    pub fn timeframe(&self) -> Result<Timeframe, ApiError> {
        Ok(self
            .timeframe
            .as_deref()
            .map(str::parse::<Timeframe>)
            .transpose()?
            .unwrap_or(Timeframe::H1))
    }

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub candles: CandleSeries,
    pub volume: Vec<VolumeBar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OhlcvResponse {
    pub success: bool,
    pub data: ChartData,
    pub source: ProviderId,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/ohlcv", post(ohlcv))
}

pub async fn ohlcv(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<OhlcvRequest>, JsonRejection>,
) -> Result<Json<OhlcvResponse>, ApiError> {
    let Json(request) = payload?;

    if request.symbol.trim().is_empty() {
        return Err(ApiError::BadRequest("symbol must not be empty".to_string()));
    }

    let symbol = MarketSymbol::parse(&request.symbol);
    let timeframe = request.timeframe()?;

    let resolved = state
        .resolver
        .resolve(&symbol, timeframe, request.limit())
        .await?;

    Ok(Json(OhlcvResponse {
        success: true,
        data: ChartData {
            volume: resolved.series.volume_bars(),
            candles: resolved.series,
        },
        source: resolved.provider,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{row, state};
    use axum::http::StatusCode;
    use trader_data::candle::{DOWN_COLOUR, UP_COLOUR};

    fn request(symbol: &str, timeframe: Option<&str>, limit: Option<usize>) -> OhlcvRequest {
        OhlcvRequest {
            symbol: symbol.to_string(),
            timeframe: timeframe.map(str::to_string),
            limit,
        }
    }

    #[test]
    fn test_request_limit() {
        struct TestCase {
            input: Option<usize>,
            expected: usize,
        }

        let tests = vec![
            TestCase {
                // TC0: default
                input: None,
                expected: 100,
            },
            TestCase {
                // TC1: zero raised to one
                input: Some(0),
                expected: 1,
            },
            TestCase {
                // TC2: capped
                input: Some(5000),
                expected: 1000,
            },
            TestCase {
                // TC3: within range
                input: Some(250),
                expected: 250,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = request("BTC", None, test.input).limit();
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[tokio::test]
    async fn test_ohlcv_success() {
        let state = state(Some(vec![
            row(1_700_003_600_000, 100.0, 95.0),
            row(1_700_000_000_000, 100.0, 105.0),
        ]));

        let Json(response) = ohlcv(
            State(state),
            Ok(Json(request("BTC/USDT", Some("1h"), Some(100)))),
        )
        .await
        .unwrap();

        assert!(response.success);
        assert_eq!(response.source, ProviderId::CryptoCompare);

        let times: Vec<i64> = response.data.candles.iter().map(|c| c.time).collect();
        assert_eq!(times, vec![1_700_000_000, 1_700_003_600]);

        let colours: Vec<&str> = response.data.volume.iter().map(|bar| bar.color).collect();
        assert_eq!(colours, vec![UP_COLOUR, DOWN_COLOUR]);
        assert!(response.data.volume.iter().all(|bar| bar.value == 1_000_000.0));

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["source"], "cryptocompare");
        assert_eq!(body["data"]["candles"][0]["time"], 1_700_000_000);
    }

    #[tokio::test]
    async fn test_ohlcv_failures() {
        struct TestCase {
            secondary: Option<Vec<trader_data::normalise::TupleRow>>,
            request: OhlcvRequest,
            expected: StatusCode,
        }

        let tests = vec![
            TestCase {
                // TC0: every provider fails
                secondary: None,
                request: request("BTC/USDT", Some("5m"), None),
                expected: StatusCode::INTERNAL_SERVER_ERROR,
            },
            TestCase {
                // TC1: unknown timeframe
                secondary: Some(vec![row(1_700_000_000_000, 1.0, 2.0)]),
                request: request("BTC/USDT", Some("2w"), None),
                expected: StatusCode::BAD_REQUEST,
            },
            TestCase {
                // TC2: blank symbol
                secondary: Some(vec![row(1_700_000_000_000, 1.0, 2.0)]),
                request: request("  ", Some("1h"), None),
                expected: StatusCode::BAD_REQUEST,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = ohlcv(State(state(test.secondary)), Ok(Json(test.request)))
                .await
                .unwrap_err();
            assert_eq!(actual.status(), test.expected, "TC{} failed", index);
        }
    }
}
