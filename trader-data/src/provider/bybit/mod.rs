use self::{
    interval::BybitInterval,
    kline::{BybitKlineQuery, BybitKlineResponse},
};
use crate::{
    candle::Timeframe,
    config::{BybitCredentials, ProviderConfig},
    error::DataError,
    normalise::RawCandles,
    provider::{CandleProvider, ProviderDescriptor, ProviderId, get_json},
    symbol::{MarketSymbol, SymbolMap},
};
use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;
use url::Url;

/// Defines how a [`Timeframe`] translates into a [`Bybit`] kline interval.
pub mod interval;

/// Kline REST request and response types for [`Bybit`].
pub mod kline;

/// [`Bybit`] kline category queried.
pub const CATEGORY_SPOT: &str = "spot";

/// [`Bybit`] maximum rows returned per kline request.
pub const MAX_LIMIT: usize = 1000;

/// [`Bybit`] signed request receive window in milliseconds.
///
/// See docs: <https://bybit-exchange.github.io/docs/v5/guide#authentication>
pub const RECV_WINDOW_MS: u64 = 5000;

/// [`Bybit`] position in the fallback chain.
pub const DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    id: ProviderId::Bybit,
    priority: 0,
    requires_credentials: true,
    timeframes: &Timeframe::ALL,
};

/// [`Bybit`] spot exchange kline adapter.
///
/// See docs: <https://bybit-exchange.github.io/docs/v5/market/kline>
#[derive(Debug, Clone)]
pub struct Bybit {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<BybitCredentials>,
}

impl Bybit {
    pub fn new(client: reqwest::Client, config: &ProviderConfig) -> Self {
        Self {
            client,
            base_url: config.bybit_base_url.trim_end_matches('/').to_string(),
            credentials: config.bybit.clone(),
        }
    }
}

#[async_trait]
impl CandleProvider for Bybit {
    fn descriptor(&self) -> &ProviderDescriptor {
        &DESCRIPTOR
    }

    fn native_symbol(&self, symbol: &MarketSymbol) -> String {
        SymbolMap::global().bybit_symbol(symbol)
    }

    async fn fetch(
        &self,
        native_symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<RawCandles, DataError> {
        let interval = BybitInterval::from(timeframe);
        let query = serde_urlencoded::to_string(BybitKlineQuery {
            category: CATEGORY_SPOT,
            symbol: native_symbol,
            interval: interval.as_ref(),
            limit: limit.clamp(1, MAX_LIMIT),
        })
        .map_err(|error| DataError::unavailable(ProviderId::Bybit, error))?;

        let url = Url::parse(&format!("{}/v5/market/kline?{query}", self.base_url))
            .map_err(|error| DataError::unavailable(ProviderId::Bybit, error))?;

        let mut request = self.client.get(url);
        if let Some(credentials) = &self.credentials {
            let timestamp = Utc::now().timestamp_millis();
            let signature = sign(credentials, timestamp, RECV_WINDOW_MS, &query)?;
            request = request
                .header("X-BAPI-API-KEY", &credentials.api_key)
                .header("X-BAPI-TIMESTAMP", timestamp.to_string())
                .header("X-BAPI-RECV-WINDOW", RECV_WINDOW_MS.to_string())
                .header("X-BAPI-SIGN", signature);
        }

        debug!(symbol = native_symbol, %timeframe, limit, "fetching Bybit klines");

        let response = get_json::<BybitKlineResponse>(ProviderId::Bybit, request).await?;
        RawCandles::try_from(response)
    }
}

/// Generate the hex-encoded HMAC-SHA256 signature for a signed GET request.
///
/// See docs: <https://bybit-exchange.github.io/docs/v5/guide#create-a-request>
pub fn sign(
    credentials: &BybitCredentials,
    timestamp_ms: i64,
    recv_window_ms: u64,
    query: &str,
) -> Result<String, DataError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(credentials.secret.as_bytes())
        .map_err(|error| DataError::unavailable(ProviderId::Bybit, error))?;

    mac.update(timestamp_ms.to_string().as_bytes());
    mac.update(credentials.api_key.as_bytes());
    mac.update(recv_window_ms.to_string().as_bytes());
    mac.update(query.as_bytes());

    Ok(hex::encode(mac.finalize().into_bytes()))
}
