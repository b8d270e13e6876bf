use self::history::CryptoCompareHistory;
use crate::{
    candle::Timeframe,
    config::ProviderConfig,
    error::DataError,
    normalise::{RawCandles, WrappedRows},
    provider::{CandleProvider, ProviderDescriptor, ProviderId, get_json},
    symbol::{MarketSymbol, SymbolMap},
};
use async_trait::async_trait;
use tracing::debug;
use url::Url;

/// Table mapping a [`Timeframe`] onto a CryptoCompare history endpoint.
pub mod history;

/// [`CryptoCompare`] quote currency.
pub const TO_SYMBOL: &str = "USD";

/// [`CryptoCompare`] maximum rows returned per history request.
pub const MAX_LIMIT: usize = 2000;

/// [`CryptoCompare`] position in the fallback chain.
pub const DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    id: ProviderId::CryptoCompare,
    priority: 1,
    requires_credentials: false,
    timeframes: &Timeframe::ALL,
};

/// [`CryptoCompare`] free tier historical OHLCV adapter, keyed by ticker.
///
/// See docs: <https://developers.cryptocompare.com/documentation/legacy/Historical/dataHistominute>
#[derive(Debug, Clone)]
pub struct CryptoCompare {
    client: reqwest::Client,
    base_url: String,
}

impl CryptoCompare {
    pub fn new(client: reqwest::Client, config: &ProviderConfig) -> Self {
        Self {
            client,
            base_url: config.cryptocompare_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, native_symbol: &str, timeframe: Timeframe, limit: usize) -> Result<Url, DataError> {
        let history = CryptoCompareHistory::from(timeframe);

        let mut url = Url::parse(&format!("{}/data/v2/{}", self.base_url, history.endpoint))
            .map_err(|error| DataError::unavailable(ProviderId::CryptoCompare, error))?;

        url.query_pairs_mut()
            .append_pair("fsym", native_symbol)
            .append_pair("tsym", TO_SYMBOL)
            .append_pair("limit", &limit.clamp(1, MAX_LIMIT).to_string())
            .append_pair("aggregate", &history.aggregate.to_string());

        Ok(url)
    }
}

#[async_trait]
impl CandleProvider for CryptoCompare {
    fn descriptor(&self) -> &ProviderDescriptor {
        &DESCRIPTOR
    }

    fn native_symbol(&self, symbol: &MarketSymbol) -> String {
        SymbolMap::global().cryptocompare_symbol(symbol)
    }

    async fn fetch(
        &self,
        native_symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<RawCandles, DataError> {
        let url = self.url(native_symbol, timeframe, limit)?;

        debug!(symbol = native_symbol, %timeframe, limit, "fetching CryptoCompare history");

        get_json::<WrappedRows>(ProviderId::CryptoCompare, self.client.get(url))
            .await
            .map(RawCandles::Wrapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url() {
        let config = ProviderConfig {
            cryptocompare_base_url: "https://min-api.cryptocompare.com/".to_string(),
            ..ProviderConfig::default()
        };
        let cryptocompare = CryptoCompare::new(reqwest::Client::new(), &config);

        let url = cryptocompare.url("MATIC", Timeframe::M5, 100).unwrap();

        assert_eq!(
            url.as_str(),
            "https://min-api.cryptocompare.com/data/v2/histominute?fsym=MATIC&tsym=USD&limit=100&aggregate=5"
        );
    }

    #[test]
    fn test_native_symbol_alias() {
        let cryptocompare = CryptoCompare::new(reqwest::Client::new(), &ProviderConfig::default());
        assert_eq!(cryptocompare.native_symbol(&MarketSymbol::parse("POL/USDT")), "MATIC");
        assert_eq!(cryptocompare.native_symbol(&MarketSymbol::parse("ADA")), "ADA");
    }
}
